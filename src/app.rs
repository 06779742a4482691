use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;

use anyhow::Result;
use tracing::{debug, warn};

use crate::action::Action;
use crate::config::Config;
use crate::event::{Event, InputMode};
use crate::filter::{Filter, FilterMode};
use crate::fs::ops::{self, Transfer};
use crate::fs::{DirEntry, DirLoader, Filesystem, Listing};
use crate::selection::Selection;
use crate::session::SessionSnapshot;
use crate::viewport::Viewport;

/// Terminal rows not available to the entry list: header and status line.
pub const CHROME_ROWS: u16 = 2;

/// Ticks a status message stays visible.
const STATUS_TICKS: u16 = 30;

pub fn list_rows(term_height: u16) -> usize {
  term_height.saturating_sub(CHROME_ROWS) as usize
}

fn names(entries: &[DirEntry]) -> Vec<&str> {
  entries.iter().map(|e| e.name.as_str()).collect()
}

pub struct App {
  /// Directory the user navigated to. Differs from `listed_dir` while its
  /// listing is still in flight.
  pub current_dir: PathBuf,
  /// Directory `entries` were read from.
  pub listed_dir: PathBuf,
  pub entries: Vec<DirEntry>,
  /// Index into the effective listing.
  pub cursor: usize,
  pub viewport: Viewport,
  cursor_memory: HashMap<PathBuf, usize>,
  pending_focus: Option<OsString>,
  pub show_hidden: bool,
  /// `show_hidden` as it was for the listing in `entries`.
  listed_hidden: bool,
  pub filter: Filter,
  pub selection: Selection,
  pub transfer: Transfer,
  loader: DirLoader,
  fs: Arc<dyn Filesystem>,
  pub home: PathBuf,
  pub loading: bool,
  pub status_message: Option<String>,
  status_ticks: u16,
  pub should_quit: bool,
  pub save_on_quit: bool,
}

impl App {
  pub fn new(
    fs: Arc<dyn Filesystem>,
    tx: Sender<Event>,
    start_dir: PathBuf,
    home: PathBuf,
    config: &Config,
    term_height: u16,
  ) -> Self {
    let loader = DirLoader::new(Arc::clone(&fs), tx);
    let mut app = Self {
      current_dir: start_dir.clone(),
      listed_dir: start_dir,
      entries: Vec::new(),
      cursor: 0,
      viewport: Viewport::for_rows(list_rows(term_height)),
      cursor_memory: HashMap::new(),
      pending_focus: None,
      show_hidden: config.show_hidden,
      listed_hidden: config.show_hidden,
      filter: Filter::new(),
      selection: Selection::new(),
      transfer: Transfer::default(),
      loader,
      fs,
      home,
      loading: false,
      status_message: None,
      status_ticks: 0,
      should_quit: false,
      save_on_quit: false,
    };
    app.request_load();
    app
  }

  pub fn input_mode(&self) -> InputMode {
    match self.filter.mode {
      FilterMode::Filtering => InputMode::Filter,
      FilterMode::Unfiltered | FilterMode::Applied => InputMode::Normal,
    }
  }

  pub fn set_status(&mut self, message: String) {
    self.status_message = Some(message);
    self.status_ticks = STATUS_TICKS;
  }

  pub fn update(&mut self, action: Action) -> Result<()> {
    match action {
      Action::ForceQuit => {
        self.should_quit = true;
        self.save_on_quit = false;
        return Ok(());
      }
      Action::Resize(_, h) => {
        let len = self.effective_len();
        self.viewport.resize(list_rows(h), self.cursor, len);
        return Ok(());
      }
      Action::Tick => {
        if self.status_ticks > 0 {
          self.status_ticks -= 1;
        } else {
          self.status_message = None;
        }
        return Ok(());
      }
      Action::None => return Ok(()),
      _ => {}
    }

    match self.input_mode() {
      InputMode::Filter => self.filter_mode(action),
      InputMode::Normal => self.normal_mode(action),
    }
    Ok(())
  }

  fn filter_mode(&mut self, action: Action) {
    match action {
      Action::FilterInput(c) => self.filter.push(c, &names(&self.entries)),
      Action::FilterBackspace => self.filter.pop(&names(&self.entries)),
      Action::FilterAccept => {
        self.filter.accept();
        self.cursor = 0;
        self.viewport.reset(self.effective_len());
      }
      Action::FilterOff => self.leave_filter(),
      _ => {}
    }
  }

  fn normal_mode(&mut self, action: Action) {
    match action {
      Action::Quit => {
        self.should_quit = true;
        self.save_on_quit = true;
      }
      Action::MoveUp => self.move_by(-1),
      Action::MoveDown => self.move_by(1),
      Action::GoToTop => self.move_by(isize::MIN),
      Action::GoToBottom => self.move_by(isize::MAX),
      Action::PageUp => self.move_by(-self.viewport.page()),
      Action::PageDown => self.move_by(self.viewport.page()),
      Action::HalfPageUp => self.move_by(-self.viewport.half_page()),
      Action::HalfPageDown => self.move_by(self.viewport.half_page()),
      Action::Ascend => self.ascend(),
      Action::Descend => self.descend(),
      Action::ToggleHidden => self.toggle_hidden(),
      Action::GoHome => self.change_dir(self.home.clone(), None),
      Action::FilterOn => self.start_filter(),
      Action::FilterOff => self.leave_filter(),
      Action::ToggleSelect => self.toggle_select(),
      Action::ToggleSelectAll => self.toggle_select_all(),
      Action::Yank => self.yank(false),
      Action::Cut => self.yank(true),
      Action::Paste => self.paste(),
      _ => {}
    }
  }

  /// Applies a finished listing if it answers the most recent request.
  pub fn apply_listing(&mut self, listing: Listing) {
    if !self.loader.is_current(&listing) {
      debug!(
        generation = listing.generation,
        current = self.loader.generation(),
        path = %listing.path.display(),
        "discarding stale listing"
      );
      return;
    }
    self.loading = false;

    let entries = match listing.result {
      Ok(entries) => entries,
      Err(e) => {
        warn!(error = %e, "listing failed");
        self.set_status(format!("Cannot open {}: {}", e.path.display(), e.source));
        self.current_dir = self.listed_dir.clone();
        self.show_hidden = self.listed_hidden;
        self.pending_focus = None;
        return;
      }
    };

    debug!(path = %listing.path.display(), count = entries.len(), "applying listing");
    self.entries = entries;
    self.listed_dir = listing.path;
    self.listed_hidden = self.show_hidden;
    if self.filter.is_active() {
      self.filter.refresh(&names(&self.entries));
    }

    let len = self.effective_len();
    self.viewport.reset(len);
    let raw = self.resolve_focus();
    self.cursor = self.to_effective(raw).min(len.saturating_sub(1));
    self.viewport.follow(self.cursor, len);
  }

  /// Raw index to land on after a reload: the pending focus name if it is
  /// still listed, else the remembered index, else the top.
  fn resolve_focus(&mut self) -> usize {
    if let Some(name) = self.pending_focus.take()
      && let Some(i) = self.entries.iter().position(|e| e.file_name == name)
    {
      return i;
    }
    self.cursor_memory.get(&self.listed_dir).copied().unwrap_or(0)
  }

  fn request_load(&mut self) {
    self.loading = true;
    self.loader.request(&self.current_dir, self.show_hidden);
  }

  pub fn effective_len(&self) -> usize {
    if self.filter.is_applied() {
      self.filter.matches.len()
    } else {
      self.entries.len()
    }
  }

  /// Raw listing index of the effective position `index`.
  fn to_raw(&self, index: usize) -> Option<usize> {
    if self.filter.is_applied() {
      self.filter.matches.get(index).map(|m| m.index)
    } else {
      (index < self.entries.len()).then_some(index)
    }
  }

  fn to_effective(&self, raw: usize) -> usize {
    if self.filter.is_applied() {
      self.filter.matches.iter().position(|m| m.index == raw).unwrap_or(0)
    } else {
      raw
    }
  }

  fn raw_cursor(&self) -> usize {
    self.to_raw(self.cursor).unwrap_or(0)
  }

  /// Entry at effective position `index`.
  pub fn entry_at(&self, index: usize) -> Option<&DirEntry> {
    self.to_raw(index).and_then(|i| self.entries.get(i))
  }

  pub fn selected_entry(&self) -> Option<&DirEntry> {
    self.entry_at(self.cursor)
  }

  pub fn is_selected(&self, entry: &DirEntry) -> bool {
    self.selection.contains(&self.listed_dir, &entry.file_name)
  }

  fn move_by(&mut self, delta: isize) {
    let len = self.effective_len();
    self.cursor = self.viewport.move_cursor(self.cursor, delta, len);
  }

  fn change_dir(&mut self, dir: PathBuf, focus: Option<OsString>) {
    self.cursor_memory.insert(self.listed_dir.clone(), self.raw_cursor());
    self.filter.clear();
    self.current_dir = dir;
    self.pending_focus = focus;
    self.request_load();
  }

  fn descend(&mut self) {
    let Some(entry) = self.selected_entry() else {
      return;
    };
    let target = self.listed_dir.join(&entry.file_name);
    let is_symlink = entry.is_symlink();

    let is_dir = self.fs.stat(&target).is_ok_and(|s| s.is_dir());
    if !is_dir || !self.fs.can_read_dir(&target) {
      debug!(path = %target.display(), "not descending");
      return;
    }
    let target = if is_symlink {
      match self.fs.resolve_symlink(&target) {
        Ok(real) => real,
        Err(e) => {
          debug!(path = %target.display(), error = %e, "cannot resolve link");
          return;
        }
      }
    } else {
      target
    };
    self.change_dir(target, None);
  }

  fn ascend(&mut self) {
    let (Some(parent), Some(name)) = (self.current_dir.parent(), self.current_dir.file_name()) else {
      return;
    };
    let (parent, name) = (parent.to_path_buf(), name.to_os_string());
    self.change_dir(parent, Some(name));
  }

  /// Exits filtering, keeping the cursor on the same entry.
  fn leave_filter(&mut self) {
    if !self.filter.is_active() {
      return;
    }
    let raw = self.raw_cursor();
    self.filter.clear();
    self.cursor = raw;
    let len = self.effective_len();
    self.viewport.follow(self.cursor, len);
  }

  fn start_filter(&mut self) {
    let raw = self.raw_cursor();
    self.filter.start(&names(&self.entries));
    self.cursor = raw;
    let len = self.effective_len();
    self.viewport.follow(self.cursor, len);
  }

  fn toggle_hidden(&mut self) {
    self.leave_filter();

    if self.show_hidden {
      // Every hidden entry above the cursor drops out of the listing.
      let above = self.entries[..self.cursor.min(self.entries.len())]
        .iter()
        .filter(|e| e.is_hidden())
        .count();
      self.cursor_memory.insert(self.listed_dir.clone(), self.cursor - above);
      self.pending_focus = None;
    } else {
      // Dotfiles about to appear shift the index; follow the entry by name.
      self.cursor_memory.insert(self.listed_dir.clone(), self.cursor);
      self.pending_focus = self.entries.get(self.cursor).map(|e| e.file_name.clone());
    }

    self.show_hidden = !self.show_hidden;
    self.request_load();
  }

  fn toggle_select(&mut self) {
    let Some(name) = self.selected_entry().map(|e| e.file_name.clone()) else {
      return;
    };
    self.selection.toggle(&self.listed_dir, &name);
    self.move_by(1);
  }

  fn toggle_select_all(&mut self) {
    let visible: Vec<OsString> = (0..self.effective_len())
      .filter_map(|i| self.entry_at(i).map(|e| e.file_name.clone()))
      .collect();
    self.selection.toggle_all(&self.listed_dir, &visible);
  }

  /// Selected paths, or the entry under the cursor when nothing is selected.
  fn transfer_sources(&self) -> Vec<PathBuf> {
    if !self.selection.is_empty() {
      return self.selection.paths();
    }
    self
      .selected_entry()
      .map(|e| vec![self.listed_dir.join(&e.file_name)])
      .unwrap_or_default()
  }

  fn yank(&mut self, cut: bool) {
    let sources = self.transfer_sources();
    let count = sources.len();
    if cut {
      self.transfer.cut(sources);
    } else {
      self.transfer.yank(sources);
    }
    if count == 0 {
      return;
    }
    if cut {
      self.set_status(format!("{count} file(s) ready to be cut and pasted"));
    } else {
      self.set_status(format!("Yanked {count} file(s)"));
    }
  }

  fn paste(&mut self) {
    if self.transfer.is_empty() {
      self.set_status("Nothing to paste".to_string());
      return;
    }
    let total = self.transfer.buffer.len();
    let dest = self.listed_dir.clone();
    let report = ops::paste(self.fs.as_ref(), &mut self.transfer, &dest);

    if report.any_error() {
      self.set_status(format!("Error while pasting: {} of {total} failed", report.errors.len()));
    } else {
      self.set_status(format!("Pasted {} file(s)", report.pasted.len()));
    }
    if report.moved {
      for path in &report.removed {
        self.selection.remove_path(path);
      }
      self.leave_filter();
    }

    self.cursor_memory.insert(self.listed_dir.clone(), self.raw_cursor());
    self.pending_focus = None;
    self.request_load();
  }

  pub fn snapshot(&self) -> SessionSnapshot {
    SessionSnapshot {
      current_dir: self.current_dir.clone(),
      flattened_selection: self.selection.flatten(),
    }
  }
}

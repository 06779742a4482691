mod action;
mod app;
mod config;
mod error;
mod event;
mod filter;
mod fs;
mod logging;
mod selection;
mod session;
mod ui;
mod viewport;

use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};

use crate::action::Action;
use crate::app::App;
use crate::event::{Event, EventLoop, map_key};
use crate::fs::RealFs;

fn main() {
  if let Err(e) = run() {
    eprintln!("hop: {e:#}");
    std::process::exit(1);
  }
}

fn run() -> Result<()> {
  let args: Vec<String> = std::env::args().skip(1).collect();

  let mut show_help = false;
  let mut show_version = false;
  let mut show_init = false;
  let mut show_hidden = false;
  let mut path_arg: Option<String> = None;

  for arg in &args {
    match arg.as_str() {
      "--help" | "-h" => show_help = true,
      "--version" | "-V" => show_version = true,
      "--init" => show_init = true,
      "--all" | "-a" => show_hidden = true,
      a if !a.starts_with('-') => path_arg = Some(a.to_string()),
      _ => {
        eprintln!("hop: unknown option '{arg}'");
        std::process::exit(1);
      }
    }
  }

  if show_help {
    println!(concat!(
      "hop - terminal file browser\n",
      "\n",
      "Usage: hop [options] [path]\n",
      "\n",
      "Options:\n",
      "  -a, --all                Show hidden files\n",
      "  --init                   Write the default config to ~/.config/hop/\n",
      "  -h, --help               Print this help message\n",
      "  -V, --version            Print version\n",
      "\n",
      "If no path is given, opens the current directory.\n",
      "On quit, the last directory and selection are written to the cache\n",
      "directory (lastdir, selection) and the selection is copied to the clipboard.",
    ));
    return Ok(());
  }

  if show_version {
    println!("hop {}", env!("CARGO_PKG_VERSION"));
    return Ok(());
  }

  if show_init {
    let config_path = config::Config::config_path().map_err(anyhow::Error::msg)?;
    let write_config = if config_path.exists() {
      eprint!("{} already exists. Overwrite? [y/N] ", config_path.display());
      let mut answer = String::new();
      io::stdin().read_line(&mut answer).unwrap_or(0);
      answer.trim().eq_ignore_ascii_case("y")
    } else {
      true
    };
    if write_config {
      config::Config::dump_default_config(&config_path).map_err(anyhow::Error::msg)?;
      println!("{}", config_path.display());
    }
    return Ok(());
  }

  let (mut config, config_errors) = config::Config::load();
  if show_hidden {
    config.show_hidden = true;
  }

  let home = dirs::home_dir().context("could not determine home directory")?;
  let root = match path_arg {
    Some(path) => PathBuf::from(path),
    None => std::env::current_dir().context("could not determine working directory")?,
  };
  let root = std::fs::canonicalize(&root).with_context(|| format!("cannot open {}", root.display()))?;

  let cache_dir = session::cache_dir();
  let _log_guard = cache_dir
    .as_ref()
    .ok()
    .and_then(|dir| logging::init(dir, &config.log_level));
  info!(root = %root.display(), "starting");

  let original_hook = panic::take_hook();
  panic::set_hook(Box::new(move |info| {
    let _ = restore_terminal();
    original_hook(info);
  }));

  setup_terminal()?;
  let backend = CrosstermBackend::new(io::stdout());
  let mut terminal = Terminal::new(backend)?;
  let (_, rows) = crossterm::terminal::size()?;

  let events = EventLoop::new(Duration::from_millis(config.tick_rate_ms));
  let mut app = App::new(Arc::new(RealFs), events.sender(), root, home, &config, rows);

  if !config_errors.is_empty() {
    for e in &config_errors {
      warn!(error = %e, "config");
    }
    app.set_status(config_errors.join("; "));
  }

  let outcome = event_loop(&mut terminal, &events, &mut app, &config);
  restore_terminal()?;
  outcome?;

  if app.save_on_quit {
    let snapshot = app.snapshot();
    snapshot.save(&cache_dir?)?;
    snapshot.copy_selection_to_clipboard();
  }
  info!("exiting");

  Ok(())
}

fn event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  events: &EventLoop,
  app: &mut App,
  config: &config::Config,
) -> Result<()> {
  loop {
    terminal.draw(|frame| ui::draw(frame, app))?;

    match events.next()? {
      Event::Key(key) => {
        let action = map_key(key, app.input_mode(), config);
        app.update(action)?;
      }
      Event::Resize(w, h) => app.update(Action::Resize(w, h))?,
      Event::Tick => app.update(Action::Tick)?,
      Event::DirLoaded(listing) => app.apply_listing(listing),
    }

    if app.should_quit {
      return Ok(());
    }
  }
}

fn setup_terminal() -> Result<()> {
  enable_raw_mode()?;
  execute!(io::stdout(), EnterAlternateScreen)?;
  Ok(())
}

fn restore_terminal() -> Result<()> {
  disable_raw_mode()?;
  execute!(io::stdout(), LeaveAlternateScreen)?;
  Ok(())
}

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::action::Action;
use crate::config::{Config, is_force_quit, normalize_key_event};
use crate::fs::Listing;

pub enum Event {
  Key(KeyEvent),
  Resize(u16, u16),
  Tick,
  DirLoaded(Listing),
}

pub struct EventLoop {
  tx: mpsc::Sender<Event>,
  rx: mpsc::Receiver<Event>,
}

impl EventLoop {
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::channel();
    let input_tx = tx.clone();

    thread::spawn(move || loop {
      if event::poll(tick_rate).unwrap_or(false) {
        match event::read() {
          Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
            if input_tx.send(Event::Key(key)).is_err() {
              break;
            }
          }
          Ok(CrosstermEvent::Resize(w, h)) => {
            if input_tx.send(Event::Resize(w, h)).is_err() {
              break;
            }
          }
          _ => {}
        }
      } else if input_tx.send(Event::Tick).is_err() {
        break;
      }
    });

    Self { tx, rx }
  }

  /// Handle for background workers that feed results back into the loop.
  pub fn sender(&self) -> mpsc::Sender<Event> {
    self.tx.clone()
  }

  pub fn next(&self) -> Result<Event> {
    Ok(self.rx.recv()?)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
  Normal,
  Filter,
}

pub fn map_key(key: KeyEvent, mode: InputMode, config: &Config) -> Action {
  let kb = normalize_key_event(key);
  if is_force_quit(&kb) {
    return Action::ForceQuit;
  }

  match mode {
    InputMode::Filter => {
      if let Some(action) = config.filter_keys.get(&kb) {
        return action.clone();
      }
      match key.code {
        KeyCode::Backspace => Action::FilterBackspace,
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
          Action::FilterInput(c)
        }
        _ => Action::None,
      }
    }
    InputMode::Normal => config.normal_keys.get(&kb).cloned().unwrap_or(Action::None),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent {
      code,
      modifiers: KeyModifiers::NONE,
      kind: KeyEventKind::Press,
      state: KeyEventState::NONE,
    }
  }

  fn key_with_mod(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent {
      code,
      modifiers,
      kind: KeyEventKind::Press,
      state: KeyEventState::NONE,
    }
  }

  fn cfg() -> Config {
    Config::default()
  }

  #[test]
  fn test_normal_mode_quit() {
    let c = cfg();
    assert_eq!(map_key(key(KeyCode::Char('q')), InputMode::Normal, &c), Action::Quit);
  }

  #[test]
  fn test_normal_mode_navigation() {
    let c = cfg();
    assert_eq!(map_key(key(KeyCode::Char('j')), InputMode::Normal, &c), Action::MoveDown);
    assert_eq!(map_key(key(KeyCode::Char('k')), InputMode::Normal, &c), Action::MoveUp);
    assert_eq!(map_key(key(KeyCode::Left), InputMode::Normal, &c), Action::Ascend);
    assert_eq!(map_key(key(KeyCode::Char('l')), InputMode::Normal, &c), Action::Descend);
    assert_eq!(map_key(key(KeyCode::Home), InputMode::Normal, &c), Action::GoToTop);
    assert_eq!(
      map_key(key_with_mod(KeyCode::Char('G'), KeyModifiers::SHIFT), InputMode::Normal, &c),
      Action::GoToBottom
    );
    assert_eq!(
      map_key(key_with_mod(KeyCode::Char('d'), KeyModifiers::CONTROL), InputMode::Normal, &c),
      Action::HalfPageDown
    );
  }

  #[test]
  fn test_normal_mode_selection_keys() {
    let c = cfg();
    assert_eq!(map_key(key(KeyCode::Char(' ')), InputMode::Normal, &c), Action::ToggleSelect);
    assert_eq!(map_key(key(KeyCode::Char('y')), InputMode::Normal, &c), Action::Yank);
    assert_eq!(map_key(key(KeyCode::Char('x')), InputMode::Normal, &c), Action::Cut);
    assert_eq!(map_key(key(KeyCode::Char('p')), InputMode::Normal, &c), Action::Paste);
  }

  #[test]
  fn test_unbound_key_is_none() {
    let c = cfg();
    assert_eq!(map_key(key(KeyCode::Char('z')), InputMode::Normal, &c), Action::None);
    assert_eq!(map_key(key(KeyCode::F(5)), InputMode::Filter, &c), Action::None);
  }

  #[test]
  fn test_ctrl_c_force_quits_everywhere() {
    let c = cfg();
    let ctrl_c = key_with_mod(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert_eq!(map_key(ctrl_c, InputMode::Normal, &c), Action::ForceQuit);
    assert_eq!(map_key(ctrl_c, InputMode::Filter, &c), Action::ForceQuit);
  }

  #[test]
  fn test_ctrl_c_survives_rebinding() {
    let mut c = cfg();
    let kb = crate::config::KeyBinding {
      code: KeyCode::Char('c'),
      modifiers: KeyModifiers::CONTROL,
    };
    c.normal_keys.insert(kb, Action::MoveDown);
    assert_eq!(
      map_key(key_with_mod(KeyCode::Char('c'), KeyModifiers::CONTROL), InputMode::Normal, &c),
      Action::ForceQuit
    );
  }

  #[test]
  fn test_filter_mode() {
    let c = cfg();
    assert_eq!(map_key(key(KeyCode::Char('j')), InputMode::Filter, &c), Action::FilterInput('j'));
    assert_eq!(map_key(key(KeyCode::Char('q')), InputMode::Filter, &c), Action::FilterInput('q'));
    assert_eq!(
      map_key(key_with_mod(KeyCode::Char('B'), KeyModifiers::SHIFT), InputMode::Filter, &c),
      Action::FilterInput('B')
    );
    assert_eq!(map_key(key(KeyCode::Enter), InputMode::Filter, &c), Action::FilterAccept);
    assert_eq!(map_key(key(KeyCode::Down), InputMode::Filter, &c), Action::FilterAccept);
    assert_eq!(
      map_key(key_with_mod(KeyCode::BackTab, KeyModifiers::SHIFT), InputMode::Filter, &c),
      Action::FilterAccept
    );
    assert_eq!(
      map_key(key_with_mod(KeyCode::Char('k'), KeyModifiers::CONTROL), InputMode::Filter, &c),
      Action::FilterAccept
    );
    assert_eq!(map_key(key(KeyCode::Esc), InputMode::Filter, &c), Action::FilterOff);
    assert_eq!(map_key(key(KeyCode::Backspace), InputMode::Filter, &c), Action::FilterBackspace);
  }

  #[test]
  fn test_filter_ignores_unbound_control_chars() {
    let c = cfg();
    assert_eq!(
      map_key(key_with_mod(KeyCode::Char('x'), KeyModifiers::CONTROL), InputMode::Filter, &c),
      Action::None
    );
  }

  #[test]
  fn test_custom_config_remaps_key() {
    let mut c = cfg();
    let kb = crate::config::KeyBinding {
      code: KeyCode::Char('j'),
      modifiers: KeyModifiers::NONE,
    };
    c.normal_keys.insert(kb, Action::Quit);
    assert_eq!(map_key(key(KeyCode::Char('j')), InputMode::Normal, &c), Action::Quit);
  }

  #[test]
  fn test_sender_feeds_the_loop() {
    let (tx, rx) = mpsc::channel();
    let events = EventLoop { tx, rx };
    events.sender().send(Event::Tick).unwrap();
    assert!(matches!(events.next().unwrap(), Event::Tick));
  }
}

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

use crate::action::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
  pub code: KeyCode,
  pub modifiers: KeyModifiers,
}

pub struct Config {
  pub tick_rate_ms: u64,
  pub show_hidden: bool,
  pub log_level: String,
  pub normal_keys: HashMap<KeyBinding, Action>,
  pub filter_keys: HashMap<KeyBinding, Action>,
}

#[derive(Deserialize, Default)]
struct TomlConfig {
  general: Option<GeneralConfig>,
  keys: Option<KeysConfig>,
}

#[derive(Deserialize, Default)]
struct GeneralConfig {
  tick_rate_ms: Option<u64>,
  show_hidden: Option<bool>,
  log_level: Option<String>,
}

#[derive(Deserialize, Default)]
struct KeysConfig {
  normal: Option<HashMap<String, String>>,
  filter: Option<HashMap<String, String>>,
}

pub fn parse_key_binding(s: &str) -> Option<KeyBinding> {
  if s.is_empty() {
    return None;
  }

  let parts: Vec<&str> = s.split('+').collect();

  if parts.len() == 1 {
    let key = parts[0];
    if let Some(code) = named_key(key) {
      return Some(KeyBinding { code, modifiers: KeyModifiers::NONE });
    }
    let chars: Vec<char> = key.chars().collect();
    if chars.len() == 1 {
      return Some(KeyBinding { code: KeyCode::Char(chars[0]), modifiers: KeyModifiers::NONE });
    }
    return None;
  }

  if parts.len() == 2 {
    let modifier_str = parts[0].to_lowercase();
    let key_str = parts[1];

    let modifiers = match modifier_str.as_str() {
      "ctrl" => KeyModifiers::CONTROL,
      "shift" => {
        let chars: Vec<char> = key_str.chars().collect();
        if chars.len() == 1 {
          let c = chars[0].to_uppercase().next().unwrap_or(chars[0]);
          return Some(KeyBinding { code: KeyCode::Char(c), modifiers: KeyModifiers::NONE });
        }
        if key_str.eq_ignore_ascii_case("tab") {
          return Some(KeyBinding { code: KeyCode::BackTab, modifiers: KeyModifiers::NONE });
        }
        if let Some(code) = named_key(key_str) {
          return Some(KeyBinding { code, modifiers: KeyModifiers::SHIFT });
        }
        return None;
      }
      "alt" => KeyModifiers::ALT,
      _ => return None,
    };

    if let Some(code) = named_key(key_str) {
      return Some(KeyBinding { code, modifiers });
    }
    let chars: Vec<char> = key_str.chars().collect();
    if chars.len() == 1 {
      return Some(KeyBinding { code: KeyCode::Char(chars[0]), modifiers });
    }
    return None;
  }

  None
}

fn named_key(s: &str) -> Option<KeyCode> {
  match s.to_lowercase().as_str() {
    "enter" => Some(KeyCode::Enter),
    "space" => Some(KeyCode::Char(' ')),
    "esc" => Some(KeyCode::Esc),
    "up" => Some(KeyCode::Up),
    "down" => Some(KeyCode::Down),
    "left" => Some(KeyCode::Left),
    "right" => Some(KeyCode::Right),
    "home" => Some(KeyCode::Home),
    "end" => Some(KeyCode::End),
    "backspace" => Some(KeyCode::Backspace),
    "tab" => Some(KeyCode::Tab),
    "backtab" => Some(KeyCode::BackTab),
    "pageup" => Some(KeyCode::PageUp),
    "pagedown" => Some(KeyCode::PageDown),
    _ => None,
  }
}

pub fn normalize_key_event(key: KeyEvent) -> KeyBinding {
  let mut modifiers = key.modifiers;
  // Shift is already folded into the character (`G`, `~`) and into BackTab.
  if matches!(key.code, KeyCode::Char(_) | KeyCode::BackTab) {
    modifiers -= KeyModifiers::SHIFT;
  }
  KeyBinding { code: key.code, modifiers }
}

/// Ctrl+C, which quits from every mode regardless of the key tables.
pub fn is_force_quit(kb: &KeyBinding) -> bool {
  kb.code == KeyCode::Char('c') && kb.modifiers == KeyModifiers::CONTROL
}

impl Default for Config {
  fn default() -> Self {
    let mut config = Config::empty();
    let mut errors = Vec::new();
    config.apply_toml_str(Config::default_toml(), &mut errors);
    config
  }
}

fn bind_table(table: &HashMap<String, String>, keys: &mut HashMap<KeyBinding, Action>, errors: &mut Vec<String>) {
  keys.clear();
  for (key_str, action_str) in table {
    let Some(kb) = parse_key_binding(key_str) else {
      errors.push(format!("invalid key binding: {key_str:?}"));
      continue;
    };
    let Some(action) = Action::from_name(action_str) else {
      errors.push(format!("invalid action: {action_str:?}"));
      continue;
    };
    keys.insert(kb, action);
  }
}

impl Config {
  fn empty() -> Self {
    Config {
      tick_rate_ms: 100,
      show_hidden: false,
      log_level: "info".to_string(),
      normal_keys: HashMap::new(),
      filter_keys: HashMap::new(),
    }
  }

  fn apply_toml_str(&mut self, s: &str, errors: &mut Vec<String>) {
    let toml_config: TomlConfig = match toml::from_str(s) {
      Ok(c) => c,
      Err(e) => {
        errors.push(format!("failed to parse config.toml: {e}"));
        return;
      }
    };

    if let Some(general) = toml_config.general {
      if let Some(tick) = general.tick_rate_ms {
        self.tick_rate_ms = tick;
      }
      if let Some(show_hidden) = general.show_hidden {
        self.show_hidden = show_hidden;
      }
      if let Some(level) = general.log_level {
        self.log_level = level;
      }
    }

    if let Some(keys) = toml_config.keys {
      if let Some(normal) = keys.normal {
        bind_table(&normal, &mut self.normal_keys, errors);
      }
      if let Some(filter) = keys.filter {
        bind_table(&filter, &mut self.filter_keys, errors);
      }
    }
  }

  pub fn default_toml() -> &'static str {
    r#"[general]
tick_rate_ms = 100    # event loop tick rate in ms
show_hidden = false   # start with dotfiles visible
log_level = "info"    # overridden by HOP_LOG

[keys.normal]
k = "up"
up = "up"
j = "down"
down = "down"
h = "ascend"
left = "ascend"
l = "descend"
right = "descend"
g = "top"
home = "top"
"shift+g" = "bottom"
end = "bottom"
"ctrl+f" = "page_down"
pagedown = "page_down"
"ctrl+b" = "page_up"
pageup = "page_up"
"ctrl+d" = "half_page_down"
"ctrl+u" = "half_page_up"
"." = "toggle_hidden"
"~" = "go_home"
"/" = "filter_on"
esc = "filter_off"
space = "toggle_select"
a = "toggle_select_all"
y = "yank"
x = "cut"
p = "paste"
q = "quit"

[keys.filter]
esc = "filter_off"
enter = "filter_accept"
tab = "filter_accept"
"shift+tab" = "filter_accept"
up = "filter_accept"
down = "filter_accept"
"ctrl+j" = "filter_accept"
"ctrl+k" = "filter_accept"
backspace = "filter_backspace"
"#
  }

  pub fn config_path() -> Result<PathBuf, String> {
    dirs::config_dir()
      .map(|d| d.join("hop").join("config.toml"))
      .ok_or_else(|| "could not determine config directory".to_string())
  }

  pub fn dump_default_config(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| format!("failed to create {}: {e}", parent.display()))?;
    }

    std::fs::write(path, Self::default_toml())
      .map_err(|e| format!("failed to write {}: {e}", path.display()))?;

    Ok(())
  }

  pub fn load() -> (Config, Vec<String>) {
    let mut errors = Vec::new();
    let content = Self::config_path()
      .ok()
      .and_then(|p| std::fs::read_to_string(p).ok());

    let config = match content {
      Some(s) => Self::load_from_str_with_errors(&s, &mut errors),
      None => Config::default(),
    };
    (config, errors)
  }

  #[cfg(test)]
  pub fn load_from_str(s: &str) -> Config {
    let mut errors = Vec::new();
    Self::load_from_str_with_errors(s, &mut errors)
  }

  fn load_from_str_with_errors(s: &str, errors: &mut Vec<String>) -> Config {
    let mut config = Config::default();
    config.apply_toml_str(s, errors);
    config
  }
}

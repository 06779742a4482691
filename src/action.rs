#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
  Quit,
  ForceQuit,
  MoveUp,
  MoveDown,
  GoToTop,
  GoToBottom,
  PageUp,
  PageDown,
  HalfPageUp,
  HalfPageDown,
  Ascend,
  Descend,
  ToggleHidden,
  GoHome,
  FilterOn,
  FilterOff,
  FilterAccept,
  FilterInput(char),
  FilterBackspace,
  ToggleSelect,
  ToggleSelectAll,
  Yank,
  Cut,
  Paste,
  Resize(u16, u16),
  Tick,
  None,
}

impl Action {
  pub fn from_name(name: &str) -> Option<Action> {
    match name {
      "quit" => Some(Action::Quit),
      "force_quit" => Some(Action::ForceQuit),
      "up" => Some(Action::MoveUp),
      "down" => Some(Action::MoveDown),
      "top" => Some(Action::GoToTop),
      "bottom" => Some(Action::GoToBottom),
      "page_up" => Some(Action::PageUp),
      "page_down" => Some(Action::PageDown),
      "half_page_up" => Some(Action::HalfPageUp),
      "half_page_down" => Some(Action::HalfPageDown),
      "ascend" => Some(Action::Ascend),
      "descend" => Some(Action::Descend),
      "toggle_hidden" => Some(Action::ToggleHidden),
      "go_home" => Some(Action::GoHome),
      "filter_on" => Some(Action::FilterOn),
      "filter_off" => Some(Action::FilterOff),
      "filter_accept" => Some(Action::FilterAccept),
      "filter_backspace" => Some(Action::FilterBackspace),
      "toggle_select" => Some(Action::ToggleSelect),
      "toggle_select_all" => Some(Action::ToggleSelectAll),
      "yank" => Some(Action::Yank),
      "cut" => Some(Action::Cut),
      "paste" => Some(Action::Paste),
      "none" => Some(Action::None),
      _ => None,
    }
  }
}

pub mod entry_list;
pub mod status_bar;

use std::path::Path;

use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &App) {
  let area = frame.area();

  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(1),    // entries
      Constraint::Length(1), // status bar
    ])
    .split(area);

  render_header(app, chunks[0], frame.buffer_mut());
  entry_list::render_entry_list(app, chunks[1], frame.buffer_mut());
  status_bar::render_status_bar(app, chunks[2], frame.buffer_mut());
}

/// `path` with the home directory prefix replaced by `~`.
pub fn abbreviate_home(path: &Path, home: &Path) -> String {
  if home.as_os_str().is_empty() || home == Path::new("/") {
    return path.display().to_string();
  }
  match path.strip_prefix(home) {
    Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
    Ok(rest) => format!("~/{}", rest.display()),
    Err(_) => path.display().to_string(),
  }
}

fn render_header(app: &App, area: Rect, buf: &mut Buffer) {
  let dir = abbreviate_home(&app.current_dir, &app.home);
  let separator = if dir.ends_with('/') { "" } else { "/" };

  let mut spans = vec![Span::styled(
    format!(" {dir}{separator}"),
    Style::default().fg(Color::Indexed(75)).add_modifier(Modifier::BOLD),
  )];
  if !app.loading
    && let Some(entry) = app.selected_entry()
  {
    spans.push(Span::styled(
      entry.name.clone(),
      Style::default().fg(Color::Indexed(252)).add_modifier(Modifier::BOLD),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Indexed(236)));
  paragraph.render(area, buf);
}

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::app::App;
use crate::filter::FilterMode;
use crate::fs::EntryKind;

fn kind_label(kind: EntryKind) -> &'static str {
  match kind {
    EntryKind::Regular => "file",
    EntryKind::Directory => "dir",
    EntryKind::Symlink => "link",
  }
}

pub fn render_status_bar(app: &App, area: Rect, buf: &mut Buffer) {
  let line = match app.filter.mode {
    FilterMode::Filtering => Line::from(vec![
      Span::styled(" /", Style::default().fg(Color::Indexed(75)).add_modifier(Modifier::BOLD)),
      Span::styled(app.filter.query.clone(), Style::default().fg(Color::Indexed(252))),
      Span::styled("▌", Style::default().fg(Color::Indexed(75))),
      Span::styled(
        format!("  {}/{}", app.filter.matches.len(), app.entries.len()),
        Style::default().fg(Color::DarkGray),
      ),
    ]),
    FilterMode::Applied | FilterMode::Unfiltered => {
      if let Some(ref msg) = app.status_message {
        Line::from(vec![Span::styled(format!(" {msg}"), Style::default().fg(Color::Indexed(150)))])
      } else {
        let mut spans = Vec::new();
        if let Some(entry) = app.selected_entry() {
          spans.push(Span::styled(
            format!(" {:o}", entry.stat.mode),
            Style::default().fg(Color::DarkGray),
          ));
          spans.push(Span::styled(
            format!(" {} {}", kind_label(entry.kind()), entry.stat.len),
            Style::default().fg(Color::DarkGray),
          ));
        }
        if app.filter.is_applied() {
          spans.push(Span::styled(
            format!(" /{}", app.filter.query),
            Style::default().fg(Color::Indexed(75)),
          ));
        }
        if !app.selection.is_empty() {
          spans.push(Span::styled(
            format!(" [{} selected, {} here]", app.selection.len(), app.selection.count_in(&app.listed_dir)),
            Style::default().fg(Color::Indexed(214)),
          ));
        }
        if app.show_hidden {
          spans.push(Span::styled(" [hidden: on]", Style::default().fg(Color::DarkGray)));
        }
        let len = app.effective_len();
        let position = if len == 0 { 0 } else { app.cursor + 1 };
        spans.push(Span::styled(format!(" {position}/{len} "), Style::default().fg(Color::DarkGray)));
        Line::from(spans)
      }
    }
  };

  let paragraph = Paragraph::new(line).style(Style::default().bg(Color::Indexed(236)));
  paragraph.render(area, buf);
}

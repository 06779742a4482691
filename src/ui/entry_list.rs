use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::app::App;
use crate::filter::FilterMode;
use crate::fs::{DirEntry, EntryKind};

/// One rendered line of the listing.
struct Row<'a> {
  entry: &'a DirEntry,
  positions: &'a [usize],
  is_cursor: bool,
}

/// Splits a name into spans, styling the characters at `positions` (char
/// indices, as reported by the matcher) with `highlight_style`.
fn highlight_name(name: &str, positions: &[usize], base_style: Style, highlight_style: Style) -> Vec<Span<'static>> {
  if positions.is_empty() {
    return vec![Span::styled(name.to_string(), base_style)];
  }

  let mut spans = Vec::new();
  let mut run = String::new();
  let mut run_hit = false;
  for (i, c) in name.chars().enumerate() {
    let hit = positions.contains(&i);
    if hit != run_hit && !run.is_empty() {
      let style = if run_hit { highlight_style } else { base_style };
      spans.push(Span::styled(std::mem::take(&mut run), style));
    }
    run_hit = hit;
    run.push(c);
  }
  if !run.is_empty() {
    let style = if run_hit { highlight_style } else { base_style };
    spans.push(Span::styled(run, style));
  }
  spans
}

fn name_color(kind: EntryKind) -> Color {
  match kind {
    EntryKind::Directory => Color::Indexed(75),
    EntryKind::Symlink => Color::Indexed(80),
    EntryKind::Regular => Color::Indexed(252),
  }
}

fn visible_rows(app: &App, height: usize) -> Vec<Row<'_>> {
  match app.filter.mode {
    // The list narrows live while typing; the top match is what accept lands on.
    FilterMode::Filtering => app
      .filter
      .matches
      .iter()
      .take(height)
      .enumerate()
      .filter_map(|(i, m)| {
        let entry = app.entries.get(m.index)?;
        Some(Row { entry, positions: &m.positions, is_cursor: i == 0 })
      })
      .collect(),
    FilterMode::Applied | FilterMode::Unfiltered => {
      let len = app.effective_len();
      if len == 0 {
        return Vec::new();
      }
      let last = app.viewport.max.min(len - 1);
      (app.viewport.min..=last)
        .take(height)
        .filter_map(|i| {
          let entry = app.entry_at(i)?;
          let positions = if app.filter.is_applied() {
            app.filter.matches.get(i).map_or(&[][..], |m| m.positions.as_slice())
          } else {
            &[][..]
          };
          Some(Row { entry, positions, is_cursor: i == app.cursor })
        })
        .collect()
    }
  }
}

fn render_row(app: &App, row: &Row) -> Line<'static> {
  let entry = row.entry;
  let selected = app.is_selected(entry);
  let is_cut = app.transfer.is_cut(&app.listed_dir.join(&entry.file_name));

  let name_style = if row.is_cursor {
    Style::default()
      .fg(Color::Indexed(234))
      .bg(Color::Indexed(75))
      .add_modifier(Modifier::BOLD)
  } else if is_cut {
    Style::default()
      .fg(name_color(entry.kind()))
      .add_modifier(Modifier::DIM | Modifier::CROSSED_OUT)
  } else if entry.is_dir() {
    Style::default().fg(name_color(entry.kind())).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(name_color(entry.kind()))
  };
  let highlight_style = name_style
    .fg(Color::Indexed(220))
    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

  let mark = if selected {
    Span::styled(" ● ", Style::default().fg(Color::Indexed(214)))
  } else {
    Span::raw("   ")
  };

  let mut spans = vec![mark];
  spans.extend(highlight_name(&entry.name, row.positions, name_style, highlight_style));
  if entry.is_dir() {
    spans.push(Span::styled("/", name_style));
  } else if entry.is_symlink() {
    spans.push(Span::styled(" @", Style::default().fg(Color::DarkGray)));
  }
  Line::from(spans)
}

pub fn render_entry_list(app: &App, area: Rect, buf: &mut Buffer) {
  let rows = visible_rows(app, area.height as usize);

  let lines: Vec<Line> = if rows.is_empty() {
    let placeholder = if app.loading && app.entries.is_empty() {
      " Loading…"
    } else if app.filter.is_active() && !app.entries.is_empty() {
      " No matches"
    } else {
      " Empty directory"
    };
    vec![Line::from(Span::styled(placeholder, Style::default().fg(Color::DarkGray)))]
  } else {
    rows.iter().map(|row| render_row(app, row)).collect()
  };

  Paragraph::new(lines).render(area, buf);
}

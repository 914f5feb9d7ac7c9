//! Right panel on the people screen: the open popup, or where the viewer is.

use catchin_core::location::LocationState;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the detail pane into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let session = &app.session;
  let popup = app.selected.and_then(|id| session.popup(id));
  let person = app.selected.and_then(|id| session.directory().get(id));

  let (Some(popup), Some(person)) = (popup, person) else {
    draw_location(f, area, app);
    return;
  };

  let block = Block::default()
    .title(format!(" {} ", popup.title))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let pending = session.outbox().pending_for(person.id);
  let mut lines = vec![
    Line::from(Span::styled(popup.subtitle, Style::default().fg(Color::Cyan))),
    Line::from(Span::styled(popup.detail, Style::default().fg(Color::Yellow))),
    Line::from(""),
    Line::from(person.bio.clone()),
    Line::from(""),
  ];
  match (session.favorite_cafe(person), &person.favorite_place) {
    (Some(cafe), _) => lines.push(Line::from(Span::styled(
      format!("Favourite spot: {} · partner -{}%", cafe.name, cafe.discount),
      Style::default().fg(Color::Magenta),
    ))),
    (None, Some(place)) => lines.push(Line::from(Span::styled(
      format!("Favourite spot: {place}"),
      Style::default().fg(Color::DarkGray),
    ))),
    (None, None) => {}
  }
  if pending > 0 {
    lines.push(Line::from(Span::styled(
      format!("{pending} invitation(s) waiting for a reply"),
      Style::default().fg(Color::DarkGray),
    )));
  }
  lines.push(Line::from(Span::styled(
    format!("[i] {}", popup.invite_label),
    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
  )));

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn draw_location(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Your location ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let dim = Style::default().fg(Color::DarkGray);
  let mut lines = match app.session.location() {
    LocationState::Idle => vec![Line::styled("Location not requested.", dim)],
    LocationState::Pending => vec![Line::styled(
      "Locating…",
      Style::default().fg(Color::Yellow),
    )],
    LocationState::Located(at) => vec![
      Line::styled(format!("📍 {at}"), Style::default().fg(Color::Green)),
      Line::styled("Distances are measured from here.", dim),
    ],
    LocationState::Failed(e) => vec![
      Line::styled(e.message(), Style::default().fg(Color::Red)),
      Line::styled("Showing the default area. Press r to retry.", dim),
    ],
  };
  lines.push(Line::from(""));
  lines.push(Line::styled("Select someone and press Enter.", dim));

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

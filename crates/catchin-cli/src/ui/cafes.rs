//! Partner cafés with their offers.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let cafes = app.session.cafes();

  let block = Block::default()
    .title(format!(" Partner cafés ({}) ", cafes.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let dim = Style::default().fg(Color::DarkGray);
  let mut lines = Vec::new();
  for nearby in &cafes {
    let cafe = nearby.cafe;
    let mut head = vec![
      Span::styled(
        format!("{:<20}", cafe.name),
        Style::default().add_modifier(Modifier::BOLD),
      ),
      Span::styled(format!("-{}%  ", cafe.discount), Style::default().fg(Color::Green)),
      Span::styled(format!("★ {}  ", cafe.rating), Style::default().fg(Color::Yellow)),
    ];
    if let Some(min) = nearby.walk_minutes {
      head.push(Span::styled(format!("{min} min on foot  "), Style::default().fg(Color::Cyan)));
    }
    if cafe.has_qr {
      head.push(Span::styled("[QR]", dim));
    }
    lines.push(Line::from(head));
    if !cafe.menu.is_empty() {
      lines.push(Line::styled(format!("  {}", cafe.menu.join(" · ")), dim));
    }
    lines.push(Line::from(""));
  }
  if cafes.is_empty() {
    lines.push(Line::styled("No partner cafés configured.", dim));
  }

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

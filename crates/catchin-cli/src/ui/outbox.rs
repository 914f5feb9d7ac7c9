//! Sent invitations.

use catchin_core::invitation::InvitationStatus;
use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let sent = app.session.outbox().sent();

  let block = Block::default()
    .title(format!(" Outbox ({}) ", sent.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  if sent.is_empty() {
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new("No invitations sent yet.").style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Min(3), Constraint::Length(5)])
    .split(area);

  let items: Vec<ListItem> = sent
    .iter()
    .map(|inv| {
      let (label, color) = match inv.status {
        InvitationStatus::Pending => ("pending", Color::Yellow),
        InvitationStatus::Accepted => ("accepted", Color::Green),
        InvitationStatus::Declined => ("declined", Color::Red),
      };
      ListItem::new(Line::from(vec![
        Span::styled(
          inv.sent_at.with_timezone(&Local).format("%H:%M  ").to_string(),
          Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
          format!("{:<16}", inv.recipient_name),
          Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(label, Style::default().fg(color)),
      ]))
    })
    .collect();

  let cursor = app.outbox_cursor.min(sent.len() - 1);
  let mut state = ListState::default();
  state.select(Some(cursor));
  f.render_stateful_widget(
    List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::Blue).fg(Color::White)),
    rows[0],
    &mut state,
  );

  f.render_widget(
    Paragraph::new(sent[cursor].message.as_str())
      .block(
        Block::default()
          .title(" Message ")
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::DarkGray)),
      )
      .wrap(Wrap { trim: true }),
    rows[1],
  );
}

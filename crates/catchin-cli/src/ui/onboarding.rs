//! Setup screen shown before the user first goes available.

use catchin_core::{
  availability::DURATION_CHOICES, directory::CategoryFilter, person::Category,
};
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

/// Render the setup card centred in `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let [row] = Layout::vertical([Constraint::Length(14)])
    .flex(Flex::Center)
    .areas(area);
  let [card] = Layout::horizontal([Constraint::Max(60)])
    .flex(Flex::Center)
    .areas(row);

  let block = Block::default()
    .title(" Ready for a coffee? ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow));

  let session = &app.session;
  let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
  let chosen = Style::default()
    .fg(Color::Black)
    .bg(Color::Yellow)
    .add_modifier(Modifier::BOLD);
  let plain = Style::default().fg(Color::Gray);

  let meeting = [
    CategoryFilter::All,
    CategoryFilter::Only(Category::Business),
    CategoryFilter::Only(Category::Friendly),
  ]
  .into_iter()
  .map(|c| {
    let style = if c == session.category() { chosen } else { plain };
    Span::styled(format!(" {} ", c.label()), style)
  });

  let duration = session.availability().duration();
  let durations = DURATION_CHOICES.iter().map(|m| {
    let style = if *m == duration { chosen } else { plain };
    Span::styled(format!(" {m} min "), style)
  });

  let mode = session.travel_mode();
  let travel = format!(
    "{} · up to {} min",
    mode.label(),
    session.config().travel_minutes
  );

  let mut lines = vec![
    Line::from(Span::styled(
      "Meet people nearby for a quick coffee.",
      Style::default().fg(Color::White),
    )),
    Line::from(""),
    Line::from(Span::styled("Meeting type   [c]", label)),
    Line::from(meeting.collect::<Vec<_>>()),
    Line::from(""),
    Line::from(Span::styled("Available for  [+]", label)),
    Line::from(durations.collect::<Vec<_>>()),
    Line::from(""),
    Line::from(Span::styled("Travel         [t]", label)),
    Line::from(Span::styled(travel, plain)),
    Line::from(""),
  ];
  lines.push(Line::from(Span::styled(
    "Press Enter to go available",
    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
  )));

  f.render_widget(
    Paragraph::new(lines)
      .block(block)
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: false }),
    card,
  );
}

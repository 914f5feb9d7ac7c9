//! Screen rendering: header, body per screen, status bar.

pub mod cafes;
pub mod map;
pub mod onboarding;
pub mod outbox;
pub mod people_list;
pub mod person_detail;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let time = Local::now().format("%H:%M").to_string();

  let title = Span::styled(
    " ☕ CatchinCup ",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let availability = app.session.availability();
  let badge = if availability.is_available() {
    Span::styled(
      format!(" ● Available · {} min left ", availability.remaining()),
      Style::default().fg(Color::Black).bg(Color::Green),
    )
  } else {
    Span::styled(
      " ○ Unavailable ",
      Style::default().fg(Color::White).bg(Color::Red),
    )
  };
  let tabs = Span::styled(
    "  [1] people  [2] map  [3] outbox  [4] cafés",
    Style::default().fg(Color::Gray),
  );
  let right = Span::styled(format!("{time} "), Style::default().fg(Color::Gray));

  // Simple left-right header: pad the middle.
  let used: usize = [&title, &badge, &tabs, &right]
    .iter()
    .map(|s| s.width())
    .sum();
  let pad = (area.width as usize).saturating_sub(used);

  let line = Line::from(vec![title, badge, tabs, Span::raw(" ".repeat(pad)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  match app.screen {
    Screen::Onboarding => onboarding::draw(f, area, app),
    Screen::People => {
      // List on the left (40%), selected person or location on the right.
      let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);
      people_list::draw(f, cols[0], app);
      person_detail::draw(f, cols[1], app);
    }
    Screen::Map => map::draw(f, area, app),
    Screen::Outbox => outbox::draw(f, area, app),
    Screen::Cafes => cafes::draw(f, area, app),
  }
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.screen {
    _ if app.filter_active => ("SEARCH", "Type to filter  Esc clear  Enter done"),
    Screen::Onboarding => (
      "SETUP",
      "c meeting type  + duration  t travel  Enter go available  Esc skip",
    ),
    Screen::People => (
      "PEOPLE",
      "↑↓/jk navigate  Enter open  i invite  a available  / search  r locate  q quit",
    ),
    Screen::Map => (
      "MAP",
      "Tab/←→ markers  Enter invite  Esc close  a available  c category  q quit",
    ),
    Screen::Outbox => ("OUTBOX", "↑↓/jk navigate  Esc back  q quit"),
    Screen::Cafes => ("CAFÉS", "Esc back  r locate  q quit"),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Yellow)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), Style::default().fg(Color::Gray));

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

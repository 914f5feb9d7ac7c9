//! Nearby people pane, left panel.

use catchin_core::person::Category;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::App;

/// Render the discoverable people into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let session = &app.session;
  let nearby = session.discoverable();

  let title = format!(
    " Nearby · {} ({}/{}) ",
    session.category().label(),
    nearby.len(),
    session.directory().len()
  );
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  if !session.is_available() {
    f.render_widget(
      Paragraph::new(vec![
        Line::from("You're hidden and can't see anyone."),
        Line::from(Span::styled(
          "press a to go available",
          Style::default().fg(Color::Yellow),
        )),
      ])
      .style(Style::default().fg(Color::DarkGray)),
      inner_area,
    );
    return;
  }

  // Filter bar at the bottom of the inner area.
  if (app.filter_active || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let filter_text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  if nearby.is_empty() {
    f.render_widget(
      Paragraph::new("Nobody matches.").style(Style::default().fg(Color::DarkGray)),
      inner_area,
    );
    return;
  }

  let mode = session.travel_mode();
  let reach = session.config().travel_minutes;
  let items: Vec<ListItem> = nearby
    .iter()
    .map(|n| {
      let p = n.person;
      let tag_color = match p.category {
        Category::Business => Color::Blue,
        Category::Friendly => Color::Green,
      };
      let mut spans = vec![
        Span::raw(format!("{} ", p.avatar)),
        Span::styled(p.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!("  {}", p.category.label()), Style::default().fg(tag_color)),
      ];
      if let (Some(d), Some(minutes)) = (n.distance, n.travel_minutes) {
        // Beyond the travel budget: still listed, but flagged.
        let color = if minutes > reach { Color::Red } else { Color::Gray };
        spans.push(Span::styled(
          format!("  {d} · {minutes} min {}", mode.label()),
          Style::default().fg(color),
        ));
      }
      ListItem::new(Line::from(spans))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.list_cursor.min(nearby.len() - 1)));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}

//! Map pane: a canvas implementation of [`MapSurface`].
//!
//! Markers are placed by the session; the pane only draws them and turns key
//! presses into [`MapEvent`]s for the owning [`App`](crate::app::App).

use catchin_core::{
  map::{MapEvent, MapEventSender, MapSurface, MapView, Marker, MarkerColor, MarkerKind},
  person::PersonId,
};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  symbols,
  text::{Line, Span},
  widgets::{
    Block, Borders, Clear, Paragraph,
    canvas::{Canvas, Map as WorldMap, MapResolution, Points},
  },
};

use crate::app::App;

// ─── Surface ──────────────────────────────────────────────────────────────────

pub struct CanvasMap {
  view:    MapView,
  markers: Vec<Marker>,
  /// Focused person marker. The viewer marker is not selectable.
  cursor:  Option<PersonId>,
  events:  MapEventSender,
}

impl CanvasMap {
  pub fn new(events: MapEventSender) -> Self {
    Self {
      view: MapView::default(),
      markers: Vec::new(),
      cursor: None,
      events,
    }
  }

  pub fn markers(&self) -> &[Marker] { &self.markers }

  fn person_ids(&self) -> Vec<PersonId> {
    self
      .markers
      .iter()
      .filter_map(|m| match m.kind {
        MarkerKind::Person(id) => Some(id),
        MarkerKind::Viewer => None,
      })
      .collect()
  }

  /// Person under the marker cursor, if any.
  pub fn focused(&self) -> Option<PersonId> {
    self.cursor.filter(|id| self.person_ids().contains(id))
  }

  /// Longitude/latitude half-spans for the current zoom level. Terminal cells
  /// are about twice as tall as wide, hence the halved latitude span.
  fn half_spans(&self) -> (f64, f64) {
    let lng = 720.0 / 2f64.powi(i32::from(self.view.zoom));
    (lng / 2.0, lng / 4.0)
  }

  fn bounds(&self) -> ([f64; 2], [f64; 2]) {
    let (hx, hy) = self.half_spans();
    let c = self.view.center;
    ([c.lng - hx, c.lng + hx], [c.lat - hy, c.lat + hy])
  }

  /// Handle a key aimed at the map. Returns `false` if the key was not used.
  ///
  /// Selections are reported through the map's event channel, never applied
  /// directly.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    let ids = self.person_ids();
    let at = self
      .focused()
      .and_then(|id| ids.iter().position(|x| *x == id));
    match key.code {
      KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('j') => {
        if ids.is_empty() {
          return true;
        }
        let next = at.map_or(0, |i| (i + 1) % ids.len());
        self.cursor = Some(ids[next]);
        self.events.emit(MapEvent::MarkerSelected(ids[next]));
      }
      KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('k') => {
        if ids.is_empty() {
          return true;
        }
        let prev = at.map_or(ids.len() - 1, |i| (i + ids.len() - 1) % ids.len());
        self.cursor = Some(ids[prev]);
        self.events.emit(MapEvent::MarkerSelected(ids[prev]));
      }
      KeyCode::Enter | KeyCode::Char('i') => {
        if let Some(id) = self.focused() {
          self.events.emit(MapEvent::InviteRequested(id));
        }
      }
      KeyCode::Esc if at.is_some() => {
        self.cursor = None;
        self.events.emit(MapEvent::Dismissed);
      }
      _ => return false,
    }
    true
  }
}

impl MapSurface for CanvasMap {
  fn set_view(&mut self, view: MapView) { self.view = view; }

  fn clear_markers(&mut self) { self.markers.clear(); }

  fn place_marker(&mut self, marker: Marker) { self.markers.push(marker); }
}

fn color(c: MarkerColor) -> Color {
  let (r, g, b) = c.rgb();
  Color::Rgb(r, g, b)
}

// ─── Drawing ──────────────────────────────────────────────────────────────────

/// Render the map pane into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let map = &app.map;
  let title = if app.map_ready() {
    format!(" Map · zoom {} · {} ", map.view.zoom, map.view.center)
  } else {
    " Map (loading…) ".to_string()
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let (x_bounds, y_bounds) = map.bounds();
  let focused = map.focused();
  let markers = map.markers.clone();
  let world = map.view.zoom <= 6;

  let canvas = Canvas::default()
    .block(block)
    .marker(symbols::Marker::Braille)
    .x_bounds(x_bounds)
    .y_bounds(y_bounds)
    .paint(move |ctx| {
      if world {
        ctx.draw(&WorldMap {
          resolution: MapResolution::High,
          color:      Color::DarkGray,
        });
        ctx.layer();
      }
      for m in &markers {
        let (x, y) = (m.position.lng, m.position.lat);
        ctx.draw(&Points {
          coords: &[(x, y)],
          color:  color(m.color),
        });
        let is_focused = matches!(m.kind, MarkerKind::Person(id) if Some(id) == focused);
        let mut style = Style::default().fg(color(m.color));
        if is_focused {
          style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
        }
        ctx.print(x, y, Line::from(Span::styled(format!("● {}", m.title), style)));
      }
    });
  f.render_widget(canvas, area);

  if let Some(popup) = app.selected.and_then(|id| app.session.popup(id)) {
    let width = area.width.min(40);
    let height = 6.min(area.height);
    let rect = Rect {
      x: area.x + area.width.saturating_sub(width) / 2,
      y: area.y + area.height.saturating_sub(height + 1),
      width,
      height,
    };
    let lines = vec![
      Line::from(Span::styled(
        popup.title,
        Style::default().add_modifier(Modifier::BOLD),
      )),
      Line::from(Span::styled(popup.subtitle, Style::default().fg(Color::Gray))),
      Line::from(Span::styled(popup.detail, Style::default().fg(Color::Yellow))),
      Line::from(Span::styled(
        format!("[Enter] {}", popup.invite_label),
        Style::default().fg(Color::Green),
      )),
    ];
    f.render_widget(Clear, rect);
    f.render_widget(
      Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
      rect,
    );
  }
}

//! Application state machine and event dispatcher.

use std::{
  sync::Arc,
  time::{Duration, Instant},
};

use catchin_core::{
  availability::TickOutcome,
  geo::Coordinate,
  location::{self, LocationError, LocationState},
  map::{self, MapEvent, MapEvents, MapReadiness, ReadySignal},
  person::{PersonId, TravelMode},
  session::Session,
};
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use strum::IntoEnumIterator;
use tokio::sync::mpsc;

use crate::{locator::Locator, ui::map::CanvasMap};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Pick meeting type, duration and travel mode before going available.
  Onboarding,
  /// Nearby people as a list, with the selected person on the right.
  People,
  Map,
  /// Invitations sent this session.
  Outbox,
  /// Partner cafés and their offers.
  Cafes,
}

/// Results delivered to the app from background tasks.
#[derive(Debug)]
pub enum AppEvent {
  Location(Result<Coordinate, LocationError>),
  MapReady,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  pub session: Session,

  /// Current filter string (mirrored into the session query).
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Cursor position within the discoverable list.
  pub list_cursor: usize,

  /// Cursor position within the outbox.
  pub outbox_cursor: usize,

  /// Person whose popup is open, if any.
  pub selected: Option<PersonId>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  pub map: CanvasMap,
  map_events: MapEvents,
  map_ready: MapReadiness,
  ready_signal: Option<ReadySignal>,

  locator:   Arc<Locator>,
  events_tx: mpsc::UnboundedSender<AppEvent>,
  events_rx: mpsc::UnboundedReceiver<AppEvent>,
  last_tick: Instant,
}

impl App {
  pub fn new(session: Session, locator: Locator) -> Self {
    let (map_tx, map_events) = MapEvents::channel();
    let (ready_signal, map_ready) = map::readiness();
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    Self {
      screen: Screen::Onboarding,
      session,
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      outbox_cursor: 0,
      selected: None,
      status_msg: String::new(),
      map: CanvasMap::new(map_tx),
      map_events,
      map_ready,
      ready_signal: Some(ready_signal),
      locator: Arc::new(locator),
      events_tx,
      events_rx,
      last_tick: Instant::now(),
    }
  }

  /// Kick off background work: the first position fix and the map
  /// readiness watcher. Must run inside a tokio runtime.
  pub fn start(&mut self) {
    let mut ready = self.map_ready.clone();
    let tx = self.events_tx.clone();
    tokio::spawn(async move {
      if ready.wait().await {
        let _ = tx.send(AppEvent::MapReady);
      }
    });
    self.request_location();
  }

  pub fn map_ready(&self) -> bool { self.map_ready.is_ready() }

  // ── Background results ────────────────────────────────────────────────────

  /// Ask the locator for a position unless a request is already in flight.
  pub fn request_location(&mut self) {
    if !self.session.begin_location() {
      self.status_msg = "Still locating…".into();
      return;
    }
    self.status_msg = "Locating…".into();
    let locator = Arc::clone(&self.locator);
    let options = self.session.config().location;
    let tx = self.events_tx.clone();
    tokio::spawn(async move {
      let outcome = location::request(&*locator, options).await;
      let _ = tx.send(AppEvent::Location(outcome));
    });
  }

  /// Called after every drawn frame. The first frame with a usable area
  /// marks the map as ready.
  pub fn on_frame(&mut self, area: Rect) {
    if area.width > 0 && area.height > 0 {
      if let Some(signal) = self.ready_signal.take() {
        signal.mark_ready();
      }
    }
  }

  /// Drain background results and map events. Never blocks.
  pub fn pump(&mut self) {
    while let Ok(event) = self.events_rx.try_recv() {
      match event {
        AppEvent::Location(outcome) => {
          self.session.resolve_location(outcome);
          self.status_msg = match self.session.location() {
            LocationState::Located(at) => format!("Located at {at}"),
            LocationState::Failed(e) => format!("{}  [r] retry", e.message()),
            _ => String::new(),
          };
          self.refresh_map();
        }
        AppEvent::MapReady => {
          tracing::debug!("map ready");
          self.refresh_map();
        }
      }
    }
    while let Some(event) = self.map_events.try_next() {
      self.handle_map_event(event);
    }
  }

  /// Advance the availability countdown for every interval elapsed since the
  /// last tick.
  pub fn check_tick(&mut self, now: Instant) {
    let interval = self.session.config().tick_interval();
    while now.saturating_duration_since(self.last_tick) >= interval {
      self.last_tick += interval;
      if self.session.tick() == TickOutcome::Expired {
        self.status_msg = "Your availability has ended.".into();
        self.selected = None;
        self.list_cursor = 0;
        self.refresh_map();
      }
    }
  }

  /// Re-place markers once the map can show them.
  fn refresh_map(&mut self) {
    if self.map_ready.is_ready() {
      self.session.render_map(&mut self.map);
    }
  }

  fn handle_map_event(&mut self, event: MapEvent) {
    match event {
      MapEvent::MarkerSelected(id) => {
        if self.session.popup(id).is_some() {
          self.selected = Some(id);
          if let Some(i) = self
            .session
            .discoverable()
            .iter()
            .position(|n| n.person.id == id)
          {
            self.list_cursor = i;
          }
        }
      }
      MapEvent::InviteRequested(id) => self.invite(id),
      MapEvent::Dismissed => self.selected = None,
    }
  }

  // ── Actions ───────────────────────────────────────────────────────────────

  fn invite(&mut self, id: PersonId) {
    self.status_msg = match self.session.invite(id, Utc::now()) {
      Ok(invitation) => invitation.confirmation(),
      Err(e) => format!("Error: {e}"),
    };
  }

  fn toggle_availability(&mut self) {
    self.last_tick = Instant::now();
    self.status_msg = if self.session.toggle_availability() {
      format!(
        "You're available for {} min",
        self.session.availability().duration()
      )
    } else {
      self.selected = None;
      "You're no longer available".into()
    };
    self.list_cursor = 0;
    self.refresh_map();
  }

  fn cycle_category(&mut self) {
    self.session.set_category(self.session.category().next());
    self.list_cursor = 0;
    self.drop_hidden_selection();
    self.refresh_map();
  }

  /// Close the popup when the filters no longer show its person.
  fn drop_hidden_selection(&mut self) {
    let Some(id) = self.selected else { return };
    if !self.session.discoverable().iter().any(|n| n.person.id == id) {
      self.selected = None;
    }
  }

  fn cycle_travel_mode(&mut self) {
    let modes: Vec<TravelMode> = TravelMode::iter().collect();
    let at = modes
      .iter()
      .position(|m| *m == self.session.travel_mode())
      .unwrap_or(0);
    self.session.set_travel_mode(modes[(at + 1) % modes.len()]);
  }

  /// The person under the list cursor, if any.
  pub fn cursor_person(&self) -> Option<PersonId> {
    self
      .session
      .discoverable()
      .get(self.list_cursor)
      .map(|n| n.person.id)
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    if self.filter_active {
      self.handle_filter_key(key);
      return true;
    }

    match self.screen {
      Screen::Onboarding => self.handle_onboarding_key(key),
      Screen::People => self.handle_people_key(key),
      Screen::Map => self.handle_map_key(key),
      Screen::Outbox => self.handle_outbox_key(key),
      Screen::Cafes => self.handle_cafes_key(key),
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => self.filter_active = false,
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => return,
    }
    self.session.set_query(self.filter.clone());
    self.list_cursor = 0;
    self.drop_hidden_selection();
    self.refresh_map();
  }

  fn handle_onboarding_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Tab | KeyCode::Char('c') => self.cycle_category(),
      KeyCode::Char('+') | KeyCode::Char('d') => self.session.cycle_duration(),
      KeyCode::Char('t') => self.cycle_travel_mode(),
      KeyCode::Enter => {
        if !self.session.is_available() {
          self.toggle_availability();
        }
        self.screen = Screen::People;
      }
      KeyCode::Esc => self.screen = Screen::People,
      _ => {}
    }
    true
  }

  /// Keys shared by the people, map and outbox screens. Returns `None` when
  /// the key was not one of them.
  fn handle_common_key(&mut self, key: KeyEvent) -> Option<bool> {
    match key.code {
      KeyCode::Char('q') => return Some(false),
      KeyCode::Char('a') => self.toggle_availability(),
      KeyCode::Char('c') => self.cycle_category(),
      KeyCode::Char('t') => self.cycle_travel_mode(),
      KeyCode::Char('r') => self.request_location(),
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.session.set_query("");
        self.list_cursor = 0;
      }
      KeyCode::Char('1') => self.screen = Screen::People,
      KeyCode::Char('2') => {
        self.screen = Screen::Map;
        self.refresh_map();
      }
      KeyCode::Char('3') => self.screen = Screen::Outbox,
      KeyCode::Char('4') => self.screen = Screen::Cafes,
      KeyCode::Char('o') => self.screen = Screen::Onboarding,
      _ => return None,
    }
    Some(true)
  }

  fn handle_people_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.session.discoverable().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        self.selected = self.cursor_person();
      }
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => self.selected = None,
      KeyCode::Char('i') => {
        if let Some(id) = self.selected.or_else(|| self.cursor_person()) {
          self.invite(id);
        }
      }
      KeyCode::Tab => {
        self.screen = Screen::Map;
        self.refresh_map();
      }
      _ => return self.handle_common_key(key).unwrap_or(true),
    }
    true
  }

  fn handle_map_key(&mut self, key: KeyEvent) -> bool {
    if self.map.handle_key(key) {
      return true;
    }
    match key.code {
      KeyCode::Esc => self.screen = Screen::People,
      _ => return self.handle_common_key(key).unwrap_or(true),
    }
    true
  }

  fn handle_outbox_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.outbox_cursor + 1 < self.session.outbox().sent().len() {
          self.outbox_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.outbox_cursor = self.outbox_cursor.saturating_sub(1);
      }
      KeyCode::Esc | KeyCode::Tab => self.screen = Screen::People,
      _ => return self.handle_common_key(key).unwrap_or(true),
    }
    true
  }

  fn handle_cafes_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Esc | KeyCode::Tab => self.screen = Screen::People,
      _ => return self.handle_common_key(key).unwrap_or(true),
    }
    true
  }

  /// Time until the next countdown tick is due.
  pub fn until_tick(&self, now: Instant) -> Duration {
    (self.last_tick + self.session.config().tick_interval()).saturating_duration_since(now)
  }
}

#[cfg(test)]
mod tests {
  use catchin_core::{
    config::SessionConfig,
    directory::CategoryFilter,
    location::FixedPosition,
    person::Category,
  };

  use super::*;

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  fn app_with(locator: Locator) -> App {
    let session = Session::new(SessionConfig {
      tick_seconds: 1,
      ..Default::default()
    })
    .unwrap();
    App::new(session, locator)
  }

  fn app() -> App { app_with(Locator::Fixed(FixedPosition(Coordinate::PARIS))) }

  fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
      app.handle_key(key(KeyCode::Char(c)));
    }
  }

  /// Pump until `done` holds, yielding to spawned tasks in between.
  async fn pump_until(app: &mut App, done: impl Fn(&App) -> bool) {
    for _ in 0..100 {
      app.pump();
      if done(app) {
        return;
      }
      tokio::task::yield_now().await;
    }
    panic!("condition not reached");
  }

  #[test]
  fn onboarding_enter_goes_available() {
    let mut app = app();
    assert_eq!(app.screen, Screen::Onboarding);
    app.handle_key(key(KeyCode::Char('+')));
    assert_eq!(app.session.availability().duration(), 45);
    app.handle_key(key(KeyCode::Char('c')));
    assert_eq!(
      app.session.category(),
      CategoryFilter::Only(Category::Business)
    );
    app.handle_key(key(KeyCode::Char('t')));
    assert_eq!(app.session.travel_mode(), TravelMode::Transit);

    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.screen, Screen::People);
    assert!(app.session.is_available());
    assert_eq!(app.status_msg, "You're available for 45 min");
    assert_eq!(app.session.discoverable().len(), 2);
  }

  #[test]
  fn esc_skips_onboarding_without_going_available() {
    let mut app = app();
    app.handle_key(key(KeyCode::Esc));
    assert_eq!(app.screen, Screen::People);
    assert!(!app.session.is_available());
    assert_eq!(app.cursor_person(), None);
  }

  #[test]
  fn filter_narrows_and_esc_clears() {
    let mut app = app();
    app.handle_key(key(KeyCode::Enter));
    app.handle_key(key(KeyCode::Char('/')));
    assert!(app.filter_active);
    type_str(&mut app, "designer");
    assert_eq!(app.session.query(), "designer");
    assert_eq!(app.cursor_person(), Some(PersonId(2)));

    app.handle_key(key(KeyCode::Esc));
    assert!(!app.filter_active);
    assert_eq!(app.session.query(), "");
    assert_eq!(app.session.discoverable().len(), 3);
  }

  #[test]
  fn invite_from_list_sets_confirmation() {
    let mut app = app();
    app.handle_key(key(KeyCode::Enter));
    app.handle_key(key(KeyCode::Char('j')));
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.selected, Some(PersonId(2)));
    app.handle_key(key(KeyCode::Char('i')));
    assert_eq!(app.status_msg, "Invitation sent to Lucas!");
    assert_eq!(app.session.outbox().sent().len(), 1);

    app.handle_key(key(KeyCode::Char('3')));
    assert_eq!(app.screen, Screen::Outbox);
    assert!(app.handle_key(key(KeyCode::Char('j'))));
    assert_eq!(app.outbox_cursor, 0);
    assert!(!app.handle_key(key(KeyCode::Char('q'))));
  }

  #[test]
  fn category_change_closes_hidden_popup() {
    let mut app = app();
    app.handle_key(key(KeyCode::Enter));
    app.handle_key(key(KeyCode::Char('j')));
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.selected, Some(PersonId(2)));

    // Lucas is friendly; business only hides him.
    app.handle_key(key(KeyCode::Char('c')));
    assert_eq!(app.selected, None);
    app.handle_key(key(KeyCode::Char('i')));
    assert_ne!(app.status_msg, "Invitation sent to Lucas!");
    assert!(
      app
        .session
        .outbox()
        .sent()
        .iter()
        .all(|inv| inv.recipient != PersonId(2))
    );
  }

  #[test]
  fn typing_a_filter_closes_hidden_popup() {
    let mut app = app();
    app.handle_key(key(KeyCode::Enter));
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.selected, Some(PersonId(1)));

    app.handle_key(key(KeyCode::Char('/')));
    type_str(&mut app, "em");
    assert_eq!(app.selected, Some(PersonId(1)));
    type_str(&mut app, "x");
    assert_eq!(app.selected, None);
  }

  #[test]
  fn cafes_screen_is_reachable() {
    let mut app = app();
    app.handle_key(key(KeyCode::Esc));
    app.handle_key(key(KeyCode::Char('4')));
    assert_eq!(app.screen, Screen::Cafes);
    app.handle_key(key(KeyCode::Esc));
    assert_eq!(app.screen, Screen::People);
  }

  #[test]
  fn countdown_expires_availability() {
    let mut app = app();
    app.handle_key(key(KeyCode::Enter));
    app.selected = Some(PersonId(1));
    let start = app.last_tick;

    app.check_tick(start + Duration::from_millis(500));
    assert_eq!(app.session.availability().remaining(), 30);
    app.check_tick(start + Duration::from_secs(1));
    assert_eq!(app.session.availability().remaining(), 29);

    app.check_tick(start + Duration::from_secs(30));
    assert!(!app.session.is_available());
    assert_eq!(app.selected, None);
    assert_eq!(app.status_msg, "Your availability has ended.");
    assert_eq!(app.until_tick(app.last_tick), Duration::from_secs(1));
  }

  #[tokio::test]
  async fn location_fix_arrives_from_background() {
    let mut app = app();
    app.start();
    assert!(app.session.location().is_loading());
    pump_until(&mut app, |a| a.session.viewer().is_some()).await;
    assert_eq!(app.session.viewer(), Some(Coordinate::PARIS));
    assert!(app.status_msg.starts_with("Located at"));
  }

  #[tokio::test]
  async fn denied_location_offers_retry() {
    let mut app = app_with(Locator::Disabled(catchin_core::location::DeniedPosition));
    app.start();
    pump_until(&mut app, |a| a.session.location().error().is_some()).await;
    assert!(app.status_msg.ends_with("[r] retry"));

    app.handle_key(key(KeyCode::Esc));
    app.handle_key(key(KeyCode::Char('r')));
    assert!(app.session.location().is_loading());
    assert_eq!(app.status_msg, "Locating…");
    app.handle_key(key(KeyCode::Char('r')));
    assert_eq!(app.status_msg, "Still locating…");
  }

  #[tokio::test]
  async fn markers_wait_for_first_frame() {
    let mut app = app();
    app.handle_key(key(KeyCode::Enter));
    app.start();
    pump_until(&mut app, |a| a.session.viewer().is_some()).await;
    assert!(!app.map_ready());
    assert!(app.map.markers().is_empty());

    app.on_frame(Rect::new(0, 0, 80, 24));
    pump_until(&mut app, |a| !a.map.markers().is_empty()).await;
    // Three people plus the viewer.
    assert_eq!(app.map.markers().len(), 4);
  }

  #[tokio::test]
  async fn map_selection_opens_popup_and_invites() {
    let mut app = app();
    app.handle_key(key(KeyCode::Enter));
    app.start();
    app.on_frame(Rect::new(0, 0, 80, 24));
    pump_until(&mut app, |a| !a.map.markers().is_empty()).await;

    app.handle_key(key(KeyCode::Char('2')));
    assert_eq!(app.screen, Screen::Map);
    app.handle_key(key(KeyCode::Tab));
    app.handle_key(key(KeyCode::Tab));
    app.pump();
    assert_eq!(app.selected, Some(PersonId(2)));
    assert_eq!(app.list_cursor, 1);

    app.handle_key(key(KeyCode::Enter));
    app.pump();
    assert_eq!(app.status_msg, "Invitation sent to Lucas!");

    app.handle_key(key(KeyCode::Esc));
    app.pump();
    assert_eq!(app.selected, None);
    app.handle_key(key(KeyCode::Esc));
    assert_eq!(app.screen, Screen::People);
  }
}

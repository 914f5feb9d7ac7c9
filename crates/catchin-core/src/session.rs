//! The meetup session: availability, position, directory and outbox in one
//! place.
//!
//! A [`Session`] is the single stateful component a front-end drives. It owns
//! the discoverability rule: nobody is shown to a viewer who is not
//! available.

use chrono::{DateTime, Utc};

use crate::{
  Error, Result,
  availability::{Availability, TickOutcome},
  cafe::{Cafe, NearbyCafe},
  config::SessionConfig,
  directory::{CategoryFilter, Directory, Nearby},
  geo::Coordinate,
  invitation::{Invitation, Outbox},
  location::{Geolocation, LocationError, LocationState, PositionSource},
  map::{MapSurface, MapView, Popup, render_directory},
  person::{Person, PersonId, TravelMode},
};

#[derive(Debug, Clone)]
pub struct Session {
  config:       SessionConfig,
  availability: Availability,
  geolocation:  Geolocation,
  directory:    Directory,
  cafes:        Vec<Cafe>,
  outbox:       Outbox,
  query:        String,
  category:     CategoryFilter,
}

impl Session {
  pub fn new(config: SessionConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self {
      availability: Availability::new(config.availability_minutes),
      geolocation: Geolocation::new(config.location),
      directory: config.directory(),
      cafes: config.cafes(),
      outbox: Outbox::new(),
      query: String::new(),
      category: config.meeting_type,
      config,
    })
  }

  pub fn config(&self) -> &SessionConfig { &self.config }

  // ── Availability ──────────────────────────────────────────────────────────

  pub fn availability(&self) -> &Availability { &self.availability }

  pub fn is_available(&self) -> bool { self.availability.is_available() }

  pub fn toggle_availability(&mut self) -> bool { self.availability.toggle() }

  pub fn tick(&mut self) -> TickOutcome { self.availability.tick() }

  pub fn set_duration(&mut self, minutes: u32) -> Result<()> {
    self.availability.set_duration(minutes)
  }

  pub fn cycle_duration(&mut self) { self.availability.cycle_duration() }

  // ── Location ──────────────────────────────────────────────────────────────

  pub fn location(&self) -> LocationState { self.geolocation.state() }

  pub fn viewer(&self) -> Option<Coordinate> { self.geolocation.state().coordinate() }

  /// See [`Geolocation::begin`].
  pub fn begin_location(&mut self) -> bool { self.geolocation.begin() }

  pub fn resolve_location(&mut self, outcome: std::result::Result<Coordinate, LocationError>) {
    self.geolocation.resolve(outcome)
  }

  pub async fn acquire_location<S: PositionSource>(&mut self, source: &S) -> LocationState {
    self.geolocation.acquire(source).await
  }

  // ── Directory ─────────────────────────────────────────────────────────────

  pub fn directory(&self) -> &Directory { &self.directory }

  pub fn query(&self) -> &str { &self.query }

  pub fn set_query(&mut self, query: impl Into<String>) { self.query = query.into(); }

  pub fn category(&self) -> CategoryFilter { self.category }

  pub fn set_category(&mut self, category: CategoryFilter) { self.category = category; }

  pub fn travel_mode(&self) -> TravelMode { self.config.travel_mode }

  pub fn set_travel_mode(&mut self, mode: TravelMode) { self.config.travel_mode = mode; }

  /// People matching the current query and category, ignoring availability.
  pub fn matching(&self) -> Vec<&Person> { self.directory.filter(&self.query, self.category) }

  /// People the viewer may see right now, with derived distances. Empty while
  /// the viewer is unavailable.
  pub fn discoverable(&self) -> Vec<Nearby<'_>> {
    if !self.is_available() {
      return Vec::new();
    }
    Directory::nearby(self.matching(), self.viewer(), self.config.travel_mode)
  }

  // ── Cafés ─────────────────────────────────────────────────────────────────

  /// Partner cafés with the walk from the viewer. Listed regardless of
  /// availability.
  pub fn cafes(&self) -> Vec<NearbyCafe<'_>> {
    let viewer = self.viewer();
    self.cafes.iter().map(|c| NearbyCafe::new(c, viewer)).collect()
  }

  /// The partner café `person` names as their favourite, if any.
  pub fn favorite_cafe(&self, person: &Person) -> Option<&Cafe> {
    self.cafes.iter().find(|c| c.is_favorite_of(person))
  }

  // ── Map ───────────────────────────────────────────────────────────────────

  /// Centred on the viewer once located, on the configured centre otherwise.
  pub fn map_view(&self) -> MapView {
    MapView {
      center: self.viewer().unwrap_or(self.config.map.center),
      zoom:   self.config.map.zoom,
    }
  }

  /// Put the viewer and the discoverable people on `surface`.
  pub fn render_map<M: MapSurface + ?Sized>(&self, surface: &mut M) -> usize {
    let people: Vec<&Person> = self.discoverable().iter().map(|n| n.person).collect();
    render_directory(surface, self.map_view(), self.viewer(), people)
  }

  /// Summary for a selected marker. `None` if `id` is not discoverable.
  pub fn popup(&self, id: PersonId) -> Option<Popup> {
    self
      .discoverable()
      .into_iter()
      .find(|n| n.person.id == id)
      .map(|n| Popup::new(n.person, n.distance))
  }

  // ── Invitations ───────────────────────────────────────────────────────────

  /// Invite a discoverable person. Anyone the viewer cannot currently see
  /// (unavailable, or hidden by the filter) is refused.
  pub fn invite(&mut self, id: PersonId, now: DateTime<Utc>) -> Result<&Invitation> {
    if self.directory.get(id).is_none() {
      return Err(Error::PersonNotFound(id.0));
    }
    let visible = self.discoverable().iter().any(|n| n.person.id == id);
    if !visible {
      return Err(Error::NotDiscoverable(id.0));
    }
    let person = self.directory.get(id).ok_or(Error::PersonNotFound(id.0))?;
    Ok(self.outbox.invite(person, now))
  }

  pub fn outbox(&self) -> &Outbox { &self.outbox }

  pub fn outbox_mut(&mut self) -> &mut Outbox { &mut self.outbox }
}

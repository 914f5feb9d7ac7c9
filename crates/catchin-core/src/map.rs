//! The boundary towards a map surface.
//!
//! The map itself is an external collaborator reached through [`MapSurface`].
//! This module decides *what* goes on it (one marker per person, coloured by
//! category, plus the viewer), how a selected marker is summarised
//! ([`Popup`]), how selections travel back to the owner ([`MapEvents`]) and
//! how the owner learns the surface is usable ([`readiness`]).

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use crate::{
  geo::{Coordinate, Distance},
  person::{Category, Person, PersonId},
};

// ─── Markers ─────────────────────────────────────────────────────────────────

/// A 24-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerColor(pub u32);

impl MarkerColor {
  pub const BUSINESS: MarkerColor = MarkerColor(0x3B82F6);
  pub const FRIENDLY: MarkerColor = MarkerColor(0x10B981);
  pub const VIEWER: MarkerColor = MarkerColor(0xF97316);

  pub fn for_category(category: Category) -> Self {
    match category {
      Category::Business => Self::BUSINESS,
      Category::Friendly => Self::FRIENDLY,
    }
  }

  pub fn rgb(&self) -> (u8, u8, u8) {
    (
      ((self.0 >> 16) & 0xFF) as u8,
      ((self.0 >> 8) & 0xFF) as u8,
      (self.0 & 0xFF) as u8,
    )
  }
}

/// What a marker stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MarkerKind {
  Viewer,
  Person(PersonId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
  pub kind:     MarkerKind,
  pub position: Coordinate,
  pub title:    String,
  pub color:    MarkerColor,
}

impl Marker {
  pub fn for_person(person: &Person) -> Self {
    Self {
      kind:     MarkerKind::Person(person.id),
      position: person.position,
      title:    person.name.clone(),
      color:    MarkerColor::for_category(person.category),
    }
  }

  pub fn for_viewer(position: Coordinate) -> Self {
    Self {
      kind: MarkerKind::Viewer,
      position,
      title: "You".to_string(),
      color: MarkerColor::VIEWER,
    }
  }
}

/// Centre and zoom level of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
  pub center: Coordinate,
  /// Web-map style zoom level: 0 shows the world, 15 a neighbourhood.
  pub zoom:   u8,
}

impl Default for MapView {
  fn default() -> Self {
    Self {
      center: Coordinate::PARIS,
      zoom:   15,
    }
  }
}

// ─── Surface ─────────────────────────────────────────────────────────────────

/// A surface that can display markers.
pub trait MapSurface {
  fn set_view(&mut self, view: MapView);

  fn clear_markers(&mut self);

  fn place_marker(&mut self, marker: Marker);
}

/// Replace everything on `surface` with the viewer (if located) and one marker
/// per entry of `people`. Returns the number of markers placed.
pub fn render_directory<'a, M: MapSurface + ?Sized>(
  surface: &mut M,
  view: MapView,
  viewer: Option<Coordinate>,
  people: impl IntoIterator<Item = &'a Person>,
) -> usize {
  surface.clear_markers();
  surface.set_view(view);

  let mut placed = 0;
  if let Some(position) = viewer {
    surface.place_marker(Marker::for_viewer(position));
    placed += 1;
  }
  for person in people {
    surface.place_marker(Marker::for_person(person));
    placed += 1;
  }
  tracing::trace!(markers = placed, "map markers placed");
  placed
}

// ─── Popup ───────────────────────────────────────────────────────────────────

/// Summary surfaced when a person's marker is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
  pub person_id:    PersonId,
  pub title:        String,
  pub subtitle:     String,
  pub detail:       String,
  pub invite_label: &'static str,
}

impl Popup {
  pub fn new(person: &Person, distance: Option<Distance>) -> Self {
    let subtitle = match distance {
      Some(d) => format!("{d} • {}", person.category.label()),
      None => person.category.label().to_string(),
    };
    Self {
      person_id: person.id,
      title: format!("{} {}", person.avatar, person.name),
      subtitle,
      detail: format!("★ {}  ·  {} meetups", person.rating, person.meetups),
      invite_label: "☕ Invite",
    }
  }
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// Interaction reported by a map surface to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
  MarkerSelected(PersonId),
  /// The invite affordance in a popup was used.
  InviteRequested(PersonId),
  Dismissed,
}

/// Sending half handed to the surface. Cheap to clone.
#[derive(Debug, Clone)]
pub struct MapEventSender(mpsc::UnboundedSender<MapEvent>);

impl MapEventSender {
  /// Report `event`. Returns `false` if the owner has gone away.
  pub fn emit(&self, event: MapEvent) -> bool { self.0.send(event).is_ok() }
}

/// Receiving half kept by the owner of the map.
#[derive(Debug)]
pub struct MapEvents(mpsc::UnboundedReceiver<MapEvent>);

impl MapEvents {
  /// A fresh event channel scoped to one map instance.
  pub fn channel() -> (MapEventSender, MapEvents) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MapEventSender(tx), MapEvents(rx))
  }

  /// Next event without waiting.
  pub fn try_next(&mut self) -> Option<MapEvent> { self.0.try_recv().ok() }

  /// Wait for the next event; `None` once every sender is gone.
  pub async fn next(&mut self) -> Option<MapEvent> { self.0.recv().await }
}

// ─── Readiness ───────────────────────────────────────────────────────────────

/// Signals that the map surface can accept markers. Consumed on use, so the
/// surface can become ready at most once.
#[derive(Debug)]
pub struct ReadySignal(watch::Sender<bool>);

impl ReadySignal {
  pub fn mark_ready(self) {
    // send_replace never fails, even with no receivers left.
    self.0.send_replace(true);
  }
}

/// Resolves once the paired [`ReadySignal`] fires.
#[derive(Debug, Clone)]
pub struct MapReadiness(watch::Receiver<bool>);

impl MapReadiness {
  pub fn is_ready(&self) -> bool { *self.0.borrow() }

  /// Wait until ready. Returns `false` if the signal was dropped unused.
  pub async fn wait(&mut self) -> bool { self.0.wait_for(|ready| *ready).await.is_ok() }
}

/// A linked signal/readiness pair.
pub fn readiness() -> (ReadySignal, MapReadiness) {
  let (tx, rx) = watch::channel(false);
  (ReadySignal(tx), MapReadiness(rx))
}

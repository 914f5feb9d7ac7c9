//! Session configuration.
//!
//! Every knob has a default, so an empty TOML document is a valid config.

use std::{collections::HashSet, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  availability::{DEFAULT_DURATION, DURATION_CHOICES},
  cafe::{self, Cafe},
  directory::{CategoryFilter, Directory},
  geo::Coordinate,
  location::PositionOptions,
  map::MapView,
  person::{Person, TravelMode},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
  /// Minutes of availability started by a toggle.
  pub availability_minutes: u32,
  /// Category the directory starts filtered to.
  pub meeting_type:         CategoryFilter,
  pub travel_mode:          TravelMode,
  /// How far the viewer is willing to travel, in minutes.
  pub travel_minutes:       u32,
  /// Seconds per countdown tick. One minute outside of demos.
  pub tick_seconds:         u64,
  pub location:             PositionOptions,
  /// Initial map view; also the centre used while no position is known.
  pub map:                  MapView,
  /// Replaces the built-in directory when non-empty.
  pub people:               Vec<Person>,
  /// Replaces the built-in partner cafés when non-empty.
  pub cafes:                Vec<Cafe>,
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self {
      availability_minutes: DEFAULT_DURATION,
      meeting_type:         CategoryFilter::All,
      travel_mode:          TravelMode::Walk,
      travel_minutes:       15,
      tick_seconds:         60,
      location:             PositionOptions::default(),
      map:                  MapView::default(),
      people:               Vec::new(),
      cafes:                Vec::new(),
    }
  }
}

impl SessionConfig {
  /// Reject values the session cannot work with.
  pub fn validate(&self) -> Result<()> {
    if !DURATION_CHOICES.contains(&self.availability_minutes) {
      return Err(Error::UnsupportedDuration {
        got:     self.availability_minutes,
        allowed: DURATION_CHOICES.to_vec(),
      });
    }
    let center = self.map.center;
    Coordinate::new(center.lat, center.lng)?;

    let mut ids = HashSet::new();
    for person in &self.people {
      let p = person.position;
      Coordinate::new(p.lat, p.lng)?;
      if !ids.insert(person.id) {
        return Err(Error::DuplicatePerson(person.id.0));
      }
    }

    let mut ids = HashSet::new();
    for cafe in &self.cafes {
      cafe.validate()?;
      if !ids.insert(cafe.id) {
        return Err(Error::DuplicateCafe(cafe.id.0));
      }
    }
    Ok(())
  }

  pub fn tick_interval(&self) -> Duration { Duration::from_secs(self.tick_seconds.max(1)) }

  /// The configured people, or the built-in directory when none are given.
  pub fn directory(&self) -> Directory {
    if self.people.is_empty() {
      Directory::default()
    } else {
      Directory::new(self.people.clone())
    }
  }

  /// The configured cafés, or the built-in partners when none are given.
  pub fn cafes(&self) -> Vec<Cafe> {
    if self.cafes.is_empty() {
      cafe::default_partners()
    } else {
      self.cafes.clone()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::person::{Category, PersonId};

  #[test]
  fn empty_document_is_default() {
    let cfg: SessionConfig = toml::from_str("").unwrap();
    assert_eq!(cfg, SessionConfig::default());
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.directory().len(), 3);
    assert_eq!(cfg.cafes().len(), 2);
    assert_eq!(cfg.tick_interval(), Duration::from_secs(60));
  }

  #[test]
  fn overrides_and_people() {
    let raw = r#"
      availability_minutes = 60
      meeting_type = "friendly"
      travel_mode = "transit"
      tick_seconds = 0

      [location]
      timeout = 4

      [map]
      center = { lat = 45.764, lng = 4.8357 }
      zoom = 14

      [[people]]
      id = 7
      name = "Marc"
      category = "friendly"
      bio = "Entrepreneur"
      position = { lat = 45.765, lng = 4.836 }
      rating = 4.6
      meetups = 20
      favorite_place = "Le Kiosque"

      [[cafes]]
      id = 9
      name = "Le Kiosque"
      discount = 10
      rating = 4.2
      position = { lat = 45.7641, lng = 4.8352 }
      menu = ["Filter coffee"]
    "#;
    let cfg: SessionConfig = toml::from_str(raw).unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.availability_minutes, 60);
    assert_eq!(cfg.meeting_type, CategoryFilter::Only(Category::Friendly));
    assert_eq!(cfg.travel_mode, TravelMode::Transit);
    assert_eq!(cfg.location.timeout, Duration::from_secs(4));
    assert_eq!(cfg.map.zoom, 14);
    // Zero is clamped so the loop never spins.
    assert_eq!(cfg.tick_interval(), Duration::from_secs(1));

    let dir = cfg.directory();
    assert_eq!(dir.len(), 1);
    let marc = dir.get(PersonId(7)).unwrap();
    assert_eq!(marc.avatar, "☕");

    let cafes = cfg.cafes();
    assert_eq!(cafes.len(), 1);
    assert!(!cafes[0].has_qr);
    assert!(cafes[0].is_favorite_of(marc));
  }

  #[test]
  fn odd_duration_is_rejected() {
    let cfg = SessionConfig {
      availability_minutes: 25,
      ..Default::default()
    };
    assert!(matches!(
      cfg.validate(),
      Err(Error::UnsupportedDuration { got: 25, .. })
    ));
  }

  #[test]
  fn out_of_range_person_is_rejected() {
    let raw = r#"
      [[people]]
      id = 1
      name = "Nowhere"
      category = "business"
      position = { lat = 123.0, lng = 0.0 }
      rating = 3.0
    "#;
    let cfg: SessionConfig = toml::from_str(raw).unwrap();
    assert!(matches!(cfg.validate(), Err(Error::InvalidLatitude(_))));
  }

  #[test]
  fn duplicate_person_ids_are_rejected() {
    let raw = r#"
      [[people]]
      id = 4
      name = "Ana"
      category = "friendly"
      position = { lat = 48.85, lng = 2.35 }
      rating = 4.0

      [[people]]
      id = 4
      name = "Ben"
      category = "business"
      position = { lat = 48.86, lng = 2.36 }
      rating = 4.5
    "#;
    let cfg: SessionConfig = toml::from_str(raw).unwrap();
    assert!(matches!(cfg.validate(), Err(Error::DuplicatePerson(4))));
  }

  #[test]
  fn duplicate_cafe_ids_are_rejected() {
    let mut cafes = crate::cafe::default_partners();
    cafes[1].id = cafes[0].id;
    let cfg = SessionConfig {
      cafes,
      ..Default::default()
    };
    assert!(matches!(cfg.validate(), Err(Error::DuplicateCafe(1))));
  }

  #[test]
  fn out_of_range_map_center_is_rejected() {
    let raw = r#"
      [map]
      center = { lat = 10.0, lng = 200.0 }
      zoom = 12
    "#;
    let cfg: SessionConfig = toml::from_str(raw).unwrap();
    assert!(matches!(cfg.validate(), Err(Error::InvalidLongitude(_))));
  }
}

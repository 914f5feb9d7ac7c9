//! People shown in the nearby directory.
//!
//! A [`Person`] is immutable for the lifetime of the session. Distance is not
//! stored on the person; it is derived from the viewer's coordinate on read
//! (see [`crate::directory::Nearby`]).

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result, geo::Coordinate};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Stable identifier of a directory entry.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PersonId(pub u32);

impl fmt::Display for PersonId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

// ─── Category ────────────────────────────────────────────────────────────────

/// The kind of meetup a person is open to.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Category {
  Business,
  Friendly,
}

impl Category {
  /// Short human label used in lists and popups.
  pub fn label(&self) -> &'static str {
    match self {
      Self::Business => "Business",
      Self::Friendly => "Friendly",
    }
  }
}

// ─── Rating ──────────────────────────────────────────────────────────────────

/// A peer rating between 0.0 and 5.0 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Rating(pub(crate) f32);

impl Rating {
  pub const MAX: f32 = 5.0;

  pub fn new(value: f32) -> Result<Self> {
    if value.is_nan() || !(0.0..=Self::MAX).contains(&value) {
      return Err(Error::InvalidRating(value));
    }
    Ok(Self(value))
  }

  pub fn value(&self) -> f32 { self.0 }
}

impl TryFrom<f32> for Rating {
  type Error = Error;

  fn try_from(value: f32) -> Result<Self> { Self::new(value) }
}

impl From<Rating> for f32 {
  fn from(r: Rating) -> Self { r.0 }
}

impl fmt::Display for Rating {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:.1}", self.0)
  }
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// A directory entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
  pub id:             PersonId,
  pub name:           String,
  /// A single glyph shown next to the name.
  #[serde(default = "default_avatar")]
  pub avatar:         String,
  pub category:       Category,
  #[serde(default)]
  pub bio:            String,
  pub position:       Coordinate,
  pub rating:         Rating,
  /// Number of meetups this person has completed.
  #[serde(default)]
  pub meetups:        u32,
  /// Name of the café this person likes to meet at.
  #[serde(default)]
  pub favorite_place: Option<String>,
}

fn default_avatar() -> String { "☕".to_string() }

impl Person {
  /// Case-insensitive substring match over name and bio.
  ///
  /// `needle` must already be lowercased.
  pub(crate) fn matches_text(&self, needle: &str) -> bool {
    needle.is_empty()
      || self.name.to_lowercase().contains(needle)
      || self.bio.to_lowercase().contains(needle)
  }
}

// ─── Travel mode ─────────────────────────────────────────────────────────────

/// How the viewer is willing to travel to a meetup.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TravelMode {
  #[default]
  Walk,
  Transit,
  Car,
}

impl TravelMode {
  /// Average urban speed used for travel-time estimates.
  pub fn speed_kmh(&self) -> f64 {
    match self {
      Self::Walk => 5.0,
      Self::Transit => 20.0,
      Self::Car => 30.0,
    }
  }

  /// Estimated whole minutes to cover `meters`; never less than one.
  pub fn minutes_for(&self, meters: f64) -> u32 {
    let hours = meters / 1000.0 / self.speed_kmh();
    ((hours * 60.0).ceil() as u32).max(1)
  }

  pub fn label(&self) -> &'static str {
    match self {
      Self::Walk => "on foot",
      Self::Transit => "by transit",
      Self::Car => "by car",
    }
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn category_parses_case_insensitively() {
    assert_eq!(Category::from_str("Business").unwrap(), Category::Business);
    assert_eq!(Category::from_str("friendly").unwrap(), Category::Friendly);
    assert!(Category::from_str("romantic").is_err());
    assert_eq!(Category::Friendly.to_string(), "friendly");
  }

  #[test]
  fn rating_bounds() {
    assert!(Rating::new(0.0).is_ok());
    assert!(Rating::new(5.0).is_ok());
    assert!(matches!(Rating::new(5.1), Err(Error::InvalidRating(_))));
    assert!(Rating::new(f32::NAN).is_err());
  }

  #[test]
  fn rating_deserialize_validates() {
    let ok: Rating = serde_json::from_str("4.8").unwrap();
    assert_eq!(ok.to_string(), "4.8");
    assert!(serde_json::from_str::<Rating>("7").is_err());
  }

  #[test]
  fn travel_minutes_round_up() {
    // 400 m on foot at 5 km/h is 4.8 minutes.
    assert_eq!(TravelMode::Walk.minutes_for(400.0), 5);
    assert_eq!(TravelMode::Car.minutes_for(10.0), 1);
    assert_eq!(TravelMode::Walk.minutes_for(0.0), 1);
    assert_eq!(TravelMode::Transit.minutes_for(5000.0), 15);
  }

  #[test]
  fn text_match_covers_name_and_bio() {
    let p = Person {
      id:             PersonId(1),
      name:           "Emma".into(),
      avatar:         default_avatar(),
      category:       Category::Business,
      bio:            "Marketing consultant".into(),
      position:       Coordinate::PARIS,
      rating:         Rating::new(4.8).unwrap(),
      meetups:        12,
      favorite_place: None,
    };
    assert!(p.matches_text(""));
    assert!(p.matches_text("emm"));
    assert!(p.matches_text("consult"));
    assert!(!p.matches_text("lucas"));
  }
}

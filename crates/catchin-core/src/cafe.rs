//! Partner cafés where meetups can happen.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  geo::{Coordinate, Distance},
  person::{Person, Rating, TravelMode},
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CafeId(pub u32);

impl fmt::Display for CafeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// A café offering a discount to people meeting through the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cafe {
  pub id:       CafeId,
  pub name:     String,
  /// Discount in percent, 0–100.
  #[serde(default)]
  pub discount: u8,
  pub rating:   Rating,
  pub position: Coordinate,
  /// Whether the discount is redeemed by scanning a QR code at the counter.
  #[serde(default)]
  pub has_qr:   bool,
  #[serde(default)]
  pub menu:     Vec<String>,
}

impl Cafe {
  pub fn validate(&self) -> Result<()> {
    if self.discount > 100 {
      return Err(Error::InvalidDiscount(self.discount));
    }
    Coordinate::new(self.position.lat, self.position.lng)?;
    Ok(())
  }

  /// Whether `person` names this café as their favourite place.
  pub fn is_favorite_of(&self, person: &Person) -> bool {
    person
      .favorite_place
      .as_deref()
      .is_some_and(|p| p.trim().eq_ignore_ascii_case(self.name.trim()))
  }
}

/// A café paired with the walk from the viewer, when the viewer is located.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyCafe<'a> {
  pub cafe:         &'a Cafe,
  pub distance:     Option<Distance>,
  pub walk_minutes: Option<u32>,
}

impl<'a> NearbyCafe<'a> {
  pub fn new(cafe: &'a Cafe, viewer: Option<Coordinate>) -> Self {
    let distance = viewer.map(|v| v.distance_to(&cafe.position));
    Self {
      cafe,
      distance,
      walk_minutes: distance.map(|d| TravelMode::Walk.minutes_for(d.meters())),
    }
  }
}

/// The built-in partner list around central Paris.
pub fn default_partners() -> Vec<Cafe> {
  let menu = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
  vec![
    Cafe {
      id:       CafeId(1),
      name:     "Café Le Central".to_string(),
      discount: 20,
      rating:   Rating(4.8),
      position: Coordinate { lat: 48.8570, lng: 2.3530 },
      has_qr:   true,
      menu:     menu(&["Espresso", "Cappuccino", "Latte", "Croissants"]),
    },
    Cafe {
      id:       CafeId(2),
      name:     "Café Commerce".to_string(),
      discount: 15,
      rating:   Rating(4.6),
      position: Coordinate { lat: 48.8601, lng: 2.3498 },
      has_qr:   true,
      menu:     menu(&["Speciality coffee", "Salads", "Sandwiches"]),
    },
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::directory::Directory;

  #[test]
  fn defaults_are_valid_partners() {
    let cafes = default_partners();
    assert_eq!(cafes.len(), 2);
    for cafe in &cafes {
      cafe.validate().unwrap();
      assert!(cafe.has_qr);
      assert!(!cafe.menu.is_empty());
    }
    assert_eq!(cafes[0].discount, 20);
  }

  #[test]
  fn favourite_matches_by_name() {
    let cafes = default_partners();
    let dir = Directory::default();
    let emma = &dir.people()[0];
    let sophie = &dir.people()[2];
    assert!(cafes[0].is_favorite_of(emma));
    assert!(!cafes[1].is_favorite_of(emma));
    // Sophie's favourite is not a partner.
    assert!(cafes.iter().all(|c| !c.is_favorite_of(sophie)));
  }

  #[test]
  fn walk_needs_a_fix() {
    let cafes = default_partners();
    let far = NearbyCafe::new(&cafes[0], None);
    assert_eq!(far.walk_minutes, None);
    let here = NearbyCafe::new(&cafes[0], Some(Coordinate::PARIS));
    let d = here.distance.unwrap();
    assert!(d.meters() > 50.0 && d.meters() < 200.0);
    assert_eq!(here.walk_minutes, Some(TravelMode::Walk.minutes_for(d.meters())));
  }

  #[test]
  fn discount_over_100_is_rejected() {
    let mut cafe = default_partners().remove(0);
    cafe.discount = 120;
    assert!(matches!(cafe.validate(), Err(Error::InvalidDiscount(120))));
  }
}

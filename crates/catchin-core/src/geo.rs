//! Coordinates and great-circle distance.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Mean Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
  pub lat: f64,
  pub lng: f64,
}

impl Coordinate {
  /// Paris, Hôtel de Ville. Used as the map centre when no fix is available.
  pub const PARIS: Coordinate = Coordinate { lat: 48.8566, lng: 2.3522 };

  /// Build a coordinate, rejecting values outside the valid ranges.
  pub fn new(lat: f64, lng: f64) -> Result<Self> {
    if !(-90.0..=90.0).contains(&lat) {
      return Err(Error::InvalidLatitude(lat));
    }
    if !(-180.0..=180.0).contains(&lng) {
      return Err(Error::InvalidLongitude(lng));
    }
    Ok(Self { lat, lng })
  }

  /// Haversine distance to `other`.
  pub fn distance_to(&self, other: &Coordinate) -> Distance {
    let dlat = (other.lat - self.lat).to_radians();
    let dlng = (other.lng - self.lng).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
      + self.lat.to_radians().cos()
        * other.lat.to_radians().cos()
        * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    Distance::from_meters(EARTH_RADIUS_M * c)
  }
}

impl fmt::Display for Coordinate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:.4}, {:.4}", self.lat, self.lng)
  }
}

/// A non-negative distance in metres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Distance(f64);

impl Distance {
  pub fn from_meters(meters: f64) -> Self { Self(meters.max(0.0)) }

  pub fn meters(&self) -> f64 { self.0 }

  pub fn kilometers(&self) -> f64 { self.0 / 1000.0 }
}

impl fmt::Display for Distance {
  /// `350 m` below one kilometre, `1.2 km` above.
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.0 < 1000.0 {
      write!(f, "{} m", self.0.round() as u64)
    } else {
      write!(f, "{:.1} km", self.kilometers())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_out_of_range() {
    assert!(matches!(
      Coordinate::new(91.0, 0.0),
      Err(Error::InvalidLatitude(_))
    ));
    assert!(matches!(
      Coordinate::new(0.0, -180.5),
      Err(Error::InvalidLongitude(_))
    ));
    assert!(Coordinate::new(-90.0, 180.0).is_ok());
  }

  #[test]
  fn zero_distance_to_self() {
    let d = Coordinate::PARIS.distance_to(&Coordinate::PARIS);
    assert_eq!(d.meters(), 0.0);
  }

  #[test]
  fn paris_to_london_is_about_344_km() {
    let london = Coordinate::new(51.5074, -0.1278).unwrap();
    let km = Coordinate::PARIS.distance_to(&london).kilometers();
    assert!((km - 344.0).abs() < 5.0, "got {km}");
  }

  #[test]
  fn distance_is_symmetric() {
    let a = Coordinate::new(48.8576, 2.3532).unwrap();
    let b = Coordinate::new(48.8596, 2.3552).unwrap();
    let ab = a.distance_to(&b).meters();
    let ba = b.distance_to(&a).meters();
    assert!((ab - ba).abs() < 1e-6);
  }

  #[test]
  fn display_switches_units() {
    assert_eq!(Distance::from_meters(349.6).to_string(), "350 m");
    assert_eq!(Distance::from_meters(1234.0).to_string(), "1.2 km");
    assert_eq!(Distance::from_meters(-3.0).meters(), 0.0);
  }
}

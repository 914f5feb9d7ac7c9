//! Error types for `catchin-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("latitude out of range: {0}")]
  InvalidLatitude(f64),

  #[error("longitude out of range: {0}")]
  InvalidLongitude(f64),

  #[error("rating out of range: {0}")]
  InvalidRating(f32),

  #[error("unknown category: {0:?}")]
  UnknownCategory(String),

  #[error("availability duration must be one of {allowed:?}, got {got}")]
  UnsupportedDuration { got: u32, allowed: Vec<u32> },

  #[error("invitation not found: {0}")]
  InvitationNotFound(Uuid),

  #[error("invitation {0} has already been answered")]
  AlreadyResponded(Uuid),

  #[error("person not found: {0}")]
  PersonNotFound(u32),

  #[error("person {0} is not discoverable right now")]
  NotDiscoverable(u32),

  #[error("duplicate person id: {0}")]
  DuplicatePerson(u32),

  #[error("duplicate café id: {0}")]
  DuplicateCafe(u32),

  #[error("discount must be a percentage, got {0}")]
  InvalidDiscount(u8),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! One-shot acquisition of the viewer's position.
//!
//! The platform boundary is [`PositionSource`]. [`Geolocation`] wraps a single
//! request with a deadline and records its outcome as a [`LocationState`].
//! Nothing here retries: a failed request stays failed until the user asks
//! again.

use std::{future::Future, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Coordinate;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Why a position request failed. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationError {
  #[error("location permission was denied")]
  PermissionDenied,

  #[error("position is unavailable")]
  PositionUnavailable,

  #[error("location request timed out")]
  Timeout,

  #[error("geolocation is not supported")]
  Unsupported,
}

impl LocationError {
  /// Sentence shown to the user. Each variant reads differently.
  pub fn message(&self) -> &'static str {
    match self {
      Self::PermissionDenied => {
        "Location access was denied. Enable it to see people around you."
      }
      Self::PositionUnavailable => {
        "Your position could not be determined right now."
      }
      Self::Timeout => "Finding your position took too long. Press r to try again.",
      Self::Unsupported => "Location is not available on this device.",
    }
  }
}

// ─── Options ─────────────────────────────────────────────────────────────────

/// Knobs forwarded to the position source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionOptions {
  /// Prefer an accurate fix over a fast one.
  pub high_accuracy: bool,
  /// Deadline for the whole request.
  #[serde(with = "secs")]
  pub timeout:       Duration,
  /// Oldest cached fix the source may hand back.
  #[serde(with = "secs")]
  pub maximum_age:   Duration,
}

impl Default for PositionOptions {
  fn default() -> Self {
    Self {
      high_accuracy: true,
      timeout:       Duration::from_secs(10),
      maximum_age:   Duration::from_secs(5 * 60),
    }
  }
}

/// (De)serialise a [`Duration`] as whole seconds.
mod secs {
  use std::time::Duration;

  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_secs())
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    u64::deserialize(d).map(Duration::from_secs)
  }
}

// ─── Source trait ────────────────────────────────────────────────────────────

/// Something that can report where the viewer is.
///
/// Implementations should honour `options` where they can; the deadline is
/// enforced by [`Geolocation`] regardless.
pub trait PositionSource: Send + Sync {
  fn current_position<'a>(
    &'a self,
    options: &'a PositionOptions,
  ) -> impl Future<Output = Result<Coordinate, LocationError>> + Send + 'a;
}

/// Always reports the same coordinate.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinate);

impl PositionSource for FixedPosition {
  async fn current_position(
    &self,
    _options: &PositionOptions,
  ) -> Result<Coordinate, LocationError> {
    Ok(self.0)
  }
}

/// The platform has no way to locate the viewer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPositionSource;

impl PositionSource for NoPositionSource {
  async fn current_position(
    &self,
    _options: &PositionOptions,
  ) -> Result<Coordinate, LocationError> {
    Err(LocationError::Unsupported)
  }
}

/// The viewer has switched location off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedPosition;

impl PositionSource for DeniedPosition {
  async fn current_position(
    &self,
    _options: &PositionOptions,
  ) -> Result<Coordinate, LocationError> {
    Err(LocationError::PermissionDenied)
  }
}

// ─── State ───────────────────────────────────────────────────────────────────

/// Outcome of the position request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum LocationState {
  /// No request has been made yet.
  #[default]
  Idle,
  /// A request is in flight.
  Pending,
  Located(Coordinate),
  Failed(LocationError),
}

impl LocationState {
  pub fn coordinate(&self) -> Option<Coordinate> {
    match self {
      Self::Located(c) => Some(*c),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<LocationError> {
    match self {
      Self::Failed(e) => Some(*e),
      _ => None,
    }
  }

  pub fn is_loading(&self) -> bool { matches!(self, Self::Pending) }
}

/// Tracks the single outstanding position request.
#[derive(Debug, Clone, Default)]
pub struct Geolocation {
  state:   LocationState,
  options: PositionOptions,
}

impl Geolocation {
  pub fn new(options: PositionOptions) -> Self {
    Self {
      state: LocationState::Idle,
      options,
    }
  }

  pub fn state(&self) -> LocationState { self.state }

  pub fn options(&self) -> PositionOptions { self.options }

  /// Mark a request as started. Returns `false` if one is already in flight,
  /// in which case the caller must not start another.
  pub fn begin(&mut self) -> bool {
    if self.state.is_loading() {
      return false;
    }
    self.state = LocationState::Pending;
    true
  }

  /// Record the outcome of the request started by [`Geolocation::begin`].
  pub fn resolve(&mut self, outcome: Result<Coordinate, LocationError>) {
    self.state = match outcome {
      Ok(c) => {
        tracing::info!(lat = c.lat, lng = c.lng, "position acquired");
        LocationState::Located(c)
      }
      Err(e) => {
        tracing::warn!(error = %e, "position request failed");
        LocationState::Failed(e)
      }
    };
  }

  /// Begin, query `source` once under the configured deadline, and resolve.
  pub async fn acquire<S: PositionSource>(&mut self, source: &S) -> LocationState {
    if !self.begin() {
      return self.state;
    }
    let outcome = request(source, self.options).await;
    self.resolve(outcome);
    self.state
  }
}

/// A single deadline-bounded query against `source`.
///
/// Split out from [`Geolocation::acquire`] so a front-end can run it on a
/// spawned task and feed the result back through [`Geolocation::resolve`].
pub async fn request<S: PositionSource>(
  source: &S,
  options: PositionOptions,
) -> Result<Coordinate, LocationError> {
  tracing::debug!(
    high_accuracy = options.high_accuracy,
    timeout_ms = options.timeout.as_millis() as u64,
    "requesting position"
  );
  match tokio::time::timeout(options.timeout, source.current_position(&options)).await {
    Ok(outcome) => outcome,
    Err(_) => Err(LocationError::Timeout),
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;

  /// Never answers.
  struct Hang;

  impl PositionSource for Hang {
    async fn current_position(
      &self,
      _options: &PositionOptions,
    ) -> Result<Coordinate, LocationError> {
      std::future::pending().await
    }
  }

  struct Failing(LocationError);

  impl PositionSource for Failing {
    async fn current_position(
      &self,
      _options: &PositionOptions,
    ) -> Result<Coordinate, LocationError> {
      Err(self.0)
    }
  }

  #[tokio::test]
  async fn fixed_source_locates() {
    let mut geo = Geolocation::default();
    let state = geo.acquire(&FixedPosition(Coordinate::PARIS)).await;
    assert_eq!(state, LocationState::Located(Coordinate::PARIS));
    assert_eq!(geo.state().coordinate(), Some(Coordinate::PARIS));
    assert!(geo.state().error().is_none());
  }

  #[tokio::test]
  async fn unsupported_and_denied_sources() {
    let mut geo = Geolocation::default();
    assert_eq!(
      geo.acquire(&NoPositionSource).await,
      LocationState::Failed(LocationError::Unsupported)
    );
    assert_eq!(
      geo.acquire(&DeniedPosition).await,
      LocationState::Failed(LocationError::PermissionDenied)
    );
  }

  #[tokio::test(start_paused = true)]
  async fn deadline_maps_to_timeout() {
    let mut geo = Geolocation::new(PositionOptions {
      timeout: Duration::from_secs(10),
      ..Default::default()
    });
    let state = geo.acquire(&Hang).await;
    assert_eq!(state, LocationState::Failed(LocationError::Timeout));
  }

  #[tokio::test]
  async fn success_clears_previous_error() {
    let mut geo = Geolocation::default();
    geo.acquire(&Failing(LocationError::PositionUnavailable)).await;
    assert_eq!(geo.state().error(), Some(LocationError::PositionUnavailable));
    geo.acquire(&FixedPosition(Coordinate::PARIS)).await;
    assert!(geo.state().error().is_none());
  }

  #[test]
  fn begin_refuses_second_request() {
    let mut geo = Geolocation::default();
    assert!(geo.begin());
    assert!(geo.state().is_loading());
    assert!(!geo.begin());
    geo.resolve(Err(LocationError::Timeout));
    assert!(geo.begin());
  }

  #[test]
  fn every_error_has_a_distinct_message() {
    let all = [
      LocationError::PermissionDenied,
      LocationError::PositionUnavailable,
      LocationError::Timeout,
      LocationError::Unsupported,
    ];
    let messages: HashSet<&str> = all.iter().map(|e| e.message()).collect();
    assert_eq!(messages.len(), all.len());
    for e in all {
      assert!(!e.message().is_empty());
      assert!(!e.to_string().is_empty());
    }
  }

  #[test]
  fn options_deserialize_seconds() {
    let opts: PositionOptions =
      toml::from_str("timeout = 3\nhigh_accuracy = false").unwrap();
    assert_eq!(opts.timeout, Duration::from_secs(3));
    assert!(!opts.high_accuracy);
    assert_eq!(opts.maximum_age, Duration::from_secs(300));
  }
}

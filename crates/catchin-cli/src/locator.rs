//! Position sources available to the terminal client.

use std::time::Duration;

use anyhow::Context;
use catchin_core::{
  geo::Coordinate,
  location::{
    DeniedPosition, FixedPosition, LocationError, NoPositionSource, PositionOptions,
    PositionSource,
  },
};
use clap::ValueEnum;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// Default IP geolocation endpoint.
pub const DEFAULT_IP_URL: &str = "http://ip-api.com/json";

// ─── Config ───────────────────────────────────────────────────────────────────

/// Which source to locate the viewer with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LocatorKind {
  /// Approximate position from the public IP address.
  #[default]
  Ip,
  /// A configured coordinate.
  Fixed,
  /// Location switched off by the user.
  Disabled,
  /// No location support at all.
  #[serde(alias = "none")]
  #[value(alias = "none")]
  Unsupported,
}

/// `[locator]` table of the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
  pub kind:     LocatorKind,
  pub url:      String,
  pub position: Option<Coordinate>,
}

impl Default for LocatorConfig {
  fn default() -> Self {
    Self {
      kind:     LocatorKind::default(),
      url:      DEFAULT_IP_URL.to_string(),
      position: None,
    }
  }
}

// ─── IP lookup ────────────────────────────────────────────────────────────────

/// Response shape shared by the common IP geolocation services.
#[derive(Debug, Deserialize)]
struct IpLookup {
  status:    Option<String>,
  lat:       Option<f64>,
  lon:       Option<f64>,
  latitude:  Option<f64>,
  longitude: Option<f64>,
}

impl IpLookup {
  fn coordinate(&self) -> Option<Coordinate> {
    if self.status.as_deref().is_some_and(|s| s != "success") {
      return None;
    }
    let lat = self.lat.or(self.latitude)?;
    let lng = self.lon.or(self.longitude)?;
    Coordinate::new(lat, lng).ok()
  }
}

/// Looks the viewer up by public IP over HTTP.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct IpLocator {
  client: Client,
  url:    String,
}

impl IpLocator {
  pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
    let client = Client::builder()
      .connect_timeout(Duration::from_secs(5))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self {
      client,
      url: url.into(),
    })
  }
}

impl PositionSource for IpLocator {
  async fn current_position(
    &self,
    options: &PositionOptions,
  ) -> Result<Coordinate, LocationError> {
    let resp = self
      .client
      .get(&self.url)
      .timeout(options.timeout)
      .send()
      .await
      .map_err(|e| {
        tracing::warn!("IP lookup unreachable: {e}");
        if e.is_timeout() {
          LocationError::Timeout
        } else {
          LocationError::PositionUnavailable
        }
      })?;

    match resp.status() {
      StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
        tracing::warn!("IP lookup refused: {}", resp.status());
        return Err(LocationError::PermissionDenied);
      }
      s if !s.is_success() => {
        tracing::warn!("IP lookup non-OK: {s}");
        return Err(LocationError::PositionUnavailable);
      }
      _ => {}
    }

    let body: IpLookup = resp.json().await.map_err(|e| {
      tracing::warn!("IP lookup returned an unreadable body: {e}");
      LocationError::PositionUnavailable
    })?;
    body.coordinate().ok_or(LocationError::PositionUnavailable)
  }
}

// ─── Locator ──────────────────────────────────────────────────────────────────

/// The configured position source.
#[derive(Debug, Clone)]
pub enum Locator {
  Ip(IpLocator),
  Fixed(FixedPosition),
  Disabled(DeniedPosition),
  Unsupported(NoPositionSource),
}

impl Locator {
  pub fn from_config(cfg: &LocatorConfig) -> anyhow::Result<Self> {
    Ok(match cfg.kind {
      LocatorKind::Ip => Self::Ip(IpLocator::new(cfg.url.clone())?),
      LocatorKind::Fixed => {
        let position = cfg
          .position
          .ok_or_else(|| anyhow::anyhow!("fixed locator needs a position (--lat/--lng)"))?;
        let position =
          Coordinate::new(position.lat, position.lng).context("invalid [locator].position")?;
        Self::Fixed(FixedPosition(position))
      }
      LocatorKind::Disabled => Self::Disabled(DeniedPosition),
      LocatorKind::Unsupported => Self::Unsupported(NoPositionSource),
    })
  }
}

impl PositionSource for Locator {
  async fn current_position(
    &self,
    options: &PositionOptions,
  ) -> Result<Coordinate, LocationError> {
    match self {
      Self::Ip(l) => l.current_position(options).await,
      Self::Fixed(l) => l.current_position(options).await,
      Self::Disabled(l) => l.current_position(options).await,
      Self::Unsupported(l) => l.current_position(options).await,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ip_lookup_accepts_both_field_styles() {
    let a: IpLookup =
      serde_json::from_str(r#"{"status":"success","lat":48.85,"lon":2.35}"#).unwrap();
    assert_eq!(a.coordinate(), Some(Coordinate { lat: 48.85, lng: 2.35 }));

    let b: IpLookup = serde_json::from_str(r#"{"latitude":45.76,"longitude":4.83}"#).unwrap();
    assert_eq!(b.coordinate(), Some(Coordinate { lat: 45.76, lng: 4.83 }));
  }

  #[test]
  fn ip_lookup_failure_has_no_coordinate() {
    let fail: IpLookup =
      serde_json::from_str(r#"{"status":"fail","message":"private range"}"#).unwrap();
    assert_eq!(fail.coordinate(), None);

    let bogus: IpLookup = serde_json::from_str(r#"{"lat":400.0,"lon":0.0}"#).unwrap();
    assert_eq!(bogus.coordinate(), None);
  }

  #[test]
  fn kind_accepts_none_alias() {
    let cfg: LocatorConfig = toml::from_str(r#"kind = "none""#).unwrap();
    assert_eq!(cfg.kind, LocatorKind::Unsupported);
    assert_eq!(cfg.url, DEFAULT_IP_URL);
  }

  #[test]
  fn fixed_locator_requires_position() {
    let cfg = LocatorConfig {
      kind: LocatorKind::Fixed,
      ..Default::default()
    };
    assert!(Locator::from_config(&cfg).is_err());
  }

  #[test]
  fn fixed_locator_rejects_out_of_range_position() {
    let cfg: LocatorConfig = toml::from_str(
      r#"
        kind = "fixed"
        position = { lat = 123.0, lng = 2.35 }
      "#,
    )
    .unwrap();
    assert!(Locator::from_config(&cfg).is_err());
  }

  #[tokio::test]
  async fn locator_dispatches_to_source() {
    let opts = PositionOptions::default();
    let fixed = Locator::from_config(&LocatorConfig {
      kind: LocatorKind::Fixed,
      position: Some(Coordinate::PARIS),
      ..Default::default()
    })
    .unwrap();
    assert_eq!(fixed.current_position(&opts).await, Ok(Coordinate::PARIS));

    let off = Locator::from_config(&LocatorConfig {
      kind: LocatorKind::Disabled,
      ..Default::default()
    })
    .unwrap();
    assert_eq!(
      off.current_position(&opts).await,
      Err(LocationError::PermissionDenied)
    );

    let none = Locator::from_config(&LocatorConfig {
      kind: LocatorKind::Unsupported,
      ..Default::default()
    })
    .unwrap();
    assert_eq!(
      none.current_position(&opts).await,
      Err(LocationError::Unsupported)
    );
  }
}

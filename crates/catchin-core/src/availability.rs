//! The viewer's availability window.
//!
//! Availability is a flag plus a countdown in minutes. It is switched on and
//! off only by [`Availability::toggle`]; the countdown is driven by
//! [`Availability::tick`], one call per elapsed minute.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Durations (in minutes) offered when going available.
pub const DURATION_CHOICES: [u32; 5] = [15, 30, 45, 60, 120];

/// Duration used when nothing else is configured.
pub const DEFAULT_DURATION: u32 = 30;

/// What a call to [`Availability::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
  /// The viewer was not available; nothing changed.
  Idle,
  /// Still available with this many minutes left.
  Counting(u32),
  /// The countdown ran out and availability was switched off.
  Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
  available: bool,
  remaining: u32,
  duration:  u32,
}

impl Default for Availability {
  fn default() -> Self { Self::new(DEFAULT_DURATION) }
}

impl Availability {
  /// Unavailable, with `duration` minutes applied on the next toggle-on.
  pub fn new(duration: u32) -> Self {
    Self {
      available: false,
      remaining: 0,
      duration,
    }
  }

  pub fn is_available(&self) -> bool { self.available }

  /// Minutes left in the current window; `0` when unavailable.
  pub fn remaining(&self) -> u32 { self.remaining }

  pub fn duration(&self) -> u32 { self.duration }

  /// Change the duration used by the next toggle-on. Only values from
  /// [`DURATION_CHOICES`] are accepted.
  pub fn set_duration(&mut self, minutes: u32) -> Result<()> {
    if !DURATION_CHOICES.contains(&minutes) {
      return Err(Error::UnsupportedDuration {
        got:     minutes,
        allowed: DURATION_CHOICES.to_vec(),
      });
    }
    self.duration = minutes;
    Ok(())
  }

  /// Step through [`DURATION_CHOICES`], wrapping around.
  pub fn cycle_duration(&mut self) {
    let idx = DURATION_CHOICES
      .iter()
      .position(|d| *d == self.duration)
      .map_or(0, |i| (i + 1) % DURATION_CHOICES.len());
    self.duration = DURATION_CHOICES[idx];
  }

  /// Flip availability. Going available starts a fresh countdown of
  /// `duration` minutes; going unavailable clears it.
  pub fn toggle(&mut self) -> bool {
    self.available = !self.available;
    self.remaining = if self.available { self.duration } else { 0 };
    tracing::debug!(
      available = self.available,
      remaining = self.remaining,
      "availability toggled"
    );
    self.available
  }

  /// Advance the countdown by one minute.
  pub fn tick(&mut self) -> TickOutcome {
    if !self.available {
      return TickOutcome::Idle;
    }
    self.remaining = self.remaining.saturating_sub(1);
    if self.remaining == 0 {
      self.available = false;
      tracing::info!("availability window expired");
      return TickOutcome::Expired;
    }
    TickOutcome::Counting(self.remaining)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn toggle_on_starts_countdown() {
    let mut a = Availability::default();
    assert!(!a.is_available());
    assert!(a.toggle());
    assert_eq!(a.remaining(), 30);
  }

  #[test]
  fn toggle_twice_restores_state() {
    let start = Availability::default();
    let mut a = start.clone();
    a.toggle();
    a.toggle();
    assert_eq!(a, start);

    let mut on = Availability::default();
    on.toggle();
    on.tick();
    let snapshot = on.clone();
    on.toggle();
    on.toggle();
    // Back on, with a fresh window.
    assert!(on.is_available());
    assert_eq!(on.remaining(), snapshot.duration());
  }

  #[test]
  fn thirty_ticks_expire_default_window() {
    let mut a = Availability::default();
    a.toggle();
    for i in 1..30 {
      assert_eq!(a.tick(), TickOutcome::Counting(30 - i));
      assert!(a.is_available());
    }
    assert_eq!(a.tick(), TickOutcome::Expired);
    assert!(!a.is_available());
    assert_eq!(a.remaining(), 0);
  }

  #[test]
  fn countdown_never_negative() {
    let mut a = Availability::new(15);
    a.toggle();
    for _ in 0..100 {
      a.tick();
    }
    assert_eq!(a.remaining(), 0);
    assert_eq!(a.tick(), TickOutcome::Idle);
  }

  #[test]
  fn zero_remaining_expires_on_next_tick() {
    let mut a = Availability {
      available: true,
      remaining: 0,
      duration:  30,
    };
    assert_eq!(a.tick(), TickOutcome::Expired);
    assert!(!a.is_available());
  }

  #[test]
  fn unavailable_tick_is_idle() {
    let mut a = Availability::default();
    assert_eq!(a.tick(), TickOutcome::Idle);
    assert_eq!(a, Availability::default());
  }

  #[test]
  fn duration_must_be_a_choice() {
    let mut a = Availability::default();
    a.set_duration(60).unwrap();
    a.toggle();
    assert_eq!(a.remaining(), 60);
    assert!(matches!(
      a.set_duration(7),
      Err(Error::UnsupportedDuration { got: 7, .. })
    ));
  }

  #[test]
  fn cycle_wraps_around() {
    let mut a = Availability::new(120);
    a.cycle_duration();
    assert_eq!(a.duration(), 15);
    a.cycle_duration();
    assert_eq!(a.duration(), 30);
  }
}

//! Core types and rules for the CatchinCup meetup client.
//!
//! This crate is free of terminal and HTTP dependencies. Platform concerns
//! (where the position comes from, how the map is drawn) sit behind the
//! [`location::PositionSource`] and [`map::MapSurface`] traits.

pub mod availability;
pub mod cafe;
pub mod config;
pub mod directory;
pub mod error;
pub mod geo;
pub mod invitation;
pub mod location;
pub mod map;
pub mod person;
pub mod session;

pub use error::{Error, Result};

#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Core domain types for the timezone assistant.
//!
//! This crate holds everything the conversation layer needs without
//! touching the network: resolved-city values, the collaborator traits
//! (geocoding, timezone-at-point, full city resolution), and the pure
//! time arithmetic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod naming;
pub mod timemath;

pub use naming::canonical_city_name;

/// A geographic point returned by a geocoder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A city successfully resolved to a timezone.
///
/// Immutable value produced on every successful lookup; offset and
/// abbreviation reflect the instant of resolution (DST-aware).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCity {
    /// The raw text the user typed.
    pub query: String,
    /// Canonical display name (see [`naming::canonical_city_name`]).
    pub display_name: String,
    /// IANA timezone of the city.
    pub timezone: chrono_tz::Tz,
    /// UTC offset at resolution time, formatted `+HH:MM` / `-HH:MM`.
    pub utc_offset: String,
    /// Zone abbreviation at resolution time (e.g. `CET`).
    pub abbreviation: String,
}

/// Resolution failure surfaced to the conversation layer.
///
/// Geocoder misses, uncovered points (open ocean) and transport errors
/// all collapse into this single variant; the distinction is logged by
/// the resolver implementation but never shown to the user.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("could not resolve {0:?} to a timezone")]
    NotFound(String),
}

/// What to do when structured input (e.g. `HH:MM AM/PM City`) fails to
/// parse: stay in the same state and re-prompt, or fall back to the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedInputPolicy {
    #[default]
    Reprompt,
    ReturnToMenu,
}

/// Free-text place name to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Returns `Ok(None)` when the service has no match for the query.
    async fn geocode(&self, query: &str) -> anyhow::Result<Option<Coordinates>>;
}

/// Coordinates to IANA timezone (point-in-polygon lookup).
pub trait TimezoneLocator: Send + Sync {
    /// Returns `None` when no zone covers the point.
    fn timezone_at(&self, coords: Coordinates) -> Option<chrono_tz::Tz>;
}

/// Full city resolution: text to [`ResolvedCity`].
#[async_trait]
pub trait CityResolver: Send + Sync {
    async fn resolve(&self, text: &str) -> Result<ResolvedCity, ResolveError>;
}

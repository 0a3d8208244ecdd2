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

//! Collaborator implementations for city resolution.
//!
//! Geocoding goes over HTTP (Nominatim); the coordinates-to-timezone step
//! is a local point-in-polygon lookup over the bundled tzf dataset.

mod locator;
mod nominatim;
mod resolver;

pub use locator::TzfLocator;
pub use nominatim::NominatimGeocoder;
pub use resolver::GeoCityResolver;

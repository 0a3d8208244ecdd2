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

//! Configuration and localized strings, loaded once at startup from
//! `~/zonebot/`.

mod schema;
mod strings;

pub use schema::{Config, ConversationConfig, GeocoderConfig, TelegramConfig};
pub use strings::Strings;

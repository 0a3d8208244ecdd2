#![deny(
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

//! Telegram transport for the timezone assistant.
//!
//! Maps teloxide updates onto conversation [`zonebot_conversation::Input`]
//! values, ships [`zonebot_conversation::Reply`] values back as messages
//! with inline keyboards, and drives the per-session inactivity timeout.

mod bot;
mod command;
mod error;
mod handler;
mod keyboard;

pub use bot::ZoneBot;
pub use command::Command;
pub use error::{Error, Result};

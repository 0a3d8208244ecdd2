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

//! Conversation state machine for the timezone assistant.
//!
//! One [`Session`] per chat, a finite set of states, and an [`Engine`]
//! holding the transition table. The engine is the only place that turns
//! resolver and arithmetic failures into user-visible text; transports
//! above it just ship [`Reply`] values.

mod engine;
mod session;
mod store;
mod templates;
mod timeout;

pub use engine::{Engine, EngineConfig, Input, MenuAction, MenuKind, Reply};
pub use session::{ConversationState, PendingOperation, Session};
pub use store::{SessionKey, SessionRegistry, SessionStore};
pub use templates::{RandomPicker, VariantPicker};
pub use timeout::TimeoutSupervisor;

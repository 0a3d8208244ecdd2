//! Per-chat session record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zonebot_core::ResolvedCity;

/// Where the conversation is waiting for input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    AwaitingFirstCity,
    AwaitingNextCity,
    AwaitingConversionTarget,
    AwaitingConversionTime,
    AwaitingDifferenceCity,
}

/// Multi-step operation currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingOperation {
    #[default]
    None,
    Convert,
    Difference,
}

/// The durable record of one ongoing conversation.
///
/// Serde-derived so a pluggable [`crate::SessionStore`] can persist it.
/// Invariant: `secondary_city` is only set while `pending_operation` is
/// not `None`; completion or abandonment clears both together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub state: ConversationState,
    pub primary_city: Option<ResolvedCity>,
    pending_operation: PendingOperation,
    secondary_city: Option<ResolvedCity>,
    pub last_activity: DateTime<Utc>,
    activity_token: u64,
    pub active: bool,
}

impl Session {
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: ConversationState::AwaitingFirstCity,
            primary_city: None,
            pending_operation: PendingOperation::None,
            secondary_city: None,
            last_activity: now,
            activity_token: 0,
            active: true,
        }
    }

    /// Record inbound activity and return the new activity token.
    ///
    /// The token is monotonic per session; a timeout armed with an older
    /// token becomes a no-op (see [`Self::expire`]).
    pub fn touch(&mut self, now: DateTime<Utc>) -> u64 {
        self.activity_token += 1;
        self.last_activity = now;
        self.active = true;
        self.activity_token
    }

    #[must_use]
    pub const fn activity_token(&self) -> u64 {
        self.activity_token
    }

    #[must_use]
    pub const fn pending_operation(&self) -> PendingOperation {
        self.pending_operation
    }

    #[must_use]
    pub const fn secondary_city(&self) -> Option<&ResolvedCity> {
        self.secondary_city.as_ref()
    }

    /// Start a multi-step operation, dropping any half-finished one.
    pub fn begin_operation(&mut self, operation: PendingOperation) {
        self.clear_pending();
        self.pending_operation = operation;
    }

    /// Attach the secondary city of the operation in flight.
    ///
    /// Only valid while an operation is pending.
    pub fn set_secondary_city(&mut self, city: ResolvedCity) {
        debug_assert!(self.pending_operation != PendingOperation::None);
        if self.pending_operation != PendingOperation::None {
            self.secondary_city = Some(city);
        }
    }

    /// Complete or abandon the operation in flight.
    pub fn clear_pending(&mut self) {
        self.pending_operation = PendingOperation::None;
        self.secondary_city = None;
    }

    /// Return to the initial state, dropping all conversation data.
    pub fn reset(&mut self) {
        self.state = ConversationState::AwaitingFirstCity;
        self.primary_city = None;
        self.clear_pending();
        self.active = true;
    }

    /// Deactivate the session if `token` is still the latest activity.
    ///
    /// Returns `true` when the expiry took effect. A stale token means a
    /// message won the race against the timeout, so nothing happens.
    pub fn expire(&mut self, token: u64) -> bool {
        if token != self.activity_token || !self.active {
            return false;
        }
        self.active = false;
        true
    }
}

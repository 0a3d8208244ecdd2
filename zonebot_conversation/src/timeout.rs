//! Per-session inactivity deadlines.

use crate::store::SessionKey;
use std::{collections::HashMap, time::Duration};
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::debug;

/// Races each session's inactivity clock against its next message.
///
/// At most one deferred action is live per session. Each arm carries the
/// session's activity token; an arm whose token is not newer than the
/// standing one is dropped, so concurrent turns for the same session can
/// deliver their arms in any order without a stale deadline surviving a
/// fresh one. The action itself must still re-validate the token when it
/// fires; abort alone cannot close the window where a message and a
/// deadline run back-to-back.
pub struct TimeoutSupervisor {
    window: Duration,
    armed: Mutex<HashMap<SessionKey, (u64, AbortHandle)>>,
}

impl TimeoutSupervisor {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            armed: Mutex::new(HashMap::new()),
        }
    }

    /// The inactivity window sessions are held to.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Arm (or re-arm) the deadline for `key` on behalf of activity
    /// `token`.
    ///
    /// `on_expire` runs once if no newer arm or disarm happens within the
    /// window. An arm carrying a token no newer than the standing one is
    /// ignored.
    pub async fn arm<F, Fut>(&self, key: SessionKey, token: u64, on_expire: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let window = self.window;
        let mut armed = self.armed.lock().await;
        let stale = armed
            .get(&key)
            .is_some_and(|(standing, _)| *standing >= token);
        if stale {
            debug!("Dropping stale arm (token {token}) for session {key}");
            return;
        }

        // Spawn under the lock so the map entry and the live task can
        // never disagree about which deadline is current.
        let task = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            debug!("Inactivity deadline fired for session {key}");
            on_expire().await;
        });

        if let Some((_, previous)) = armed.insert(key, (token, task.abort_handle())) {
            previous.abort();
        }
    }

    /// Cancel the deadline for `key`, if any.
    pub async fn disarm(&self, key: SessionKey) {
        if let Some((_, handle)) = self.armed.lock().await.remove(&key) {
            handle.abort();
        }
    }
}

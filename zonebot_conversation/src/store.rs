//! Session ownership and optional durable persistence.

use crate::session::Session;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use tracing::warn;

/// Sessions are keyed by chat identity.
pub type SessionKey = i64;

/// Pluggable durable storage for [`Session`] records.
///
/// The reference deployment runs in-memory only; implementations can back
/// this with any keyed store. Failures are logged and never fatal to a
/// conversation.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, key: SessionKey) -> anyhow::Result<Option<Session>>;
    async fn save(&self, key: SessionKey, session: &Session) -> anyhow::Result<()>;
    async fn clear(&self, key: SessionKey) -> anyhow::Result<()>;
}

/// In-process owner of all live sessions.
///
/// Hands out one `Arc<Mutex<Session>>` per chat so a session processes
/// one message at a time while different sessions stay fully independent;
/// the registry lock is only held to fetch the handle, never across a
/// transition.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionKey, Arc<Mutex<Session>>>>,
    backing: Option<Arc<dyn SessionStore>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            backing: None,
        }
    }

    /// Attach a durable store consulted on miss and written after every
    /// transition.
    #[must_use]
    pub fn with_backing(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.backing = Some(store);
        self
    }

    /// Fetch the session handle for `key`, creating it on first contact.
    ///
    /// Returns the handle and whether this is the first contact for the
    /// key (no live session and nothing in the durable store).
    pub async fn get_or_create(
        &self,
        key: SessionKey,
        now: DateTime<Utc>,
    ) -> (Arc<Mutex<Session>>, bool) {
        let mut sessions = self.sessions.lock().await;
        if let Some(handle) = sessions.get(&key) {
            return (Arc::clone(handle), false);
        }

        let mut first_contact = true;
        let session = match &self.backing {
            Some(store) => match store.load(key).await {
                Ok(Some(stored)) => {
                    first_contact = false;
                    stored
                }
                Ok(None) => Session::new(now),
                Err(e) => {
                    warn!("Session store load failed for {key}: {e}");
                    Session::new(now)
                }
            },
            None => Session::new(now),
        };

        let handle = Arc::new(Mutex::new(session));
        sessions.insert(key, Arc::clone(&handle));
        (handle, first_contact)
    }

    /// Look up a live session without creating one.
    pub async fn get(&self, key: SessionKey) -> Option<Arc<Mutex<Session>>> {
        self.sessions.lock().await.get(&key).map(Arc::clone)
    }

    /// Write-through to the durable store, if one is attached.
    pub async fn persist(&self, key: SessionKey, session: &Session) {
        if let Some(store) = &self.backing {
            if let Err(e) = store.save(key, session).await {
                warn!("Session store save failed for {key}: {e}");
            }
        }
    }

    /// Drop the live session and clear the durable record.
    pub async fn remove(&self, key: SessionKey) {
        self.sessions.lock().await.remove(&key);
        if let Some(store) = &self.backing {
            if let Err(e) = store.clear(key).await {
                warn!("Session store clear failed for {key}: {e}");
            }
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//! Session storage backends.
//!
//! [`SessionStore`] is the seam between the manager and wherever records
//! live. The manager only ever talks to a `dyn SessionStore`, so a backend
//! backed by an external key-value service can replace [`MemoryStore`]
//! without touching manager code.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::record::SessionRecord;
use crate::token::token_prefix;

/// Trait for session storage backends.
///
/// All methods are synchronous and may be called concurrently from any
/// number of threads, including the background sweep.
pub trait SessionStore: Send + Sync {
    /// Insert or overwrite the record stored under `token`.
    fn save(&self, token: &str, record: SessionRecord) -> Result<()>;

    /// Get the current record for `token`.
    ///
    /// Returns [`Error::NotFound`] if the token was never saved or has
    /// been deleted.
    fn get(&self, token: &str) -> Result<SessionRecord>;

    /// Remove the record stored under `token`.
    ///
    /// Deleting a token that is not present is not an error.
    fn delete(&self, token: &str) -> Result<()>;

    /// Remove every record idle for longer than `ttl`.
    ///
    /// Returns the number of records removed.
    fn cleanup(&self, ttl: Duration) -> Result<usize>;
}

/// In-memory session store.
///
/// A single `RwLock` guards the map: `get` shares the lock, while `save`,
/// `delete` and `cleanup` hold it exclusively. `cleanup` scans the whole
/// map under the write lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired or not.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn save(&self, token: &str, record: SessionRecord) -> Result<()> {
        self.sessions.write().insert(token.to_string(), record);
        trace!(token = %token_prefix(token), "Session saved");
        Ok(())
    }

    fn get(&self, token: &str) -> Result<SessionRecord> {
        self.sessions
            .read()
            .get(token)
            .cloned()
            .ok_or_else(|| Error::NotFound(token_prefix(token).to_string()))
    }

    fn delete(&self, token: &str) -> Result<()> {
        if self.sessions.write().remove(token).is_some() {
            trace!(token = %token_prefix(token), "Session deleted");
        }
        Ok(())
    }

    fn cleanup(&self, ttl: Duration) -> Result<usize> {
        let mut sessions = self.sessions.write();
        let now = Utc::now();
        let before = sessions.len();

        sessions.retain(|_, record| !record.is_expired(now, ttl));

        let removed = before - sessions.len();
        if removed > 0 {
            debug!(count = removed, remaining = sessions.len(), "Removed expired sessions");
        }
        Ok(removed)
    }
}

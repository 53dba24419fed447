//! Session lifecycle manager.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};

use crate::config::ManagerConfig;
use crate::error::{Error, Result};
use crate::record::SessionRecord;
use crate::store::{MemoryStore, SessionStore};
use crate::sweep::SweepTask;
use crate::token::{generate_token, token_prefix};

/// Issues session tokens and routes session reads and writes to a store.
///
/// A session moves through two states: it becomes active on
/// [`create_session`](Self::create_session), stays active across updates,
/// and disappears on [`destroy_session`](Self::destroy_session) or when a
/// cleanup sweep finds it idle for longer than the TTL.
///
/// When built inside a Tokio runtime with the cleanup task enabled, the
/// manager owns a background sweep that runs until
/// [`shutdown`](Self::shutdown) is called or the manager is dropped.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    config: ManagerConfig,
    sweep: Mutex<Option<SweepTask>>,
}

impl SessionManager {
    /// Create a manager over `store`, or over a fresh [`MemoryStore`] if
    /// `None` is given.
    pub fn new(store: Option<Arc<dyn SessionStore>>, config: ManagerConfig) -> Result<Self> {
        config.validate()?;
        let store: Arc<dyn SessionStore> = match store {
            Some(store) => store,
            None => Arc::new(MemoryStore::new()),
        };

        let sweep = if config.enable_cleanup_task {
            if tokio::runtime::Handle::try_current().is_ok() {
                Some(SweepTask::spawn(
                    Arc::clone(&store),
                    config.ttl,
                    config.cleanup_interval,
                ))
            } else {
                warn!("No Tokio runtime available, session cleanup sweep disabled");
                None
            }
        } else {
            None
        };

        info!(
            ttl = ?config.ttl,
            cookie_name = %config.cookie_name,
            sweep = sweep.is_some(),
            "Session manager started"
        );

        Ok(Self {
            store,
            config,
            sweep: Mutex::new(sweep),
        })
    }

    /// Create a manager backed by a fresh [`MemoryStore`].
    pub fn with_memory_store(config: ManagerConfig) -> Result<Self> {
        Self::new(None, config)
    }

    /// Start a session for `user_id` and return its token.
    pub fn create_session(&self, user_id: &str, source_ip: &str) -> Result<String> {
        let token = generate_token()?;
        let record = SessionRecord::new(user_id, source_ip);
        self.store.save(&token, record)?;

        debug!(token = %token_prefix(&token), user_id = %user_id, "Session created");
        Ok(token)
    }

    /// Look up the session for `token`.
    ///
    /// Any store failure, not just a missing token, yields `None`.
    pub fn get_session(&self, token: &str) -> Option<SessionRecord> {
        match self.store.get(token) {
            Ok(record) => Some(record),
            Err(Error::NotFound(_)) => {
                trace!(token = %token_prefix(token), "Session not found");
                None
            }
            Err(e) => {
                debug!(token = %token_prefix(token), error = %e, "Session lookup failed");
                None
            }
        }
    }

    /// Replace the session stored under `token` with `record`, stamping
    /// `last_activity` with the current time.
    ///
    /// Every field is overwritten, so `record` should come from a prior
    /// [`get_session`](Self::get_session). Concurrent updates to the same
    /// token race; the last write wins.
    pub fn update_session(&self, token: &str, mut record: SessionRecord) -> Result<()> {
        record.touch();
        self.store.save(token, record)
    }

    /// Refresh `last_activity` on an existing session without changing
    /// anything else.
    ///
    /// This is a read followed by a write, not an atomic operation.
    pub fn touch_session(&self, token: &str) -> Result<()> {
        let record = self.store.get(token)?;
        self.update_session(token, record)
    }

    /// End the session for `token`. Ending an unknown session succeeds.
    pub fn destroy_session(&self, token: &str) -> Result<()> {
        self.store.delete(token)?;
        debug!(token = %token_prefix(token), "Session destroyed");
        Ok(())
    }

    /// Run one cleanup pass now, returning the number of sessions removed.
    pub fn cleanup_now(&self) -> Result<usize> {
        self.store.cleanup(self.config.ttl)
    }

    /// Stop the background sweep and wait for it to exit.
    ///
    /// Safe to call more than once. Session operations keep working after
    /// shutdown; only the automatic cleanup stops.
    pub async fn shutdown(&self) {
        let sweep = self.sweep.lock().await.take();
        if let Some(sweep) = sweep {
            sweep.shutdown().await;
            info!("Session manager shut down");
        }
    }

    /// Check if the background sweep is running.
    pub async fn sweep_running(&self) -> bool {
        self.sweep
            .lock()
            .await
            .as_ref()
            .is_some_and(SweepTask::is_running)
    }

    /// Session inactivity timeout.
    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Alias for [`ttl`](Self::ttl).
    pub fn session_timeout(&self) -> Duration {
        self.config.ttl
    }

    /// Name of the cookie that carries the token.
    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Whether the session cookie should be marked `Secure`.
    pub fn secure_cookie(&self) -> bool {
        self.config.secure_cookie
    }

    /// Get the manager configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Get the backing store.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .finish()
    }
}

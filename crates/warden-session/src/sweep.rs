//! Periodic cleanup of expired sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::store::SessionStore;

/// Handle to a background task that periodically calls
/// [`SessionStore::cleanup`].
///
/// The task waits one interval, sweeps, and repeats until cancelled.
/// Dropping the handle cancels the task.
pub struct SweepTask {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl SweepTask {
    /// Spawn the sweep on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn(store: Arc<dyn SessionStore>, ttl: Duration, interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(store, ttl, interval, cancel.clone()));
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Check if the sweep task is still running.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal the task to stop without waiting for it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Stop the task and wait for it to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Session sweep task ended abnormally");
            }
        }
    }
}

impl Drop for SweepTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for SweepTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepTask")
            .field("running", &self.is_running())
            .finish()
    }
}

async fn run(
    store: Arc<dyn SessionStore>,
    ttl: Duration,
    interval: Duration,
    cancel: CancellationToken,
) {
    debug!(?ttl, ?interval, "Session sweep started");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }

        // The store call is synchronous and may block on the write lock.
        let sweep_store = Arc::clone(&store);
        match tokio::task::spawn_blocking(move || sweep_store.cleanup(ttl)).await {
            Ok(Ok(count)) => {
                if count > 0 {
                    info!(count, "Session sweep removed expired sessions");
                } else {
                    debug!("Session sweep found nothing to remove");
                }
            }
            Ok(Err(e)) => warn!(error = %e, "Session sweep failed"),
            Err(e) => warn!(error = %e, "Session sweep panicked"),
        }
    }
    debug!("Session sweep stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::record::SessionRecord;
    use crate::store::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store whose cleanup always fails, counting attempts.
    #[derive(Default)]
    struct FailingStore {
        cleanups: AtomicUsize,
    }

    impl SessionStore for FailingStore {
        fn save(&self, _token: &str, _record: SessionRecord) -> Result<()> {
            Ok(())
        }

        fn get(&self, token: &str) -> Result<SessionRecord> {
            Err(Error::NotFound(token.to_string()))
        }

        fn delete(&self, _token: &str) -> Result<()> {
            Ok(())
        }

        fn cleanup(&self, _ttl: Duration) -> Result<usize> {
            self.cleanups.fetch_add(1, Ordering::SeqCst);
            Err(Error::Storage("backend offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_sweep_removes_expired() {
        let store = Arc::new(MemoryStore::new());
        store.save("tok", SessionRecord::new("u", "ip")).unwrap();

        let task = SweepTask::spawn(
            store.clone(),
            Duration::from_millis(10),
            Duration::from_millis(20),
        );
        assert!(task.is_running());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(store.is_empty());

        task.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_task() {
        let store = Arc::new(MemoryStore::new());
        let task = SweepTask::spawn(store, Duration::from_secs(1), Duration::from_secs(3600));

        // Returns promptly even though the interval is an hour.
        tokio::time::timeout(Duration::from_secs(1), task.shutdown())
            .await
            .expect("shutdown should not wait for the interval");
    }

    #[tokio::test]
    async fn test_sweep_survives_cleanup_errors() {
        let store = Arc::new(FailingStore::default());
        let task = SweepTask::spawn(
            store.clone(),
            Duration::from_secs(1),
            Duration::from_millis(10),
        );

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(task.is_running());
        assert!(store.cleanups.load(Ordering::SeqCst) >= 2);

        task.shutdown().await;
    }
}

//! Command implementations for fieldsync.
//!
//! This module wires the sync subsystem together for one CLI invocation and
//! contains the implementation of all commands.

mod sync;

pub use sync::{add, clear, list, remove, run, status};

use std::sync::Arc;

use crate::config::{Config, Paths};
use crate::error::FieldSyncError;
use crate::features::sync::{ConnectivityMonitor, RemoteTarget, SimulatedRemote, SyncEngine, SyncQueue};
use crate::storage::{DataDirLock, DurableStore};

/// Host-side record of the connectivity seen by the previous invocation.
const NETWORK_KEY: &str = "network_online";

/// Everything a command needs, built once per invocation.
pub struct Context {
    pub engine: Arc<SyncEngine>,
    pub remote: Arc<dyn RemoteTarget>,
    _lock: Option<DataDirLock>,
}

impl Context {
    /// Open the store, restore the queue and bring connectivity up to date.
    ///
    /// Waits for any other invocation using the same data directory to
    /// finish first, so a single queue owns the stored snapshot.
    ///
    /// The monitor starts from the state the previous invocation saw, then
    /// receives the current signal. Coming back online with items waiting
    /// triggers the automatic drain, which finishes before any command runs.
    ///
    /// # Errors
    ///
    /// Returns an error if no tokio runtime is available.
    pub async fn open(paths: &Paths, config: &Config, offline: bool) -> Result<Self, FieldSyncError> {
        let lock = lock_data_dir(paths).await;

        let store = Arc::new(DurableStore::open(paths));
        let queue = Arc::new(SyncQueue::load(Arc::clone(&store)));

        let online_now = !offline && config.network.assume_online;
        let last_known = store.read::<bool>(NETWORK_KEY).unwrap_or(online_now);
        let monitor = Arc::new(ConnectivityMonitor::new(last_known));

        let engine = Arc::new(SyncEngine::new(queue, monitor, Arc::clone(&store)));
        let remote: Arc<dyn RemoteTarget> = Arc::new(SimulatedRemote::from_config(&config.remote));
        engine.attach(Arc::clone(&remote))?;

        let reconnecting = online_now && !last_known && !engine.queue().is_empty();
        let mut results = engine.subscribe_results();

        engine.monitor().signal(online_now);
        store.write(NETWORK_KEY, &online_now);

        if reconnecting && results.changed().await.is_ok() {
            if let Some(result) = results.borrow_and_update().as_ref() {
                tracing::info!(
                    succeeded = result.succeeded,
                    failed = result.failed,
                    "automatic sync after reconnect"
                );
            }
        }

        Ok(Self {
            engine,
            remote,
            _lock: lock,
        })
    }
}

/// Take the data directory lock, waiting for the current owner if needed.
///
/// Without a usable lock file the store cannot open either, so the session
/// continues unlocked on the in-memory fallback.
async fn lock_data_dir(paths: &Paths) -> Option<DataDirLock> {
    match DataDirLock::try_acquire(paths) {
        Ok(Some(lock)) => return Some(lock),
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(error = %e, "could not lock data directory");
            return None;
        }
    }

    tracing::info!(path = %paths.root.display(), "waiting for another fieldsync process to finish");
    let paths = paths.clone();
    match tokio::task::spawn_blocking(move || DataDirLock::acquire(&paths)).await {
        Ok(Ok(lock)) => Some(lock),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "could not lock data directory");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "data directory lock task failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::sync::ItemKind;
    use serde_json::json;
    use tempfile::TempDir;

    fn quick_config() -> Config {
        let mut config = Config::default();
        config.remote.latency_ms = 0;
        config
    }

    #[tokio::test]
    async fn test_reconnect_drains_queue() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_root(temp_dir.path().to_path_buf());

        {
            let ctx = Context::open(&paths, &quick_config(), true).await.unwrap();
            ctx.engine.queue().enqueue(ItemKind::UnitStateUpdate, json!({}));
            ctx.engine.queue().enqueue(ItemKind::PhotoAttachment, json!({}));
            ctx.engine.queue().enqueue(ItemKind::ChangeRequest, json!({}));
            assert_eq!(ctx.engine.pending_count(), 3);
        }

        let ctx = Context::open(&paths, &quick_config(), false).await.unwrap();

        assert_eq!(ctx.engine.pending_count(), 0);
        assert!(ctx.engine.last_sync_time().is_some());
    }

    #[tokio::test]
    async fn test_staying_online_does_not_drain() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_root(temp_dir.path().to_path_buf());

        {
            let ctx = Context::open(&paths, &quick_config(), false).await.unwrap();
            ctx.engine.queue().enqueue(ItemKind::GpsCapture, json!({}));
        }

        let ctx = Context::open(&paths, &quick_config(), false).await.unwrap();
        assert_eq!(ctx.engine.pending_count(), 1);
        assert!(ctx.engine.last_sync_time().is_none());
    }

    #[tokio::test]
    async fn test_second_context_waits_for_first() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_root(temp_dir.path().to_path_buf());

        let first = Context::open(&paths, &quick_config(), true).await.unwrap();
        first.engine.queue().enqueue(ItemKind::GpsCapture, json!({}));

        let waiting_paths = paths.clone();
        let second = tokio::spawn(async move {
            let ctx = Context::open(&waiting_paths, &quick_config(), true)
                .await
                .unwrap();
            ctx.engine.pending_count()
        });

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert!(!second.is_finished());

        // Written after the second context asked for the directory.
        first.engine.queue().enqueue(ItemKind::PhotoAttachment, json!({}));
        drop(first);

        assert_eq!(second.await.unwrap(), 2);
    }
}

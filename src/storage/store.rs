//! Durable key-value store.
//!
//! [`DurableStore`] is the only persistence surface the sync subsystem sees.
//! Backend failures never reach its callers: reads degrade to "absent",
//! writes and removals degrade to logged no-ops.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Paths;
use crate::error::FieldSyncError;

use super::Database;

/// Raw storage backend. Errors are reported here and absorbed by
/// [`DurableStore`].
#[cfg_attr(test, mockall::automock)]
pub trait StoreBackend: Send + Sync {
    /// Fetch the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, FieldSyncError>;

    /// Overwrite the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), FieldSyncError>;

    /// Delete `key`; deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), FieldSyncError>;
}

/// `SQLite` backed storage, one row per key.
pub struct SqliteBackend {
    db: Mutex<Database>,
}

impl SqliteBackend {
    /// Wrap an opened database.
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    fn with_db<T>(
        &self,
        f: impl FnOnce(&Database) -> Result<T, FieldSyncError>,
    ) -> Result<T, FieldSyncError> {
        let db = self
            .db
            .lock()
            .map_err(|_| FieldSyncError::Database("database lock poisoned".to_string()))?;
        f(&db)
    }
}

impl StoreBackend for SqliteBackend {
    fn get(&self, key: &str) -> Result<Option<String>, FieldSyncError> {
        self.with_db(|db| {
            db.connection()
                .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                    row.get(0)
                })
                .optional()
                .map_err(|e| FieldSyncError::Database(format!("Failed to read {key}: {e}")))
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), FieldSyncError> {
        self.with_db(|db| {
            db.connection()
                .execute(
                    r"INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                      ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        updated_at = excluded.updated_at",
                    params![key, value, Utc::now().to_rfc3339()],
                )
                .map_err(|e| FieldSyncError::Database(format!("Failed to write {key}: {e}")))?;
            Ok(())
        })
    }

    fn delete(&self, key: &str) -> Result<(), FieldSyncError> {
        self.with_db(|db| {
            db.connection()
                .execute("DELETE FROM kv_store WHERE key = ?1", [key])
                .map_err(|e| FieldSyncError::Database(format!("Failed to delete {key}: {e}")))?;
            Ok(())
        })
    }
}

/// Process-local storage. Clones share the same entries, which lets tests
/// "restart" by building a fresh store over a clone.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, FieldSyncError> {
        self.entries
            .lock()
            .map_err(|_| FieldSyncError::Database("memory store lock poisoned".to_string()))
    }
}

impl StoreBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, FieldSyncError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), FieldSyncError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), FieldSyncError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Durable named values that survive restarts.
pub struct DurableStore {
    backend: Box<dyn StoreBackend>,
    persistent: bool,
}

impl DurableStore {
    /// Build a store over any backend.
    #[must_use]
    pub fn new(backend: impl StoreBackend + 'static, persistent: bool) -> Self {
        Self {
            backend: Box::new(backend),
            persistent,
        }
    }

    /// A store that only lives for this process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new(), false)
    }

    /// Open the `SQLite` store under `paths`, falling back to memory when the
    /// database is unavailable. Never fails.
    #[must_use]
    pub fn open(paths: &Paths) -> Self {
        let opened = paths
            .ensure_dirs()
            .and_then(|()| Database::open_at(&paths.database));

        match opened {
            Ok(db) => {
                tracing::debug!(path = %paths.database.display(), "opened durable store");
                Self::new(SqliteBackend::new(db), true)
            }
            Err(e) => {
                tracing::warn!(error = %e, "durable store unavailable, using in-memory storage");
                Self::in_memory()
            }
        }
    }

    /// Whether values written here outlive the process.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Read the raw text under `key`.
    #[must_use]
    pub fn read_raw(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "store read failed");
                None
            }
        }
    }

    /// Read and decode the JSON value under `key`. Malformed data is absent.
    #[must_use]
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding malformed stored value");
                None
            }
        }
    }

    /// Overwrite the raw text under `key`. Returns whether it was persisted.
    pub fn write_raw(&self, key: &str, value: &str) -> bool {
        match self.backend.set(key, value) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "store write failed");
                false
            }
        }
    }

    /// Encode `value` as JSON and store it under `key`.
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(json) => self.write_raw(key, &json),
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to encode value for store");
                false
            }
        }
    }

    /// Remove `key`. Missing keys and backend failures are ignored.
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.delete(key) {
            tracing::warn!(key, error = %e, "store remove failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let store = DurableStore::in_memory();

        assert!(store.write("answer", &42));
        assert_eq!(store.read::<i32>("answer"), Some(42));
        assert!(!store.is_persistent());
    }

    #[test]
    fn test_read_absent() {
        let store = DurableStore::in_memory();
        assert_eq!(store.read::<i32>("missing"), None);
        assert_eq!(store.read_raw("missing"), None);
    }

    #[test]
    fn test_malformed_value_reads_as_absent() {
        let store = DurableStore::in_memory();
        store.write_raw("broken", "{not json");

        assert_eq!(store.read::<Vec<String>>("broken"), None);
        assert_eq!(store.read_raw("broken").as_deref(), Some("{not json"));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = DurableStore::in_memory();
        store.write("key", "value");

        store.remove("key");
        store.remove("key");

        assert_eq!(store.read::<String>("key"), None);
    }

    #[test]
    fn test_backend_errors_degrade() {
        let mut backend = MockStoreBackend::new();
        backend
            .expect_get()
            .returning(|_| Err(FieldSyncError::Database("disk gone".to_string())));
        backend
            .expect_set()
            .returning(|_, _| Err(FieldSyncError::Database("quota exceeded".to_string())));
        backend
            .expect_delete()
            .returning(|_| Err(FieldSyncError::Database("disk gone".to_string())));

        let store = DurableStore::new(backend, true);

        assert_eq!(store.read::<i32>("any"), None);
        assert!(!store.write("any", &1));
        store.remove("any");
    }

    #[test]
    fn test_sqlite_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_root(temp_dir.path().to_path_buf());

        {
            let store = DurableStore::open(&paths);
            assert!(store.is_persistent());
            assert!(store.write("greeting", "hello"));
            assert!(store.write("greeting", "hello again"));
        }

        let store = DurableStore::open(&paths);
        assert_eq!(store.read::<String>("greeting").as_deref(), Some("hello again"));
    }

    #[test]
    fn test_open_degrades_to_memory() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the data directory should be
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let paths = Paths::with_root(blocker.join("data"));

        let store = DurableStore::open(&paths);

        assert!(!store.is_persistent());
        assert!(store.write("still", &"works"));
        assert_eq!(store.read::<String>("still").as_deref(), Some("works"));
    }

    #[test]
    fn test_memory_backend_clones_share_entries() {
        let backend = MemoryBackend::new();
        let first = DurableStore::new(backend.clone(), false);
        let second = DurableStore::new(backend, false);

        first.write("shared", &true);
        assert_eq!(second.read::<bool>("shared"), Some(true));
    }
}

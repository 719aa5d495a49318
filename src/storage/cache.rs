//! Locally cached reference data (project lists, unit details) kept in the
//! durable store so views can render while offline.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::DurableStore;

const CACHE_PREFIX: &str = "cached_data";

/// A value mirrored into the durable store under `cached_data_<key>`.
pub struct CachedData<T> {
    store: Arc<DurableStore>,
    storage_key: String,
    initial: T,
    value: T,
}

impl<T> CachedData<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Load the cached value, or `initial` when nothing usable is stored.
    pub fn load(store: Arc<DurableStore>, key: &str, initial: T) -> Self {
        let storage_key = format!("{CACHE_PREFIX}_{key}");
        let value = store
            .read(&storage_key)
            .unwrap_or_else(|| initial.clone());

        Self {
            store,
            storage_key,
            initial,
            value,
        }
    }

    /// Current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value and write it through.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.store.write(&self.storage_key, &self.value);
    }

    /// Modify the value in place and write it through.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
        self.store.write(&self.storage_key, &self.value);
    }

    /// Drop the cached entry and fall back to the initial value.
    pub fn clear(&mut self) {
        self.store.remove(&self.storage_key);
        self.value = self.initial.clone();
    }
}

//! Storage layer for fieldsync.
//!
//! This module provides the durable key-value store used by:
//! - The sync queue (pending offline actions)
//! - The last successful sync timestamp
//! - Cached reference data for offline views
//!
//! It also owns the lock that keeps one process per data directory.

mod cache;
mod database;
mod lock;
mod migrations;
mod store;

pub use cache::CachedData;
pub use database::Database;
pub use lock::DataDirLock;
pub use store::{DurableStore, MemoryBackend, SqliteBackend, StoreBackend};

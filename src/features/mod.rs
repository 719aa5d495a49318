//! Feature implementations for fieldsync.
//!
//! - Sync: offline action queue, connectivity monitor and sync engine

pub mod sync;

//! fieldsync - offline action queue and sync engine for field operations
//!
//! Field actions recorded without connectivity are persisted in a durable
//! key-value store and replayed in order against a remote target once the
//! network comes back.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod features;
pub mod output;
pub mod storage;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::FieldSyncError;

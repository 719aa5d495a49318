//! Error types for fieldsync.

use thiserror::Error;

/// Errors raised inside fieldsync.
///
/// Producer-facing queue operations never surface these; they are logged and
/// degraded at the storage seam. They appear on configuration, CLI input and
/// remote submission paths.
#[derive(Debug, Error)]
pub enum FieldSyncError {
    /// Database open, query or migration failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration could not be read, parsed or written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The remote target rejected or could not receive an item.
    #[error("Submission failed: {0}")]
    Submission(String),

    /// A queue item or other resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User input that cannot be interpreted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<rusqlite::Error> for FieldSyncError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

//! Path resolution for fieldsync configuration and data files.
//!
//! All fieldsync data is stored in `~/.fieldsync/` unless `FIELDSYNC_HOME`
//! or `--data-dir` points elsewhere:
//! - `config.yaml` - Main configuration file
//! - `fieldsync.db` - SQLite key-value store holding the sync queue
//! - `fieldsync.lock` - Held by the running invocation

use std::path::PathBuf;

use crate::error::FieldSyncError;

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "FIELDSYNC_HOME";

/// Paths to fieldsync configuration and data files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.fieldsync/`
    pub root: PathBuf,
    /// Config file: `~/.fieldsync/config.yaml`
    pub config_file: PathBuf,
    /// Database file: `~/.fieldsync/fieldsync.db`
    pub database: PathBuf,
    /// Lock file: `~/.fieldsync/fieldsync.lock`
    pub lock_file: PathBuf,
}

impl Paths {
    /// Resolve paths from `FIELDSYNC_HOME`, falling back to `~/.fieldsync`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither variable is set.
    pub fn new() -> Result<Self, FieldSyncError> {
        if let Ok(root) = std::env::var(HOME_ENV) {
            return Ok(Self::with_root(PathBuf::from(root)));
        }

        let home = std::env::var("HOME").map_err(|_| {
            FieldSyncError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".fieldsync")))
    }

    /// Create paths with a custom root directory.
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            database: root.join("fieldsync.db"),
            lock_file: root.join("fieldsync.lock"),
            root,
        }
    }

    /// Ensure the root directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), FieldSyncError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                FieldSyncError::Config(format!(
                    "Failed to create directory {}: {e}",
                    self.root.display()
                ))
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_with_root() {
        let root = PathBuf::from("/tmp/test-fieldsync");
        let paths = Paths::with_root(root.clone());

        assert_eq!(paths.root, root);
        assert_eq!(paths.config_file, root.join("config.yaml"));
        assert_eq!(paths.database, root.join("fieldsync.db"));
        assert_eq!(paths.lock_file, root.join("fieldsync.lock"));
    }

    #[test]
    fn test_ensure_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_root(temp_dir.path().join("nested").join("data"));

        paths.ensure_dirs().unwrap();

        assert!(paths.root.exists());
    }
}

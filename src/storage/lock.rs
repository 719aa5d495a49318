//! Exclusive lock on the data directory.
//!
//! The sync queue keeps its whole snapshot under one key, so only one
//! process may own a data directory at a time. The lock is released when
//! the [`DataDirLock`] is dropped.

use std::fs::{File, OpenOptions};

use fs2::FileExt;

use crate::config::Paths;
use crate::error::FieldSyncError;

/// Held for as long as this process owns the data directory.
#[derive(Debug)]
pub struct DataDirLock {
    _file: File,
}

impl DataDirLock {
    /// Take the lock if no other process holds it.
    ///
    /// Returns `Ok(None)` when another process owns the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock file cannot be created.
    pub fn try_acquire(paths: &Paths) -> Result<Option<Self>, FieldSyncError> {
        let file = open_lock_file(paths)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { _file: file })),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Block until the lock is free, then take it.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock file cannot be created or locked.
    pub fn acquire(paths: &Paths) -> Result<Self, FieldSyncError> {
        let file = open_lock_file(paths)?;
        file.lock_exclusive()?;
        Ok(Self { _file: file })
    }
}

fn open_lock_file(paths: &Paths) -> Result<File, FieldSyncError> {
    paths.ensure_dirs()?;
    Ok(OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(&paths.lock_file)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_owner_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_root(temp_dir.path().to_path_buf());

        let held = DataDirLock::try_acquire(&paths).unwrap();
        assert!(held.is_some());
        assert!(DataDirLock::try_acquire(&paths).unwrap().is_none());

        drop(held);
        assert!(DataDirLock::try_acquire(&paths).unwrap().is_some());
    }

    #[test]
    fn test_acquire_waits_for_release() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_root(temp_dir.path().join("data"));

        let held = DataDirLock::acquire(&paths).unwrap();
        let waiter_paths = paths.clone();
        let waiter = std::thread::spawn(move || DataDirLock::acquire(&waiter_paths).is_ok());

        std::thread::sleep(std::time::Duration::from_millis(100));
        assert!(!waiter.is_finished());

        drop(held);
        assert!(waiter.join().unwrap());
    }
}

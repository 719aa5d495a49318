//! `SQLite` database connection.
//!
//! The database is stored at `~/.fieldsync/fieldsync.db` and holds the
//! `kv_store` table behind [`super::SqliteBackend`].

use rusqlite::Connection;

use crate::error::FieldSyncError;

use super::migrations;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at a specific path.
    ///
    /// Creates the database file and runs migrations if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_at(path: &std::path::Path) -> Result<Self, FieldSyncError> {
        let conn = Connection::open(path).map_err(|e| {
            FieldSyncError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;

        let db = Self { conn };
        db.migrate()?;

        Ok(db)
    }

    fn migrate(&self) -> Result<(), FieldSyncError> {
        migrations::run(&self.conn)
    }

    /// Get a reference to the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(db: &Database) -> i32 {
        migrations::get_version(db.connection()).unwrap()
    }

    #[test]
    fn test_open_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let db = Database::open_at(&db_path).unwrap();
        assert!(version(&db) > 0);
        assert!(db_path.exists());
    }

    #[test]
    fn test_reopen_database() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        {
            let db = Database::open_at(&db_path).unwrap();
            db.connection()
                .execute(
                    "INSERT INTO kv_store (key, value, updated_at) VALUES ('k', 'v', 'now')",
                    [],
                )
                .unwrap();
        }

        // Reopen - migrations must not run again
        let db = Database::open_at(&db_path).unwrap();
        assert!(version(&db) > 0);
        let value: String = db
            .connection()
            .query_row("SELECT value FROM kv_store WHERE key = 'k'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(value, "v");
    }

    #[test]
    fn test_open_in_missing_directory_fails() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("missing").join("test.db");

        assert!(Database::open_at(&db_path).is_err());
    }
}

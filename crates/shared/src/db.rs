//! SQLite storage for the personal lists.
//!
//! The schema is versioned through `PRAGMA user_version`; opening a database
//! older than [`SCHEMA_VERSION`] (including a brand new file) applies
//! `schema.sql`, which is idempotent.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

/// Version written by `schema.sql`
pub const SCHEMA_VERSION: i32 = 1;

/// Database connection wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path, creating parent directories
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        debug!(path = %path.display(), "Opening database");

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;

        Self::with_connection(conn)
    }

    /// Throwaway database, used by tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let db = Self { conn };

        let version = db.version()?;
        if version < SCHEMA_VERSION || !db.table_exists("list_entries")? {
            info!(from = version, to = SCHEMA_VERSION, "Applying list schema");
            db.conn
                .execute_batch(include_str!("../schema.sql"))
                .context("Failed to create database schema")?;
        }

        Ok(db)
    }

    /// Get a reference to the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Check if a table exists
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Schema version from the `user_version` pragma
    pub fn version(&self) -> Result<i32> {
        let version = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .context("Failed to read schema version")?;
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_database_in_missing_directory() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("nested").join("lists.db");

        let db = Database::open(&db_path)?;
        assert!(db_path.exists());
        assert!(db.table_exists("list_entries")?);
        assert_eq!(db.version()?, SCHEMA_VERSION);

        Ok(())
    }

    #[test]
    fn test_reopen_keeps_rows() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("lists.db");

        Database::open(&db_path)?.conn().execute(
            "INSERT INTO list_entries (anime_id, title, status, updated_at)
             VALUES (1, 'A', 'watching', '2024-01-01T00:00:00Z')",
            [],
        )?;

        let db = Database::open(&db_path)?;
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM list_entries", [], |row| row.get(0))?;
        assert_eq!(count, 1);

        Ok(())
    }

    #[test]
    fn test_reopen_migrates_unversioned_database() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("old.db");

        // Database written before the list table existed
        Connection::open(&db_path)?.execute_batch("CREATE TABLE legacy (id INTEGER);")?;

        let db = Database::open(&db_path)?;
        assert!(db.table_exists("list_entries")?);
        assert!(db.table_exists("legacy")?);
        assert_eq!(db.version()?, SCHEMA_VERSION);

        Ok(())
    }

    #[test]
    fn test_in_memory() -> Result<()> {
        let db = Database::open_in_memory()?;
        assert!(db.table_exists("list_entries")?);
        Ok(())
    }
}

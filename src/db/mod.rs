pub mod models;
pub mod queries;

use crate::library::{LibraryError, Result};
use rusqlite::Connection;
use std::path::Path;

/// SQLite-backed media library.
pub struct Database {
    pub conn: Connection,
}

impl Database {
    /// Open (creating if needed) the library at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open a library that must already exist. A missing file means there is
    /// no library to reconcile against, which is fatal for `sync`.
    pub fn open_existing(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(LibraryError::Unavailable(path.to_path_buf()));
        }
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        log::debug!("Opened library at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        self.conn.pragma_update(None, "journal_mode", "WAL")?;
        self.conn.pragma_update(None, "synchronous", "NORMAL")?;
        self.migrate()?;
        Ok(())
    }

    fn migrate(&self) -> Result<()> {
        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap_or(0);

        if version > SCHEMA_VERSION {
            return Err(LibraryError::Migration(format!(
                "library schema v{version} is newer than this build (v{SCHEMA_VERSION})"
            )));
        }
        if version < 1 {
            self.migrate_v1()?;
        }
        if version < 2 {
            self.migrate_v2()?;
        }

        self.conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        Ok(())
    }

    /// V1: tracks table
    fn migrate_v1(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS tracks (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                kind        TEXT NOT NULL DEFAULT 'file',
                -- NULL or '' when the backing file is unknown
                location    TEXT,
                added_at    TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_tracks_kind ON tracks(kind);
            ",
        )?;
        Ok(())
    }

    /// V2: library-level key/value settings (display name)
    fn migrate_v2(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS library_info (
                key     TEXT PRIMARY KEY,
                value   TEXT NOT NULL
            );

            INSERT OR IGNORE INTO library_info (key, value) VALUES ('name', 'Library');
            ",
        )?;
        Ok(())
    }
}

const SCHEMA_VERSION: i32 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_set_user_version() {
        let db = Database::open_in_memory().unwrap();
        let version: i32 = db
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_open_existing_requires_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.db");
        let err = Database::open_existing(&path).err().unwrap();
        assert!(matches!(err, LibraryError::Unavailable(p) if p == path));
        assert!(!path.exists());
    }

    #[test]
    fn test_open_then_reopen_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("library.db");
        drop(Database::open(&path).unwrap());
        assert!(Database::open_existing(&path).is_ok());
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1).unwrap();
        assert!(matches!(db.migrate(), Err(LibraryError::Migration(_))));
    }
}

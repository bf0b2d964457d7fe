use super::models::{track_from_row, LibraryStats};
use super::Database;
use crate::library::{LibraryError, MediaLibrary, Result, Track, TrackKind};
use rusqlite::{params, OptionalExtension};
use std::path::Path;

const TRACK_COLUMNS: &str = "id, name, kind, location";

impl Database {
    /// Insert a track. Returns the new track id.
    pub fn insert_track(&self, name: &str, kind: TrackKind, location: Option<&Path>) -> Result<i64> {
        let location = location.map(|p| p.to_string_lossy().to_string());
        self.conn.execute(
            "INSERT INTO tracks (name, kind, location) VALUES (?1, ?2, ?3)",
            params![name, kind.as_str(), location],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_track(&self, id: i64) -> Result<Track> {
        self.conn
            .query_row(
                &format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE id = ?1"),
                params![id],
                track_from_row,
            )
            .optional()?
            .ok_or(LibraryError::TrackNotFound(id))
    }

    pub fn get_all_tracks(&self) -> Result<Vec<Track>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TRACK_COLUMNS} FROM tracks ORDER BY id"))?;

        let tracks = stmt
            .query_map([], track_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tracks)
    }

    /// File tracks with no backing path.
    pub fn get_unresolved_tracks(&self) -> Result<Vec<Track>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks
             WHERE kind = 'file' AND (location IS NULL OR location = '')
             ORDER BY id"
        ))?;

        let tracks = stmt
            .query_map([], track_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tracks)
    }

    pub fn delete_track_by_id(&self, id: i64) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM tracks WHERE id = ?1", params![id])?;
        if n == 0 {
            return Err(LibraryError::TrackNotFound(id));
        }
        Ok(())
    }

    pub fn library_name(&self) -> Result<String> {
        let name: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM library_info WHERE key = 'name'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name.unwrap_or_else(|| "Library".to_string()))
    }

    pub fn set_library_name(&self, name: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO library_info (key, value) VALUES ('name', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![name],
        )?;
        Ok(())
    }

    /// Get library statistics.
    pub fn stats(&self) -> Result<LibraryStats> {
        let total_tracks: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tracks", [], |row| row.get(0))?;

        let file_tracks: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tracks WHERE kind = 'file'",
            [],
            |row| row.get(0),
        )?;

        let unresolved_tracks: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tracks
             WHERE kind = 'file' AND (location IS NULL OR location = '')",
            [],
            |row| row.get(0),
        )?;

        let mut kind_stmt = self
            .conn
            .prepare("SELECT kind, COUNT(*) FROM tracks GROUP BY kind ORDER BY COUNT(*) DESC")?;
        let kinds: Vec<(String, i64)> = kind_stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(LibraryStats {
            total_tracks,
            file_tracks,
            unresolved_tracks,
            kinds,
        })
    }
}

impl MediaLibrary for Database {
    fn version(&self) -> Result<String> {
        Ok(format!(
            "{} {} (SQLite {})",
            crate::APP_NAME,
            env!("CARGO_PKG_VERSION"),
            rusqlite::version()
        ))
    }

    fn name(&self) -> Result<String> {
        self.library_name()
    }

    fn tracks(&self) -> Result<Vec<Track>> {
        self.get_all_tracks()
    }

    fn add_file(&mut self, path: &Path) -> Result<Track> {
        let name = crate::scanner::metadata::track_name(path);
        let id = self.insert_track(&name, TrackKind::File, Some(path))?;
        log::debug!("Inserted track {id} for {}", path.display());
        self.get_track(id)
    }

    fn delete_track(&mut self, track: &Track) -> Result<()> {
        self.delete_track_by_id(track.id)
    }
}

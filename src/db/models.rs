use crate::library::{Track, TrackKind};
use std::path::PathBuf;

/// Map a `tracks` row (id, name, kind, location) to a `Track`.
pub(crate) fn track_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Track> {
    let kind: String = row.get(2)?;
    let location: Option<String> = row.get(3)?;
    Ok(Track {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: TrackKind::from_db(&kind),
        location: location.map(PathBuf::from),
    })
}

/// Library statistics.
pub struct LibraryStats {
    pub total_tracks: i64,
    pub file_tracks: i64,
    pub unresolved_tracks: i64,
    pub kinds: Vec<(String, i64)>,
}

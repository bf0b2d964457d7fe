pub mod track;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use track::{Track, TrackKind};

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("No library found at {} (run `libsync init` first)", .0.display())]
    Unavailable(PathBuf),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration failed: {0}")]
    Migration(String),
    #[error("Track {0} not found in library")]
    TrackNotFound(i64),
}

pub type Result<T> = std::result::Result<T, LibraryError>;

/// The operations the reconciler needs from a media library.
///
/// Reads (`version`, `name`, `tracks`) never change the library. `add_file`
/// and `delete_track` are the only mutations, and the reconciler only calls
/// them after the read-only diff is complete.
pub trait MediaLibrary {
    /// Human-readable version string of the library backend.
    fn version(&self) -> Result<String>;

    /// Display name of the library (e.g. "Library").
    fn name(&self) -> Result<String>;

    /// Every track the library knows about, regardless of kind.
    fn tracks(&self) -> Result<Vec<Track>>;

    /// Add a file on disk as a new track and return it.
    fn add_file(&mut self, path: &Path) -> Result<Track>;

    /// Remove a track entry. The file on disk (if any) is left alone.
    fn delete_track(&mut self, track: &Track) -> Result<()>;
}

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// What backs a library entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    File,
    Cd,
    Url,
    Device,
    SharedLibrary,
    Unknown,
}

impl TrackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Cd => "cd",
            Self::Url => "url",
            Self::Device => "device",
            Self::SharedLibrary => "shared_library",
            Self::Unknown => "unknown",
        }
    }

    /// Parse the stored column value. Anything unrecognized is `Unknown`.
    pub fn from_db(s: &str) -> Self {
        match s {
            "file" => Self::File,
            "cd" => Self::Cd,
            "url" => Self::Url,
            "device" => Self::Device,
            "shared_library" => Self::SharedLibrary,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A library entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    pub id: i64,
    pub name: String,
    pub kind: TrackKind,
    /// Backing file. `None` and an empty path both mean the link is broken.
    pub location: Option<PathBuf>,
}

impl Track {
    /// The backing file path, if set and non-empty.
    pub fn resolved_location(&self) -> Option<&Path> {
        self.location
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    pub fn is_file(&self) -> bool {
        self.kind == TrackKind::File
    }

    /// A file track whose location is unknown.
    pub fn is_unresolved(&self) -> bool {
        self.is_file() && self.resolved_location().is_none()
    }
}

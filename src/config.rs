use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::shorten::PLATFORM_MAX_PATH;

/// Application configuration loaded from TOML config file.
/// Every field has a default, so the file is optional.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Root of the audio files to reconcile against (used when `sync` has no --music-dir).
    pub music_dir: Option<PathBuf>,
    /// Custom library database path (overrides XDG default).
    pub library_path: Option<PathBuf>,
    /// Remove library entries whose backing file is unknown.
    pub delete_unresolved_tracks: bool,
    /// Compute and report the diff but never touch the library.
    pub no_updates: bool,
    /// File extensions to pick up. Empty = `DEFAULT_EXTENSIONS`.
    pub extensions: Vec<String>,
    /// Number of parallel workers. 0 = rayon default.
    pub workers: usize,
    /// Paths longer than this are shortened before being added. 0 = platform limit.
    pub max_path_len: usize,
}

impl AppConfig {
    /// Load config from `~/.config/libsync/config.toml`.
    /// Returns default config if file doesn't exist.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => match Self::load_from(&path) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("{:#}. Using defaults.", e);
                    Self::default()
                }
            },
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Load config from an explicit path. Unlike `load`, a missing or
    /// malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Extensions to scan for, falling back to the built-in list.
    pub fn resolve_extensions(&self) -> Vec<String> {
        if self.extensions.is_empty() {
            crate::DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
        } else {
            self.extensions.clone()
        }
    }

    /// Resolve path limit: 0 → platform limit.
    pub fn resolve_max_path_len(&self) -> usize {
        if self.max_path_len > 0 {
            self.max_path_len
        } else {
            PLATFORM_MAX_PATH
        }
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Resolve the default library path using XDG data directory.
pub fn default_library_path() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("", "", crate::APP_NAME) {
        dirs.data_dir().join("library.db")
    } else {
        // Fallback: current directory
        PathBuf::from("library.db")
    }
}

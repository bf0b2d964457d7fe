pub mod config;
pub mod db;
pub mod library;
pub mod prompt;
pub mod reconcile;
pub mod scanner;
pub mod shorten;

/// Extensions matched when the config doesn't list any.
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp3"];

/// Application name for XDG paths
pub const APP_NAME: &str = "libsync";

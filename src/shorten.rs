use std::io;
use std::path::{Path, PathBuf};

/// Longest path the platform accepts for a file.
#[cfg(unix)]
pub const PLATFORM_MAX_PATH: usize = libc::PATH_MAX as usize;
#[cfg(windows)]
pub const PLATFORM_MAX_PATH: usize = 260;
#[cfg(not(any(unix, windows)))]
pub const PLATFORM_MAX_PATH: usize = 4096;

/// Produces a shorter path that names the same file.
pub trait PathShortener {
    fn shorten(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Resolves `.`/`..` segments and symlinks via `fs::canonicalize` and keeps
/// whichever of the two spellings is shorter.
#[derive(Debug, Default, Clone, Copy)]
pub struct CanonicalShortener;

impl PathShortener for CanonicalShortener {
    fn shorten(&self, path: &Path) -> io::Result<PathBuf> {
        let canonical = std::fs::canonicalize(path)?;
        if canonical.as_os_str().len() < path.as_os_str().len() {
            Ok(canonical)
        } else {
            Ok(path.to_path_buf())
        }
    }
}

/// The path to hand to the library: `path` itself when it fits in `limit`
/// bytes, otherwise the shortener's result.
pub fn fit_path(shortener: &dyn PathShortener, path: &Path, limit: usize) -> io::Result<PathBuf> {
    if path.as_os_str().len() <= limit {
        return Ok(path.to_path_buf());
    }
    let short = shortener.shorten(path)?;
    log::debug!("Shortened {} -> {}", path.display(), short.display());
    if short.as_os_str().len() > limit {
        log::warn!(
            "{} is still {} bytes after shortening (limit {})",
            short.display(),
            short.as_os_str().len(),
            limit
        );
    }
    Ok(short)
}

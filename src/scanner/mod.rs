pub mod metadata;

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Music directory not found: {}", .0.display())]
    MusicDirMissing(PathBuf),
    #[error("Music directory is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// Check that the music root exists and is a directory.
pub fn ensure_music_dir(root: &Path) -> Result<(), ScanError> {
    if !root.exists() {
        return Err(ScanError::MusicDirMissing(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Recursively collect files under `root` whose extension is in `extensions`.
///
/// Symlinks are followed. Unreadable entries are logged and skipped. The
/// result is sorted by path so runs are deterministic.
pub fn discover_files(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, ScanError> {
    ensure_music_dir(root)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {pos} audio files found ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if has_extension(entry.path(), extensions) {
            files.push(entry.into_path());
            pb.inc(1);
        }
    }

    pb.finish_and_clear();
    files.sort();
    log::info!("Discovered {} audio files under {}", files.len(), root.display());
    Ok(files)
}

/// Case-insensitive extension match. Entries in `extensions` may carry a
/// leading dot.
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(e) => e.to_lowercase(),
        None => return false,
    };
    extensions
        .iter()
        .any(|want| want.trim_start_matches('.').to_lowercase() == ext)
}

/// Comparison key for a path: the lossy string form, lower-cased.
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_has_extension() {
        let mp3 = exts(&["mp3"]);
        assert!(has_extension(Path::new("/music/a.mp3"), &mp3));
        assert!(has_extension(Path::new("/music/B.MP3"), &mp3));
        assert!(!has_extension(Path::new("/music/c.flac"), &mp3));
        assert!(!has_extension(Path::new("/music/mp3"), &mp3));
        assert!(has_extension(Path::new("/music/c.flac"), &exts(&[".FLAC", "mp3"])));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/Music/Grateful Dead/Song.MP3")),
            "/music/grateful dead/song.mp3"
        );
        assert_eq!(
            normalize_path(Path::new("/Music/Song.mp3")),
            normalize_path(Path::new("/music/song.mp3"))
        );
    }

    #[test]
    fn test_discover_files_recurses_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("gd77/disc1")).unwrap();
        fs::write(root.join("top.mp3"), b"").unwrap();
        fs::write(root.join("gd77/disc1/d1t01.MP3"), b"").unwrap();
        fs::write(root.join("gd77/disc1/d1t01.flac"), b"").unwrap();
        fs::write(root.join("gd77/cover.jpg"), b"").unwrap();

        let files = discover_files(root, &exts(&["mp3"])).unwrap();
        assert_eq!(
            files,
            vec![root.join("gd77/disc1/d1t01.MP3"), root.join("top.mp3")]
        );
    }

    #[test]
    fn test_discover_files_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            discover_files(&missing, &exts(&["mp3"])),
            Err(ScanError::MusicDirMissing(p)) if p == missing
        ));
    }

    #[test]
    fn test_discover_files_root_is_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.mp3");
        fs::write(&file, b"").unwrap();
        assert!(matches!(
            discover_files(&file, &exts(&["mp3"])),
            Err(ScanError::NotADirectory(_))
        ));
    }
}

use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use std::path::Path;

/// Display name for a file being added to the library: the title tag if the
/// file has one, otherwise the file stem.
pub fn track_name(path: &Path) -> String {
    read_title(path)
        .or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().to_string())
        })
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Read the title tag. Returns `None` on any failure (unreadable file, no tags).
fn read_title(path: &Path) -> Option<String> {
    let tagged_file = match lofty::read_from_path(path) {
        Ok(f) => f,
        Err(e) => {
            log::debug!("Could not read tags from {}: {}", path.display(), e);
            return None;
        }
    };

    // Try primary tag, then fall back
    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())?;

    tag.title()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

//! Library ↔ disk reconciliation.
//!
//! A run has two phases. [`Reconciler::plan`] reads the library and the music
//! directory and computes the diff without changing anything; the two reads
//! run in parallel. [`Reconciler::apply`] then walks the plan on the calling
//! thread, adding new files and (optionally) deleting unresolved tracks.
//!
//! There is no transaction across the mutation phase. If an add or delete
//! fails midway the earlier changes stay in the library; re-running picks up
//! where it left off because already-added files are no longer new.

use std::collections::HashSet;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;

use crate::library::{LibraryError, MediaLibrary, Track};
use crate::prompt;
use crate::scanner::{self, ScanError};
use crate::shorten::{self, PathShortener};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Settings for one reconciliation run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub music_dir: PathBuf,
    pub extensions: Vec<String>,
    pub delete_unresolved: bool,
    /// No-updates mode: report only.
    pub dry_run: bool,
    pub max_path_len: usize,
    /// Worker threads for the read phase. 0 = rayon default.
    pub workers: usize,
    /// Skip the confirmation prompt.
    pub assume_yes: bool,
}

impl SyncOptions {
    pub fn deletes_enabled(&self) -> bool {
        self.delete_unresolved && !self.dry_run
    }
}

/// The diff between library and disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncPlan {
    /// Discovered files with no matching resolved track, in discovery order.
    pub new_files: Vec<PathBuf>,
    /// File tracks with no backing path.
    pub unresolved: Vec<Track>,
    pub library_tracks: usize,
    pub file_tracks: usize,
    pub discovered: usize,
}

impl SyncPlan {
    /// Sequential diff of a track list against discovered paths.
    pub fn build(tracks: &[Track], discovered: Vec<PathBuf>) -> Self {
        let resolved = resolved_keys(tracks);
        Self::from_parts(tracks, &resolved, discovered)
    }

    fn from_parts(tracks: &[Track], resolved: &HashSet<String>, discovered: Vec<PathBuf>) -> Self {
        let discovered_count = discovered.len();
        Self {
            new_files: new_files(discovered, resolved),
            unresolved: tracks.iter().filter(|t| t.is_unresolved()).cloned().collect(),
            library_tracks: tracks.len(),
            file_tracks: tracks.iter().filter(|t| t.is_file()).count(),
            discovered: discovered_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.new_files.is_empty() && self.unresolved.is_empty()
    }
}

/// Normalized locations of every resolved file track.
pub fn resolved_keys(tracks: &[Track]) -> HashSet<String> {
    tracks
        .par_iter()
        .filter(|t| t.is_file())
        .filter_map(|t| t.resolved_location())
        .map(scanner::normalize_path)
        .collect()
}

/// `discovered − resolved` by normalized path. Paths that normalize to the
/// same key collapse to the first one seen.
pub fn new_files(discovered: Vec<PathBuf>, resolved: &HashSet<String>) -> Vec<PathBuf> {
    let keys: Vec<String> = discovered
        .par_iter()
        .map(|p| scanner::normalize_path(p))
        .collect();

    let mut seen = HashSet::new();
    discovered
        .into_iter()
        .zip(keys)
        .filter(|(_, key)| !resolved.contains(key) && seen.insert(key.clone()))
        .map(|(path, _)| path)
        .collect()
}

/// What happened during `apply`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SyncReport {
    /// Files reported as added (in dry-run mode: would be added).
    pub added: Vec<PathBuf>,
    /// New files that disappeared between planning and applying.
    pub skipped_missing: usize,
    /// Names of unresolved tracks that were reported.
    pub unresolved: Vec<String>,
    /// Unresolved tracks actually removed from the library.
    pub deleted: usize,
}

impl SyncReport {
    /// Whether applying the same run for real would touch the library.
    pub fn has_changes(&self, delete_unresolved: bool) -> bool {
        !self.added.is_empty() || (delete_unresolved && !self.unresolved.is_empty())
    }
}

#[derive(Debug, PartialEq)]
pub enum SyncOutcome {
    Completed(SyncReport),
    /// The user declined the confirmation prompt. Nothing was changed.
    Aborted,
}

pub struct Reconciler<'a, L: MediaLibrary> {
    library: &'a mut L,
    shortener: Box<dyn PathShortener + 'a>,
    options: SyncOptions,
}

impl<'a, L: MediaLibrary> Reconciler<'a, L> {
    pub fn new(library: &'a mut L, shortener: impl PathShortener + 'a, options: SyncOptions) -> Self {
        Self {
            library,
            shortener: Box::new(shortener),
            options,
        }
    }

    /// Read the library and the music directory and compute the diff.
    pub fn plan(&self) -> Result<SyncPlan, SyncError> {
        let tracks = self.library.tracks()?;
        log::debug!("Library has {} tracks", tracks.len());

        // Stored locations must not depend on the working directory.
        let music_dir = std::path::absolute(&self.options.music_dir)?;
        scanner::ensure_music_dir(&music_dir)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.workers)
            .build()?;

        let extensions = &self.options.extensions;
        let (resolved, discovered) = pool.install(|| {
            rayon::join(
                || resolved_keys(&tracks),
                || scanner::discover_files(&music_dir, extensions),
            )
        });
        let discovered = discovered?;
        log::debug!(
            "{} resolved locations, {} files on disk",
            resolved.len(),
            discovered.len()
        );

        let mut plan = pool.install(|| SyncPlan::from_parts(&tracks, &resolved, discovered));
        plan.new_files
            .retain(|file| !self.stored_under_short_path(file, &resolved));
        Ok(plan)
    }

    /// A file over the path limit was added under its shortened spelling, so
    /// it is only new if that spelling is unknown as well.
    fn stored_under_short_path(&self, file: &Path, resolved: &HashSet<String>) -> bool {
        if file.as_os_str().len() <= self.options.max_path_len {
            return false;
        }
        match self.shortener.shorten(file) {
            Ok(short) => resolved.contains(&scanner::normalize_path(&short)),
            Err(e) => {
                log::debug!("Could not shorten {}: {}", file.display(), e);
                false
            }
        }
    }

    /// Carry out a plan: add new files, report and optionally delete
    /// unresolved tracks. Writes one line per file/track to `out`.
    pub fn apply<W: Write>(&mut self, plan: &SyncPlan, out: &mut W) -> Result<SyncReport, SyncError> {
        let dry_run = self.options.dry_run;
        let mut report = SyncReport::default();

        if dry_run {
            writeln!(out, "**** No-updates mode: no changes will be written to the library ****")?;
        }

        for file in &plan.new_files {
            if !file.exists() {
                log::warn!("Skipping {}: no longer on disk", file.display());
                report.skipped_missing += 1;
                continue;
            }
            if !dry_run {
                let path = shorten::fit_path(&*self.shortener, file, self.options.max_path_len)?;
                let track = self.library.add_file(&path)?;
                log::debug!("Added track {} ({})", track.id, track.name);
            }
            writeln!(out, "Adding {}", file.display())?;
            report.added.push(file.clone());
        }

        let delete = self.options.deletes_enabled();
        for track in &plan.unresolved {
            writeln!(out, "Unresolved {}", track.name)?;
            if delete {
                self.library.delete_track(track)?;
                report.deleted += 1;
            }
            report.unresolved.push(track.name.clone());
        }

        Ok(report)
    }

    /// Full run: header, plan, confirmation, apply.
    pub fn run<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> Result<SyncOutcome, SyncError> {
        writeln!(out, "Library version: {}", self.library.version()?)?;
        writeln!(out, "Music directory: {}", self.options.music_dir.display())?;
        writeln!(out, "Delete unresolved tracks: {}", self.options.delete_unresolved)?;
        writeln!(out, "No updates: {}", self.options.dry_run)?;

        let plan = self.plan()?;
        writeln!(
            out,
            "{}: {} tracks ({} files), {} audio files on disk",
            self.library.name()?,
            plan.library_tracks,
            plan.file_tracks,
            plan.discovered
        )?;
        writeln!(
            out,
            "{} new files, {} unresolved tracks",
            plan.new_files.len(),
            plan.unresolved.len()
        )?;

        if !self.options.assume_yes && !prompt::confirm(input, out, "Proceed with sync?")? {
            writeln!(out, "Sync aborted")?;
            return Ok(SyncOutcome::Aborted);
        }

        let report = self.apply(&plan, out)?;
        Ok(SyncOutcome::Completed(report))
    }
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use libsync::config::AppConfig;
use libsync::db::Database;
use libsync::library::{MediaLibrary, Track};
use libsync::reconcile::{Reconciler, SyncOptions, SyncOutcome};
use libsync::shorten::CanonicalShortener;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "libsync", version, about = "Reconcile a music library against the audio files on disk")]
struct Cli {
    /// Config file (defaults to ~/.config/libsync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the library database
    #[arg(long, global = true)]
    library: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add new files from the music directory and report tracks with missing files
    Sync {
        /// Music directory (defaults to config file music_dir)
        #[arg(long)]
        music_dir: Option<PathBuf>,

        /// Report what would change without touching the library
        #[arg(long)]
        dry_run: bool,

        /// Delete tracks whose file is unknown
        #[arg(long)]
        delete_unresolved: bool,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Create an empty library
    Init {
        /// Display name of the library
        #[arg(long)]
        name: Option<String>,
    },

    /// List library tracks
    Tracks {
        /// Only file tracks with no known location
        #[arg(long)]
        unresolved: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show library statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Explicit --config must load; the XDG file is optional
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    // Resolve library path: CLI > config > XDG default
    let library_path = cli.library
        .or(config.library_path.clone())
        .unwrap_or_else(libsync::config::default_library_path);
    log::info!("Library: {}", library_path.display());

    match cli.command {
        Commands::Sync { music_dir, dry_run, delete_unresolved, yes } => {
            let music_dir = match music_dir.or(config.music_dir.clone()) {
                Some(dir) => dir,
                None => anyhow::bail!(
                    "No music directory. Pass --music-dir or set music_dir in config."
                ),
            };
            let music_dir = std::path::absolute(&music_dir)
                .with_context(|| format!("Invalid music directory {}", music_dir.display()))?;
            let dry_run = dry_run || config.no_updates;
            let delete_unresolved = delete_unresolved || config.delete_unresolved_tracks;
            let options = SyncOptions {
                music_dir,
                extensions: config.resolve_extensions(),
                delete_unresolved,
                dry_run,
                max_path_len: config.resolve_max_path_len(),
                workers: config.workers,
                assume_yes: yes,
            };

            println!("Library Sync");
            // The handle is released when `db` goes out of scope, on every path.
            let mut db = Database::open_existing(&library_path)
                .context("Failed to open library")?;

            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            let outcome = Reconciler::new(&mut db, CanonicalShortener, options)
                .run(&mut stdin.lock(), &mut stdout.lock())
                .context("Sync failed")?;

            match outcome {
                SyncOutcome::Aborted => {}
                SyncOutcome::Completed(report) => {
                    println!(
                        "Sync complete: {} added, {} unresolved, {} deleted, {} skipped (vanished)",
                        report.added.len(),
                        report.unresolved.len(),
                        report.deleted,
                        report.skipped_missing
                    );
                    if dry_run && report.has_changes(delete_unresolved) {
                        println!("(dry run: re-run without --dry-run to apply)");
                    }
                }
            }
        }

        Commands::Init { name } => {
            let db = Database::open(&library_path)
                .context("Failed to create library")?;
            if let Some(name) = name {
                db.set_library_name(&name).context("Failed to set library name")?;
            }
            println!(
                "Initialized library \"{}\" at {}",
                db.name()?,
                library_path.display()
            );
        }

        Commands::Tracks { unresolved, json } => {
            let db = Database::open_existing(&library_path)
                .context("Failed to open library")?;
            let tracks = if unresolved {
                db.get_unresolved_tracks()
            } else {
                db.get_all_tracks()
            }
            .context("Query failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&tracks)?);
            } else if tracks.is_empty() {
                println!("No tracks found.");
            } else {
                print_track_table(&tracks);
            }
        }

        Commands::Stats => {
            let db = Database::open_existing(&library_path)
                .context("Failed to open library")?;
            let stats = db.stats().context("Failed to get stats")?;
            println!("Library Statistics ({})", db.name()?);
            println!("==================");
            println!("Total tracks:      {}", stats.total_tracks);
            println!("File tracks:       {}", stats.file_tracks);
            println!("Unresolved tracks: {}", stats.unresolved_tracks);
            println!();

            if !stats.kinds.is_empty() {
                println!("Kinds:");
                for (kind, count) in &stats.kinds {
                    println!("  {:<16} {}", kind, count);
                }
            }
        }
    }

    Ok(())
}

/// Print a table of tracks.
fn print_track_table(tracks: &[Track]) {
    println!("{:>6}  {:<30} {:<8} {}", "Id", "Name", "Kind", "Location");
    println!("{}", "-".repeat(80));

    for t in tracks {
        // Truncate long names
        let name: String = if t.name.chars().count() > 30 {
            format!("{}...", t.name.chars().take(27).collect::<String>())
        } else {
            t.name.clone()
        };
        let location = t
            .resolved_location()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(missing)".to_string());

        println!("{:>6}  {:<30} {:<8} {}", t.id, name, t.kind, location);
    }
}

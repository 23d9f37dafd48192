use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser};

use crate::{
    collect,
    config::Config,
    progress::ConsoleProgress,
    thumbnail::{self, ThumbnailCache, THUMBNAIL_SIZE},
    worker::{self, WarmOptions, WarmReport},
};

/// Forces the system thumbnail cache to build a thumbnail for every file in
/// the given folders.
#[derive(Parser, Debug)]
#[command(name = "preload-thumbs", version)]
pub struct Cli {
    /// Folders to walk recursively
    folders: Vec<PathBuf>,

    /// Number of worker threads (capped at the number of cores)
    #[arg(long, short)]
    jobs: Option<usize>,

    /// Stop starting new files after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Follow symbolic links while walking
    #[arg(long, short = 'L')]
    follow_links: bool,

    /// TOML file with defaults for the options above
    #[arg(long, short, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    pub fn run() -> Result<(), Box<dyn Error>> {
        Cli::parse().execute()
    }

    fn execute(self) -> Result<(), Box<dyn Error>> {
        if self.folders.is_empty() {
            println!("{}", Cli::command().render_usage());
            return Ok(());
        }

        let config = Config::get(self.config.as_deref())?;
        let follow_links = self.follow_links || config.follow_links;

        let files = collect_folders(&self.folders, follow_links, &mut io::stdout())?;
        if files.is_empty() {
            return Ok(());
        }

        let cache = thumbnail::platform_cache()?;
        let options = WarmOptions {
            jobs: worker::worker_count(self.jobs.or(config.jobs), files.len()),
            size: THUMBNAIL_SIZE,
            deadline: deadline_after(self.timeout.or(config.timeout_secs)),
        };

        let progress = ConsoleProgress::new(files.len(), io::stdout());
        warm_files(&files, cache.as_ref(), &options, progress)?;
        Ok(())
    }
}

/// Collects the files under `folders`, writing one line per missing folder
/// and a notice when nothing was found.
fn collect_folders<W: Write>(
    folders: &[PathBuf],
    follow_links: bool,
    out: &mut W,
) -> io::Result<Vec<PathBuf>> {
    let collection = collect::collect(folders, follow_links);
    for folder in &collection.missing {
        writeln!(out, "Folder not found: {}", folder.display())?;
    }
    if collection.files.is_empty() {
        writeln!(out, "No files found to process.")?;
    }
    Ok(collection.files)
}

fn warm_files<W: Write>(
    files: &[PathBuf],
    cache: &dyn ThumbnailCache,
    options: &WarmOptions,
    mut progress: ConsoleProgress<W>,
) -> io::Result<WarmReport> {
    log::info!("warming {} files on {} workers", files.len(), options.jobs);

    let report = worker::warm_all(files, cache, options, |tick| {
        if let Err(e) = progress.tick(&tick) {
            log::warn!("could not report progress: {}", e);
        }
    });
    progress.finish(&report)?;
    Ok(report)
}

// A timeout too far out to represent is the same as none.
fn deadline_after(secs: Option<u64>) -> Option<Instant> {
    secs.and_then(|secs| Instant::now().checked_add(Duration::from_secs(secs)))
}

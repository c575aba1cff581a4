//! geipf CLI - command-line extractor for Granado Espada IPF archives.
//!
//! This is the main entry point for the geipf command-line application.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use geipf::prelude::*;

/// Extracts files from a Granado Espada IPF archive.
#[derive(Parser)]
#[command(name = "geipf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the .ipf archive
    archive: PathBuf,

    /// Output directory (defaults to the archive's name without its extension)
    output_dir: Option<PathBuf>,

    /// Number of parallel workers (defaults to min(8, logical cpu count))
    worker_count: Option<usize>,

    /// Emit one line per entry instead of a progress bar
    #[arg(short, long)]
    verbose: bool,
}

/// A [`ProgressSink`] that drives an `indicatif` bar, switching its
/// style when the scheduler moves from filename decoding to payload
/// extraction.
struct BarProgress {
    bar: ProgressBar,
    phase: Mutex<Option<Phase>>,
    last_total: AtomicU64,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        Self {
            bar,
            phase: Mutex::new(None),
            last_total: AtomicU64::new(0),
        }
    }
}

impl ProgressSink for BarProgress {
    fn report(&self, current: u64, total: u64, phase: Phase) {
        let mut slot = self.phase.lock().unwrap();
        if *slot != Some(phase) {
            *slot = Some(phase);
            let message = match phase {
                Phase::DecodingFilenames => "decoding filenames",
                Phase::Extracting => "extracting",
            };
            self.bar.set_message(message);
            self.bar.set_position(0);
        }
        drop(slot);

        if self.last_total.swap(total, Ordering::Relaxed) != total {
            self.bar.set_length(total);
        }
        self.bar.set_position(current);
    }
}

fn default_output_dir(archive: &std::path::Path) -> PathBuf {
    match archive.file_stem() {
        Some(stem) => PathBuf::from(stem),
        None => PathBuf::from("out"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let output_dir = cli
        .output_dir
        .unwrap_or_else(|| default_output_dir(&cli.archive));

    let progress: Option<std::sync::Arc<dyn ProgressSink>> = if cli.verbose {
        None
    } else {
        Some(std::sync::Arc::new(BarProgress::new()))
    };

    let options = ExtractOptions {
        worker_count: cli.worker_count,
        verbose: cli.verbose,
        on_progress: progress,
    };

    let report = extract(&cli.archive, &output_dir, options)
        .with_context(|| format!("failed to extract {}", cli.archive.display()))?;

    println!(
        "extracted {}/{} entries in {:.1} s",
        report.extracted_entries,
        report.total_entries,
        report.elapsed.as_secs_f64()
    );

    if report.extracted_entries < report.total_entries {
        std::process::exit(1);
    }

    Ok(())
}

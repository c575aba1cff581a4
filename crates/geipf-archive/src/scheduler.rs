//! The extraction scheduler: two parallel phases over an archive's
//! entry table, driven by a bounded worker pool.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::archive::ArchiveReader;
use crate::entry::Entry;
use crate::extractor::EntryExtractor;
use crate::filename::decode_filename;
use crate::progress::{NullProgress, Phase, ProgressSink};
use crate::sanitize::{sanitize_leaf, synthetic_name};
use crate::Result;

/// Caller-configurable knobs for [`extract`].
pub struct ExtractOptions {
    /// Worker thread count. Defaults to `min(8, logical_cpu_count)`.
    /// A value of 1 degrades to a correct sequential run with
    /// identical output.
    pub worker_count: Option<usize>,
    /// Emit one line per entry instead of rate-limited milestones.
    pub verbose: bool,
    /// Progress sink; defaults to a silent [`NullProgress`].
    pub on_progress: Option<Arc<dyn ProgressSink>>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            worker_count: None,
            verbose: false,
            on_progress: None,
        }
    }
}

/// Outcome of one call to [`extract`].
#[derive(Debug, Clone, Copy)]
pub struct Report {
    /// Number of entries in the archive's central directory.
    pub total_entries: usize,
    /// Number of entries successfully extracted.
    pub extracted_entries: usize,
    /// Number of entries that failed (isolated, not fatal).
    pub failed_entries: usize,
    /// Wall-clock time for the whole call.
    pub elapsed: Duration,
}

struct DecodedEntry {
    entry: Entry,
    safe_name: String,
}

fn logical_cpu_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn decode_name(archive: &ArchiveReader, entry: &Entry) -> Option<String> {
    let local_header = archive.read_local_header(entry).ok()?;
    decode_filename(&local_header.encrypted_filename?)
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => (&name[..pos], &name[pos + 1..]),
        _ => (name, ""),
    }
}

fn make_unique(base: &str, used: &mut HashSet<String>) -> String {
    if used.insert(base.to_string()) {
        return base.to_string();
    }

    let (stem, ext) = split_extension(base);
    let mut n = 1usize;
    loop {
        let candidate = if ext.is_empty() {
            format!("{stem}_{n}")
        } else {
            format!("{stem}_{n}.{ext}")
        };
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn extract_one(archive: &ArchiveReader, decoded: &DecodedEntry, output_dir: &Path) -> Result<()> {
    let local_header = archive.read_local_header(&decoded.entry)?;
    let raw_payload = archive.read_payload(&decoded.entry, local_header.payload_offset)?;
    let output_path = output_dir.join(&decoded.safe_name);
    EntryExtractor::extract(&decoded.entry, raw_payload, &output_path)
}

/// Extract every entry of `archive_path` into `output_dir`.
///
/// Drives the full pipeline: phase A decrypts every filename in
/// parallel and resolves collisions deterministically in original
/// index order; phase B extracts every entry's payload in parallel.
/// Per-entry failures are isolated, counted in the returned
/// [`Report`] rather than aborting the run. Archive-level failures
/// (bad EOCD, truncated central directory) propagate as an `Err`
/// before any file is written.
pub fn extract(archive_path: &Path, output_dir: &Path, options: ExtractOptions) -> Result<Report> {
    let start = Instant::now();
    std::fs::create_dir_all(output_dir)?;

    let archive = ArchiveReader::open(archive_path)?;

    let worker_count = options
        .worker_count
        .unwrap_or_else(|| logical_cpu_count().min(8))
        .max(1);
    let verbose = options.verbose;
    let progress: Arc<dyn ProgressSink> =
        options.on_progress.unwrap_or_else(|| Arc::new(NullProgress));

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count)
        .build()
        .map_err(|e| crate::Error::ArchiveFormat(format!("failed to build worker pool: {e}")))?;

    let total = archive.entry_count() as u64;

    // Phase A: decrypt and decode every filename, independently and
    // order-free.
    let decode_progress = AtomicU64::new(0);
    let mut decoded: Vec<(Entry, Option<String>)> = pool.install(|| {
        use rayon::prelude::*;
        archive
            .entries()
            .par_iter()
            .map(|entry| {
                let name = decode_name(&archive, entry);
                let done = decode_progress.fetch_add(1, Ordering::Relaxed) + 1;
                progress.report(done, total, Phase::DecodingFilenames);
                if verbose {
                    tracing::info!(index = entry.index, found = name.is_some(), "decoded filename");
                }
                (*entry, name)
            })
            .collect()
    });

    // Index preservation: decoded-entry list must be in strictly
    // increasing entry-index order before collision resolution runs.
    decoded.sort_by_key(|(entry, _)| entry.index);

    // Collision resolution is deterministic and scheduler-side:
    // iterate in original index order, disambiguating with `_1`,
    // `_2`, ... suffixes.
    let mut used_names = HashSet::with_capacity(decoded.len());
    let assigned: Vec<DecodedEntry> = decoded
        .into_iter()
        .map(|(entry, name)| {
            let base = match name {
                Some(n) => sanitize_leaf(&n, entry.index),
                None => synthetic_name(entry.index),
            };
            let safe_name = make_unique(&base, &mut used_names);
            DecodedEntry { entry, safe_name }
        })
        .collect();

    // Phase B: extract every entry's payload in parallel. Output
    // paths were assigned uniquely above, so no per-file locking is
    // needed here.
    let extracted_count = AtomicU64::new(0);
    let failed_count = AtomicU64::new(0);
    let extract_progress = AtomicU64::new(0);

    pool.install(|| {
        use rayon::prelude::*;
        assigned.par_iter().for_each(|decoded_entry| {
            let result = extract_one(&archive, decoded_entry, output_dir);
            let ok = result.is_ok();
            match result {
                Ok(()) => {
                    extracted_count.fetch_add(1, Ordering::Relaxed);
                }
                Err(ref e) => {
                    failed_count.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        index = decoded_entry.entry.index,
                        error = %e,
                        "entry extraction failed"
                    );
                }
            }

            let done = extract_progress.fetch_add(1, Ordering::Relaxed) + 1;
            progress.report(done, total, Phase::Extracting);
            if verbose {
                tracing::info!(
                    index = decoded_entry.entry.index,
                    name = %decoded_entry.safe_name,
                    ok,
                    "extracted entry"
                );
            }
        });
    });

    Ok(Report {
        total_entries: archive.entry_count(),
        extracted_entries: extracted_count.load(Ordering::Relaxed) as usize,
        failed_entries: failed_count.load(Ordering::Relaxed) as usize,
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_unique_first_use_is_unchanged() {
        let mut used = HashSet::new();
        assert_eq!(make_unique("x.dds", &mut used), "x.dds");
    }

    #[test]
    fn test_make_unique_resolves_collision_with_suffix() {
        let mut used = HashSet::new();
        assert_eq!(make_unique("x.dds", &mut used), "x.dds");
        assert_eq!(make_unique("x.dds", &mut used), "x_1.dds");
        assert_eq!(make_unique("x.dds", &mut used), "x_2.dds");
    }

    #[test]
    fn test_make_unique_without_extension() {
        let mut used = HashSet::new();
        assert_eq!(make_unique("readme", &mut used), "readme");
        assert_eq!(make_unique("readme", &mut used), "readme_1");
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("x.dds"), ("x", "dds"));
        assert_eq!(split_extension("readme"), ("readme", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
    }
}

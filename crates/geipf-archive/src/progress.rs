//! Progress reporting.
//!
//! Abstracted behind a capability object rather than a shared mutable
//! counter printed directly to stdout, so callers (and tests) can
//! substitute their own sink.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Which half of the two-phase extraction a progress update refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Phase A: decrypting and decoding local-header filenames.
    DecodingFilenames,
    /// Phase B: decrypting and decompressing entry payloads.
    Extracting,
}

/// A sink for extraction progress updates.
///
/// Implementations must be cheap to call from any worker thread;
/// rate-limiting (if any) is the sink's own responsibility.
pub trait ProgressSink: Send + Sync {
    /// Report that `current` of `total` units of `phase` are done.
    fn report(&self, current: u64, total: u64, phase: Phase);
}

/// A sink that discards every update. The default when the caller
/// supplies none.
#[derive(Debug, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _current: u64, _total: u64, _phase: Phase) {}
}

/// Rate-limited console progress, matching the reference tool's
/// cadence: updates are throttled to at most one per `interval`
/// (default 2s), with milestone thresholds of 10%/5%/1% of `total`
/// depending on its size so very large archives don't spam the
/// console between time-based updates either.
pub struct ConsoleProgress {
    interval: Duration,
    last_emitted: Mutex<(Instant, u64)>,
}

impl ConsoleProgress {
    /// Build a console sink with the default 2-second interval.
    pub fn new() -> Self {
        Self::with_interval(Duration::from_secs(2))
    }

    /// Build a console sink with an explicit rate-limit interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            last_emitted: Mutex::new((Instant::now(), 0)),
        }
    }

    fn milestone_step(total: u64) -> u64 {
        let total = total.max(1);
        let fraction = if total < 1_000 {
            0.10
        } else if total < 10_000 {
            0.05
        } else {
            0.01
        };
        ((total as f64 * fraction) as u64).max(1)
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn report(&self, current: u64, total: u64, phase: Phase) {
        let step = Self::milestone_step(total);
        let mut guard = self.last_emitted.lock();
        let (last_time, last_count) = *guard;

        let interval_due = last_time.elapsed() >= self.interval;
        let milestone_due = current.saturating_sub(last_count) >= step;
        let finished = current >= total;

        if !(interval_due || milestone_due || finished) {
            return;
        }

        *guard = (Instant::now(), current);
        drop(guard);

        let phase_label = match phase {
            Phase::DecodingFilenames => "decoding filenames",
            Phase::Extracting => "extracting",
        };
        tracing::info!(current, total, phase = phase_label, "progress");
    }
}

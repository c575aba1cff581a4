//! Error types for the archive crate.

use thiserror::Error;

/// Errors that can occur while reading or extracting an IPF archive.
///
/// Archive-level variants (`ArchiveFormat`, the initial-open `Io`) are
/// fatal and abort the run. `UnsupportedEntry` and `Decode` are
/// per-entry and isolated by the scheduler: they are reported and
/// counted, and extraction continues with the remaining entries.
#[derive(Debug, Error)]
pub enum Error {
    /// EOCD not found, bad signature, or a truncated header.
    #[error("archive format error: {0}")]
    ArchiveFormat(String),

    /// Compression method not in {stored, deflated}, or filename length
    /// out of range.
    #[error("unsupported entry (index {index}): {reason}")]
    UnsupportedEntry { index: usize, reason: String },

    /// Inflate failure (implies a wrong key or a corrupt payload).
    #[error("decode error (index {index}): {reason}")]
    Decode { index: usize, reason: String },

    /// Read/write syscall error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Caller-initiated stop.
    #[error("extraction cancelled")]
    Cancelled,

    /// Shared low-level binary-parsing error.
    #[error("{0}")]
    Common(#[from] geipf_common::Error),
}

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

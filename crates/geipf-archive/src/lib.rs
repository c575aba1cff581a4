//! IPF archive reader and extractor.
//!
//! IPF is the proprietary ZIP-variant archive format used by the
//! Granado Espada game client: a standard ZIP container whose entries,
//! and whose local-header filenames, are encrypted with the
//! traditional PKWARE stream cipher under one fixed, application-wide
//! password.
//!
//! The crate's single entry point is [`extract`]: it opens an
//! archive, decrypts every local-header filename, resolves naming
//! collisions deterministically, then decrypts and decompresses every
//! entry's payload in parallel.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use geipf_archive::{extract, ExtractOptions};
//!
//! let report = extract(
//!     Path::new("ai.ipf"),
//!     Path::new("out/ai"),
//!     ExtractOptions::default(),
//! )?;
//!
//! println!(
//!     "extracted {}/{} entries in {:.1} s",
//!     report.extracted_entries,
//!     report.total_entries,
//!     report.elapsed.as_secs_f64()
//! );
//! # Ok::<(), geipf_archive::Error>(())
//! ```

mod archive;
mod cipher;
mod decompress;
mod entry;
mod error;
mod extractor;
mod filename;
pub mod progress;
mod sanitize;
mod scheduler;
pub mod zip;

pub use archive::ArchiveReader;
pub use entry::{Entry, LocalHeader};
pub use error::{Error, Result};
pub use progress::{ConsoleProgress, NullProgress, Phase, ProgressSink};
pub use scheduler::{extract, ExtractOptions, Report};

//! geipf - IPF archive extraction library for Granado Espada game clients.
//!
//! This crate provides a unified, aggregate interface over the
//! geipf library ecosystem.
//!
//! # Crates
//!
//! - [`geipf_common`] - Common utilities (zero-copy binary reading)
//! - [`geipf_archive`] - IPF archive reading, PKWARE decryption and
//!   parallel extraction
//!
//! # Example
//!
//! ```no_run
//! use geipf::prelude::*;
//! use std::path::Path;
//!
//! let report = extract(
//!     Path::new("ai.ipf"),
//!     Path::new("out/ai"),
//!     ExtractOptions::default(),
//! )?;
//! println!("extracted {}/{}", report.extracted_entries, report.total_entries);
//! # Ok::<(), geipf_archive::Error>(())
//! ```

// Re-export all sub-crates
pub use geipf_archive as archive;
pub use geipf_common as common;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use geipf_archive::{
        extract, ArchiveReader, ConsoleProgress, Entry, Error, ExtractOptions, LocalHeader,
        NullProgress, Phase, ProgressSink, Report,
    };
    pub use geipf_common::BinaryReader;
}

// Re-export the crate's single entry point at the root.
pub use geipf_archive::extract;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

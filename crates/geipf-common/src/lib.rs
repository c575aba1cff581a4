//! Common utilities for geipf.
//!
//! This crate provides the foundational types shared by the archive
//! reader:
//!
//! - [`BinaryReader`] - zero-copy binary reading from byte slices
//! - [`Error`] - shared low-level parsing error type

mod error;
mod reader;

pub use error::{Error, Result};
pub use reader::BinaryReader;

/// Re-export zerocopy traits for convenience.
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

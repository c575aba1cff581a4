//! ZIP format structures.
//!
//! IPF archives are structurally plain ZIP files (no ZIP64 extensions);
//! this module contains the low-level, zero-copy structures needed to
//! parse the end-of-central-directory record, central-directory headers,
//! and local file headers.

pub mod central_dir;
mod eocd;
mod local;

pub use central_dir::CentralDirectoryHeader;
pub use eocd::EocdRecord;
pub use local::LocalFileHeader;

/// Compression methods used in IPF archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum CompressionMethod {
    /// No compression (stored).
    Stored = 0,
    /// DEFLATE compression.
    Deflated = 8,
}

impl TryFrom<u16> for CompressionMethod {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Stored),
            8 => Ok(Self::Deflated),
            other => Err(other),
        }
    }
}

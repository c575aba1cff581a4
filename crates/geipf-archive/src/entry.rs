//! Archive entry metadata.

use crate::zip::CompressionMethod;

/// A parsed central-directory entry.
///
/// Immutable once parsed; entries are ordered by `index` in the same
/// order they appear in the central directory. The raw central-
/// directory filename is not retained (it is unusable for output),
/// since only the (encrypted) local-header filename is trusted.
///
/// `compression_method` is kept as the raw on-disk value rather than
/// validated at parse time: an unsupported method is a per-entry
/// failure the scheduler isolates during extraction, not a reason to
/// drop the entry from the table or abort the whole archive.
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    /// Position in central-directory order.
    pub index: usize,
    /// Compression method, as stored in the central directory.
    pub compression_method: u16,
    /// Size of the entry's payload as stored in the archive.
    pub compressed_size: u64,
    /// Size of the entry's payload once decompressed.
    pub uncompressed_size: u64,
    /// CRC-32 of the uncompressed data, from the central directory.
    pub crc32: u32,
    /// Byte offset of the entry's local file header.
    pub local_header_offset: u64,
    /// General purpose bit flags from the central directory.
    pub general_purpose_flags: u16,
}

impl Entry {
    /// Resolve the recognized compression method, or the raw value if
    /// it is not one this decoder supports.
    pub fn compression(&self) -> Result<CompressionMethod, u16> {
        CompressionMethod::try_from(self.compression_method)
    }
}

/// A local file header, read lazily and not cached beyond the single
/// read that produced it.
#[derive(Debug, Clone)]
pub struct LocalHeader {
    /// Length, in bytes, of the (encrypted) filename.
    pub filename_length: u16,
    /// Length, in bytes, of the local extra field.
    pub extra_length: u16,
    /// The filename bytes, still ciphertext, with no 12-byte prefix.
    ///
    /// `None` when `filename_length` is 0 or exceeds 512, a
    /// recoverable condition: the entry's payload offset is still
    /// derived from the declared length, only name recovery is
    /// skipped in favor of a synthetic name.
    pub encrypted_filename: Option<Vec<u8>>,
    /// Absolute offset of the entry's payload in the archive.
    pub payload_offset: u64,
}

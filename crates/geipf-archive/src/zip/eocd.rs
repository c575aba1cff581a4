//! End of Central Directory (EOCD) record.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// End of Central Directory Record (without signature).
///
/// The 4-byte signature (`0x06054b50`) is read separately before this
/// struct.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct EocdRecord {
    /// Number of this disk.
    pub disk_number: u16,
    /// Disk where central directory starts.
    pub central_dir_disk: u16,
    /// Number of central directory records on this disk.
    pub central_dir_count_disk: u16,
    /// Total number of central directory records.
    pub central_dir_count_total: u16,
    /// Size of central directory (bytes).
    pub central_dir_size: u32,
    /// Offset of start of central directory.
    pub central_dir_offset: u32,
    /// Comment length.
    pub comment_length: u16,
}

impl EocdRecord {
    /// EOCD signature bytes.
    pub const MAGIC: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];

    /// EOCD signature as u32.
    pub const SIGNATURE: u32 = 0x0605_4b50;
}

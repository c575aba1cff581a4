//! IPF archive reader.
//!
//! Parses the end-of-central-directory record and central directory
//! into an ordered entry table, and hands out zero-copy byte-range
//! reads of each entry's raw (encrypted, still-compressed) payload.

use std::fs::File;
use std::path::Path;

use geipf_common::BinaryReader;
use memmap2::Mmap;

use crate::entry::{Entry, LocalHeader};
use crate::zip::{CentralDirectoryHeader, EocdRecord, LocalFileHeader};
use crate::{Error, Result};

/// Max ZIP comment length (65,535) plus the fixed 22-byte EOCD record.
const EOCD_SEARCH_WINDOW: usize = 65_557;

/// Local-header filenames longer than this are treated as corrupt.
const MAX_FILENAME_LENGTH: usize = 512;

/// A memory-mapped, read-only view of an IPF archive.
///
/// Backed by a [`memmap2::Mmap`] rather than a seekable file handle:
/// a read-only mapping has no file-position state for concurrent
/// readers to race on, so byte-range slices of it are `Send + Sync`
/// and safely shared across the extraction scheduler's worker pool
/// without the per-worker-handle or `pread` discipline a seekable
/// file would require.
pub struct ArchiveReader {
    mmap: Mmap,
    entries: Vec<Entry>,
}

impl ArchiveReader {
    /// Open an archive and parse its central directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let entries = Self::parse_central_directory(&mmap)?;
        Ok(Self { mmap, entries })
    }

    /// Number of entries in the archive's central directory.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// The parsed entry table, in central-directory order.
    #[inline]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Read and parse the local file header for `entry`, recovering
    /// the still-encrypted filename bytes and the entry's payload
    /// offset.
    pub fn read_local_header(&self, entry: &Entry) -> Result<LocalHeader> {
        let offset = entry.local_header_offset as usize;
        if offset + 4 > self.mmap.len() {
            return Err(Error::ArchiveFormat(format!(
                "local header offset {offset} out of bounds"
            )));
        }

        let sig = u32::from_le_bytes(self.mmap[offset..offset + 4].try_into().unwrap());
        if sig != LocalFileHeader::SIGNATURE {
            return Err(Error::UnsupportedEntry {
                index: entry.index,
                reason: format!("invalid local file header signature {sig:#010x}"),
            });
        }

        let header_start = offset + 4;
        let header_size = std::mem::size_of::<LocalFileHeader>();
        if header_start + header_size > self.mmap.len() {
            return Err(Error::ArchiveFormat(
                "truncated local file header".to_string(),
            ));
        }

        let mut reader = BinaryReader::new(&self.mmap[header_start..]);
        let header: LocalFileHeader = reader.read_struct()?;

        let filename_length = header.file_name_length;
        let name_start = header_start + header_size;
        let name_end = name_start + filename_length as usize;
        if name_end > self.mmap.len() {
            return Err(Error::ArchiveFormat(
                "local header filename extends past end of archive".to_string(),
            ));
        }

        let payload_offset = name_end + header.extra_field_length as usize;
        if payload_offset > self.mmap.len() {
            return Err(Error::ArchiveFormat(
                "local header extra field extends past end of archive".to_string(),
            ));
        }

        // A filename_length of 0 or > 512 is recoverable: skip name
        // recovery (the caller falls back to a synthetic name) but
        // still resolve the payload offset from the declared length.
        let encrypted_filename = if filename_length == 0 || filename_length as usize > MAX_FILENAME_LENGTH {
            None
        } else {
            Some(self.mmap[name_start..name_end].to_vec())
        };

        Ok(LocalHeader {
            filename_length,
            extra_length: header.extra_field_length,
            encrypted_filename,
            payload_offset: payload_offset as u64,
        })
    }

    /// Borrow an entry's raw (encrypted, still-compressed) payload
    /// bytes, starting at `payload_offset` (as produced by
    /// [`read_local_header`](Self::read_local_header)).
    pub fn read_payload(&self, entry: &Entry, payload_offset: u64) -> Result<&[u8]> {
        let start = payload_offset as usize;
        let end = start
            .checked_add(entry.compressed_size as usize)
            .ok_or_else(|| {
                Error::ArchiveFormat(format!("entry {} payload size overflow", entry.index))
            })?;
        if end > self.mmap.len() {
            return Err(Error::ArchiveFormat(format!(
                "entry {} payload extends past end of archive",
                entry.index
            )));
        }
        Ok(&self.mmap[start..end])
    }

    fn find_eocd(data: &[u8]) -> Result<usize> {
        let search_start = data.len().saturating_sub(EOCD_SEARCH_WINDOW);
        data[search_start..]
            .windows(4)
            .rposition(|w| w == EocdRecord::MAGIC)
            .map(|rel| search_start + rel)
            .ok_or_else(|| {
                Error::ArchiveFormat("end of central directory record not found".to_string())
            })
    }

    fn parse_central_directory(data: &[u8]) -> Result<Vec<Entry>> {
        let eocd_offset = Self::find_eocd(data)?;

        let mut reader = BinaryReader::new(&data[eocd_offset..]);
        reader.advance(4);
        let eocd: EocdRecord = reader.read_struct()?;

        let total_entries = eocd.central_dir_count_total as usize;
        let cd_offset = eocd.central_dir_offset as usize;
        if cd_offset > data.len() {
            return Err(Error::ArchiveFormat(
                "central directory offset out of bounds".to_string(),
            ));
        }

        let mut entries = Vec::with_capacity(total_entries);
        let mut cd_reader = BinaryReader::new(&data[cd_offset..]);

        for index in 0..total_entries {
            let sig = cd_reader.read_u32()?;
            if sig != CentralDirectoryHeader::SIGNATURE {
                return Err(Error::ArchiveFormat(format!(
                    "invalid central directory signature {sig:#010x} at entry {index}"
                )));
            }

            let header: CentralDirectoryHeader = cd_reader.read_struct()?;
            cd_reader.advance(header.variable_data_size());

            entries.push(Entry {
                index,
                compression_method: header.compression_method,
                compressed_size: header.compressed_size as u64,
                uncompressed_size: header.uncompressed_size as u64,
                crc32: header.crc32,
                local_header_offset: header.local_header_offset as u64,
                general_purpose_flags: header.flags,
            });
        }

        Ok(entries)
    }
}

impl std::fmt::Debug for ArchiveReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveReader")
            .field("entries", &self.entries.len())
            .finish()
    }
}

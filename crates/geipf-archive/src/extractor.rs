//! Per-entry decrypt-then-inflate extraction.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::cipher::{PkwareCipher, ENCRYPTION_HEADER_SIZE};
use crate::decompress::decompress_deflate;
use crate::entry::Entry;
use crate::zip::CompressionMethod;
use crate::{Error, Result};

/// A large write buffer minimizes syscall overhead when streaming an
/// entry's decompressed bytes to disk.
const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Decrypts and decompresses one entry's payload, writing the result
/// to `output_path`.
pub struct EntryExtractor;

impl EntryExtractor {
    /// Run the decrypt-then-inflate procedure for `entry` and write
    /// the plaintext to `output_path`.
    ///
    /// `raw_payload` is the entry's compressed+encrypted bytes,
    /// exactly `entry.compressed_size` long, as returned by
    /// [`ArchiveReader::read_payload`](crate::archive::ArchiveReader::read_payload).
    pub fn extract(entry: &Entry, raw_payload: &[u8], output_path: &Path) -> Result<()> {
        if raw_payload.len() < ENCRYPTION_HEADER_SIZE {
            return Err(Error::UnsupportedEntry {
                index: entry.index,
                reason: "payload shorter than the 12-byte encryption header".to_string(),
            });
        }

        let compression_method = entry
            .compression()
            .map_err(|method| Error::UnsupportedEntry {
                index: entry.index,
                reason: format!("unsupported compression method {method}"),
            })?;

        let mut cipher = PkwareCipher::new();
        // Decrypt and discard the 12-byte random encryption header.
        cipher.decrypt(&raw_payload[..ENCRYPTION_HEADER_SIZE]);
        let compressed = cipher.decrypt(&raw_payload[ENCRYPTION_HEADER_SIZE..]);

        let plaintext = match compression_method {
            CompressionMethod::Stored => compressed,
            CompressionMethod::Deflated => {
                decompress_deflate(&compressed, entry.uncompressed_size as usize).map_err(|e| {
                    Error::Decode {
                        index: entry.index,
                        reason: e.to_string(),
                    }
                })?
            }
        };

        let computed_crc32 = crate::cipher::crc32(&plaintext);
        if computed_crc32 != entry.crc32 {
            tracing::warn!(
                index = entry.index,
                expected = entry.crc32,
                actual = computed_crc32,
                "CRC-32 mismatch after decompression"
            );
        }

        let file = File::create(output_path)?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
        writer.write_all(&plaintext)?;
        writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::PkwareCipher;
    use flate2::write::DeflateEncoder;
    use flate2::Compression;

    fn build_encrypted_payload(plaintext: &[u8], method: CompressionMethod) -> (Vec<u8>, u64, u64) {
        let compressed = match method {
            CompressionMethod::Stored => plaintext.to_vec(),
            CompressionMethod::Deflated => {
                let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(plaintext).unwrap();
                encoder.finish().unwrap()
            }
        };

        let mut cipher = PkwareCipher::new();
        let header: Vec<u8> = (0..ENCRYPTION_HEADER_SIZE as u8).collect();
        let mut raw = cipher.encrypt(&header);
        raw.extend(cipher.encrypt(&compressed));

        (raw, raw.len() as u64, plaintext.len() as u64)
    }

    #[test]
    fn test_extract_stored_entry() {
        let plaintext = b"hello from granado espada";
        let (raw, compressed_size, uncompressed_size) =
            build_encrypted_payload(plaintext, CompressionMethod::Stored);

        let entry = Entry {
            index: 0,
            compression_method: CompressionMethod::Stored as u16,
            compressed_size,
            uncompressed_size,
            crc32: crate::cipher::crc32(plaintext),
            local_header_offset: 0,
            general_purpose_flags: 1,
        };

        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("out.bin");
        EntryExtractor::extract(&entry, &raw, &out_path).unwrap();

        let written = std::fs::read(&out_path).unwrap();
        assert_eq!(written, plaintext);
    }

    #[test]
    fn test_extract_deflated_entry() {
        let plaintext = b"a longer payload that benefits from deflate compression, repeated repeated repeated";
        let (raw, compressed_size, uncompressed_size) =
            build_encrypted_payload(plaintext, CompressionMethod::Deflated);

        let entry = Entry {
            index: 1,
            compression_method: CompressionMethod::Deflated as u16,
            compressed_size,
            uncompressed_size,
            crc32: crate::cipher::crc32(plaintext),
            local_header_offset: 0,
            general_purpose_flags: 1,
        };

        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("out.bin");
        EntryExtractor::extract(&entry, &raw, &out_path).unwrap();

        let written = std::fs::read(&out_path).unwrap();
        assert_eq!(written, plaintext);
    }

    #[test]
    fn test_extract_unsupported_compression_is_isolated_error() {
        let entry = Entry {
            index: 2,
            compression_method: 99,
            compressed_size: 12,
            uncompressed_size: 0,
            crc32: 0,
            local_header_offset: 0,
            general_purpose_flags: 1,
        };

        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("out.bin");
        let raw = vec![0u8; 12];
        let err = EntryExtractor::extract(&entry, &raw, &out_path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedEntry { .. }));
    }
}

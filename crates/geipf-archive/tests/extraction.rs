//! End-to-end extraction tests against a small, synthetic IPF-shaped
//! archive built in-process (no external fixture files).
//!
//! The archive is encrypted under the same fixed password the crate
//! itself uses; that password has no secrecy requirement for test
//! purposes, so the key schedule is duplicated here rather than
//! reaching into the crate's private cipher module.

use std::io::Write;
use std::path::PathBuf;

use flate2::write::DeflateEncoder;
use flate2::Compression;

use geipf_archive::{extract, Error, ExtractOptions};

const PASSWORD: [u8; 20] = [
    0x47, 0x72, 0x61, 0x6e, 0x61, 0x64, 0x6f, 0x45, 0x73, 0x70, 0x61, 0x64, 0x61, 0x21, 0x49, 0x50,
    0x46, 0x32, 0x30, 0x30,
];

const CRC32_TABLE: [u32; 256] = build_crc32_table();

const fn build_crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

struct TestCipher {
    key0: u32,
    key1: u32,
    key2: u32,
}

impl TestCipher {
    fn new() -> Self {
        let mut cipher = Self {
            key0: 0x1234_5678,
            key1: 0x2345_6789,
            key2: 0x3456_7890,
        };
        for &b in PASSWORD.iter() {
            cipher.update_keys(b);
        }
        cipher
    }

    fn crc32_update(prev: u32, byte: u8) -> u32 {
        (prev >> 8) ^ CRC32_TABLE[((prev ^ byte as u32) & 0xFF) as usize]
    }

    fn update_keys(&mut self, byte: u8) {
        self.key0 = Self::crc32_update(self.key0, byte);
        self.key1 = self
            .key1
            .wrapping_add(self.key0 & 0xFF)
            .wrapping_mul(0x0808_8405)
            .wrapping_add(1);
        self.key2 = Self::crc32_update(self.key2, (self.key1 >> 24) as u8);
    }

    fn encrypt_byte(&mut self, p: u8) -> u8 {
        let temp = ((self.key2 | 2) & 0xFFFF) as u32;
        let k = (((temp.wrapping_mul(temp ^ 1)) >> 8) & 0xFF) as u8;
        self.update_keys(p);
        p ^ k
    }

    fn encrypt(&mut self, data: &[u8]) -> Vec<u8> {
        data.iter().map(|&p| self.encrypt_byte(p)).collect()
    }
}

fn encrypt_stream(data: &[u8]) -> Vec<u8> {
    TestCipher::new().encrypt(data)
}

struct FixtureEntry {
    name: &'static str,
    method: u16,
    plaintext: Vec<u8>,
    omit_filename: bool,
}

fn stored(name: &'static str, plaintext: &[u8]) -> FixtureEntry {
    FixtureEntry {
        name,
        method: 0,
        plaintext: plaintext.to_vec(),
        omit_filename: false,
    }
}

fn deflated(name: &'static str, plaintext: &[u8]) -> FixtureEntry {
    FixtureEntry {
        name,
        method: 8,
        plaintext: plaintext.to_vec(),
        omit_filename: false,
    }
}

/// Assemble a minimal, valid IPF-shaped archive: a local header +
/// encrypted filename + encrypted (12-byte-prefixed) payload per
/// entry, followed by a central directory and an EOCD record.
fn build_archive(entries: &[FixtureEntry]) -> Vec<u8> {
    let mut local_section = Vec::new();
    let mut central_dir = Vec::new();

    for entry in entries {
        let offset = local_section.len();

        let compressed = if entry.method == 8 {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&entry.plaintext).unwrap();
            encoder.finish().unwrap()
        } else {
            entry.plaintext.clone()
        };

        let header_bytes: Vec<u8> = (0u8..12).collect();
        let mut payload_plain = header_bytes;
        payload_plain.extend_from_slice(&compressed);
        let encrypted_payload = encrypt_stream(&payload_plain);

        let encrypted_name = if entry.omit_filename {
            Vec::new()
        } else {
            encrypt_stream(entry.name.as_bytes())
        };
        let name_len: u16 = encrypted_name.len() as u16;

        local_section.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
        local_section.extend_from_slice(&20u16.to_le_bytes()); // version_needed
        local_section.extend_from_slice(&1u16.to_le_bytes()); // flags
        local_section.extend_from_slice(&entry.method.to_le_bytes());
        local_section.extend_from_slice(&0u32.to_le_bytes()); // last_modified
        local_section.extend_from_slice(&0u32.to_le_bytes()); // crc32 (unchecked by the decoder)
        local_section.extend_from_slice(&(encrypted_payload.len() as u32).to_le_bytes());
        local_section.extend_from_slice(&(entry.plaintext.len() as u32).to_le_bytes());
        local_section.extend_from_slice(&name_len.to_le_bytes());
        local_section.extend_from_slice(&0u16.to_le_bytes()); // extra_field_length
        local_section.extend_from_slice(&encrypted_name);
        local_section.extend_from_slice(&encrypted_payload);

        central_dir.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
        central_dir.extend_from_slice(&20u16.to_le_bytes()); // version_made_by
        central_dir.extend_from_slice(&20u16.to_le_bytes()); // version_needed
        central_dir.extend_from_slice(&1u16.to_le_bytes()); // flags
        central_dir.extend_from_slice(&entry.method.to_le_bytes());
        central_dir.extend_from_slice(&0u32.to_le_bytes()); // last_modified
        central_dir.extend_from_slice(&0u32.to_le_bytes()); // crc32
        central_dir.extend_from_slice(&(encrypted_payload.len() as u32).to_le_bytes());
        central_dir.extend_from_slice(&(entry.plaintext.len() as u32).to_le_bytes());
        central_dir.extend_from_slice(&0u16.to_le_bytes()); // file_name_length: ignored for output
        central_dir.extend_from_slice(&0u16.to_le_bytes()); // extra_field_length
        central_dir.extend_from_slice(&0u16.to_le_bytes()); // file_comment_length
        central_dir.extend_from_slice(&0u16.to_le_bytes()); // disk_number_start
        central_dir.extend_from_slice(&0u16.to_le_bytes()); // internal_attrs
        central_dir.extend_from_slice(&0u32.to_le_bytes()); // external_attrs
        central_dir.extend_from_slice(&(offset as u32).to_le_bytes());
    }

    let central_dir_offset = local_section.len();
    let mut archive = local_section;
    archive.extend_from_slice(&central_dir);

    archive.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
    archive.extend_from_slice(&0u16.to_le_bytes()); // disk_number
    archive.extend_from_slice(&0u16.to_le_bytes()); // central_dir_disk
    archive.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    archive.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    archive.extend_from_slice(&(central_dir.len() as u32).to_le_bytes());
    archive.extend_from_slice(&(central_dir_offset as u32).to_le_bytes());
    archive.extend_from_slice(&0u16.to_le_bytes()); // comment_length

    archive
}

fn write_archive(bytes: &[u8]) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.ipf");
    std::fs::write(&path, bytes).unwrap();
    (dir, path)
}

#[test]
fn test_full_extraction_round_trip() {
    let entries = vec![
        stored("Data/ai.xml", b"<ai>stored content</ai>"),
        deflated(
            "Data/icon.dds",
            b"deflated content deflated content deflated content",
        ),
    ];
    let expected: Vec<Vec<u8>> = entries.iter().map(|e| e.plaintext.clone()).collect();

    let bytes = build_archive(&entries);
    let (_archive_dir, archive_path) = write_archive(&bytes);
    let out_dir = tempfile::tempdir().unwrap();

    let report = extract(&archive_path, out_dir.path(), ExtractOptions::default()).unwrap();

    assert_eq!(report.total_entries, 2);
    assert_eq!(report.extracted_entries, 2);
    assert_eq!(report.failed_entries, 0);

    assert_eq!(
        std::fs::read(out_dir.path().join("Data_ai.xml")).unwrap(),
        expected[0]
    );
    assert_eq!(
        std::fs::read(out_dir.path().join("Data_icon.dds")).unwrap(),
        expected[1]
    );
}

#[test]
fn test_collision_resolution_is_deterministic_across_worker_counts() {
    let entries = vec![stored("x.dds", b"first"), stored("x.dds", b"second")];
    let bytes = build_archive(&entries);

    for workers in [1, 4] {
        let (_archive_dir, archive_path) = write_archive(&bytes);
        let out_dir = tempfile::tempdir().unwrap();

        let report = extract(
            &archive_path,
            out_dir.path(),
            ExtractOptions {
                worker_count: Some(workers),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(report.extracted_entries, 2, "workers={workers}");
        assert_eq!(
            std::fs::read(out_dir.path().join("x.dds")).unwrap(),
            b"first"
        );
        assert_eq!(
            std::fs::read(out_dir.path().join("x_1.dds")).unwrap(),
            b"second"
        );
    }
}

#[test]
fn test_zero_length_filename_falls_back_to_synthetic_name() {
    let mut missing_name = stored("", b"synthetic content");
    missing_name.omit_filename = true;
    let entries = vec![missing_name, stored("Data/other.bin", b"other content")];

    let bytes = build_archive(&entries);
    let (_archive_dir, archive_path) = write_archive(&bytes);
    let out_dir = tempfile::tempdir().unwrap();

    let report = extract(&archive_path, out_dir.path(), ExtractOptions::default()).unwrap();

    assert_eq!(report.extracted_entries, 2);
    assert_eq!(
        std::fs::read(out_dir.path().join("file_0000.bin")).unwrap(),
        b"synthetic content"
    );
    assert_eq!(
        std::fs::read(out_dir.path().join("Data_other.bin")).unwrap(),
        b"other content"
    );
}

#[test]
fn test_truncated_archive_returns_archive_format_error() {
    let entries = vec![stored("a.txt", b"hi")];
    let mut bytes = build_archive(&entries);
    bytes.truncate(bytes.len() - 22); // drop the entire EOCD record

    let (_archive_dir, archive_path) = write_archive(&bytes);
    let out_dir = tempfile::tempdir().unwrap();

    let err = extract(&archive_path, out_dir.path(), ExtractOptions::default()).unwrap_err();
    assert!(matches!(err, Error::ArchiveFormat(_)));

    assert!(std::fs::read_dir(out_dir.path()).unwrap().next().is_none());
}

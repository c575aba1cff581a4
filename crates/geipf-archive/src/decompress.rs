//! Decompression for IPF entry payloads.

use std::io::Read;

use flate2::read::DeflateDecoder;

/// Decompress raw DEFLATE-compressed data (no zlib or gzip wrapper).
pub fn decompress_deflate(data: &[u8], expected_size: usize) -> std::io::Result<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(data);
    let mut output = Vec::with_capacity(expected_size);
    decoder.read_to_end(&mut output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deflate_roundtrip() {
        use flate2::write::DeflateEncoder;
        use flate2::Compression;
        use std::io::Write;

        let original = b"Hello, Granado Espada! This is a test of DEFLATE compression.";

        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(original).unwrap();
        let compressed = encoder.finish().unwrap();

        let decompressed = decompress_deflate(&compressed, original.len()).unwrap();
        assert_eq!(decompressed, original);
    }
}

//! Filename recovery from encrypted local-header bytes.
//!
//! The archive mixes Western-ASCII and Japanese game-asset paths, so
//! recovering a usable filename means trying several text encodings
//! in order and accepting the first plausible result, never a
//! try/except chain, just a pure ordered list of decode attempts.

use crate::cipher::PkwareCipher;

fn is_printable(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| matches!(c, '\x20'..='\x7e') || matches!(c, '.' | '_' | '-' | '/'))
}

fn try_utf8(bytes: &[u8]) -> Option<String> {
    let s = std::str::from_utf8(bytes).ok()?;
    is_printable(s).then(|| s.to_string())
}

fn try_latin1(bytes: &[u8]) -> Option<String> {
    // Every byte 0x00-0xFF is a valid Unicode scalar value under
    // ISO-8859-1, so this is a direct codepoint-for-byte transcode.
    let s: String = bytes.iter().map(|&b| b as char).collect();
    is_printable(&s).then_some(s)
}

fn try_windows1252(bytes: &[u8]) -> Option<String> {
    let (cow, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
    if had_errors {
        return None;
    }
    is_printable(&cow).then(|| cow.into_owned())
}

fn try_ascii(bytes: &[u8]) -> Option<String> {
    if !bytes.is_ascii() {
        return None;
    }
    let s = std::str::from_utf8(bytes).ok()?;
    is_printable(s).then(|| s.to_string())
}

fn try_shift_jis(bytes: &[u8]) -> Option<String> {
    let (cow, _, _) = encoding_rs::SHIFT_JIS.decode(bytes);
    (cow.chars().count() > 1).then(|| cow.into_owned())
}

/// Decrypt and decode a local header's filename bytes.
///
/// Returns `None` if every encoding in the ordered fallback list
/// rejects the decrypted bytes, in which case the caller should fall
/// back to a synthetic name.
pub fn decode_filename(encrypted: &[u8]) -> Option<String> {
    let mut cipher = PkwareCipher::new();
    let decrypted = cipher.decrypt(encrypted);

    try_utf8(&decrypted)
        .or_else(|| try_latin1(&decrypted))
        .or_else(|| try_windows1252(&decrypted))
        .or_else(|| try_ascii(&decrypted))
        .or_else(|| try_shift_jis(&decrypted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::PkwareCipher;

    fn encrypt(plaintext: &[u8]) -> Vec<u8> {
        let mut cipher = PkwareCipher::new();
        cipher.encrypt(plaintext)
    }

    #[test]
    fn test_ascii_path_round_trips_through_cipher() {
        // A filename encrypted with the same fixed password must decode
        // back through the UTF-8/ASCII branch of the fallback list.
        let original = b"Data/Sprite/icon_item_0001.dds";
        let ciphertext = encrypt(original);
        let decoded = decode_filename(&ciphertext);
        assert_eq!(decoded.as_deref(), Some(std::str::from_utf8(original).unwrap()));
    }

    #[test]
    fn test_is_printable_rejects_control_bytes() {
        assert!(!is_printable("abc\u{0001}"));
        assert!(is_printable("abc.def_ghi-jkl/mno"));
    }

    #[test]
    fn test_empty_decoded_name_is_rejected() {
        assert!(!is_printable(""));
    }
}

//! Mapping a recovered filename onto a filesystem-safe leaf name.
//!
//! The archive is extracted flat: every entry lands in a single
//! output directory, regardless of any `/` the decrypted name
//! carries.

/// Turn a decoded filename into a single filesystem-safe leaf name.
///
/// Replaces every character outside `{alnum, '.', '_', '-'}` with
/// `_`, collapses runs of `_`, and trims leading/trailing `_`/`.`. An
/// empty result (or an empty input) falls back to the synthetic name
/// for `index`.
pub fn sanitize_leaf(name: &str, index: usize) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_underscore = false;

    for c in name.chars() {
        let mapped = if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '_'
        };

        if mapped == '_' {
            if last_was_underscore {
                continue;
            }
            last_was_underscore = true;
        } else {
            last_was_underscore = false;
        }
        out.push(mapped);
    }

    let trimmed = out.trim_matches(|c| c == '_' || c == '.');

    if trimmed.is_empty() {
        synthetic_name(index)
    } else {
        trimmed.to_string()
    }
}

/// The `file_NNNN.bin` fallback name used when a filename cannot be
/// recovered or sanitizes down to nothing.
pub fn synthetic_name(index: usize) -> String {
    format!("file_{index:04}.bin")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_path_separators() {
        assert_eq!(sanitize_leaf("Data/Sprite/icon.dds", 0), "Data_Sprite_icon.dds");
    }

    #[test]
    fn test_sanitize_collapses_runs_of_underscore() {
        assert_eq!(sanitize_leaf("a///b", 0), "a_b");
    }

    #[test]
    fn test_sanitize_trims_leading_and_trailing() {
        assert_eq!(sanitize_leaf("  .leading", 0), "leading");
        assert_eq!(sanitize_leaf("trailing. ", 0), "trailing");
    }

    #[test]
    fn test_sanitize_empty_result_falls_back_to_synthetic() {
        assert_eq!(sanitize_leaf("///", 7), synthetic_name(7));
        assert_eq!(sanitize_leaf("", 7), synthetic_name(7));
    }

    #[test]
    fn test_synthetic_name_is_zero_padded() {
        assert_eq!(synthetic_name(0), "file_0000.bin");
        assert_eq!(synthetic_name(42), "file_0042.bin");
        assert_eq!(synthetic_name(12345), "file_12345.bin");
    }
}

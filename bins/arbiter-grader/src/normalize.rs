/// Output Normalizer - canonical form for comparison
///
/// **Normalization Rules (Applied to All Languages):**
/// - Replace CRLF line endings with LF
/// - Trim leading and trailing whitespace
/// - Case sensitivity: YES (exact match required)
/// - Internal whitespace and blank lines: preserved
///
/// Used only for the pass/fail comparison. Stored `actual_output` and
/// `expected_output` values keep their original formatting.

/// Canonicalize process output for comparison. Idempotent.
pub fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crlf_becomes_lf() {
        assert_eq!(normalize("a\r\nb\r\n"), "a\nb");
        assert_eq!(normalize("a\nb"), "a\nb");
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(normalize("  hello  \n"), "hello");
        assert_eq!(normalize("\nhello\n"), "hello");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_preserves_internal_structure() {
        assert_eq!(normalize("a\n\nb"), "a\n\nb");
        assert_eq!(normalize("a  b"), "a  b");
    }

    #[test]
    fn test_idempotent() {
        for input in ["a\r\nb\r\n", "  x  ", "", "line1\nline2\n", "\r\n\r\n"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_case_sensitive() {
        assert_ne!(normalize("Hello"), normalize("hello"));
    }
}

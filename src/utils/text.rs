/// Longest raw-output prefix quoted back in error messages
pub const OUTPUT_EXCERPT_CHARS: usize = 500;

/// Longest stderr prefix returned as error details
pub const STDERR_EXCERPT_CHARS: usize = 2000;

/// Lossy UTF-8 view of `bytes`, cut to at most `max_chars` characters.
///
/// Returns the excerpt and whether anything was cut off.
pub fn excerpt(bytes: &[u8], max_chars: usize) -> (String, bool) {
    let text = String::from_utf8_lossy(bytes);
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => (text[..end].to_string(), true),
        None => (text.into_owned(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_short_input_untouched() {
        assert_eq!(excerpt(b"not-json", 500), ("not-json".to_string(), false));
    }

    #[test]
    fn test_excerpt_counts_chars_not_bytes() {
        let input = "ü".repeat(600);
        let (cut, truncated) = excerpt(input.as_bytes(), 500);
        assert!(truncated);
        assert_eq!(cut.chars().count(), 500);
    }

    #[test]
    fn test_excerpt_invalid_utf8_is_lossy() {
        let (cut, truncated) = excerpt(&[0x66, 0xff, 0x6f], 10);
        assert!(!truncated);
        assert_eq!(cut, "f\u{fffd}o");
    }
}

use std::fmt;
use std::path::Path;

/// Name used when the client sends a file part without a filename
pub const FALLBACK_FILENAME: &str = "upload";

/// Longest extension carried over to the staged file name
const MAX_EXTENSION_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Reduces a client-supplied filename to a safe, single path component.
///
/// Directory parts are dropped (both `/` and `\` separators), reserved and
/// control characters become `_`, and the result is capped at 255 bytes on a
/// char boundary.
pub fn sanitize_filename(filename: &str) -> Result<String, ValidationError> {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim();

    if filename.contains("..") {
        tracing::warn!("Path traversal attempt detected: {}", filename);
    }

    if name.is_empty() || name == "." || name == ".." {
        return Err(ValidationError {
            code: "INVALID_FILENAME",
            message: "Filename cannot be empty".to_string(),
        });
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|' | ';')
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    let sanitized = if sanitized.len() > 255 {
        let mut end = 255;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized[..end].to_string()
    } else {
        sanitized
    };

    Ok(sanitized)
}

/// Extension suffix (with leading dot) to keep on the staged file, if it is
/// short and purely alphanumeric.
pub fn staged_suffix(sanitized: &str) -> String {
    Path::new(sanitized)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| {
            !e.is_empty()
                && e.len() <= MAX_EXTENSION_LEN
                && e.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("report.pdf").unwrap(), "report.pdf");
        assert_eq!(sanitize_filename("my file.pdf").unwrap(), "my file.pdf");
        assert_eq!(
            sanitize_filename("test<script>.pdf").unwrap(),
            "test_script_.pdf"
        );
        assert_eq!(sanitize_filename("論文.pdf").unwrap(), "論文.pdf");

        // Path traversal
        assert_eq!(sanitize_filename("../../../etc/passwd").unwrap(), "passwd");
        assert_eq!(
            sanitize_filename("..\\..\\windows\\system32").unwrap(),
            "system32"
        );

        // Empty
        assert_eq!(sanitize_filename("").unwrap_err().code, "INVALID_FILENAME");
        assert!(sanitize_filename("dir/").is_err());
        assert!(sanitize_filename("..").is_err());
    }

    #[test]
    fn test_sanitize_filename_truncates_on_char_boundary() {
        let long = "é".repeat(200);
        let sanitized = sanitize_filename(&long).unwrap();
        assert!(sanitized.len() <= 255);
        assert!(sanitized.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_staged_suffix() {
        assert_eq!(staged_suffix("paper.PDF"), ".pdf");
        assert_eq!(staged_suffix("archive.tar.gz"), ".gz");
        assert_eq!(staged_suffix("noext"), "");
        assert_eq!(staged_suffix("weird.p d f"), "");
        assert_eq!(staged_suffix("trailing."), "");
    }
}

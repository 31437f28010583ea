use crate::models::{ModelFailure, SummaryDocument};
use crate::utils::text::{OUTPUT_EXCERPT_CHARS, excerpt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    /// The model ran but printed `{"error": ...}` instead of a summary
    #[error("Model reported an error. Raw output: {excerpt}")]
    ModelReported { message: String, excerpt: String },

    /// stdout is not a summary document
    #[error("Error parsing model output. Raw output: {excerpt}")]
    Malformed {
        excerpt: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Strictly decodes model stdout into a [`SummaryDocument`].
pub fn decode_summary(stdout: &[u8]) -> Result<SummaryDocument, DecodeError> {
    let source = match serde_json::from_slice::<SummaryDocument>(stdout) {
        Ok(document) => return Ok(document),
        Err(e) => e,
    };

    let (mut raw, truncated) = excerpt(stdout, OUTPUT_EXCERPT_CHARS);
    if truncated {
        raw.push_str("...");
    }

    if let Ok(failure) = serde_json::from_slice::<ModelFailure>(stdout) {
        return Err(DecodeError::ModelReported {
            message: failure.error,
            excerpt: raw,
        });
    }

    Err(DecodeError::Malformed {
        excerpt: raw,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"summary":"S","chunks":[{"summary":"C1","questions":["Q1"],"answers":{"Q1":"A1"}}]}"#;

    #[test]
    fn test_decodes_valid_document() {
        let document = decode_summary(VALID.as_bytes()).unwrap();

        assert_eq!(document.summary, "S");
        assert_eq!(document.chunks.len(), 1);
        assert_eq!(document.chunks[0].questions, vec!["Q1".to_string()]);
        assert_eq!(document.chunks[0].answers["Q1"], "A1");
    }

    #[test]
    fn test_tolerates_trailing_newline() {
        let stdout = format!("{}\n", VALID);
        assert!(decode_summary(stdout.as_bytes()).is_ok());
    }

    #[test]
    fn test_rejects_non_json_with_excerpt() {
        match decode_summary(b"not-json").unwrap_err() {
            DecodeError::Malformed { excerpt, .. } => assert_eq!(excerpt, "not-json"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_partial_structure() {
        let missing_chunks = br#"{"summary":"S"}"#;
        assert!(matches!(
            decode_summary(missing_chunks),
            Err(DecodeError::Malformed { .. })
        ));

        let bad_answers = br#"{"summary":"S","chunks":[{"summary":"C","questions":[],"answers":["A"]}]}"#;
        assert!(matches!(
            decode_summary(bad_answers),
            Err(DecodeError::Malformed { .. })
        ));
    }

    #[test]
    fn test_excerpt_is_bounded() {
        let noise = "x".repeat(5_000);
        let err = decode_summary(noise.as_bytes()).unwrap_err();
        let DecodeError::Malformed { excerpt, .. } = err else {
            panic!("expected malformed output");
        };
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), OUTPUT_EXCERPT_CHARS + 3);
    }

    #[test]
    fn test_recognizes_model_failure_envelope() {
        let stdout = br#"{"error": "PDF contains no extractable text."}"#;
        let err = decode_summary(stdout).unwrap_err();
        assert!(err.to_string().contains("Raw output: {\"error\""));
        match err {
            DecodeError::ModelReported { message, .. } => {
                assert_eq!(message, "PDF contains no extractable text.")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_partial_document_with_error_key_is_malformed() {
        let err = decode_summary(br#"{"summary":"S","error":"x"}"#).unwrap_err();
        match err {
            DecodeError::Malformed { excerpt, .. } => {
                assert_eq!(excerpt, r#"{"summary":"S","error":"x"}"#)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_string_error_is_malformed() {
        assert!(matches!(
            decode_summary(br#"{"error": 42}"#),
            Err(DecodeError::Malformed { .. })
        ));
    }

    #[test]
    fn test_empty_output_is_malformed() {
        assert!(matches!(
            decode_summary(b""),
            Err(DecodeError::Malformed { .. })
        ));
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Structured result produced by the summarization model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SummaryDocument {
    /// Summary of the whole document
    pub summary: String,
    /// Per-chunk results, in document order
    pub chunks: Vec<ChunkResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChunkResult {
    pub summary: String,
    pub questions: Vec<String>,
    /// Answer keyed by question text
    pub answers: BTreeMap<String, String>,
}

/// Failure envelope some model builds print instead of a summary.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelFailure {
    pub error: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Multipart form accepted by `POST /upload`.
#[derive(ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

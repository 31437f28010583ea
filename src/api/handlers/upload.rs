use crate::AppState;
use crate::api::error::AppError;
use crate::models::SummaryDocument;
use crate::services::cleanup::CleanupManager;
use crate::services::staging::UploadHandle;
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use futures::TryStreamExt;
use tokio_util::io::StreamReader;

/// Name of the multipart field carrying the document
pub const FILE_FIELD: &str = "file";

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = crate::models::UploadForm, content_type = "multipart/form-data", description = "Document to summarize"),
    responses(
        (status = 200, description = "Document summarized", body = SummaryDocument),
        (status = 400, description = "Missing or invalid file", body = crate::models::ErrorResponse),
        (status = 413, description = "File exceeds the upload limit", body = crate::models::ErrorResponse),
        (status = 500, description = "Storage, model or decode failure", body = crate::models::ErrorResponse)
    ),
    tag = "summarize"
)]
pub async fn upload_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SummaryDocument>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;
    let mut staged: Option<UploadHandle> = None;

    let result: Result<UploadHandle, AppError> = async {
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }
            if staged.is_some() {
                return Err(AppError::Validation(
                    "Only one file may be uploaded per request.".to_string(),
                ));
            }

            let file_name = field.file_name().map(str::to_string);
            let reader = StreamReader::new(field.map_err(std::io::Error::other));
            staged = Some(state.staging.stage(file_name.as_deref(), reader).await?);
        }

        staged
            .take()
            .ok_or_else(|| AppError::Validation("No file uploaded.".to_string()))
    }
    .await;

    let handle = match result {
        Ok(handle) => handle,
        Err(e) => {
            if let Some(handle) = staged.take() {
                CleanupManager.release(handle).await;
            }
            // Read the rest of the body so the client sees our response
            // instead of a connection reset
            tracing::warn!("Upload rejected: {}. Consuming remaining stream...", e);
            while let Ok(Some(mut field)) = multipart.next_field().await {
                while let Ok(Some(_)) = field.chunk().await {}
            }
            return Err(e);
        }
    };

    let document = state.summarizer.summarize(handle).await?;
    Ok(Json(document))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::Validation(e.body_text())
    }
}

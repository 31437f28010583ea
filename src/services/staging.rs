use crate::api::error::AppError;
use crate::utils::validation::{FALLBACK_FILENAME, sanitize_filename, staged_suffix};
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

/// A staged upload owned by exactly one request.
///
/// The file is removed by [`crate::services::cleanup::CleanupManager::release`].
/// A handle dropped without being released (request cancelled) removes its
/// file on drop.
#[derive(Debug)]
pub struct UploadHandle {
    pub id: Uuid,
    pub original_name: String,
    pub size_bytes: u64,
    pub(crate) path: TempPath,
}

impl UploadHandle {
    pub fn temporary_path(&self) -> &Path {
        &self.path
    }
}

/// Writes incoming uploads into the staging directory.
pub struct StagingService {
    dir: PathBuf,
    max_upload_size: usize,
}

impl StagingService {
    pub fn new(dir: impl Into<PathBuf>, max_upload_size: usize) -> Self {
        let dir = dir.into();
        let dir = std::path::absolute(&dir).unwrap_or(dir);
        Self {
            dir,
            max_upload_size,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_upload_size(&self) -> usize {
        self.max_upload_size
    }

    /// Creates the staging directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create staging directory {}: {}",
                self.dir.display(),
                e
            ))
        })
    }

    /// Streams `reader` into a fresh uniquely-named file.
    ///
    /// Fails with `PayloadTooLarge` as soon as the running total passes the
    /// limit; the partial file is removed before returning.
    pub async fn stage<R>(
        &self,
        original_name: Option<&str>,
        mut reader: R,
    ) -> Result<UploadHandle, AppError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let original_name = original_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(FALLBACK_FILENAME);
        let original_name = sanitize_filename(original_name).map_err(|e| {
            tracing::warn!(code = e.code, "Rejected upload filename: {}", e.message);
            AppError::Validation(e.message)
        })?;

        self.ensure_dir().await?;

        let id = Uuid::new_v4();
        let named = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&staged_suffix(&original_name))
            .tempfile_in(&self.dir)
            .map_err(|e| AppError::Storage(format!("Failed to create staged file: {}", e)))?;
        let (file, path) = named.into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let mut buffer = vec![0u8; 64 * 1024];
        let mut total_size: u64 = 0;

        loop {
            let n = reader.read(&mut buffer).await.map_err(read_error)?;
            if n == 0 {
                break;
            }
            total_size += n as u64;

            if total_size > self.max_upload_size as u64 {
                tracing::warn!(
                    upload_id = %id,
                    "Upload '{}' exceeded {} bytes, discarding",
                    original_name,
                    self.max_upload_size
                );
                drop(file);
                discard(path);
                return Err(AppError::PayloadTooLarge(format!(
                    "File exceeds the maximum upload size of {} bytes",
                    self.max_upload_size
                )));
            }

            file.write_all(&buffer[..n])
                .await
                .map_err(|e| AppError::Storage(format!("Failed to write staged file: {}", e)))?;
        }

        file.flush()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to flush staged file: {}", e)))?;
        drop(file);

        if total_size == 0 {
            discard(path);
            return Err(AppError::Validation("Uploaded file is empty.".to_string()));
        }

        tracing::info!(
            upload_id = %id,
            "Staged '{}' ({} bytes) at {}",
            original_name,
            total_size,
            path.display()
        );

        Ok(UploadHandle {
            id,
            original_name,
            size_bytes: total_size,
            path,
        })
    }
}

fn discard(path: TempPath) {
    let shown_path = path.display().to_string();
    if let Err(e) = path.close() {
        tracing::error!("Failed to remove partial upload {}: {}", shown_path, e);
    }
}

/// Errors reading the request body are the client's, except body-limit hits.
fn read_error(e: io::Error) -> AppError {
    let too_large = e
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<MultipartError>())
        .map(|m| m.status() == StatusCode::PAYLOAD_TOO_LARGE)
        .unwrap_or(false)
        || e.to_string().contains("length limit exceeded");

    if too_large {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::Validation(format!("Failed to read uploaded file: {}", e))
    }
}

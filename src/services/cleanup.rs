use crate::services::staging::UploadHandle;

/// Removes staged uploads once their request is done with them.
#[derive(Debug, Default, Clone, Copy)]
pub struct CleanupManager;

impl CleanupManager {
    /// Deletes the staged file. Consumes the handle, so a file is released at
    /// most once. Failures are logged and never returned.
    pub async fn release(&self, handle: UploadHandle) {
        let UploadHandle {
            id,
            original_name,
            path,
            ..
        } = handle;
        let shown_path = path.display().to_string();

        match tokio::task::spawn_blocking(move || path.close()).await {
            Ok(Ok(())) => {
                tracing::info!(upload_id = %id, "Removed staged upload '{}' ({})", original_name, shown_path);
            }
            Ok(Err(e)) => {
                tracing::error!(upload_id = %id, "Failed to delete staged upload {}: {}", shown_path, e);
            }
            Err(e) => {
                tracing::error!(upload_id = %id, "Cleanup task for {} failed: {}", shown_path, e);
            }
        }
    }
}

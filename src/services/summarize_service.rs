use crate::api::error::AppError;
use crate::models::SummaryDocument;
use crate::services::cleanup::CleanupManager;
use crate::services::decoder::{DecodeError, decode_summary};
use crate::services::invoker::{InvocationResult, InvokeError, ModelInvoker};
use crate::services::staging::UploadHandle;
use crate::utils::text::{STDERR_EXCERPT_CHARS, excerpt};
use std::sync::Arc;
use std::time::Instant;

/// Runs a staged upload through the model and turns the outcome into either a
/// summary or an [`AppError`].
pub struct SummarizeService {
    invoker: Arc<dyn ModelInvoker>,
    cleanup: CleanupManager,
}

impl SummarizeService {
    pub fn new(invoker: Arc<dyn ModelInvoker>) -> Self {
        Self {
            invoker,
            cleanup: CleanupManager,
        }
    }

    pub fn invoker(&self) -> &Arc<dyn ModelInvoker> {
        &self.invoker
    }

    /// Invokes the model on `handle`, releases the staged file, then decodes.
    ///
    /// The file is released whether the invocation succeeded or not, and
    /// before any decoding happens.
    pub async fn summarize(&self, handle: UploadHandle) -> Result<SummaryDocument, AppError> {
        let upload_id = handle.id;
        let started = Instant::now();
        tracing::info!(
            upload_id = %upload_id,
            "Invoking model for '{}' ({} bytes)",
            handle.original_name,
            handle.size_bytes
        );

        let outcome = self.invoker.invoke(handle.temporary_path()).await;
        self.cleanup.release(handle).await;

        let result = outcome.map_err(invocation_error)?;
        tracing::info!(
            upload_id = %upload_id,
            exit_code = ?result.exit_code,
            "Model finished in {:?}",
            started.elapsed()
        );

        if !result.stderr.is_empty() {
            let (stderr, _) = excerpt(&result.stderr, STDERR_EXCERPT_CHARS);
            tracing::warn!(upload_id = %upload_id, "Model stderr: {}", stderr.trim_end());
        }

        if !result.succeeded() {
            return Err(exit_error(&result));
        }

        decode_summary(&result.stdout).map_err(|e| {
            let message = e.to_string();
            match e {
                DecodeError::ModelReported { message: reported, .. } => AppError::Invocation {
                    message,
                    details: Some(reported),
                },
                DecodeError::Malformed { source, .. } => AppError::Decode {
                    message,
                    details: Some(source.to_string()),
                },
            }
        })
    }
}

fn invocation_error(e: InvokeError) -> AppError {
    AppError::Invocation {
        message: e.to_string(),
        details: None,
    }
}

fn exit_error(result: &InvocationResult) -> AppError {
    let message = match result.exit_code {
        Some(code) => format!("Model process exited with code {}", code),
        None => "Model process was terminated by a signal".to_string(),
    };
    let details = if result.stderr.is_empty() {
        None
    } else {
        let (mut stderr, truncated) = excerpt(&result.stderr, STDERR_EXCERPT_CHARS);
        if truncated {
            stderr.push_str("...");
        }
        Some(stderr)
    };
    AppError::Invocation { message, details }
}

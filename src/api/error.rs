use crate::models::ErrorResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invocation error: {message}")]
    Invocation {
        message: String,
        details: Option<String>,
    },

    #[error("Decode error: {message}")]
    Decode {
        message: String,
        details: Option<String>,
    },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Storage(_) | AppError::Invocation { .. } | AppError::Decode { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, details) = match self {
            AppError::Validation(msg) => (msg, None),
            AppError::PayloadTooLarge(msg) => (msg, None),
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                ("Internal Server Error".to_string(), None)
            }
            AppError::Invocation { message, details } => {
                tracing::error!("Model invocation failed: {}", message);
                (message, details)
            }
            AppError::Decode { message, details } => {
                tracing::error!("Failed to decode model output: {}", message);
                (message, details)
            }
        };

        let body = ErrorResponse {
            error: message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

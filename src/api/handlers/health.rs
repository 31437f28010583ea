use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

/// Body of the liveness probe
pub const LIVENESS_MESSAGE: &str = "PDF Summarizer backend is running.";

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = String, content_type = "text/plain")
    ),
    tag = "system"
)]
pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "System health status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let model_status = if state.summarizer.invoker().health_check().await {
        "available"
    } else {
        "unavailable"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        model: model_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

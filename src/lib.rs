pub mod api;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::services::staging::StagingService;
use crate::services::summarize_service::SummarizeService;
use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Allowance for multipart boundaries and headers on top of the file limit
pub const MULTIPART_OVERHEAD: usize = 10 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::upload::upload_document,
        api::handlers::health::liveness,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::SummaryDocument,
            models::ChunkResult,
            models::ErrorResponse,
            models::UploadForm,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "summarize", description = "Document summarization"),
        (name = "system", description = "Liveness and health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub staging: Arc<StagingService>,
    pub summarizer: Arc<SummarizeService>,
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.staging.max_upload_size() + MULTIPART_OVERHEAD;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(api::handlers::health::liveness))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/upload",
            post(api::handlers::upload::upload_document)
                .layer(axum::extract::DefaultBodyLimit::max(body_limit)),
        )
        .layer(from_fn(api::middleware::metrics::metrics_middleware))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .with_state(state)
}

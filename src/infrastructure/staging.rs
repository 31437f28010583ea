use crate::api::error::AppError;
use crate::config::ServiceConfig;
use crate::services::staging::StagingService;
use std::sync::Arc;
use tracing::info;

pub async fn setup_staging(config: &ServiceConfig) -> Result<Arc<StagingService>, AppError> {
    let staging = StagingService::new(&config.staging_dir, config.max_upload_size);
    staging.ensure_dir().await?;

    info!("📂 Staging directory: {}", staging.dir().display());

    Ok(Arc::new(staging))
}

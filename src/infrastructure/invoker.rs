use crate::config::ServiceConfig;
use crate::services::invoker::{ModelInvoker, ProcessInvoker};
use std::sync::Arc;
use tracing::{info, warn};

pub async fn setup_invoker(config: &ServiceConfig) -> Arc<dyn ModelInvoker> {
    let invoker = ProcessInvoker::new(config.model_executable.clone(), config.model_args.clone())
        .with_working_dir(config.model_working_dir.clone())
        .with_timeout(config.model_timeout);

    info!(
        "🧠 Model command: {} {} <file> (timeout: {})",
        config.model_executable,
        config.model_args.join(" "),
        config
            .model_timeout
            .map(|t| format!("{}s", t.as_secs()))
            .unwrap_or_else(|| "none".to_string())
    );

    if invoker.health_check().await {
        info!("🧠 Model executable found");
    } else {
        warn!(
            "⚠️  Model executable '{}' not found! Uploads will fail until it is installed.",
            config.model_executable
        );
    }

    Arc::new(invoker)
}

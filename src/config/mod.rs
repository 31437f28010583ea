use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the summarizer service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Listening port (default: 7866)
    pub port: u16,

    /// Maximum upload size in bytes (default: 100 MB)
    pub max_upload_size: usize,

    /// Directory used to stage uploads before invocation (default: "uploads")
    pub staging_dir: PathBuf,

    /// Executable of the summarization model process (default: "python3")
    pub model_executable: String,

    /// Arguments placed before the staged file path (default: ["run_model.py"])
    pub model_args: Vec<String>,

    /// Working directory of the model process (default: inherited)
    pub model_working_dir: Option<PathBuf>,

    /// Kill the model process after this long (default: no timeout)
    pub model_timeout: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 7866,
            max_upload_size: 100 * 1024 * 1024, // 100 MB
            staging_dir: PathBuf::from("uploads"),
            model_executable: "python3".to_string(),
            model_args: vec!["run_model.py".to_string()],
            model_working_dir: None,
            model_timeout: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),

            staging_dir: env::var("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.staging_dir),

            model_executable: env::var("MODEL_EXECUTABLE").unwrap_or(default.model_executable),

            model_args: env::var("MODEL_ARGS")
                .map(|v| parse_args(&v))
                .unwrap_or(default.model_args),

            model_working_dir: env::var("MODEL_WORKING_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),

            model_timeout: env::var("MODEL_TIMEOUT_SECS")
                .ok()
                .and_then(|v| parse_timeout(&v)),
        }
    }

    /// Config for local development and tests: temp staging dir, no model args
    pub fn development() -> Self {
        Self {
            staging_dir: env::temp_dir().join("doc-summarizer-staging"),
            model_args: Vec::new(),
            model_timeout: Some(Duration::from_secs(60)),
            ..Self::default()
        }
    }
}

fn parse_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// `0` and unparsable values disable the timeout.
fn parse_timeout(raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(secs) => Some(Duration::from_secs(secs)),
    }
}

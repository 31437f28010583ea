use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// Captured output of one model run
#[derive(Debug, Clone, Default)]
pub struct InvocationResult {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl InvocationResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("Failed to start model process '{executable}': {source}")]
    Spawn {
        executable: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to collect model process output: {0}")]
    Io(#[from] io::Error),

    #[error("Model process timed out after {0:?}")]
    TimedOut(Duration),
}

/// Runs the summarization model against a staged file
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Run the model with `path` as input and wait for it to exit
    async fn invoke(&self, path: &Path) -> Result<InvocationResult, InvokeError>;

    /// Check if the model can be started
    async fn health_check(&self) -> bool;
}

/// Spawns the model as a child process: `<executable> [args...] <path>`.
///
/// The child is killed if the invocation future is dropped or the timeout
/// expires, so no process outlives its request.
pub struct ProcessInvoker {
    executable: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ProcessInvoker {
    pub fn new(executable: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            executable: executable.into(),
            args,
            working_dir: None,
            timeout: None,
        }
    }

    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, path: &Path) -> Command {
        let mut command = Command::new(&self.executable);
        command
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command
    }
}

#[async_trait]
impl ModelInvoker for ProcessInvoker {
    async fn invoke(&self, path: &Path) -> Result<InvocationResult, InvokeError> {
        let mut child = self.command(path).spawn().map_err(|source| InvokeError::Spawn {
            executable: self.executable.clone(),
            source,
        })?;
        let pid = child.id().unwrap_or_default();
        tracing::debug!(pid, "Started model process for {}", path.display());

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("model stdout was not captured"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("model stderr was not captured"))?;

        // Drain both pipes while waiting, otherwise a chatty child blocks on a
        // full pipe buffer and never exits.
        let mut out = Vec::new();
        let mut err = Vec::new();
        let run = async {
            let (status, _, _) = tokio::try_join!(
                child.wait(),
                stdout.read_to_end(&mut out),
                stderr.read_to_end(&mut err)
            )?;
            Ok::<_, io::Error>(status)
        };

        let status = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(status) => status?,
                Err(_) => {
                    tracing::warn!(pid, "Model process exceeded {:?}, killing it", limit);
                    if let Err(e) = child.kill().await {
                        tracing::error!(pid, "Failed to kill model process: {}", e);
                    }
                    return Err(InvokeError::TimedOut(limit));
                }
            },
            None => run.await?,
        };

        let result = InvocationResult {
            stdout: out,
            stderr: err,
            exit_code: status.code(),
        };
        tracing::debug!(
            pid,
            exit_code = ?result.exit_code,
            stdout_bytes = result.stdout.len(),
            stderr_bytes = result.stderr.len(),
            "Model process finished"
        );
        Ok(result)
    }

    async fn health_check(&self) -> bool {
        let exe = Path::new(&self.executable);
        if exe.components().count() > 1 {
            let resolved = match &self.working_dir {
                Some(dir) if exe.is_relative() => dir.join(exe),
                _ => exe.to_path_buf(),
            };
            return resolved.is_file();
        }

        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(exe).is_file()))
            .unwrap_or(false)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> ProcessInvoker {
        ProcessInvoker::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[tokio::test]
    async fn test_captures_streams_separately() {
        let invoker = sh(r#"printf out; printf err >&2"#);
        let result = invoker.invoke(Path::new("/tmp/ignored.pdf")).await.unwrap();

        assert_eq!(result.stdout, b"out");
        assert_eq!(result.stderr, b"err");
        assert_eq!(result.exit_code, Some(0));
        assert!(result.succeeded());
    }

    #[tokio::test]
    async fn test_path_is_last_argument() {
        // With `sh -c script arg`, the first extra argument becomes $0
        let invoker = sh(r#"printf '%s' "$0""#);
        let result = invoker
            .invoke(Path::new("/srv/uploads/upload-abc.pdf"))
            .await
            .unwrap();

        assert_eq!(result.stdout, b"/srv/uploads/upload-abc.pdf");
    }

    #[tokio::test]
    async fn test_reports_nonzero_exit() {
        let invoker = sh("echo failing >&2; exit 3");
        let result = invoker.invoke(Path::new("x")).await.unwrap();

        assert_eq!(result.exit_code, Some(3));
        assert!(!result.succeeded());
        assert_eq!(result.stderr, b"failing\n");
    }

    #[tokio::test]
    async fn test_large_output_on_both_streams_does_not_deadlock() {
        let invoker = sh("head -c 1000000 /dev/zero; head -c 1000000 /dev/zero >&2")
            .with_timeout(Some(Duration::from_secs(20)));
        let result = invoker.invoke(Path::new("x")).await.unwrap();

        assert_eq!(result.stdout.len(), 1_000_000);
        assert_eq!(result.stderr.len(), 1_000_000);
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let invoker = sh("sleep 30").with_timeout(Some(Duration::from_millis(200)));
        let started = std::time::Instant::now();

        let err = invoker.invoke(Path::new("x")).await.unwrap_err();

        assert!(matches!(err, InvokeError::TimedOut(_)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_missing_executable_is_spawn_error() {
        let invoker = ProcessInvoker::new("/nonexistent/model-binary", Vec::new());
        let err = invoker.invoke(Path::new("x")).await.unwrap_err();

        assert!(matches!(err, InvokeError::Spawn { .. }));
        assert!(!invoker.health_check().await);
    }

    #[tokio::test]
    async fn test_working_dir_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = sh("pwd").with_working_dir(Some(dir.path().to_path_buf()));
        let result = invoker.invoke(Path::new("x")).await.unwrap();

        let reported = String::from_utf8(result.stdout).unwrap();
        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(Path::new(reported.trim()).canonicalize().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_health_check_resolves_from_path() {
        assert!(sh("true").health_check().await);
    }
}

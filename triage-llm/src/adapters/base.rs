//! Base implementation for CLI-based LLM adapters.
//!
//! Concrete adapters decide how to lay out the prompt; this module owns the
//! subprocess: spawn, write stdin, wait with a deadline, read stdout.

use crate::provider::{LLMError, LLMResult};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{Duration, timeout};
use tracing::debug;

/// Default timeout in seconds for generator calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Base implementation for CLI-based LLM adapters.
///
/// # Example
///
/// ```rust,ignore
/// use triage_llm::adapters::base::CliAdapter;
///
/// let adapter = CliAdapter::new("claude")
///     .with_timeout(180)
///     .with_args(vec!["--print".to_string()]);
///
/// let response = adapter.execute("full prompt text").await?;
/// ```
#[derive(Debug, Clone)]
pub struct CliAdapter {
    /// CLI command name or full path to executable.
    pub cli_command: String,

    /// Timeout in seconds for waiting on LLM response.
    pub timeout_secs: u64,

    /// Additional arguments to pass to the CLI.
    pub extra_args: Vec<String>,
}

impl CliAdapter {
    pub fn new(cli_command: impl Into<String>) -> Self {
        Self {
            cli_command: cli_command.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            extra_args: vec![],
        }
    }

    /// Set the timeout in seconds (builder pattern).
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set additional CLI arguments (builder pattern).
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Check if the CLI command is available in the system PATH.
    pub async fn check_available(&self) -> bool {
        #[cfg(unix)]
        let check_cmd = "which";
        #[cfg(windows)]
        let check_cmd = "where";

        Command::new(check_cmd)
            .arg(&self.cli_command)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Run the CLI once, writing `input` to stdin and returning trimmed
    /// stdout.
    ///
    /// # Errors
    /// - `LLMError::CliNotFound` if the executable does not exist
    /// - `LLMError::ProcessFailed` if the CLI cannot be spawned or driven
    /// - `LLMError::Timeout` if the response takes too long
    /// - `LLMError::NonZeroExit` if the CLI returns an error
    /// - `LLMError::InvalidOutput` if the output is not valid UTF-8
    pub async fn execute(&self, input: &str) -> LLMResult<String> {
        let started = Instant::now();
        let mut cmd = Command::new(&self.cli_command);
        cmd.args(&self.extra_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LLMError::CliNotFound(self.cli_command.clone())
            } else {
                LLMError::ProcessFailed {
                    cmd: self.cli_command.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        // Stdin is fed alongside the wait, under the same deadline
        let stdin = child.stdin.take();
        let write_input = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(input.as_bytes()).await?;
                // Dropping stdin closes it to signal end of input
            }
            Ok::<(), std::io::Error>(())
        };

        let (written, output) = timeout(Duration::from_secs(self.timeout_secs), async {
            tokio::join!(write_input, child.wait_with_output())
        })
        .await
        .map_err(|_| LLMError::Timeout(self.timeout_secs))?;

        let output = output.map_err(|e| LLMError::ProcessFailed {
            cmd: self.cli_command.clone(),
            message: e.to_string(),
        })?;

        debug!(
            cli = %self.cli_command,
            input_chars = input.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generator call finished"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LLMError::NonZeroExit {
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        written.map_err(|e| LLMError::ProcessFailed {
            cmd: self.cli_command.clone(),
            message: format!("Failed to write to stdin: {}", e),
        })?;

        let response =
            String::from_utf8(output.stdout).map_err(|e| LLMError::InvalidOutput(e.to_string()))?;
        Ok(response.trim().to_string())
    }
}

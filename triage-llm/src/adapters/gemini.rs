//! Gemini CLI adapter.
//!
//! Shells out to the `gemini` CLI, which reads the prompt from stdin.

use super::base::CliAdapter;
use crate::provider::{LLMProvider, LLMResult, Message, render_transcript};
use async_trait::async_trait;

/// Adapter for the Google Gemini CLI.
#[derive(Debug, Clone)]
pub struct GeminiAdapter {
    base: CliAdapter,
}

impl GeminiAdapter {
    /// Create a new Gemini adapter.
    ///
    /// `cli_path` overrides the `gemini` executable looked up in PATH.
    pub fn new(cli_path: Option<String>) -> Self {
        let cmd = cli_path.unwrap_or_else(|| "gemini".to_string());
        Self {
            base: CliAdapter::new(cmd),
        }
    }

    pub fn with_timeout(cli_path: Option<String>, timeout_secs: u64) -> Self {
        let mut adapter = Self::new(cli_path);
        adapter.base.timeout_secs = timeout_secs;
        adapter
    }

    /// Gemini has no system-prompt syntax on stdin; the system text simply
    /// leads the message.
    fn format_gemini_prompt(&self, system: &str, user: &str) -> String {
        if system.is_empty() {
            user.to_string()
        } else {
            format!("{}\n\n{}", system.trim(), user.trim())
        }
    }
}

#[async_trait]
impl LLMProvider for GeminiAdapter {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn is_available(&self) -> bool {
        self.base.check_available().await
    }

    async fn prompt(&self, system: &str, user: &str) -> LLMResult<String> {
        self.base
            .execute(&self.format_gemini_prompt(system, user))
            .await
    }

    async fn prompt_with_history(
        &self,
        system: &str,
        history: &[Message],
        user: &str,
    ) -> LLMResult<String> {
        let transcript = render_transcript(history, "User", "Model");
        let full_user = if transcript.is_empty() {
            user.to_string()
        } else {
            format!("{}\n\nUser: {}", transcript.trim_end(), user)
        };
        self.prompt(system, &full_user).await
    }
}

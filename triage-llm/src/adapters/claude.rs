//! Claude CLI adapter.
//!
//! Shells out to `claude --print`, which reads the prompt from stdin and
//! writes the completion to stdout using the user's existing CLI login.

use super::base::CliAdapter;
use crate::provider::{LLMProvider, LLMResult, Message, render_transcript};
use async_trait::async_trait;

/// Adapter for the Claude Code CLI.
///
/// - Uses `--print` for non-interactive mode
/// - System prompt is inlined as a `[System: ...]` preamble
/// - History is rendered as a `Human:`/`Assistant:` transcript
#[derive(Debug, Clone)]
pub struct ClaudeAdapter {
    base: CliAdapter,
}

impl ClaudeAdapter {
    /// Create a new Claude adapter.
    ///
    /// `cli_path` overrides the `claude` executable looked up in PATH.
    pub fn new(cli_path: Option<String>) -> Self {
        let cmd = cli_path.unwrap_or_else(|| "claude".to_string());
        Self {
            base: CliAdapter::new(cmd).with_args(vec!["--print".to_string()]),
        }
    }

    pub fn with_timeout(cli_path: Option<String>, timeout_secs: u64) -> Self {
        let mut adapter = Self::new(cli_path);
        adapter.base.timeout_secs = timeout_secs;
        adapter
    }

    fn format_claude_prompt(&self, system: &str, user: &str) -> String {
        if system.is_empty() {
            user.to_string()
        } else {
            format!("[System: {}]\n\n{}", system.trim(), user.trim())
        }
    }
}

#[async_trait]
impl LLMProvider for ClaudeAdapter {
    fn name(&self) -> &str {
        "claude"
    }

    async fn is_available(&self) -> bool {
        self.base.check_available().await
    }

    async fn prompt(&self, system: &str, user: &str) -> LLMResult<String> {
        self.base
            .execute(&self.format_claude_prompt(system, user))
            .await
    }

    async fn prompt_with_history(
        &self,
        system: &str,
        history: &[Message],
        user: &str,
    ) -> LLMResult<String> {
        let transcript = render_transcript(history, "Human", "Assistant");
        let full_user = if transcript.is_empty() {
            user.to_string()
        } else {
            format!("{}\n\nHuman: {}", transcript.trim_end(), user)
        };
        self.prompt(system, &full_user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::LLMError;

    #[test]
    fn test_new_default_command() {
        let adapter = ClaudeAdapter::new(None);
        assert_eq!(adapter.base.cli_command, "claude");
        assert!(adapter.base.extra_args.contains(&"--print".to_string()));
    }

    #[test]
    fn test_with_timeout() {
        let adapter = ClaudeAdapter::with_timeout(Some("/opt/claude".to_string()), 30);
        assert_eq!(adapter.base.cli_command, "/opt/claude");
        assert_eq!(adapter.base.timeout_secs, 30);
    }

    #[test]
    fn test_format_prompt() {
        let adapter = ClaudeAdapter::new(None);
        assert_eq!(
            adapter.format_claude_prompt("Be terse", " Hello "),
            "[System: Be terse]\n\nHello"
        );
        assert_eq!(adapter.format_claude_prompt("", "Hello"), "Hello");
    }

    #[tokio::test]
    async fn test_prompt_cli_not_found() {
        let adapter = ClaudeAdapter::new(Some("nonexistent-claude-fake-12345".to_string()));
        assert!(!adapter.is_available().await);

        let result = adapter.prompt("system", "user").await;
        assert!(matches!(result, Err(LLMError::CliNotFound(_))));
    }
}

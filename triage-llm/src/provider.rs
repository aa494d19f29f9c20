//! LLM provider trait and error types.
//!
//! Triage never calls a model API directly. Providers shell out to a coding
//! agent CLI (Claude, Gemini) and treat it as an unreliable text generator:
//! the completion is raw text that may or may not contain the JSON we asked
//! for.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LLMError {
    /// Failed to spawn the CLI process.
    #[error("Failed to spawn process '{cmd}': {message}")]
    ProcessFailed { cmd: String, message: String },

    /// Process exited with non-zero status.
    #[error("Process exited with code {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    /// Output was not valid UTF-8.
    #[error("Invalid output from LLM: {0}")]
    InvalidOutput(String),

    /// CLI command not found in PATH.
    #[error("LLM CLI not found: {0}. Is it installed and in your PATH?")]
    CliNotFound(String),

    /// Timeout waiting for LLM response.
    #[error("Timeout waiting for LLM response after {0} seconds")]
    Timeout(u64),

    /// Provider not configured or unknown.
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// I/O error during process communication.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LLMError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, LLMError::Timeout(_))
    }
}

/// Result type for LLM operations.
pub type LLMResult<T> = Result<T, LLMError>;

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Render prior turns as a plain transcript, one block per message.
///
/// `user_tag` and `assistant_tag` are the speaker prefixes the target CLI
/// expects (e.g. `Human`/`Assistant`).
pub fn render_transcript(history: &[Message], user_tag: &str, assistant_tag: &str) -> String {
    let mut transcript = String::new();
    for msg in history {
        let tag = match msg.role {
            Role::User => user_tag,
            Role::Assistant => assistant_tag,
        };
        transcript.push_str(tag);
        transcript.push_str(": ");
        transcript.push_str(msg.content.trim());
        transcript.push_str("\n\n");
    }
    transcript
}

/// Trait for LLM providers.
///
/// Implementations shell out to coding agent CLIs rather than making direct
/// API calls, reusing the user's existing CLI authentication.
///
/// # Example
///
/// ```rust,ignore
/// use triage_llm::provider::{LLMProvider, LLMResult};
///
/// async fn example(provider: &dyn LLMProvider) -> LLMResult<String> {
///     provider.prompt("You are a triage assistant.", "Classify this issue").await
/// }
/// ```
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Provider name (e.g., "claude", "gemini").
    fn name(&self) -> &str;

    /// Check if the CLI is available in the system PATH.
    ///
    /// This checks whether the command can be executed, not whether
    /// authentication is valid.
    async fn is_available(&self) -> bool;

    /// Send a prompt and get the raw completion text.
    ///
    /// # Errors
    /// Returns an error if the CLI is not available, times out, or exits
    /// with a failure status.
    async fn prompt(&self, system: &str, user: &str) -> LLMResult<String>;

    /// Send a prompt preceded by prior conversation turns.
    ///
    /// The default implementation inlines the history as a transcript ahead
    /// of the user message, so a single CLI invocation sees every turn.
    async fn prompt_with_history(
        &self,
        system: &str,
        history: &[Message],
        user: &str,
    ) -> LLMResult<String> {
        if history.is_empty() {
            return self.prompt(system, user).await;
        }
        let transcript = render_transcript(history, "User", "Assistant");
        let full_user = format!("{}\n\nUser: {}", transcript.trim_end(), user);
        self.prompt(system, &full_user).await
    }
}

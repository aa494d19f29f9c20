//! LLM CLI adapters for coding agent tools.
//!
//! - [`ClaudeAdapter`] for the Claude Code CLI (`claude`)
//! - [`GeminiAdapter`] for the Gemini CLI (`gemini`)
//!
//! Both share [`base::CliAdapter`] for subprocess handling and timeouts.

pub mod base;
pub mod claude;
pub mod gemini;

pub use claude::ClaudeAdapter;
pub use gemini::GeminiAdapter;

use crate::provider::{LLMError, LLMProvider, LLMResult};
use std::sync::Arc;

/// Provider names accepted by [`create_provider`].
pub const SUPPORTED_PROVIDERS: &[&str] = &["claude", "gemini"];

/// Build the adapter for a provider name.
///
/// # Errors
/// `LLMError::NotConfigured` for a name outside [`SUPPORTED_PROVIDERS`].
pub fn create_provider(
    name: &str,
    cli_path: Option<String>,
    timeout_secs: u64,
) -> LLMResult<Arc<dyn LLMProvider>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "claude" => Ok(Arc::new(ClaudeAdapter::with_timeout(cli_path, timeout_secs))),
        "gemini" => Ok(Arc::new(GeminiAdapter::with_timeout(cli_path, timeout_secs))),
        other => Err(LLMError::NotConfigured(format!(
            "unknown provider '{}', expected one of: {}",
            other,
            SUPPORTED_PROVIDERS.join(", ")
        ))),
    }
}

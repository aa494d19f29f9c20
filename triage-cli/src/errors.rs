//! User-facing error reporting.
//!
//! Every failure a command can hit is a [`CliError`]; [`CliError::report`]
//! turns it into an [`ErrorReport`] with a title, a description and concrete
//! suggestions. The mapping from [`ErrorKind`] is fixed.

use crate::commands::init::InitError;
use crate::config::ConfigError;
use serde::Serialize;
use thiserror::Error;
use triage_survey::{ErrorKind, TriageError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Triage(#[from] TriageError),

    #[error(transparent)]
    Init(#[from] InitError),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to start async runtime: {0}")]
    Runtime(String),

    #[error("'{command}' does not support --format {format}")]
    UnsupportedFormat { command: &'static str, format: String },
}

/// What the user sees when a command fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    /// Stable machine-readable category
    pub kind: String,
    pub title: String,
    pub description: String,
    pub suggestions: Vec<String>,
}

impl CliError {
    /// Category of this failure, if it came from a Triage operation.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            CliError::Triage(e) => Some(e.kind()),
            _ => None,
        }
    }

    pub fn report(&self) -> ErrorReport {
        match self {
            CliError::Triage(e) => report_for_kind(e.kind(), &e.to_string()),
            CliError::Config(ConfigError::EnvVarMissing(var)) => ErrorReport {
                kind: "configuration".to_string(),
                title: "Token not set".to_string(),
                description: self.to_string(),
                suggestions: vec![format!(
                    "Set {} to a personal access token with 'repo' scope:\n  export {}=ghp_xxxx",
                    var, var
                )],
            },
            CliError::Config(_) => ErrorReport {
                kind: "configuration".to_string(),
                title: "Configuration problem".to_string(),
                description: self.to_string(),
                suggestions: vec![
                    "Run 'triage init' to create a fresh triage.yaml".to_string(),
                    "Use --config to point at a different file".to_string(),
                ],
            },
            CliError::Init(InitError::FileExists { .. }) => ErrorReport {
                kind: "configuration".to_string(),
                title: "Configuration file exists".to_string(),
                description: self.to_string(),
                suggestions: vec![
                    "Re-run with --force to overwrite it".to_string(),
                    "Use --output to write somewhere else".to_string(),
                ],
            },
            CliError::Init(_) => ErrorReport {
                kind: "configuration".to_string(),
                title: "Could not write configuration".to_string(),
                description: self.to_string(),
                suggestions: vec![
                    "Supported providers are 'claude' and 'gemini'".to_string(),
                    "Check that the output directory is writable".to_string(),
                ],
            },
            CliError::UnsupportedFormat { .. } => ErrorReport {
                kind: ErrorKind::InvalidInput.as_str().to_string(),
                title: "Unsupported output format".to_string(),
                description: self.to_string(),
                suggestions: vec![
                    "Use --format markdown or --format json".to_string(),
                    "Mermaid output is available for 'triage deps' only".to_string(),
                ],
            },
            CliError::Io(_) | CliError::Serialization(_) | CliError::Runtime(_) => ErrorReport {
                kind: "internal".to_string(),
                title: "Unexpected failure".to_string(),
                description: self.to_string(),
                suggestions: vec!["Re-run with -v for detailed logs".to_string()],
            },
        }
    }

    /// Format error with suggestions for terminal output.
    pub fn format_for_cli(&self) -> String {
        let report = self.report();
        let mut output = format!("{}: {}", report.title, report.description);

        if !report.suggestions.is_empty() {
            output.push_str("\n\nSuggestions:");
            for suggestion in &report.suggestions {
                output.push_str(&format!("\n  - {}", suggestion));
            }
        }

        output
    }
}

/// Deterministic title and suggestions for each error kind.
pub fn report_for_kind(kind: ErrorKind, description: &str) -> ErrorReport {
    let (title, suggestions): (&str, &[&str]) = match kind {
        ErrorKind::NotFound => (
            "Issue or repository not found",
            &[
                "Check the repository name (owner/name) and the issue number",
                "Private repositories need a token: set GITHUB_TOKEN",
            ],
        ),
        ErrorKind::AccessDenied => (
            "Access denied",
            &[
                "Check that your token is valid and not expired",
                "Private repositories need a token with 'repo' scope",
            ],
        ),
        ErrorKind::RateLimited => (
            "GitHub rate limit reached",
            &[
                "Set GITHUB_TOKEN to raise the limit from 60 to 5,000 requests per hour",
                "Wait a few minutes and try again",
            ],
        ),
        ErrorKind::Timeout => (
            "Request timed out",
            &[
                "Try again; the service may be slow right now",
                "Raise github.timeout_secs or llm.timeout_secs in triage.yaml",
            ],
        ),
        ErrorKind::MalformedOutput => (
            "The AI response could not be read",
            &[
                "Try again; output varies between runs",
                "Use --refresh to bypass any cached result",
            ],
        ),
        ErrorKind::Validation => (
            "The AI response failed validation",
            &[
                "Try again; output varies between runs",
                "Try a different provider with TRIAGE_LLM_PROVIDER",
            ],
        ),
        ErrorKind::InvalidInput => (
            "Invalid input",
            &[
                "Repositories are 'owner/name' or https://github.com/owner/name",
                "Issue lists look like '1-5,8,10'",
            ],
        ),
        ErrorKind::Network => (
            "Network error",
            &[
                "Check your internet connection",
                "For GitHub Enterprise, check github.api_url in triage.yaml",
            ],
        ),
        ErrorKind::Generator => (
            "AI provider unavailable",
            &[
                "Make sure the provider CLI (claude or gemini) is installed and on PATH",
                "Run the CLI once by hand to complete its login",
                "Set llm.cli_path in triage.yaml if it lives elsewhere",
            ],
        ),
    };

    ErrorReport {
        kind: kind.as_str().to_string(),
        title: title.to_string(),
        description: description.to_string(),
        suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_survey::GitHubError;

    #[test]
    fn test_triage_error_report() {
        let error: CliError = TriageError::from(GitHubError::RateLimited("API rate limit exceeded".into())).into();
        let report = error.report();
        assert_eq!(report.kind, "rate_limited");
        assert_eq!(report.title, "GitHub rate limit reached");
        assert!(report.description.contains("API rate limit exceeded"));
        assert!(report.suggestions.iter().any(|s| s.contains("GITHUB_TOKEN")));
        assert_eq!(error.kind(), Some(ErrorKind::RateLimited));
    }

    #[test]
    fn test_every_kind_has_suggestions() {
        for kind in [
            ErrorKind::NotFound,
            ErrorKind::AccessDenied,
            ErrorKind::RateLimited,
            ErrorKind::Timeout,
            ErrorKind::MalformedOutput,
            ErrorKind::Validation,
            ErrorKind::InvalidInput,
            ErrorKind::Network,
            ErrorKind::Generator,
        ] {
            let report = report_for_kind(kind, "x");
            assert!(!report.title.is_empty());
            assert!(!report.suggestions.is_empty());
            assert_eq!(report.kind, kind.as_str());
        }
    }

    #[test]
    fn test_missing_token_report() {
        let error = CliError::Config(ConfigError::EnvVarMissing("GITHUB_TOKEN".into()));
        assert!(error.report().suggestions[0].contains("export GITHUB_TOKEN"));
        assert_eq!(error.kind(), None);
    }

    #[test]
    fn test_format_for_cli() {
        let error: CliError = TriageError::InvalidInput("bad repo".into()).into();
        let formatted = error.format_for_cli();
        assert!(formatted.starts_with("Invalid input: bad repo"));
        assert!(formatted.contains("Suggestions:"));
    }
}

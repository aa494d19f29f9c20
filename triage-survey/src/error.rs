//! Error taxonomy shared by every Triage operation.

use crate::github::GitHubError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use triage_graph::{GraphError, RepoIdError};
use triage_llm::{AnalysisError, LLMError};

/// Coarse failure category, stable across error sources.
///
/// Callers branch on the kind; the message carries the detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    AccessDenied,
    RateLimited,
    Timeout,
    MalformedOutput,
    Validation,
    InvalidInput,
    Network,
    Generator,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AccessDenied => "access_denied",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Timeout => "timeout",
            ErrorKind::MalformedOutput => "malformed_output",
            ErrorKind::Validation => "validation",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Network => "network",
            ErrorKind::Generator => "generator",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any failure of a Triage request.
#[derive(Debug, Error)]
pub enum TriageError {
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    InvalidRepo(#[from] RepoIdError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("{0}")]
    InvalidInput(String),
}

impl TriageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TriageError::GitHub(e) => e.kind(),
            TriageError::Analysis(e) => analysis_kind(e),
            TriageError::InvalidRepo(_) | TriageError::InvalidInput(_) | TriageError::Graph(_) => {
                ErrorKind::InvalidInput
            }
        }
    }
}

fn analysis_kind(error: &AnalysisError) -> ErrorKind {
    match error {
        AnalysisError::MalformedOutput { .. } => ErrorKind::MalformedOutput,
        AnalysisError::Validation(_) => ErrorKind::Validation,
        AnalysisError::Generator(LLMError::Timeout(_)) => ErrorKind::Timeout,
        AnalysisError::Generator(_) => ErrorKind::Generator,
    }
}

/// Result type for Triage operations.
pub type TriageResult<T> = Result<T, TriageError>;

#[cfg(test)]
mod tests {
    use super::*;
    use triage_llm::ValidationError;

    #[test]
    fn test_kinds() {
        let err: TriageError = GitHubError::NotFound("acme/app#9".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: TriageError = AnalysisError::Generator(LLMError::Timeout(180)).into();
        assert_eq!(err.kind(), ErrorKind::Timeout);

        let err: TriageError =
            AnalysisError::Generator(LLMError::CliNotFound("claude".to_string())).into();
        assert_eq!(err.kind(), ErrorKind::Generator);

        let err: TriageError = AnalysisError::Validation(ValidationError::MissingField("summary")).into();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err: TriageError = RepoIdError::EmptySegment.into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::MalformedOutput).unwrap(),
            "\"malformed_output\""
        );
        assert_eq!(ErrorKind::RateLimited.to_string(), "rate_limited");
    }
}

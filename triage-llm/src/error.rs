//! Error types for issue analysis.

use crate::analysis::ValidationError;
use crate::provider::LLMError;
use crate::repair::StageFailure;
use thiserror::Error;

/// Why an analysis could not be produced.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No repair stage recovered a JSON object from the generator output.
    #[error("generator output is not valid JSON ({})", describe_failures(.failures))]
    MalformedOutput {
        failures: Vec<StageFailure>,
        /// Leading part of the raw output, for diagnostics
        excerpt: String,
    },

    /// A JSON object was recovered but violates the record schema.
    #[error("generator output failed validation: {0}")]
    Validation(#[from] ValidationError),

    /// The generator itself failed (missing CLI, non-zero exit, timeout).
    #[error("generator call failed: {0}")]
    Generator(#[from] LLMError),
}

fn describe_failures(failures: &[StageFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

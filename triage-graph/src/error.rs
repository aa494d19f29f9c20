//! Error types for the triage-graph crate.

use crate::edge::ReferenceType;
use thiserror::Error;

/// Errors raised while parsing a repository identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoIdError {
    #[error("Invalid repository format '{0}': expected 'owner/name' or a GitHub URL")]
    InvalidFormat(String),

    #[error("Unsupported repository host: {0}")]
    UnsupportedHost(String),

    #[error("Repository owner and name must not be empty")]
    EmptySegment,

    #[error("Invalid character in repository identifier: '{0}'")]
    InvalidCharacter(char),
}

/// Errors related to Edge construction.
#[derive(Debug, Error)]
pub enum EdgeError {
    #[error("Issue #{0} cannot reference itself")]
    SelfLoop(u64),
}

/// Errors related to Graph operations.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Issue already in graph: #{0}")]
    DuplicateNode(u64),

    #[error("Issue not in graph: #{0}")]
    NodeNotFound(u64),

    #[error("Edge already exists: #{source_issue} --{reference_type}--> #{target_issue}")]
    DuplicateEdge {
        source_issue: u64,
        target_issue: u64,
        reference_type: ReferenceType,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Edge error: {0}")]
    EdgeError(#[from] EdgeError),
}

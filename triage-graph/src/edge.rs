//! Reference edges between issues.

use crate::error::EdgeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How one issue refers to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    /// "fixes #N", "resolves #N"
    /// Direction: fixing issue → fixed issue
    Fixes,

    /// "closes #N"
    /// Direction: closing issue → closed issue
    Closes,

    /// "blocks #N"
    /// Direction: blocker → blocked
    Blocks,

    /// "blocked by #N", "depends on #N"
    /// Direction: blocked → blocker
    BlockedBy,

    /// Any other `#N` reference
    Mentions,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Fixes => "fixes",
            ReferenceType::Closes => "closes",
            ReferenceType::Blocks => "blocks",
            ReferenceType::BlockedBy => "blocked_by",
            ReferenceType::Mentions => "mentions",
        }
    }

    /// Whether the reference resolves its target when merged.
    pub fn is_closing(&self) -> bool {
        matches!(self, ReferenceType::Fixes | ReferenceType::Closes)
    }

    /// Whether the reference expresses a blocking relationship.
    pub fn is_blocking(&self) -> bool {
        matches!(self, ReferenceType::Blocks | ReferenceType::BlockedBy)
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed reference from `source` to `target`, keyed by issue number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueEdge {
    pub source: u64,
    pub target: u64,

    #[serde(rename = "type")]
    pub reference_type: ReferenceType,

    /// Text surrounding the reference where it was detected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl IssueEdge {
    /// Create an edge. Self references are rejected.
    pub fn new(source: u64, target: u64, reference_type: ReferenceType) -> Result<Self, EdgeError> {
        if source == target {
            return Err(EdgeError::SelfLoop(source));
        }
        Ok(Self {
            source,
            target,
            reference_type,
            context: None,
        })
    }

    /// Attach the detection context (builder pattern).
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Identity used for duplicate collapsing.
    pub fn key(&self) -> (u64, u64, ReferenceType) {
        (self.source, self.target, self.reference_type)
    }
}

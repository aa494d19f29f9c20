//! Structured analysis record and its validation.
//!
//! Generator output is validated field by field from a `serde_json::Value`
//! rather than deserialized directly, so every violation maps to a precise
//! [`ValidationError`]. Nothing is clamped or coerced.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MIN_PRIORITY: i64 = 1;
pub const MAX_PRIORITY: i64 = 5;

/// Issue classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Bug,
    FeatureRequest,
    Documentation,
    Question,
    Other,
}

impl IssueType {
    pub const ALL: [IssueType; 5] = [
        IssueType::Bug,
        IssueType::FeatureRequest,
        IssueType::Documentation,
        IssueType::Question,
        IssueType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Bug => "bug",
            IssueType::FeatureRequest => "feature_request",
            IssueType::Documentation => "documentation",
            IssueType::Question => "question",
            IssueType::Other => "other",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = ValidationError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        IssueType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownType(s.to_string()))
    }
}

/// A field-level validation failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field '{field}' is {value}, outside {range}")]
    OutOfRange {
        field: &'static str,
        value: String,
        range: &'static str,
    },

    #[error("unknown issue type '{0}', expected one of: bug, feature_request, documentation, question, other")]
    UnknownType(String),
}

/// Validated triage output for one issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// One-sentence summary
    pub summary: String,

    #[serde(rename = "type")]
    pub issue_type: IssueType,

    /// 1 (minimal) to 5 (critical)
    pub priority_score: u8,

    pub priority_justification: String,

    /// Ordered, duplicate-free
    pub suggested_labels: Vec<String>,

    pub potential_impact: String,

    /// 0.0 to 1.0
    pub confidence_score: f64,

    /// Suggested maintainer reply
    pub draft_response: String,
}

impl AnalysisRecord {
    /// Validate a generator-produced JSON object.
    ///
    /// Unknown extra fields are ignored. Repeated labels collapse to their
    /// first occurrence and blank labels are dropped. Strings are kept as
    /// written, so a serialized record validates back to itself.
    pub fn from_json_object(object: &Map<String, Value>) -> Result<Self, ValidationError> {
        let summary = string_field(object, "summary")?;

        let type_text = string_field(object, "type")?;
        let issue_type = type_text.parse::<IssueType>()?;

        let priority_score = priority_field(object)?;
        let priority_justification = string_field(object, "priority_justification")?;
        let suggested_labels = labels_field(object)?;
        let potential_impact = string_field(object, "potential_impact")?;
        let confidence_score = confidence_field(object)?;
        let draft_response = string_field(object, "draft_response")?;

        Ok(Self {
            summary,
            issue_type,
            priority_score,
            priority_justification,
            suggested_labels,
            potential_impact,
            confidence_score,
            draft_response,
        })
    }
}

fn required<'a>(object: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value, ValidationError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(field)),
        Some(value) => Ok(value),
    }
}

fn string_field(object: &Map<String, Value>, field: &'static str) -> Result<String, ValidationError> {
    required(object, field)?
        .as_str()
        .map(str::to_string)
        .ok_or(ValidationError::WrongType {
            field,
            expected: "a string",
        })
}

fn priority_field(object: &Map<String, Value>) -> Result<u8, ValidationError> {
    const FIELD: &str = "priority_score";
    let value = required(object, FIELD)?;
    let score = value.as_i64().ok_or(ValidationError::WrongType {
        field: FIELD,
        expected: "an integer",
    })?;
    if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&score) {
        return Err(ValidationError::OutOfRange {
            field: FIELD,
            value: score.to_string(),
            range: "1..=5",
        });
    }
    Ok(score as u8)
}

fn confidence_field(object: &Map<String, Value>) -> Result<f64, ValidationError> {
    const FIELD: &str = "confidence_score";
    let value = required(object, FIELD)?;
    let score = value.as_f64().ok_or(ValidationError::WrongType {
        field: FIELD,
        expected: "a number",
    })?;
    if !(0.0..=1.0).contains(&score) {
        return Err(ValidationError::OutOfRange {
            field: FIELD,
            value: score.to_string(),
            range: "0.0..=1.0",
        });
    }
    Ok(score)
}

fn labels_field(object: &Map<String, Value>) -> Result<Vec<String>, ValidationError> {
    const FIELD: &str = "suggested_labels";
    let wrong_type = ValidationError::WrongType {
        field: FIELD,
        expected: "an array of strings",
    };
    let items = required(object, FIELD)?
        .as_array()
        .ok_or_else(|| wrong_type.clone())?;

    let mut labels: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let label = item.as_str().ok_or_else(|| wrong_type.clone())?;
        if !label.trim().is_empty() && !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }
    Ok(labels)
}

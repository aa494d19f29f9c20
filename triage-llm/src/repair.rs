//! Recovery of a JSON object from raw generator output.
//!
//! Generators asked for "JSON only" still wrap it in prose, fence it in
//! markdown or trail explanations after it. Each repair stage is a pure
//! function tried in order; the first one that yields a JSON object wins and
//! its object is validated into an [`AnalysisRecord`].

use crate::analysis::AnalysisRecord;
use crate::error::AnalysisError;
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

/// Characters of raw output kept in a `MalformedOutput` error.
const EXCERPT_CHARS: usize = 200;

/// Why one repair stage produced nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub stage: &'static str,
    pub reason: String,
}

impl StageFailure {
    fn new(stage: &'static str, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.reason)
    }
}

type Stage = fn(&str) -> Result<Map<String, Value>, StageFailure>;

/// Repair stages in the order they are tried.
const STAGES: &[Stage] = &[whole_document, fenced_block, balanced_braces];

/// Parses and validates generator output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseRepairParser;

impl ResponseRepairParser {
    /// Extract and validate an analysis from `raw`.
    ///
    /// # Errors
    /// - `AnalysisError::MalformedOutput` when no stage finds a JSON object
    /// - `AnalysisError::Validation` when the first object found is invalid
    pub fn parse(&self, raw: &str) -> Result<AnalysisRecord, AnalysisError> {
        let object = self.extract_object(raw)?;
        Ok(AnalysisRecord::from_json_object(&object)?)
    }

    /// Run the stages until one yields a JSON object.
    pub fn extract_object(&self, raw: &str) -> Result<Map<String, Value>, AnalysisError> {
        let mut failures = Vec::with_capacity(STAGES.len());
        for stage in STAGES {
            match stage(raw) {
                Ok(object) => {
                    if !failures.is_empty() {
                        debug!(recovered_after = failures.len(), "repaired generator output");
                    }
                    return Ok(object);
                }
                Err(failure) => failures.push(failure),
            }
        }

        let (excerpt, _) = triage_graph::truncate_chars(raw.trim(), EXCERPT_CHARS);
        Err(AnalysisError::MalformedOutput { failures, excerpt })
    }
}

fn parse_object(stage: &'static str, text: &str) -> Result<Map<String, Value>, StageFailure> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(other) => Err(StageFailure::new(
            stage,
            format!("expected a JSON object, found {}", json_kind(&other)),
        )),
        Err(e) => Err(StageFailure::new(stage, e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Stage 1: the whole output is the object.
fn whole_document(raw: &str) -> Result<Map<String, Value>, StageFailure> {
    parse_object("whole", raw.trim())
}

/// Stage 2: the interior of the first triple-backtick fence, with or without
/// a language tag.
fn fenced_block(raw: &str) -> Result<Map<String, Value>, StageFailure> {
    const STAGE: &str = "fenced";
    let open = raw
        .find("```")
        .ok_or_else(|| StageFailure::new(STAGE, "no fenced code block"))?;
    let after_fence = &raw[open + 3..];

    // The language tag, if any, runs to the end of the opening line
    let body_start = match after_fence.find('\n') {
        Some(newline) if !after_fence[..newline].trim().contains(char::is_whitespace) => newline + 1,
        _ => 0,
    };
    let body = &after_fence[body_start..];

    let close = body
        .find("```")
        .ok_or_else(|| StageFailure::new(STAGE, "unterminated fenced code block"))?;
    parse_object(STAGE, body[..close].trim())
}

/// Stage 3: the first top-level `{...}` span that parses, tracking string
/// literals and escapes so braces inside strings don't count.
fn balanced_braces(raw: &str) -> Result<Map<String, Value>, StageFailure> {
    const STAGE: &str = "balanced";
    let mut last_error = None;

    for (start, end) in top_level_objects(raw) {
        match parse_object(STAGE, &raw[start..=end]) {
            Ok(object) => return Ok(object),
            Err(failure) => last_error = Some(failure),
        }
    }

    Err(last_error.unwrap_or_else(|| StageFailure::new(STAGE, "no balanced {...} span")))
}

/// Byte ranges (inclusive) of every top-level balanced brace span.
fn top_level_objects(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut depth: usize = 0;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        spans.push((s, i));
                    }
                }
            }
            _ => {}
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{IssueType, ValidationError};
    use pretty_assertions::assert_eq;

    const VALID: &str = r#"{"summary": "Crash on login", "type": "bug", "priority_score": 4,
        "priority_justification": "Core flow", "suggested_labels": ["bug", "auth"],
        "potential_impact": "Users locked out", "confidence_score": 0.8,
        "draft_response": "Thanks {for} the report \"quoted\""}"#;

    fn parse(raw: &str) -> Result<AnalysisRecord, AnalysisError> {
        ResponseRepairParser.parse(raw)
    }

    #[test]
    fn test_plain_json() {
        let record = parse(VALID).unwrap();
        assert_eq!(record.issue_type, IssueType::Bug);
        assert_eq!(record.draft_response, "Thanks {for} the report \"quoted\"");
    }

    #[test]
    fn test_fenced_json_inside_prose() {
        let raw = format!("Here's my analysis:\n```json\n{VALID}\n```\nHope this helps!");
        assert_eq!(parse(&raw).unwrap(), parse(VALID).unwrap());
    }

    #[test]
    fn test_fence_without_language_tag() {
        let raw = format!("```\n{VALID}\n```");
        assert!(parse(&raw).is_ok());
    }

    #[test]
    fn test_balanced_braces_with_trailing_prose() {
        let raw = format!("Sure! {VALID} Let me know if you need {{more}}.");
        assert_eq!(parse(&raw).unwrap().priority_score, 4);
    }

    #[test]
    fn test_prose_only_is_malformed() {
        let err = parse("I'm sorry, I can't analyze this issue.").unwrap_err();
        match err {
            AnalysisError::MalformedOutput { failures, excerpt } => {
                let stages: Vec<&str> = failures.iter().map(|f| f.stage).collect();
                assert_eq!(stages, vec!["whole", "fenced", "balanced"]);
                assert!(excerpt.starts_with("I'm sorry"));
            }
            other => panic!("expected MalformedOutput, got {other:?}"),
        }
    }

    #[test]
    fn test_array_is_not_an_object() {
        let err = parse("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedOutput { .. }));
    }

    #[test]
    fn test_first_object_is_validated_not_skipped() {
        let raw = VALID.replace("\"priority_score\": 4", "\"priority_score\": 7");
        let err = parse(&format!("```json\n{raw}\n```")).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Validation(ValidationError::OutOfRange { field: "priority_score", .. })
        ));
    }

    #[test]
    fn test_serialized_record_survives_fence_and_prose() {
        let confidences = [0.0, 1.0, 0.1 + 0.2, 1.0 / 3.0, 0.9856906946328695, 0.7000000000000001];
        for (i, confidence_score) in confidences.into_iter().enumerate() {
            let record = AnalysisRecord {
                summary: format!("  Crash #{i} on login\n"),
                issue_type: IssueType::ALL[i % IssueType::ALL.len()],
                priority_score: (i % 5) as u8 + 1,
                priority_justification: "Breaks {every} \"SSO\" user".to_string(),
                suggested_labels: vec![" bug".to_string(), "auth/sso".to_string(), "bug".to_string()],
                potential_impact: "Ünïcödé\tand tabs".to_string(),
                confidence_score,
                draft_response: String::new(),
            };
            let json = serde_json::to_string(&record).unwrap();
            let raw = format!("Sure! Here's the analysis:\n```json\n{json}\n```\nHope that helps!");
            assert_eq!(parse(&raw).unwrap(), record);
        }
    }

    #[test]
    fn test_top_level_spans_skip_string_braces() {
        let text = r#"a {"k": "}{"} b {"x": {"y": 1}}"#;
        let spans = top_level_objects(text);
        assert_eq!(spans.len(), 2);
        assert_eq!(&text[spans[0].0..=spans[0].1], r#"{"k": "}{"}"#);
        assert_eq!(&text[spans[1].0..=spans[1].1], r#"{"x": {"y": 1}}"#);
    }
}

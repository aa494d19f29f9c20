//! JSON serializer for command results.
//!
//! Every document is an envelope. Successful commands flatten their report
//! next to `"success": true`; failures carry an [`ErrorReport`].
//!
//! ## Output Schema
//!
//! ```json
//! { "success": true, "generated_at": "2025-01-15T10:30:00Z", "repo": "acme/widgets", ... }
//! { "success": false, "error": { "kind": "not_found", "title": "...", "description": "...", "suggestions": [...] } }
//! ```

use crate::errors::ErrorReport;
use chrono::Utc;
use serde::Serialize;

#[derive(Serialize)]
struct SuccessEnvelope<'a, T: Serialize> {
    success: bool,
    generated_at: String,
    #[serde(flatten)]
    report: &'a T,
}

#[derive(Serialize)]
struct FailureEnvelope<'a> {
    success: bool,
    error: &'a ErrorReport,
}

/// JSON serializer for command results.
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Wrap `report` in a success envelope.
    ///
    /// # Errors
    ///
    /// Fails if `report` does not serialize to a JSON object.
    pub fn success<T: Serialize>(&self, report: &T) -> Result<String, serde_json::Error> {
        let envelope = SuccessEnvelope {
            success: true,
            generated_at: Utc::now().to_rfc3339(),
            report,
        };
        serde_json::to_string_pretty(&envelope)
    }

    /// Wrap an error report in a failure envelope.
    pub fn failure(&self, error: &ErrorReport) -> String {
        let envelope = FailureEnvelope { success: false, error };
        serde_json::to_string_pretty(&envelope).unwrap_or_else(|e| {
            format!(
                "{{\"success\": false, \"error\": {{\"kind\": \"internal\", \"description\": \"{}\"}}}}",
                e
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::LabelsReport;
    use pretty_assertions::assert_eq;
    use triage_survey::{LabelOutcome, LabelReport};

    #[test]
    fn test_success_envelope_flattens_report() {
        let report = LabelsReport::new(
            "acme/widgets",
            vec![LabelReport {
                name: "bug".to_string(),
                color: "d73a4a".to_string(),
                outcome: LabelOutcome::Created,
            }],
        );

        let output = JsonSerializer::new().success(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["repo"], "acme/widgets");
        assert_eq!(value["created"], 1);
        assert_eq!(value["labels"][0]["status"], "created");
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_failure_envelope() {
        let error = ErrorReport {
            kind: "not_found".to_string(),
            title: "Issue or repository not found".to_string(),
            description: "Not found: issue #99".to_string(),
            suggestions: vec!["Check the issue number".to_string()],
        };

        let value: serde_json::Value = serde_json::from_str(&JsonSerializer::new().failure(&error)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "success": false,
                "error": {
                    "kind": "not_found",
                    "title": "Issue or repository not found",
                    "description": "Not found: issue #99",
                    "suggestions": ["Check the issue number"]
                }
            })
        );
    }

    #[test]
    fn test_non_object_report_fails() {
        assert!(JsonSerializer::new().success(&vec![1, 2, 3]).is_err());
    }
}

//! Label materialization: create suggested labels on a repository.

use crate::github::{GitHubClient, GitHubError};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};
use triage_graph::RepoId;

/// Description attached to every label we create.
pub const LABEL_DESCRIPTION: &str = "Auto-generated by Triage";

/// Color used when no keyword matches.
pub const DEFAULT_LABEL_COLOR: &str = "ededed";

/// Keyword → color, first match wins.
const LABEL_COLORS: &[(&str, &str)] = &[
    ("bug", "d73a4a"),
    ("feature", "a2eeef"),
    ("enhancement", "a2eeef"),
    ("documentation", "0075ca"),
    ("question", "d876e3"),
    ("help wanted", "008672"),
    ("good first issue", "7057ff"),
    ("critical", "b60205"),
    ("high", "d93f0b"),
    ("priority", "fbca04"),
    ("medium", "fbca04"),
    ("low", "0e8a16"),
];

/// Pick a hex color (without `#`) for a label name.
pub fn label_color(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    LABEL_COLORS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_LABEL_COLOR)
}

/// Result of one successful create request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelWrite {
    Created,
    AlreadyExists,
}

/// Something that can create labels on a repository.
#[async_trait]
pub trait LabelWriter: Send + Sync {
    async fn create_label(
        &self,
        repo: &RepoId,
        name: &str,
        color: &str,
        description: &str,
    ) -> Result<LabelWrite, GitHubError>;
}

/// Per-label outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LabelOutcome {
    Created,
    AlreadyExisted,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelReport {
    pub name: String,
    pub color: String,
    #[serde(flatten)]
    pub outcome: LabelOutcome,
}

/// Create each label once, in order. Blank names are skipped and repeated
/// names collapse to their first occurrence. One failure never stops the
/// rest.
pub async fn create_labels(
    writer: &dyn LabelWriter,
    repo: &RepoId,
    labels: &[String],
) -> Vec<LabelReport> {
    let mut seen = HashSet::new();
    let mut reports = Vec::new();

    for name in labels.iter().map(|l| l.trim()) {
        if name.is_empty() || !seen.insert(name.to_lowercase()) {
            continue;
        }

        let color = label_color(name);
        let outcome = match writer.create_label(repo, name, color, LABEL_DESCRIPTION).await {
            Ok(LabelWrite::Created) => {
                info!(repo = %repo, label = name, "label created");
                LabelOutcome::Created
            }
            Ok(LabelWrite::AlreadyExists) => LabelOutcome::AlreadyExisted,
            Err(e) => {
                warn!(repo = %repo, label = name, error = %e, "label creation failed");
                LabelOutcome::Failed {
                    message: e.to_string(),
                }
            }
        };

        reports.push(LabelReport {
            name: name.to_string(),
            color: color.to_string(),
            outcome,
        });
    }

    reports
}

/// Create labels with a client authenticated by `token`. The client lives
/// only for this call.
pub async fn create_labels_with_token(
    repo: &RepoId,
    labels: &[String],
    token: &str,
    api_url: Option<&str>,
    timeout_secs: u64,
) -> Result<Vec<LabelReport>, GitHubError> {
    let client = GitHubClient::new(Some(token), api_url, timeout_secs)?;
    Ok(create_labels(&client, repo, labels).await)
}

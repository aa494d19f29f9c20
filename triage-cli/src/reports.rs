//! Command results in their rendered shape.
//!
//! Each command produces one of these reports. The JSON serializer writes
//! them as-is inside a success envelope; the Markdown and Mermaid
//! serializers read the same fields.

use serde::Serialize;
use std::collections::BTreeMap;
use triage_graph::{GraphSnapshot, IssueNode, IssueRecord, IssueState};
use triage_llm::AnalysisRecord;
use triage_survey::{
    AnalysisOutcome, BatchReport, DependencyGraph, DroppedIssue, LabelOutcome, LabelReport,
    SimilarityCandidate,
};

/// The parts of an issue worth echoing back to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueSummary {
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    pub author: String,
    pub labels: Vec<String>,
    pub comment_count: u32,
    pub html_url: String,
}

impl From<&IssueRecord> for IssueSummary {
    fn from(issue: &IssueRecord) -> Self {
        Self {
            number: issue.number,
            title: issue.title.clone(),
            state: issue.state,
            author: issue.author.clone(),
            labels: issue.labels.clone(),
            comment_count: issue.comment_count,
            html_url: issue.html_url.clone(),
        }
    }
}

/// Result of `triage analyze`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeReport {
    pub repo: String,
    pub issue: IssueSummary,
    pub analysis: AnalysisRecord,
    pub cached: bool,
    /// The prompt carried a shortened body or comment
    pub truncated: bool,
}

impl AnalyzeReport {
    pub fn new(repo: &str, outcome: &AnalysisOutcome) -> Self {
        Self {
            repo: repo.to_string(),
            issue: IssueSummary::from(&outcome.issue),
            analysis: outcome.analysis.clone(),
            cached: outcome.cached,
            truncated: outcome.truncated,
        }
    }
}

/// Result of `triage deps`.
#[derive(Debug, Serialize)]
pub struct DepsReport {
    pub repo: String,
    pub depth: u8,
    pub graph: GraphSnapshot,
    /// Hops from the root for every issue in the graph
    pub depths: BTreeMap<u64, usize>,
    /// Issues the root waits on
    pub blocked_by: Vec<u64>,
    /// Issues that claim to fix or close the root
    pub closed_by: Vec<u64>,
    pub dropped: Vec<DroppedIssue>,
    pub budget_exhausted: bool,
}

impl DepsReport {
    pub fn new(repo: &str, built: DependencyGraph) -> Self {
        let graph = &built.graph;
        let root = graph.root_number();
        Self {
            repo: repo.to_string(),
            depth: built.max_depth,
            graph: graph.snapshot(),
            depths: graph.depths_from_root().into_iter().collect(),
            blocked_by: issue_numbers(graph.blockers_of(root)),
            closed_by: issue_numbers(graph.closers_of(root)),
            dropped: built.dropped,
            budget_exhausted: built.budget_exhausted,
        }
    }
}

fn issue_numbers(nodes: Vec<&IssueNode>) -> Vec<u64> {
    let mut numbers: Vec<u64> = nodes.iter().map(|n| n.issue_number).collect();
    numbers.sort_unstable();
    numbers
}

/// Result of `triage duplicates`.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicatesReport {
    pub repo: String,
    pub issue: IssueSummary,
    pub scorer: String,
    pub threshold: f64,
    pub duplicates: Vec<SimilarityCandidate>,
}

/// Result of `triage similar`.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarReport {
    pub repo: String,
    pub issue: IssueSummary,
    pub scorer: String,
    pub exclude_same_repo: bool,
    pub similar: Vec<SimilarityCandidate>,
}

/// Result of `triage batch`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchView {
    pub repo: String,
    #[serde(flatten)]
    pub report: BatchReport,
}

/// Result of `triage labels`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelsReport {
    pub repo: String,
    pub labels: Vec<LabelReport>,
    pub created: usize,
    pub already_existed: usize,
    pub failed: usize,
}

impl LabelsReport {
    pub fn new(repo: &str, labels: Vec<LabelReport>) -> Self {
        let count = |pred: fn(&LabelOutcome) -> bool| labels.iter().filter(|l| pred(&l.outcome)).count();
        let created = count(|o| matches!(o, LabelOutcome::Created));
        let already_existed = count(|o| matches!(o, LabelOutcome::AlreadyExisted));
        let failed = count(|o| matches!(o, LabelOutcome::Failed { .. }));
        Self {
            repo: repo.to_string(),
            labels,
            created,
            already_existed,
            failed,
        }
    }
}

/// One component checked by `triage doctor`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthCheck {
    pub component: &'static str,
    pub healthy: bool,
    pub detail: String,
}

impl HealthCheck {
    pub fn passed(component: &'static str, detail: String) -> Self {
        Self {
            component,
            healthy: true,
            detail,
        }
    }

    pub fn failed(component: &'static str, detail: String) -> Self {
        Self {
            component,
            healthy: false,
            detail,
        }
    }
}

/// Result of `triage doctor`.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    /// `healthy` when every check passed, otherwise `degraded`
    pub status: &'static str,
    pub checks: Vec<HealthCheck>,
}

impl DoctorReport {
    pub fn new(checks: Vec<HealthCheck>) -> Self {
        let status = if checks.iter().all(|c| c.healthy) {
            "healthy"
        } else {
            "degraded"
        };
        Self { status, checks }
    }

    pub fn is_healthy(&self) -> bool {
        self.checks.iter().all(|c| c.healthy)
    }
}

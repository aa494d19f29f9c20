//! Markdown serializer for command results.
//!
//! Produces human-readable reports suitable for pasting into an issue
//! comment or reading in a terminal.
//!
//! ## Example Output
//!
//! ```markdown
//! # Issue #42: Crash on save
//!
//! **Repository**: acme/widgets | **State**: open | **Author**: octocat
//!
//! ## Summary
//!
//! Saving a document with an empty title crashes the editor.
//!
//! | Field | Value |
//! |-------|-------|
//! | Type | Bug |
//! | Priority | 4/5 |
//! ```

use crate::reports::{
    AnalyzeReport, BatchView, DepsReport, DoctorReport, DuplicatesReport, LabelsReport, SimilarReport,
};
use std::fmt::Write;
use triage_graph::ReferenceType;
use triage_llm::IssueType;
use triage_survey::{BatchEntry, LabelOutcome, SimilarityCandidate};

/// Markdown serializer for command results.
#[derive(Debug, Clone)]
pub struct MarkdownSerializer {
    /// Include the suggested reply in analysis reports
    include_draft_response: bool,

    /// Include the text around each reference in dependency reports
    include_context: bool,
}

impl Default for MarkdownSerializer {
    fn default() -> Self {
        Self {
            include_draft_response: true,
            include_context: true,
        }
    }
}

impl MarkdownSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_draft_response(mut self, include: bool) -> Self {
        self.include_draft_response = include;
        self
    }

    pub fn with_context(mut self, include: bool) -> Self {
        self.include_context = include;
        self
    }

    /// Render a single-issue analysis.
    pub fn analysis(&self, report: &AnalyzeReport) -> String {
        let mut output = String::new();
        let issue = &report.issue;
        let analysis = &report.analysis;

        writeln!(output, "# Issue #{}: {}\n", issue.number, issue.title).unwrap();
        writeln!(
            output,
            "**Repository**: {} | **State**: {} | **Author**: {} | **Comments**: {}\n",
            report.repo, issue.state, issue.author, issue.comment_count
        )
        .unwrap();

        writeln!(output, "## Summary\n").unwrap();
        writeln!(output, "{}\n", analysis.summary).unwrap();

        writeln!(output, "| Field | Value |").unwrap();
        writeln!(output, "|-------|-------|").unwrap();
        writeln!(output, "| Type | {} |", type_label(analysis.issue_type)).unwrap();
        writeln!(output, "| Priority | {}/5 |", analysis.priority_score).unwrap();
        writeln!(output, "| Confidence | {:.0}% |", analysis.confidence_score * 100.0).unwrap();
        writeln!(output, "| Suggested labels | {} |", code_list(&analysis.suggested_labels)).unwrap();
        writeln!(output).unwrap();

        writeln!(output, "**Why this priority**: {}\n", analysis.priority_justification).unwrap();
        writeln!(output, "**Potential impact**: {}\n", analysis.potential_impact).unwrap();

        if self.include_draft_response {
            writeln!(output, "## Draft Response\n").unwrap();
            for line in analysis.draft_response.lines() {
                writeln!(output, "> {}", line).unwrap();
            }
            writeln!(output).unwrap();
        }

        let mut notes = Vec::new();
        if report.cached {
            notes.push("served from cache");
        }
        if report.truncated {
            notes.push("issue text was shortened for analysis");
        }
        if !notes.is_empty() {
            writeln!(output, "_Note: {}._", notes.join("; ")).unwrap();
        }

        output
    }

    /// Render a dependency graph as node and edge tables.
    pub fn dependencies(&self, report: &DepsReport) -> String {
        let mut output = String::new();
        let graph = &report.graph;

        writeln!(output, "# Dependencies of #{}\n", graph.root_issue).unwrap();
        writeln!(
            output,
            "**Repository**: {} | **Depth**: {} | **Issues**: {} | **References**: {}\n",
            report.repo, report.depth, graph.total_nodes, graph.total_edges
        )
        .unwrap();

        writeln!(output, "## Issues\n").unwrap();
        writeln!(output, "| Issue | Depth | Title | State |").unwrap();
        writeln!(output, "|-------|-------|-------|-------|").unwrap();
        for node in &graph.nodes {
            let marker = if node.is_root() { " (root)" } else { "" };
            let depth = report
                .depths
                .get(&node.issue_number)
                .map_or_else(|| "-".to_string(), usize::to_string);
            writeln!(
                output,
                "| #{}{} | {} | {} | {} |",
                node.issue_number,
                marker,
                depth,
                cell(&node.title),
                node.state
            )
            .unwrap();
        }
        writeln!(output).unwrap();

        writeln!(output, "**Blocked by**: {}", issue_list(&report.blocked_by)).unwrap();
        writeln!(output, "**Closed by**: {}\n", issue_list(&report.closed_by)).unwrap();

        writeln!(output, "## References\n").unwrap();
        if graph.edges.is_empty() {
            writeln!(output, "No references found.\n").unwrap();
        } else {
            if self.include_context {
                writeln!(output, "| From | Relationship | To | Context |").unwrap();
                writeln!(output, "|------|--------------|----|---------|").unwrap();
            } else {
                writeln!(output, "| From | Relationship | To |").unwrap();
                writeln!(output, "|------|--------------|----|").unwrap();
            }
            for edge in &graph.edges {
                write!(
                    output,
                    "| #{} | {} | #{} |",
                    edge.source,
                    relationship_label(edge.reference_type),
                    edge.target
                )
                .unwrap();
                if self.include_context {
                    write!(output, " {} |", cell(edge.context.as_deref().unwrap_or(""))).unwrap();
                }
                writeln!(output).unwrap();
            }
            writeln!(output).unwrap();
        }

        if !report.dropped.is_empty() {
            writeln!(output, "## Unreachable References\n").unwrap();
            for dropped in &report.dropped {
                writeln!(output, "- #{} ({}): {}", dropped.number, dropped.kind, dropped.message).unwrap();
            }
            writeln!(output).unwrap();
        }

        if report.budget_exhausted {
            writeln!(
                output,
                "_Note: the fetch budget ran out; some references were not followed._"
            )
            .unwrap();
        }

        output
    }

    /// Render same-repository duplicate candidates.
    pub fn duplicates(&self, report: &DuplicatesReport) -> String {
        let mut output = String::new();
        writeln!(
            output,
            "# Possible Duplicates of #{}: {}\n",
            report.issue.number, report.issue.title
        )
        .unwrap();
        writeln!(
            output,
            "**Repository**: {} | **Scorer**: {} | **Threshold**: {:.2}\n",
            report.repo, report.scorer, report.threshold
        )
        .unwrap();

        if report.duplicates.is_empty() {
            writeln!(output, "No issues scored at or above the threshold.").unwrap();
        } else {
            write_candidates(&mut output, &report.duplicates, false);
        }
        output
    }

    /// Render cross-repository matches.
    pub fn similar(&self, report: &SimilarReport) -> String {
        let mut output = String::new();
        writeln!(
            output,
            "# Issues Similar to {}#{}: {}\n",
            report.repo, report.issue.number, report.issue.title
        )
        .unwrap();
        let scope = if report.exclude_same_repo {
            "other repositories"
        } else {
            "all repositories"
        };
        writeln!(output, "**Scorer**: {} | **Searched**: {}\n", report.scorer, scope).unwrap();

        if report.similar.is_empty() {
            writeln!(output, "No similar issues found.").unwrap();
        } else {
            write_candidates(&mut output, &report.similar, true);
        }
        output
    }

    /// Render a batch with its statistics.
    pub fn batch(&self, view: &BatchView) -> String {
        let mut output = String::new();
        let stats = &view.report.statistics;

        writeln!(output, "# Batch Analysis: {}\n", view.repo).unwrap();
        writeln!(
            output,
            "**Processed**: {} of {} requested | **Successful**: {} | **Failed**: {}\n",
            stats.processed, stats.requested, stats.successful, stats.failed
        )
        .unwrap();

        writeln!(output, "| Issue | Title | Type | Priority | Labels |").unwrap();
        writeln!(output, "|-------|-------|------|----------|--------|").unwrap();
        for entry in &view.report.entries {
            match entry {
                BatchEntry::Success {
                    number,
                    title,
                    analysis,
                    ..
                } => writeln!(
                    output,
                    "| #{} | {} | {} | {}/5 | {} |",
                    number,
                    cell(title),
                    type_label(analysis.issue_type),
                    analysis.priority_score,
                    code_list(&analysis.suggested_labels)
                )
                .unwrap(),
                BatchEntry::Failed {
                    number,
                    error_kind,
                    message,
                } => writeln!(
                    output,
                    "| #{} | _failed ({})_: {} | | | |",
                    number,
                    error_kind,
                    cell(message)
                )
                .unwrap(),
            }
        }
        writeln!(output).unwrap();

        writeln!(output, "## Statistics\n").unwrap();
        match stats.average_priority {
            Some(average) => writeln!(output, "- **Average priority**: {:.1}", average).unwrap(),
            None => writeln!(output, "- **Average priority**: n/a").unwrap(),
        }
        if !stats.type_distribution.is_empty() {
            let types: Vec<String> = stats
                .type_distribution
                .iter()
                .map(|(issue_type, count)| format!("{} ({})", type_label(*issue_type), count))
                .collect();
            writeln!(output, "- **Types**: {}", types.join(", ")).unwrap();
        }
        if !stats.top_labels.is_empty() {
            let labels: Vec<String> = stats
                .top_labels
                .iter()
                .map(|l| format!("`{}` ({})", l.label, l.count))
                .collect();
            writeln!(output, "- **Top labels**: {}", labels.join(", ")).unwrap();
        }

        output
    }

    /// Render label creation outcomes.
    pub fn labels(&self, report: &LabelsReport) -> String {
        let mut output = String::new();
        writeln!(output, "# Labels for {}\n", report.repo).unwrap();
        writeln!(output, "| Label | Color | Result |").unwrap();
        writeln!(output, "|-------|-------|--------|").unwrap();
        for label in &report.labels {
            let result = match &label.outcome {
                LabelOutcome::Created => "created".to_string(),
                LabelOutcome::AlreadyExisted => "already existed".to_string(),
                LabelOutcome::Failed { message } => format!("failed: {}", cell(message)),
            };
            writeln!(output, "| `{}` | #{} | {} |", label.name, label.color, result).unwrap();
        }
        writeln!(output).unwrap();
        writeln!(
            output,
            "{} created, {} already existed, {} failed",
            report.created, report.already_existed, report.failed
        )
        .unwrap();
        output
    }

    /// Render component health.
    pub fn doctor(&self, report: &DoctorReport) -> String {
        let mut output = String::new();
        writeln!(output, "# Triage Health: {}\n", report.status).unwrap();
        writeln!(output, "| Component | Status | Detail |").unwrap();
        writeln!(output, "|-----------|--------|--------|").unwrap();
        for check in &report.checks {
            let status = if check.healthy { "ok" } else { "unavailable" };
            writeln!(output, "| {} | {} | {} |", check.component, status, cell(&check.detail)).unwrap();
        }
        output
    }
}

fn write_candidates(output: &mut String, candidates: &[SimilarityCandidate], with_repo: bool) {
    writeln!(output, "| Issue | Title | State | Score | Assessment |").unwrap();
    writeln!(output, "|-------|-------|-------|-------|------------|").unwrap();
    for candidate in candidates {
        let issue = match (&candidate.repo, with_repo) {
            (Some(repo), true) => format!("[{}#{}]({})", repo, candidate.number, candidate.html_url),
            _ => format!("[#{}]({})", candidate.number, candidate.html_url),
        };
        writeln!(
            output,
            "| {} | {} | {} | {:.2} | {} |",
            issue,
            cell(&candidate.title),
            candidate.state,
            candidate.score,
            candidate.band.label()
        )
        .unwrap();
    }
}

fn type_label(issue_type: IssueType) -> &'static str {
    match issue_type {
        IssueType::Bug => "Bug",
        IssueType::FeatureRequest => "Feature request",
        IssueType::Documentation => "Documentation",
        IssueType::Question => "Question",
        IssueType::Other => "Other",
    }
}

fn relationship_label(reference_type: ReferenceType) -> &'static str {
    match reference_type {
        ReferenceType::Fixes => "fixes",
        ReferenceType::Closes => "closes",
        ReferenceType::Blocks => "blocks",
        ReferenceType::BlockedBy => "blocked by",
        ReferenceType::Mentions => "mentions",
    }
}

fn code_list(items: &[String]) -> String {
    if items.is_empty() {
        return "none".to_string();
    }
    items.iter().map(|i| format!("`{}`", i)).collect::<Vec<_>>().join(", ")
}

/// Keep text inside a single table cell.
fn issue_list(numbers: &[u64]) -> String {
    if numbers.is_empty() {
        return "none".to_string();
    }
    numbers
        .iter()
        .map(|n| format!("#{n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}

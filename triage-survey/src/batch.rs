//! Bounded multi-issue analysis with aggregate statistics.

use crate::error::{ErrorKind, TriageError, TriageResult};
use crate::pipeline::IssuePipeline;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};
use triage_graph::{IssueState, RepoId};
use triage_llm::{AnalysisRecord, IssueType};

/// Issues analyzed per batch; also the concurrency bound.
pub const MAX_BATCH: usize = 10;

/// Labels reported in [`BatchStatistics::top_labels`].
pub const TOP_LABELS: usize = 10;

/// Parse `"1-5,8,10"` into issue numbers, keeping order and repeats.
///
/// Ranges expand lazily: once [`MAX_BATCH`] distinct numbers are collected
/// the rest of the input is only syntax-checked, so `"1-5000"` yields
/// `1..=10` without error.
pub fn parse_issue_numbers(input: &str) -> TriageResult<Vec<u64>> {
    let invalid = |part: &str| TriageError::InvalidInput(format!("invalid issue number or range '{part}'"));
    let parse = |text: &str, part: &str| match text.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(invalid(part)),
        Ok(n) => Ok(n),
    };

    let mut numbers = Vec::new();
    let mut distinct = HashSet::new();
    let mut capped = false;
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (start, end) = match part.split_once('-') {
            Some((start, end)) => (parse(start, part)?, parse(end, part)?),
            None => {
                let n = parse(part, part)?;
                (n, n)
            }
        };
        if start > end {
            return Err(invalid(part));
        }
        if capped {
            continue;
        }
        for n in start..=end {
            if distinct.len() == MAX_BATCH && !distinct.contains(&n) {
                capped = true;
                break;
            }
            distinct.insert(n);
            numbers.push(n);
        }
    }

    if numbers.is_empty() {
        return Err(TriageError::InvalidInput("no issue numbers given".to_string()));
    }
    if capped {
        info!(kept = numbers.len(), "issue list capped at {MAX_BATCH} distinct numbers");
    }
    Ok(numbers)
}

/// De-duplicate (first appearance wins) and cap at [`MAX_BATCH`].
pub fn prepare_numbers(numbers: &[u64]) -> Vec<u64> {
    let mut seen = HashSet::new();
    numbers
        .iter()
        .copied()
        .filter(|n| seen.insert(*n))
        .take(MAX_BATCH)
        .collect()
}

/// One issue's result within a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchEntry {
    Success {
        number: u64,
        title: String,
        state: IssueState,
        html_url: String,
        analysis: AnalysisRecord,
        cached: bool,
    },
    Failed {
        number: u64,
        error_kind: ErrorKind,
        message: String,
    },
}

impl BatchEntry {
    pub fn number(&self) -> u64 {
        match self {
            BatchEntry::Success { number, .. } | BatchEntry::Failed { number, .. } => *number,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BatchEntry::Success { .. })
    }

    pub fn analysis(&self) -> Option<&AnalysisRecord> {
        match self {
            BatchEntry::Success { analysis, .. } => Some(analysis),
            BatchEntry::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Aggregates over a batch's entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchStatistics {
    /// Numbers given before de-duplication and capping
    pub requested: usize,
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    /// Mean priority over successes; `None` when nothing succeeded
    pub average_priority: Option<f64>,
    pub type_distribution: BTreeMap<IssueType, usize>,
    pub top_labels: Vec<LabelCount>,
}

impl BatchStatistics {
    pub fn from_entries(requested: usize, entries: &[BatchEntry]) -> Self {
        let analyses: Vec<&AnalysisRecord> = entries.iter().filter_map(BatchEntry::analysis).collect();

        let average_priority = if analyses.is_empty() {
            None
        } else {
            let total: u32 = analyses.iter().map(|a| u32::from(a.priority_score)).sum();
            Some(f64::from(total) / analyses.len() as f64)
        };

        let mut type_distribution = BTreeMap::new();
        for analysis in &analyses {
            *type_distribution.entry(analysis.issue_type).or_insert(0) += 1;
        }

        // label -> (count, first-seen position)
        let mut label_counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for label in analyses.iter().flat_map(|a| &a.suggested_labels) {
            let next_position = label_counts.len();
            label_counts.entry(label.as_str()).or_insert((0, next_position)).0 += 1;
        }
        let mut ranked: Vec<(&str, (usize, usize))> = label_counts.into_iter().collect();
        ranked.sort_by(|(_, (ca, pa)), (_, (cb, pb))| cb.cmp(ca).then(pa.cmp(pb)));
        let top_labels = ranked
            .into_iter()
            .take(TOP_LABELS)
            .map(|(label, (count, _))| LabelCount {
                label: label.to_string(),
                count,
            })
            .collect();

        Self {
            requested,
            processed: entries.len(),
            successful: analyses.len(),
            failed: entries.len() - analyses.len(),
            average_priority,
            type_distribution,
            top_labels,
        }
    }
}

/// Entries in request order plus their statistics.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
    pub statistics: BatchStatistics,
}

/// Runs the pipeline over a bounded set of issues.
pub struct BatchOrchestrator {
    pipeline: Arc<IssuePipeline>,
}

impl BatchOrchestrator {
    pub fn new(pipeline: Arc<IssuePipeline>) -> Self {
        Self { pipeline }
    }

    pub async fn analyze_batch(&self, repo: &RepoId, numbers: &[u64]) -> TriageResult<BatchReport> {
        self.analyze_batch_with_progress(repo, numbers, |_| {}).await
    }

    /// Analyze up to [`MAX_BATCH`] distinct issues concurrently.
    ///
    /// `on_done` is called once per entry, in request order. A failing issue
    /// becomes a failed entry and never aborts its siblings.
    pub async fn analyze_batch_with_progress<F>(
        &self,
        repo: &RepoId,
        numbers: &[u64],
        mut on_done: F,
    ) -> TriageResult<BatchReport>
    where
        F: FnMut(&BatchEntry),
    {
        let selected = prepare_numbers(numbers);
        if selected.is_empty() {
            return Err(TriageError::InvalidInput("no issue numbers given".to_string()));
        }
        if selected.len() < numbers.len() {
            info!(requested = numbers.len(), selected = selected.len(), "batch de-duplicated and capped");
        }

        let pipeline = &self.pipeline;
        let entries: Vec<BatchEntry> = stream::iter(selected)
            .map(|number| async move {
                match pipeline.analyze(repo, number, false).await {
                    Ok(outcome) => BatchEntry::Success {
                        number,
                        title: outcome.issue.title,
                        state: outcome.issue.state,
                        html_url: outcome.issue.html_url,
                        analysis: outcome.analysis,
                        cached: outcome.cached,
                    },
                    Err(e) => {
                        warn!(repo = %repo, issue = number, error = %e, "batch entry failed");
                        BatchEntry::Failed {
                            number,
                            error_kind: e.kind(),
                            message: e.to_string(),
                        }
                    }
                }
            })
            .buffered(MAX_BATCH)
            .inspect(|entry| on_done(entry))
            .collect()
            .await;

        let statistics = BatchStatistics::from_entries(numbers.len(), &entries);
        info!(
            repo = %repo,
            successful = statistics.successful,
            failed = statistics.failed,
            "batch complete"
        );

        Ok(BatchReport { entries, statistics })
    }
}

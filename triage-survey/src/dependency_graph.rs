//! Breadth-first construction of an issue reference graph.
//!
//! Starting from a root issue, references found in each issue's text are
//! resolved through an [`IssueSource`] and turned into nodes and edges of an
//! [`IssueGraph`]. Expansion is bounded by depth and by a per-request fetch
//! budget.

use crate::error::{ErrorKind, TriageResult};
use crate::references::detect_in_issue;
use crate::source::IssueSource;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};
use triage_graph::{GraphError, IssueEdge, IssueGraph, IssueNode, IssueRecord, RepoId};

pub const MIN_DEPTH: u8 = 1;
pub const MAX_DEPTH: u8 = 3;
pub const DEFAULT_DEPTH: u8 = 1;

/// Issues fetched per request, root excluded.
pub const DEFAULT_MAX_FETCHES: usize = 25;

/// Bring a requested depth into `MIN_DEPTH..=MAX_DEPTH`.
pub fn clamp_depth(depth: u8) -> u8 {
    depth.clamp(MIN_DEPTH, MAX_DEPTH)
}

/// A referenced issue that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedIssue {
    pub number: u64,
    pub kind: ErrorKind,
    pub message: String,
}

/// Result of a graph build.
#[derive(Debug)]
pub struct DependencyGraph {
    pub graph: IssueGraph,
    pub dropped: Vec<DroppedIssue>,
    /// Depth actually used after clamping
    pub max_depth: u8,
    /// At least one reference went unfetched because the budget ran out
    pub budget_exhausted: bool,
}

/// Builds [`DependencyGraph`]s from an issue source.
pub struct ReferenceGraphBuilder {
    source: Arc<dyn IssueSource>,
    max_fetches: usize,
}

impl ReferenceGraphBuilder {
    pub fn new(source: Arc<dyn IssueSource>) -> Self {
        Self {
            source,
            max_fetches: DEFAULT_MAX_FETCHES,
        }
    }

    /// Override the per-request fetch budget (builder pattern).
    pub fn with_max_fetches(mut self, max_fetches: usize) -> Self {
        self.max_fetches = max_fetches;
        self
    }

    /// Build the reference graph around `root_number`.
    ///
    /// Issues at depth `< max_depth` have their unseen references fetched and
    /// queued; issues at `max_depth` only add edges to nodes already in the
    /// graph. Edges are only drawn between present nodes.
    ///
    /// # Errors
    ///
    /// Fails only when the root issue cannot be fetched.
    pub async fn build(&self, repo: &RepoId, root_number: u64, max_depth: u8) -> TriageResult<DependencyGraph> {
        let max_depth = clamp_depth(max_depth);
        let root = self.source.fetch_issue(repo, root_number).await?;

        let mut graph = IssueGraph::new(IssueNode::from_issue(&root));
        let mut visited: HashSet<u64> = HashSet::from([root_number]);
        let mut frontier: VecDeque<(IssueRecord, u8)> = VecDeque::from([(root, 0)]);
        let mut dropped = Vec::new();
        let mut fetches = 0usize;
        let mut budget_exhausted = false;

        while let Some((issue, depth)) = frontier.pop_front() {
            let references = detect_in_issue(&issue);
            debug!(issue = issue.number, depth, references = references.len(), "expanding issue");

            for reference in references {
                let target = reference.target;

                if depth < max_depth && !visited.contains(&target) {
                    if fetches >= self.max_fetches {
                        budget_exhausted = true;
                    } else {
                        visited.insert(target);
                        fetches += 1;
                        match self.source.fetch_issue(repo, target).await {
                            Ok(child) => {
                                graph.add_node(IssueNode::from_issue(&child))?;
                                frontier.push_back((child, depth + 1));
                            }
                            Err(e) => {
                                warn!(repo = %repo, issue = target, error = %e, "dropping unreachable reference");
                                dropped.push(DroppedIssue {
                                    number: target,
                                    kind: e.kind(),
                                    message: e.to_string(),
                                });
                            }
                        }
                    }
                }

                if graph.contains_node(target) {
                    let edge = IssueEdge::new(issue.number, target, reference.reference_type)
                        .map_err(GraphError::from)?
                        .with_context(reference.context);
                    graph.insert_edge(edge)?;
                }
            }
        }

        info!(
            repo = %repo,
            root = root_number,
            depth = max_depth,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            dropped = dropped.len(),
            "dependency graph built"
        );

        Ok(DependencyGraph {
            graph,
            dropped,
            max_depth,
            budget_exhausted,
        })
    }
}

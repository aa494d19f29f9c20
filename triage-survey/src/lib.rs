//! Issue discovery and derived analyses for Triage.
//!
//! This crate connects the issue tracker to the analysis engine.
//!
//! # Overview
//!
//! The triage-survey crate is responsible for:
//!
//! - **GitHub Integration**: Fetching issues, listing and searching them,
//!   and creating labels through [`GitHubClient`]
//! - **Analysis Pipeline**: Fetch, cache lookup, analyze and store via
//!   [`IssuePipeline`]
//! - **Dependency Graphs**: Breadth-first expansion of `#N` references with
//!   [`ReferenceGraphBuilder`]
//! - **Similarity**: Duplicate detection and cross-repository search with
//!   [`SimilarityRanker`]
//! - **Batches**: Bounded concurrent analysis and statistics with
//!   [`BatchOrchestrator`]
//!
//! # Architecture
//!
//! Everything that talks to GitHub goes through the [`IssueSource`] and
//! [`LabelWriter`] traits, so the algorithms here run unchanged against
//! in-memory sources in tests. Every failure is a [`TriageError`] with a
//! stable [`ErrorKind`].
//!
//! # Modules
//!
//! - [`github`]: GitHub API client
//! - [`source`]: Issue source abstraction
//! - [`pipeline`]: Single-issue analysis
//! - [`references`]: `#N` reference detection and classification
//! - [`dependency_graph`]: Reference graph construction
//! - [`similarity`]: Similarity scoring and ranking
//! - [`batch`]: Multi-issue analysis
//! - [`labels`]: Label materialization

pub mod batch;
pub mod dependency_graph;
pub mod error;
pub mod github;
pub mod labels;
pub mod pipeline;
pub mod references;
pub mod similarity;
pub mod source;

pub use batch::{
    BatchEntry, BatchOrchestrator, BatchReport, BatchStatistics, LabelCount, MAX_BATCH,
    parse_issue_numbers, prepare_numbers,
};
pub use dependency_graph::{DependencyGraph, DroppedIssue, ReferenceGraphBuilder, clamp_depth};
pub use error::{ErrorKind, TriageError, TriageResult};
pub use github::{GitHubClient, GitHubError};
pub use labels::{LabelOutcome, LabelReport, LabelWrite, LabelWriter, create_labels, create_labels_with_token, label_color};
pub use pipeline::{AnalysisOutcome, IssuePipeline};
pub use references::{DetectedReference, detect_in_issue, detect_references};
pub use similarity::{
    LexicalScorer, LlmScorer, SimilarityBand, SimilarityCandidate, SimilarityRanker,
    SimilarityScorer,
};
pub use source::{ApiQuota, IssueSource};

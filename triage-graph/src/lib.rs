//! # triage-graph
//!
//! Issue data model and dependency graph for Triage.
//!
//! This crate provides the shared data types every other Triage crate speaks:
//!
//! - **Repository identity**: [`RepoId`] parsed from `owner/name` or a URL
//! - **Issue records**: [`IssueRecord`] with comments, labels and state
//! - **Reference types**: fixes, closes, blocks, blocked_by, mentions
//! - **IssueGraph**: a rooted directed graph of issues on `petgraph`
//! - **Query interface**: traversal, blockers, closers, depth from root
//!
//! ## Example
//!
//! ```rust
//! use triage_graph::{IssueEdge, IssueGraph, IssueNode, IssueState, ReferenceType};
//!
//! let mut graph = IssueGraph::new(IssueNode::new(1, "Login crash", IssueState::Open, ""));
//! graph.add_node(IssueNode::new(42, "SSO refactor", IssueState::Closed, "")).unwrap();
//! graph
//!     .add_edge(IssueEdge::new(1, 42, ReferenceType::Fixes).unwrap())
//!     .unwrap();
//!
//! assert_eq!(graph.node_count(), 2);
//! assert!(graph.root().is_root());
//! ```

pub mod edge;
pub mod error;
pub mod graph;
pub mod issue;
pub mod node;
pub mod query;

pub use edge::{IssueEdge, ReferenceType};
pub use error::{EdgeError, GraphError, RepoIdError};
pub use graph::{GraphSnapshot, IssueGraph};
pub use issue::{IssueComment, IssueRecord, IssueState, RepoId, truncate_chars};
pub use node::IssueNode;
pub use query::TraversalDirection;

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

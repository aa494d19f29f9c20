//! IssueGraph - the dependency graph container.

use crate::edge::IssueEdge;
use crate::error::GraphError;
use crate::node::IssueNode;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::HashMap;

/// JSON-serializable representation of the graph.
#[derive(Debug, Serialize)]
pub struct GraphSnapshot {
    /// Issue number the graph was built from
    pub root_issue: u64,

    /// Nodes in discovery order, root first
    pub nodes: Vec<IssueNode>,

    /// Edges in detection order
    pub edges: Vec<IssueEdge>,

    pub total_nodes: usize,

    pub total_edges: usize,
}

/// A directed graph of issues linked by textual references.
///
/// Exactly one node is the root, and it is fixed at construction.
pub struct IssueGraph {
    /// Underlying directed graph from petgraph
    inner: DiGraph<IssueNode, IssueEdge>,

    /// Index from issue number to petgraph NodeIndex for O(1) lookup
    node_index: HashMap<u64, NodeIndex>,

    root: u64,
}

impl IssueGraph {
    /// Create a graph containing only `root`, flagged as the root.
    pub fn new(mut root: IssueNode) -> Self {
        root.is_root = true;
        let number = root.issue_number;
        let mut inner = DiGraph::new();
        let idx = inner.add_node(root);
        let mut node_index = HashMap::new();
        node_index.insert(number, idx);
        Self {
            inner,
            node_index,
            root: number,
        }
    }

    // === Node Operations ===

    /// Add a non-root node.
    /// Returns error if the issue is already present.
    pub fn add_node(&mut self, mut node: IssueNode) -> Result<NodeIndex, GraphError> {
        if self.node_index.contains_key(&node.issue_number) {
            return Err(GraphError::DuplicateNode(node.issue_number));
        }

        node.is_root = false;
        let number = node.issue_number;
        let idx = self.inner.add_node(node);
        self.node_index.insert(number, idx);
        Ok(idx)
    }

    pub fn get_node(&self, number: u64) -> Option<&IssueNode> {
        self.node_index.get(&number).map(|&idx| &self.inner[idx])
    }

    pub fn contains_node(&self, number: u64) -> bool {
        self.node_index.contains_key(&number)
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Iterate over nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &IssueNode> {
        self.inner.node_weights()
    }

    pub fn root(&self) -> &IssueNode {
        &self.inner[self.node_index[&self.root]]
    }

    pub fn root_number(&self) -> u64 {
        self.root
    }

    // === Edge Operations ===

    /// Add an edge between two present nodes.
    /// Rejects a second edge with the same (source, target, type).
    pub fn add_edge(&mut self, edge: IssueEdge) -> Result<(), GraphError> {
        let (source_idx, target_idx) = self.endpoints(&edge)?;

        if self.has_edge(source_idx, target_idx, &edge) {
            return Err(GraphError::DuplicateEdge {
                source_issue: edge.source,
                target_issue: edge.target,
                reference_type: edge.reference_type,
            });
        }

        self.inner.add_edge(source_idx, target_idx, edge);
        Ok(())
    }

    /// Add an edge unless an identical one exists.
    /// Returns `true` if the edge was inserted, `false` if it collapsed into
    /// an existing one. The first detection's context is kept.
    pub fn insert_edge(&mut self, edge: IssueEdge) -> Result<bool, GraphError> {
        let (source_idx, target_idx) = self.endpoints(&edge)?;
        if self.has_edge(source_idx, target_idx, &edge) {
            return Ok(false);
        }
        self.inner.add_edge(source_idx, target_idx, edge);
        Ok(true)
    }

    fn endpoints(&self, edge: &IssueEdge) -> Result<(NodeIndex, NodeIndex), GraphError> {
        let source_idx = *self
            .node_index
            .get(&edge.source)
            .ok_or(GraphError::NodeNotFound(edge.source))?;
        let target_idx = *self
            .node_index
            .get(&edge.target)
            .ok_or(GraphError::NodeNotFound(edge.target))?;
        Ok((source_idx, target_idx))
    }

    fn has_edge(&self, source_idx: NodeIndex, target_idx: NodeIndex, edge: &IssueEdge) -> bool {
        self.inner
            .edges_connecting(source_idx, target_idx)
            .any(|existing| existing.weight().reference_type == edge.reference_type)
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &IssueEdge> {
        self.inner.edge_weights()
    }

    /// Edges leaving `number`.
    pub fn edges_from(&self, number: u64) -> Vec<&IssueEdge> {
        self.edges_directed(number, Direction::Outgoing)
    }

    /// Edges arriving at `number`.
    pub fn edges_to(&self, number: u64) -> Vec<&IssueEdge> {
        self.edges_directed(number, Direction::Incoming)
    }

    fn edges_directed(&self, number: u64, direction: Direction) -> Vec<&IssueEdge> {
        self.node_index
            .get(&number)
            .map(|&idx| {
                let mut edges: Vec<_> = self.inner.edges_directed(idx, direction).collect();
                // petgraph yields adjacency lists newest first
                edges.sort_by_key(|e| e.id());
                edges.into_iter().map(|e| e.weight()).collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn inner(&self) -> &DiGraph<IssueNode, IssueEdge> {
        &self.inner
    }

    pub(crate) fn index_of(&self, number: u64) -> Option<NodeIndex> {
        self.node_index.get(&number).copied()
    }

    // === Serialization ===

    pub fn snapshot(&self) -> GraphSnapshot {
        let nodes: Vec<IssueNode> = self.nodes().cloned().collect();
        let edges: Vec<IssueEdge> = self.edges().cloned().collect();
        GraphSnapshot {
            root_issue: self.root,
            total_nodes: nodes.len(),
            total_edges: edges.len(),
            nodes,
            edges,
        }
    }

    /// Serialize the graph to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, GraphError> {
        serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| GraphError::SerializationError(e.to_string()))
    }
}

impl std::fmt::Debug for IssueGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssueGraph")
            .field("root", &self.root)
            .field("node_count", &self.node_count())
            .field("edge_count", &self.edge_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::ReferenceType;
    use crate::issue::IssueState;
    use pretty_assertions::assert_eq;

    fn node(number: u64) -> IssueNode {
        IssueNode::new(
            number,
            format!("Issue {number}"),
            IssueState::Open,
            format!("https://github.com/a/b/issues/{number}"),
        )
    }

    fn edge(source: u64, target: u64, kind: ReferenceType) -> IssueEdge {
        IssueEdge::new(source, target, kind).unwrap()
    }

    #[test]
    fn test_root_is_unique() {
        let mut graph = IssueGraph::new(node(1));
        let mut sneaky = node(2);
        sneaky.is_root = true;
        graph.add_node(sneaky).unwrap();

        let roots: Vec<u64> = graph
            .nodes()
            .filter(|n| n.is_root())
            .map(|n| n.issue_number)
            .collect();
        assert_eq!(roots, vec![1]);
        assert_eq!(graph.root().issue_number, 1);
    }

    #[test]
    fn test_duplicate_node() {
        let mut graph = IssueGraph::new(node(1));
        graph.add_node(node(2)).unwrap();
        assert!(matches!(
            graph.add_node(node(2)),
            Err(GraphError::DuplicateNode(2))
        ));
        assert!(matches!(
            graph.add_node(node(1)),
            Err(GraphError::DuplicateNode(1))
        ));
    }

    #[test]
    fn test_edge_requires_present_nodes() {
        let mut graph = IssueGraph::new(node(1));
        let result = graph.add_edge(edge(1, 42, ReferenceType::Fixes));
        assert!(matches!(result, Err(GraphError::NodeNotFound(42))));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let mut graph = IssueGraph::new(node(1));
        graph.add_node(node(2)).unwrap();

        assert!(graph
            .insert_edge(edge(1, 2, ReferenceType::Mentions).with_context("first"))
            .unwrap());
        assert!(!graph
            .insert_edge(edge(1, 2, ReferenceType::Mentions).with_context("second"))
            .unwrap());
        // Different type between the same pair is a distinct edge
        assert!(graph.insert_edge(edge(1, 2, ReferenceType::Fixes)).unwrap());

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edges_from(1)[0].context.as_deref(), Some("first"));

        assert!(matches!(
            graph.add_edge(edge(1, 2, ReferenceType::Fixes)),
            Err(GraphError::DuplicateEdge { .. })
        ));
    }

    #[test]
    fn test_edges_directed_in_insertion_order() {
        let mut graph = IssueGraph::new(node(1));
        for n in [2, 3, 4] {
            graph.add_node(node(n)).unwrap();
            graph.add_edge(edge(1, n, ReferenceType::Mentions)).unwrap();
        }
        let targets: Vec<u64> = graph.edges_from(1).iter().map(|e| e.target).collect();
        assert_eq!(targets, vec![2, 3, 4]);
        assert_eq!(graph.edges_to(3).len(), 1);
        assert!(graph.edges_from(99).is_empty());
    }

    #[test]
    fn test_snapshot_shape() {
        let mut graph = IssueGraph::new(node(1));
        graph.add_node(node(42)).unwrap();
        graph
            .add_edge(edge(1, 42, ReferenceType::Fixes).with_context("...fixes #42..."))
            .unwrap();

        let json: serde_json::Value = serde_json::from_str(&graph.to_json().unwrap()).unwrap();
        assert_eq!(json["root_issue"], 1);
        assert_eq!(json["total_nodes"], 2);
        assert_eq!(json["total_edges"], 1);
        assert_eq!(json["nodes"][0]["is_root"], true);
        assert_eq!(json["nodes"][1]["is_root"], false);
        assert_eq!(json["edges"][0]["type"], "fixes");
    }
}

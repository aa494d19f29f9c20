//! Query interface for the issue graph.

use crate::edge::ReferenceType;
use crate::graph::IssueGraph;
use crate::node::IssueNode;
use petgraph::Direction;
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet, VecDeque};

/// Direction for edge traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalDirection {
    /// Follow outgoing edges only
    Outgoing,
    /// Follow incoming edges only
    Incoming,
    /// Follow both directions
    Both,
}

impl IssueGraph {
    /// Find all issues connected to `number` via specific reference types.
    ///
    /// # Arguments
    /// * `number` - Starting issue
    /// * `reference_types` - Types to follow (None = all types)
    /// * `direction` - Outgoing, Incoming, or Both
    pub fn traverse_edges(
        &self,
        number: u64,
        reference_types: Option<&[ReferenceType]>,
        direction: TraversalDirection,
    ) -> Vec<&IssueNode> {
        let Some(idx) = self.index_of(number) else {
            return vec![];
        };

        let directions = match direction {
            TraversalDirection::Outgoing => vec![Direction::Outgoing],
            TraversalDirection::Incoming => vec![Direction::Incoming],
            TraversalDirection::Both => vec![Direction::Outgoing, Direction::Incoming],
        };

        let mut seen = HashSet::new();
        let mut result = Vec::new();

        for dir in directions {
            let mut edge_refs: Vec<_> = self.inner().edges_directed(idx, dir).collect();
            edge_refs.sort_by_key(|e| e.id());

            for edge_ref in edge_refs {
                if let Some(types) = reference_types {
                    if !types.contains(&edge_ref.weight().reference_type) {
                        continue;
                    }
                }

                let other = match dir {
                    Direction::Outgoing => edge_ref.target(),
                    Direction::Incoming => edge_ref.source(),
                };
                if seen.insert(other) {
                    result.push(&self.inner()[other]);
                }
            }
        }

        result
    }

    /// Issues that block `number`: its `blocked_by` targets plus the sources
    /// of `blocks` edges pointing at it.
    pub fn blockers_of(&self, number: u64) -> Vec<&IssueNode> {
        let mut blockers =
            self.traverse_edges(number, Some(&[ReferenceType::BlockedBy]), TraversalDirection::Outgoing);
        for node in
            self.traverse_edges(number, Some(&[ReferenceType::Blocks]), TraversalDirection::Incoming)
        {
            if !blockers.iter().any(|b| b.issue_number == node.issue_number) {
                blockers.push(node);
            }
        }
        blockers
    }

    /// Issues that claim to fix or close `number`.
    pub fn closers_of(&self, number: u64) -> Vec<&IssueNode> {
        self.traverse_edges(
            number,
            Some(&[ReferenceType::Fixes, ReferenceType::Closes]),
            TraversalDirection::Incoming,
        )
    }

    /// Hop distance of every node from the root, ignoring edge direction.
    pub fn depths_from_root(&self) -> HashMap<u64, usize> {
        let mut depths = HashMap::new();
        let mut queue = VecDeque::new();
        depths.insert(self.root_number(), 0);
        queue.push_back(self.root_number());

        while let Some(current) = queue.pop_front() {
            let depth = depths[&current];
            for neighbor in self.traverse_edges(current, None, TraversalDirection::Both) {
                if !depths.contains_key(&neighbor.issue_number) {
                    depths.insert(neighbor.issue_number, depth + 1);
                    queue.push_back(neighbor.issue_number);
                }
            }
        }

        depths
    }
}

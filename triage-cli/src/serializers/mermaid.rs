//! Mermaid serializer for dependency graphs.
//!
//! Produces Mermaid flowchart syntax for pasting into issues, pull requests
//! or documentation.
//!
//! ## Output Format
//!
//! ```mermaid
//! flowchart LR
//!     i42["#42 Crash on save<br/>open"]
//!     i17["#17 Refactor save path<br/>closed"]
//!     i42 -->|blocked by| i17
//!
//!     classDef root fill:#4a86e8,stroke:#333,stroke-width:3px,color:white
//!     class i42 root
//! ```
//!
//! ## Edge Styles
//!
//! - Closing references (`fixes`, `closes`): `==>` (thick)
//! - Blocking references (`blocks`, `blocked by`): `-->` (solid)
//! - Mentions: `-.->` (dotted)

use std::fmt::Write;
use triage_graph::{GraphSnapshot, IssueState, ReferenceType};

/// Direction for the flowchart layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Left to Right
    #[default]
    LR,
    /// Right to Left
    RL,
    /// Top to Bottom
    TB,
    /// Bottom to Top
    BT,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::LR => "LR",
            Direction::RL => "RL",
            Direction::TB => "TB",
            Direction::BT => "BT",
        }
    }
}

/// Mermaid serializer for dependency graphs.
#[derive(Debug, Clone)]
pub struct MermaidSerializer {
    direction: Direction,

    /// Emit `classDef` lines for the root and closed issues
    include_styles: bool,

    /// Titles longer than this are cut with an ellipsis (0 = never)
    max_title_chars: usize,
}

impl Default for MermaidSerializer {
    fn default() -> Self {
        Self {
            direction: Direction::LR,
            include_styles: true,
            max_title_chars: 40,
        }
    }
}

impl MermaidSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flow direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set whether to include style classes.
    pub fn with_styles(mut self, include: bool) -> Self {
        self.include_styles = include;
        self
    }

    pub fn with_max_title_chars(mut self, max: usize) -> Self {
        self.max_title_chars = max;
        self
    }

    /// Serialize a dependency graph snapshot to Mermaid syntax.
    pub fn serialize_graph(&self, graph: &GraphSnapshot) -> String {
        let mut output = String::new();

        writeln!(output, "flowchart {}", self.direction.as_str()).unwrap();

        for node in &graph.nodes {
            let title = if self.max_title_chars == 0 {
                node.title.clone()
            } else {
                shorten(&node.title, self.max_title_chars)
            };
            writeln!(
                output,
                "    {}[\"#{} {}<br/>{}\"]",
                node_id(node.issue_number),
                node.issue_number,
                escape_label(&title),
                node.state
            )
            .unwrap();
        }

        if !graph.edges.is_empty() {
            writeln!(output).unwrap();
        }
        for edge in &graph.edges {
            writeln!(
                output,
                "    {} {}|{}| {}",
                node_id(edge.source),
                arrow(edge.reference_type),
                edge_label(edge.reference_type),
                node_id(edge.target)
            )
            .unwrap();
        }

        if self.include_styles {
            writeln!(output).unwrap();
            self.write_style_classes(&mut output, graph);
        }

        output
    }

    fn write_style_classes(&self, output: &mut String, graph: &GraphSnapshot) {
        writeln!(
            output,
            "    classDef root fill:#4a86e8,stroke:#333,stroke-width:3px,color:white"
        )
        .unwrap();
        writeln!(
            output,
            "    classDef closed fill:#d9d9d9,stroke:#999,color:#666"
        )
        .unwrap();

        writeln!(output, "    class {} root", node_id(graph.root_issue)).unwrap();

        let closed: Vec<String> = graph
            .nodes
            .iter()
            .filter(|n| n.state == IssueState::Closed && !n.is_root())
            .map(|n| node_id(n.issue_number))
            .collect();
        if !closed.is_empty() {
            writeln!(output, "    class {} closed", closed.join(",")).unwrap();
        }
    }
}

fn node_id(number: u64) -> String {
    format!("i{}", number)
}

fn arrow(reference_type: ReferenceType) -> &'static str {
    if reference_type.is_closing() {
        "==>"
    } else if reference_type.is_blocking() {
        "-->"
    } else {
        "-.->"
    }
}

fn edge_label(reference_type: ReferenceType) -> &'static str {
    match reference_type {
        ReferenceType::Fixes => "fixes",
        ReferenceType::Closes => "closes",
        ReferenceType::Blocks => "blocks",
        ReferenceType::BlockedBy => "blocked by",
        ReferenceType::Mentions => "mentions",
    }
}

fn shorten(title: &str, max_chars: usize) -> String {
    let (mut text, truncated) = triage_graph::truncate_chars(title, max_chars);
    if truncated {
        text.push_str("...");
    }
    text
}

/// Escape a label for use in Mermaid.
///
/// Handles special characters that could break Mermaid syntax.
fn escape_label(label: &str) -> String {
    label
        .replace('"', "#quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_graph::{IssueEdge, IssueGraph, IssueNode};

    fn sample_graph() -> GraphSnapshot {
        let mut graph = IssueGraph::new(IssueNode::new(42, "Crash on \"save\"", IssueState::Open, ""));
        graph
            .add_node(IssueNode::new(17, "Refactor save path", IssueState::Closed, ""))
            .unwrap();
        graph
            .add_node(IssueNode::new(5, "Tracking issue", IssueState::Open, ""))
            .unwrap();
        graph
            .add_edge(IssueEdge::new(42, 17, ReferenceType::BlockedBy).unwrap())
            .unwrap();
        graph
            .add_edge(IssueEdge::new(17, 5, ReferenceType::Fixes).unwrap())
            .unwrap();
        graph
            .add_edge(IssueEdge::new(42, 5, ReferenceType::Mentions).unwrap())
            .unwrap();
        graph.snapshot()
    }

    #[test]
    fn test_serialize_graph() {
        let output = MermaidSerializer::new().serialize_graph(&sample_graph());

        assert!(output.starts_with("flowchart LR\n"));
        assert!(output.contains("    i42[\"#42 Crash on #quot;save#quot;<br/>open\"]"));
        assert!(output.contains("    i42 -->|blocked by| i17"));
        assert!(output.contains("    i17 ==>|fixes| i5"));
        assert!(output.contains("    i42 -.->|mentions| i5"));
        assert!(output.contains("    class i42 root"));
        assert!(output.contains("    class i17 closed"));
    }

    #[test]
    fn test_direction_and_styles() {
        let output = MermaidSerializer::new()
            .with_direction(Direction::TB)
            .with_styles(false)
            .serialize_graph(&sample_graph());

        assert!(output.starts_with("flowchart TB\n"));
        assert!(!output.contains("classDef"));
    }

    #[test]
    fn test_long_titles_shortened() {
        let graph = IssueGraph::new(IssueNode::new(1, "a".repeat(60), IssueState::Open, "")).snapshot();
        let output = MermaidSerializer::new()
            .with_max_title_chars(10)
            .serialize_graph(&graph);
        assert!(output.contains(&format!("#1 {}...<br/>", "a".repeat(10))));
    }
}

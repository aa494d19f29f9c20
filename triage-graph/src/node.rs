//! Issue nodes in the dependency graph.

use crate::issue::{IssueRecord, IssueState};
use serde::Serialize;

/// An issue as it appears in a dependency graph.
///
/// `is_root` is set only by [`IssueGraph::new`](crate::IssueGraph::new) and
/// cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueNode {
    /// Issue number, the node identity
    #[serde(rename = "id")]
    pub issue_number: u64,

    pub title: String,

    pub state: IssueState,

    pub html_url: String,

    pub(crate) is_root: bool,
}

impl IssueNode {
    /// Create a non-root node.
    pub fn new(
        issue_number: u64,
        title: impl Into<String>,
        state: IssueState,
        html_url: impl Into<String>,
    ) -> Self {
        Self {
            issue_number,
            title: title.into(),
            state,
            html_url: html_url.into(),
            is_root: false,
        }
    }

    /// Build a node from a fetched issue.
    pub fn from_issue(issue: &IssueRecord) -> Self {
        Self::new(issue.number, issue.title.clone(), issue.state, issue.html_url.clone())
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::RepoId;

    #[test]
    fn test_from_issue() {
        let repo = RepoId::parse("acme/widgets").unwrap();
        let issue = IssueRecord::new(repo, 12, "Crash on save").with_state(IssueState::Closed);
        let node = IssueNode::from_issue(&issue);
        assert_eq!(node.issue_number, 12);
        assert_eq!(node.state, IssueState::Closed);
        assert_eq!(node.html_url, "https://github.com/acme/widgets/issues/12");
        assert!(!node.is_root());
    }

    #[test]
    fn test_serialized_shape() {
        let node = IssueNode::new(3, "t", IssueState::Open, "u");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["state"], "open");
        assert_eq!(json["is_root"], false);
    }
}

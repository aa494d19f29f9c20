//! Read access to an issue tracker.

use crate::github::GitHubError;
use async_trait::async_trait;
use serde::Serialize;
use triage_graph::{IssueRecord, RepoId};

/// Body characters kept when an issue is fetched.
pub const MAX_FETCHED_BODY_CHARS: usize = 50_000;

/// Core request quota reported by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApiQuota {
    pub remaining: usize,
    pub limit: usize,
}

/// Where issues come from.
///
/// [`GitHubClient`](crate::GitHubClient) is the production implementation;
/// tests substitute in-memory sources.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Fetch one issue with its comments. Bodies longer than
    /// [`MAX_FETCHED_BODY_CHARS`] are truncated and flagged.
    async fn fetch_issue(&self, repo: &RepoId, number: u64) -> Result<IssueRecord, GitHubError>;

    /// Most recently updated issues of any state, newest first, without
    /// comments. Pull requests are excluded.
    async fn list_recent_issues(&self, repo: &RepoId, limit: u8) -> Result<Vec<IssueRecord>, GitHubError>;

    /// Keyword search across all public repositories, best match first,
    /// without comments.
    async fn search_issues(&self, query: &str, limit: u8) -> Result<Vec<IssueRecord>, GitHubError>;

    /// Round-trip to the tracker, returning its request quota when it
    /// reports one. Sources with nothing to reach answer `Ok(None)`.
    async fn quota(&self) -> Result<Option<ApiQuota>, GitHubError> {
        Ok(None)
    }
}

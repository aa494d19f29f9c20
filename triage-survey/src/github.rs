//! GitHub API client for issue retrieval and label creation.
//!
//! This module provides functionality for:
//! - Fetching an issue with its comments
//! - Listing the most recently updated issues of a repository
//! - Searching issues across repositories
//! - Creating labels with a caller-supplied token
//!
//! Every request runs under a deadline; the client uses the `octocrab`
//! library for GitHub API interactions.

use crate::error::ErrorKind;
use crate::labels::{LabelWrite, LabelWriter};
use crate::source::{ApiQuota, IssueSource, MAX_FETCHED_BODY_CHARS};
use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::models::issues::Issue;
use octocrab::params;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use triage_graph::{IssueComment, IssueRecord, IssueState, RepoId};

/// Default deadline for one GitHub request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Comments fetched per issue (one page).
const COMMENTS_PER_PAGE: u8 = 100;

/// Errors that can occur during GitHub operations
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Issue or repository does not exist (or is invisible to us)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication failed or the resource is private
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Primary or secondary rate limit hit
    #[error("Rate limited by GitHub: {0}")]
    RateLimited(String),

    /// No response within the deadline
    #[error("GitHub request timed out after {0} seconds")]
    Timeout(u64),

    /// Transport failure or an unexpected response
    #[error("Network error: {0}")]
    Network(String),

    /// Any other error status
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Label creation hit an existing label
    #[error("Label already exists: {0}")]
    AlreadyExists(String),

    /// Failed to build octocrab client
    #[error("Failed to build GitHub client: {0}")]
    ClientBuildError(String),
}

impl GitHubError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GitHubError::NotFound(_) => ErrorKind::NotFound,
            GitHubError::AccessDenied(_) => ErrorKind::AccessDenied,
            GitHubError::RateLimited(_) => ErrorKind::RateLimited,
            GitHubError::Timeout(_) => ErrorKind::Timeout,
            GitHubError::Network(_) | GitHubError::Api { .. } => ErrorKind::Network,
            GitHubError::AlreadyExists(_) | GitHubError::ClientBuildError(_) => {
                ErrorKind::InvalidInput
            }
        }
    }

    /// Classify an HTTP error status for `resource`.
    pub fn from_status(status: u16, message: &str, resource: &str) -> Self {
        match status {
            404 | 410 => GitHubError::NotFound(resource.to_string()),
            401 => GitHubError::AccessDenied(format!("{resource}: bad credentials")),
            403 if message.to_ascii_lowercase().contains("rate limit") => {
                GitHubError::RateLimited(message.to_string())
            }
            403 => GitHubError::AccessDenied(resource.to_string()),
            429 => GitHubError::RateLimited(message.to_string()),
            _ => GitHubError::Api {
                status,
                message: message.to_string(),
            },
        }
    }

    fn from_octocrab(error: octocrab::Error, resource: &str) -> Self {
        match error {
            octocrab::Error::GitHub { source, .. } => {
                Self::from_status(source.status_code.as_u16(), &source.message, resource)
            }
            other => GitHubError::Network(other.to_string()),
        }
    }
}

/// GitHub API client wrapper
pub struct GitHubClient {
    client: Octocrab,
    timeout: Duration,
}

impl GitHubClient {
    /// Create a new GitHub client.
    ///
    /// # Arguments
    ///
    /// * `token` - Optional personal access token (raises rate limits)
    /// * `api_url` - Optional base URL for GitHub Enterprise
    /// * `timeout_secs` - Deadline for each request
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built
    pub fn new(
        token: Option<&str>,
        api_url: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, GitHubError> {
        let mut builder = Octocrab::builder();

        if let Some(token) = token {
            builder = builder.personal_token(token.to_string());
        }

        if let Some(url) = api_url {
            builder = builder
                .base_uri(url)
                .map_err(|e| GitHubError::ClientBuildError(e.to_string()))?;
        }

        let client = builder
            .build()
            .map_err(|e| GitHubError::ClientBuildError(e.to_string()))?;

        Ok(Self {
            client,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Run one API call under the request deadline.
    async fn call<T>(
        &self,
        resource: &str,
        request: impl Future<Output = octocrab::Result<T>>,
    ) -> Result<T, GitHubError> {
        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| GitHubError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| GitHubError::from_octocrab(e, resource))
    }
}

#[async_trait]
impl IssueSource for GitHubClient {
    #[instrument(skip(self), fields(repo = %repo))]
    async fn fetch_issue(&self, repo: &RepoId, number: u64) -> Result<IssueRecord, GitHubError> {
        let resource = format!("{repo}#{number}");
        let handler = self.client.issues(&repo.owner, &repo.name);

        let issue = self.call(&resource, handler.get(number)).await?;
        let comments_page = self
            .call(
                &resource,
                handler
                    .list_comments(number)
                    .per_page(COMMENTS_PER_PAGE)
                    .send(),
            )
            .await?;

        let mut record = issue_to_record(issue, repo.clone());
        record.comments = comments_page
            .items
            .into_iter()
            .map(|c| IssueComment::new(c.user.login, c.body.unwrap_or_default(), c.created_at))
            .collect();
        record.comments.sort_by_key(|c| c.created_at);
        record.comment_count = record.comment_count.max(record.comments.len() as u32);
        record.truncate_body(MAX_FETCHED_BODY_CHARS);

        debug!(
            comments = record.comments.len(),
            truncated = record.body_truncated,
            "fetched issue"
        );
        Ok(record)
    }

    #[instrument(skip(self), fields(repo = %repo))]
    async fn list_recent_issues(&self, repo: &RepoId, limit: u8) -> Result<Vec<IssueRecord>, GitHubError> {
        let page = self
            .call(
                &repo.full_name(),
                self.client
                    .issues(&repo.owner, &repo.name)
                    .list()
                    .state(params::State::All)
                    .sort(params::issues::Sort::Updated)
                    .direction(params::Direction::Descending)
                    .per_page(limit)
                    .send(),
            )
            .await?;

        let issues: Vec<IssueRecord> = page
            .items
            .into_iter()
            .filter(|issue| issue.pull_request.is_none())
            .map(|issue| issue_to_record(issue, repo.clone()))
            .collect();
        debug!(count = issues.len(), "listed recent issues");
        Ok(issues)
    }

    #[instrument(skip(self))]
    async fn search_issues(&self, query: &str, limit: u8) -> Result<Vec<IssueRecord>, GitHubError> {
        let page = self
            .call(
                "issue search",
                self.client
                    .search()
                    .issues_and_pull_requests(query)
                    .per_page(limit)
                    .send(),
            )
            .await?;

        let mut issues = Vec::with_capacity(page.items.len());
        for issue in page.items {
            if issue.pull_request.is_some() {
                continue;
            }
            match repo_from_api_url(issue.repository_url.as_str()) {
                Some(repo) => issues.push(issue_to_record(issue, repo)),
                None => debug!(url = %issue.repository_url, "skipping result with unparsable repository"),
            }
        }
        debug!(count = issues.len(), "search returned issues");
        Ok(issues)
    }

    #[instrument(skip(self))]
    async fn quota(&self) -> Result<Option<ApiQuota>, GitHubError> {
        let limits = self.call("rate limit", self.client.ratelimit().get()).await?;
        debug!(remaining = limits.rate.remaining, limit = limits.rate.limit, "rate limit");
        Ok(Some(ApiQuota {
            remaining: limits.rate.remaining,
            limit: limits.rate.limit,
        }))
    }
}

#[async_trait]
impl LabelWriter for GitHubClient {
    #[instrument(skip(self, description), fields(repo = %repo))]
    async fn create_label(
        &self,
        repo: &RepoId,
        name: &str,
        color: &str,
        description: &str,
    ) -> Result<LabelWrite, GitHubError> {
        let resource = format!("{repo} label '{name}'");
        let result = self
            .call(
                &resource,
                self.client
                    .issues(&repo.owner, &repo.name)
                    .create_label(name, color, description),
            )
            .await;

        match result {
            Ok(_) => Ok(LabelWrite::Created),
            Err(GitHubError::Api { status: 422, .. }) => Ok(LabelWrite::AlreadyExists),
            Err(e) => Err(e),
        }
    }
}

fn issue_to_record(issue: Issue, repo: RepoId) -> IssueRecord {
    let state = match issue.state {
        octocrab::models::IssueState::Closed => IssueState::Closed,
        _ => IssueState::Open,
    };

    IssueRecord {
        repo,
        number: issue.number,
        title: issue.title,
        body: issue.body.unwrap_or_default(),
        body_truncated: false,
        state,
        author: issue.user.login,
        labels: issue.labels.into_iter().map(|l| l.name).collect(),
        comments: Vec::new(),
        comment_count: issue.comments,
        created_at: issue.created_at,
        html_url: issue.html_url.to_string(),
    }
}

/// Extract `owner/name` from an API repository URL such as
/// `https://api.github.com/repos/owner/name`.
pub fn repo_from_api_url(url: &str) -> Option<RepoId> {
    let mut segments = url.trim_end_matches('/').rsplit('/');
    let name = segments.next()?;
    let owner = segments.next()?;
    if segments.next()? != "repos" {
        return None;
    }
    RepoId::new(owner, name).ok()
}

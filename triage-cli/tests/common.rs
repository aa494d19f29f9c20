//! Shared fixtures for triage-cli integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use triage_cli::{TriageConfig, TriageContext};
use triage_graph::{IssueRecord, IssueState, RepoId};
use triage_llm::{LLMProvider, LLMResult, Message};
use triage_survey::{ApiQuota, GitHubError, IssueSource};

pub const ANALYSIS_REPLY: &str = r#"```json
{
  "summary": "Saving a document with an empty title crashes the editor",
  "type": "Bug",
  "priority_score": 4,
  "priority_justification": "Data loss on a core workflow",
  "suggested_labels": ["bug", "editor"],
  "potential_impact": "Every user who saves an untitled document",
  "confidence_score": 0.9,
  "draft_response": "Thanks for the detailed report!"
}
```"#;

pub fn repo() -> RepoId {
    RepoId::parse("acme/widgets").expect("valid repo")
}

/// In-memory tracker for `acme/widgets`.
#[derive(Default)]
pub struct FakeTracker {
    issues: HashMap<u64, IssueRecord>,
    quota: Option<ApiQuota>,
    offline: bool,
}

impl FakeTracker {
    pub fn with(mut self, number: u64, title: &str, body: &str) -> Self {
        let issue = IssueRecord::new(repo(), number, title)
            .with_body(body)
            .with_state(IssueState::Open);
        self.issues.insert(number, issue);
        self
    }

    pub fn with_quota(mut self, remaining: usize, limit: usize) -> Self {
        self.quota = Some(ApiQuota { remaining, limit });
        self
    }

    /// Every quota request fails with a network error.
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }
}

#[async_trait]
impl IssueSource for FakeTracker {
    async fn fetch_issue(&self, repo: &RepoId, number: u64) -> Result<IssueRecord, GitHubError> {
        self.issues
            .get(&number)
            .cloned()
            .ok_or_else(|| GitHubError::NotFound(format!("{repo}#{number}")))
    }

    async fn list_recent_issues(&self, _repo: &RepoId, limit: u8) -> Result<Vec<IssueRecord>, GitHubError> {
        let mut issues: Vec<IssueRecord> = self.issues.values().cloned().collect();
        issues.sort_by(|a, b| b.number.cmp(&a.number));
        issues.truncate(limit as usize);
        Ok(issues)
    }

    async fn search_issues(&self, _query: &str, _limit: u8) -> Result<Vec<IssueRecord>, GitHubError> {
        Ok(Vec::new())
    }

    async fn quota(&self) -> Result<Option<ApiQuota>, GitHubError> {
        if self.offline {
            return Err(GitHubError::Network("connection refused".to_string()));
        }
        Ok(self.quota)
    }
}

/// Generator that always returns [`ANALYSIS_REPLY`].
#[derive(Default)]
pub struct CannedGenerator {
    calls: AtomicUsize,
    missing: bool,
}

impl CannedGenerator {
    /// A generator whose CLI is not installed.
    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LLMProvider for CannedGenerator {
    fn name(&self) -> &str {
        "canned"
    }

    async fn is_available(&self) -> bool {
        !self.missing
    }

    async fn prompt(&self, _system: &str, _user: &str) -> LLMResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ANALYSIS_REPLY.to_string())
    }

    async fn prompt_with_history(&self, system: &str, _history: &[Message], user: &str) -> LLMResult<String> {
        self.prompt(system, user).await
    }
}

pub fn context(tracker: FakeTracker, generator: Arc<CannedGenerator>) -> TriageContext {
    TriageContext::from_parts(TriageConfig::default(), Arc::new(tracker), generator)
}

/// Parse a JSON document produced by a command.
pub fn json(document: &str) -> serde_json::Value {
    serde_json::from_str(document).expect("command output is JSON")
}

//! Shared fixtures for triage-survey integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use triage_graph::{IssueRecord, RepoId};
use triage_llm::{LLMProvider, LLMResult, Message};
use triage_survey::{GitHubError, IssueSource};

pub const VALID_REPLY: &str = r#"Sure! Here is the analysis:
```json
{
  "summary": "Export to PDF crashes the desktop app",
  "type": "bug",
  "priority_score": 4,
  "priority_justification": "Core workflow broken for many users",
  "suggested_labels": ["bug", "export", "bug"],
  "potential_impact": "Users cannot share reports",
  "confidence_score": 0.85,
  "draft_response": "Thanks for the report, we are looking into it."
}
```
Let me know if you need anything else."#;

pub fn repo() -> RepoId {
    RepoId::parse("acme/app").expect("valid repo")
}

/// In-memory issue tracker keyed by issue number.
#[derive(Default)]
pub struct MemoryTracker {
    issues: HashMap<u64, IssueRecord>,
    private: HashSet<u64>,
    pub fetches: AtomicUsize,
}

impl MemoryTracker {
    pub fn with(mut self, number: u64, title: &str, body: &str) -> Self {
        self.issues
            .insert(number, IssueRecord::new(repo(), number, title).with_body(body));
        self
    }

    /// `number` exists but the caller may not read it.
    pub fn with_private(mut self, number: u64) -> Self {
        self.private.insert(number);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IssueSource for MemoryTracker {
    async fn fetch_issue(&self, repo: &RepoId, number: u64) -> Result<IssueRecord, GitHubError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.private.contains(&number) {
            return Err(GitHubError::AccessDenied(format!("{repo}#{number}")));
        }
        self.issues
            .get(&number)
            .cloned()
            .ok_or_else(|| GitHubError::NotFound(format!("{repo}#{number}")))
    }

    async fn list_recent_issues(&self, _repo: &RepoId, limit: u8) -> Result<Vec<IssueRecord>, GitHubError> {
        let mut issues: Vec<IssueRecord> = self.issues.values().cloned().collect();
        issues.sort_by_key(|i| i.number);
        issues.truncate(limit as usize);
        Ok(issues)
    }

    async fn search_issues(&self, _query: &str, _limit: u8) -> Result<Vec<IssueRecord>, GitHubError> {
        Ok(Vec::new())
    }
}

/// Generator that answers every issue with [`VALID_REPLY`], except issues
/// titled "Broken ..." which get prose with no JSON.
pub struct ScriptedGenerator {
    pub calls: AtomicUsize,
    pub delay: Duration,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LLMProvider for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn prompt(&self, _system: &str, user: &str) -> LLMResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if user.contains("Title: Broken") {
            Ok("I'm sorry, I can't analyze this issue right now.".to_string())
        } else {
            Ok(VALID_REPLY.to_string())
        }
    }

    async fn prompt_with_history(&self, system: &str, _history: &[Message], user: &str) -> LLMResult<String> {
        self.prompt(system, user).await
    }
}

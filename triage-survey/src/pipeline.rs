//! The issue intelligence pipeline: fetch, cache lookup, analyze, store.

use crate::error::TriageResult;
use crate::source::IssueSource;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use triage_graph::{IssueRecord, RepoId};
use triage_llm::{AnalysisCache, AnalysisEngine, AnalysisRecord, CacheKey};

/// Everything one analysis request produces.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub issue: IssueRecord,
    pub analysis: AnalysisRecord,
    /// Served from the cache without a generator call
    pub cached: bool,
    /// The prompt saw a truncated body
    pub truncated: bool,
}

/// Fetches an issue and returns its (possibly cached) analysis.
///
/// The issue itself is always fetched fresh; only analyses are cached.
pub struct IssuePipeline {
    source: Arc<dyn IssueSource>,
    engine: AnalysisEngine,
    cache: Arc<AnalysisCache>,
}

impl IssuePipeline {
    pub fn new(source: Arc<dyn IssueSource>, engine: AnalysisEngine, cache: Arc<AnalysisCache>) -> Self {
        Self { source, engine, cache }
    }

    pub fn source(&self) -> &Arc<dyn IssueSource> {
        &self.source
    }

    pub fn cache(&self) -> &Arc<AnalysisCache> {
        &self.cache
    }

    /// Analyze `repo#number`.
    ///
    /// With `refresh`, the cache is bypassed and the fresh result overwrites
    /// any cached one. Otherwise concurrent requests for the same issue share
    /// one generator call.
    pub async fn analyze(&self, repo: &RepoId, number: u64, refresh: bool) -> TriageResult<AnalysisOutcome> {
        let issue = self.source.fetch_issue(repo, number).await?;
        let key = CacheKey::new(repo, number);

        let (analysis, cached, truncated) = if refresh {
            debug!(key = %key, "refresh requested, bypassing cache");
            let output = self.engine.analyze(&issue).await?;
            self.cache.store(key, output.record.clone());
            (output.record, false, output.truncated)
        } else {
            let (analysis, cached) = self
                .cache
                .get_or_compute(key, || async {
                    self.engine.analyze(&issue).await.map(|output| output.record)
                })
                .await?;
            (analysis, cached, self.engine.truncates(&issue))
        };

        info!(
            repo = %repo,
            issue = number,
            cached,
            priority = analysis.priority_score,
            "issue analyzed"
        );

        Ok(AnalysisOutcome {
            issue,
            analysis,
            cached,
            truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, TriageError};
    use crate::source::memory::MemorySource;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use triage_llm::{LLMProvider, LLMResult, Message};

    const REPLY: &str = r#"Here you go:
```json
{"summary": "Export crashes", "type": "bug", "priority_score": 4,
 "priority_justification": "Core flow", "suggested_labels": ["bug", "export"],
 "potential_impact": "Users cannot export", "confidence_score": 0.8,
 "draft_response": "Thanks, investigating."}
```"#;

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LLMProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn prompt(&self, _system: &str, _user: &str) -> LLMResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(REPLY.to_string())
        }

        async fn prompt_with_history(&self, system: &str, _history: &[Message], user: &str) -> LLMResult<String> {
            self.prompt(system, user).await
        }
    }

    fn setup() -> (IssuePipeline, Arc<CountingProvider>) {
        let repo = RepoId::parse("acme/app").unwrap();
        let source = MemorySource::default()
            .with(IssueRecord::new(repo, 1, "Export crashes").with_body("Stack trace attached"));
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let pipeline = IssuePipeline::new(
            Arc::new(source),
            AnalysisEngine::new(provider.clone()),
            Arc::new(AnalysisCache::default()),
        );
        (pipeline, provider)
    }

    #[tokio::test]
    async fn test_second_request_is_cached() {
        let (pipeline, provider) = setup();
        let repo = RepoId::parse("acme/app").unwrap();

        let first = pipeline.analyze(&repo, 1, false).await.unwrap();
        assert!(!first.cached);
        assert!(!first.truncated);

        let second = pipeline.analyze(&repo, 1, false).await.unwrap();
        assert!(second.cached);
        assert_eq!(second.analysis, first.analysis);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_recomputes() {
        let (pipeline, provider) = setup();
        let repo = RepoId::parse("acme/app").unwrap();

        pipeline.analyze(&repo, 1, false).await.unwrap();
        let refreshed = pipeline.analyze(&repo, 1, true).await.unwrap();
        assert!(!refreshed.cached);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(pipeline.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_issue() {
        let (pipeline, provider) = setup();
        let err = pipeline
            .analyze(&RepoId::parse("acme/app").unwrap(), 404, false)
            .await
            .unwrap_err();
        assert!(matches!(err, TriageError::GitHub(_)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}

//! AnalysisEngine - one generator call per issue, repaired and validated.

use crate::analysis::AnalysisRecord;
use crate::error::AnalysisError;
use crate::prompt::{PERSONA, PromptBudget, build_user_prompt, exemplars, render_issue};
use crate::provider::LLMProvider;
use crate::repair::ResponseRepairParser;
use std::sync::Arc;
use tracing::{debug, info, warn};
use triage_graph::IssueRecord;

/// A validated analysis plus whether the prompt saw a truncated body.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutput {
    pub record: AnalysisRecord,
    pub truncated: bool,
}

/// Turns an [`IssueRecord`] into an [`AnalysisRecord`].
///
/// # Example
///
/// ```rust,ignore
/// use triage_llm::{AnalysisEngine, adapters::create_provider};
///
/// let engine = AnalysisEngine::new(create_provider("claude", None, 180)?);
/// let output = engine.analyze(&issue).await?;
/// println!("priority {}", output.record.priority_score);
/// ```
#[derive(Clone)]
pub struct AnalysisEngine {
    provider: Arc<dyn LLMProvider>,
    budget: PromptBudget,
    parser: ResponseRepairParser,
}

impl AnalysisEngine {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            budget: PromptBudget::default(),
            parser: ResponseRepairParser,
        }
    }

    /// Override the prompt size limits (builder pattern).
    pub fn with_budget(mut self, budget: PromptBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// Whether a prompt for `issue` would carry a truncated body.
    pub fn truncates(&self, issue: &IssueRecord) -> bool {
        render_issue(issue, &self.budget).truncated
    }

    /// Analyze one issue with exactly one generator invocation.
    ///
    /// # Errors
    /// - `AnalysisError::Generator` when the CLI fails or times out
    /// - `AnalysisError::MalformedOutput` when no JSON object is recoverable
    /// - `AnalysisError::Validation` when the object violates the schema
    pub async fn analyze(&self, issue: &IssueRecord) -> Result<EngineOutput, AnalysisError> {
        let rendered = render_issue(issue, &self.budget);
        let user = build_user_prompt(&rendered);

        debug!(
            repo = %issue.repo,
            issue = issue.number,
            provider = self.provider.name(),
            prompt_chars = user.len(),
            truncated = rendered.truncated,
            "requesting analysis"
        );

        let raw = self
            .provider
            .prompt_with_history(PERSONA, &exemplars(), &user)
            .await?;

        let record = self.parser.parse(&raw).inspect_err(|e| {
            warn!(repo = %issue.repo, issue = issue.number, error = %e, "unusable generator output");
        })?;

        info!(
            repo = %issue.repo,
            issue = issue.number,
            issue_type = %record.issue_type,
            priority = record.priority_score,
            "analysis complete"
        );

        Ok(EngineOutput {
            record,
            truncated: rendered.truncated,
        })
    }
}

impl std::fmt::Debug for AnalysisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisEngine")
            .field("provider", &self.provider.name())
            .field("budget", &self.budget)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{IssueType, ValidationError};
    use crate::provider::{LLMError, LLMResult, Message};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use triage_graph::RepoId;

    /// Provider that replays a fixed reply and records what it was sent.
    struct ScriptedProvider {
        reply: LLMResult<String>,
        calls: AtomicUsize,
        history_len: Mutex<usize>,
        last_system: Mutex<String>,
    }

    impl ScriptedProvider {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
                history_len: Mutex::new(0),
                last_system: Mutex::new(String::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(LLMError::Timeout(180)),
                ..Self::replying("")
            }
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn prompt(&self, _system: &str, _user: &str) -> LLMResult<String> {
            unreachable!("engine always sends history")
        }

        async fn prompt_with_history(
            &self,
            system: &str,
            history: &[Message],
            _user: &str,
        ) -> LLMResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.history_len.lock().unwrap() = history.len();
            *self.last_system.lock().unwrap() = system.to_string();
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(LLMError::Timeout(180)),
            }
        }
    }

    fn issue() -> IssueRecord {
        IssueRecord::new(RepoId::parse("acme/app").unwrap(), 3, "Typo in README")
            .with_body("'recieve' should be 'receive'")
    }

    const REPLY: &str = r#"```json
{"summary": "README typo", "type": "documentation", "priority_score": 1,
 "priority_justification": "Cosmetic", "suggested_labels": ["documentation", "good first issue"],
 "potential_impact": "None", "confidence_score": 0.99, "draft_response": "Thanks!"}
```"#;

    #[tokio::test]
    async fn test_single_call_with_exemplar_history() {
        let provider = Arc::new(ScriptedProvider::replying(REPLY));
        let engine = AnalysisEngine::new(provider.clone());

        let output = engine.analyze(&issue()).await.unwrap();

        assert_eq!(output.record.issue_type, IssueType::Documentation);
        assert!(!output.truncated);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*provider.history_len.lock().unwrap(), 4);
        assert!(provider.last_system.lock().unwrap().contains("Senior Technical Product Manager"));
    }

    #[tokio::test]
    async fn test_truncation_surfaced() {
        let provider = Arc::new(ScriptedProvider::replying(REPLY));
        let engine = AnalysisEngine::new(provider).with_budget(PromptBudget {
            body_chars: 5,
            ..PromptBudget::default()
        });
        assert!(engine.truncates(&issue()));
        assert!(engine.analyze(&issue()).await.unwrap().truncated);
    }

    #[tokio::test]
    async fn test_range_violation_is_validation_error() {
        let reply = REPLY.replace("\"priority_score\": 1", "\"priority_score\": 9");
        let engine = AnalysisEngine::new(Arc::new(ScriptedProvider::replying(&reply)));
        let err = engine.analyze(&issue()).await.unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Validation(ValidationError::OutOfRange { .. })
        ));
    }

    #[tokio::test]
    async fn test_generator_failure() {
        let engine = AnalysisEngine::new(Arc::new(ScriptedProvider::failing()));
        let err = engine.analyze(&issue()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Generator(LLMError::Timeout(180))));
    }
}

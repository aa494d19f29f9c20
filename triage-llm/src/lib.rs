//! Issue analysis over CLI-hosted LLMs for Triage.
//!
//! This crate turns one [`IssueRecord`](triage_graph::IssueRecord) into a
//! validated [`AnalysisRecord`]:
//!
//! - [`prompt`] builds the persona, exemplar history, schema contract and
//!   budgeted issue text
//! - [`LLMProvider`] implementations in [`adapters`] shell out to `claude`
//!   or `gemini`
//! - [`ResponseRepairParser`] recovers JSON from prose-wrapped output
//! - [`AnalysisEngine`] ties the three together, one generator call per issue
//! - [`AnalysisCache`] memoizes results with single-flight semantics
//!
//! # Architecture
//!
//! Triage integrates with LLMs by **shelling out to coding agent CLIs**
//! rather than making API calls. No API keys live in `triage.yaml`; the
//! user's existing CLI authentication is reused.
//!
//! # Example
//!
//! ```rust,ignore
//! use triage_llm::{AnalysisCache, AnalysisEngine, CacheKey, adapters::create_provider};
//!
//! let engine = AnalysisEngine::new(create_provider("claude", None, 180)?);
//! let cache = AnalysisCache::default();
//! let (record, cached) = cache
//!     .get_or_compute(CacheKey::new(&issue.repo, issue.number), || async {
//!         engine.analyze(&issue).await.map(|out| out.record)
//!     })
//!     .await?;
//! ```

pub mod adapters;
pub mod analysis;
pub mod cache;
pub mod engine;
pub mod error;
pub mod prompt;
pub mod provider;
pub mod repair;

pub use adapters::{ClaudeAdapter, GeminiAdapter, SUPPORTED_PROVIDERS, create_provider};
pub use analysis::{AnalysisRecord, IssueType, ValidationError};
pub use cache::{AnalysisCache, CacheKey};
pub use engine::{AnalysisEngine, EngineOutput};
pub use error::AnalysisError;
pub use prompt::PromptBudget;
pub use provider::{LLMError, LLMProvider, LLMResult, Message, Role};
pub use repair::{ResponseRepairParser, StageFailure};

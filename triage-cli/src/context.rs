//! Wiring shared by the commands.
//!
//! A [`TriageContext`] owns one issue source, one generator and one analysis
//! cache. Commands borrow it to build the pipeline, ranker or graph builder
//! they need, so every analysis in a process goes through the same cache.

use crate::config::{ScorerKind, TriageConfig};
use crate::errors::CliError;
use std::sync::Arc;
use tracing::debug;
use triage_llm::{AnalysisCache, AnalysisEngine, AnalysisError, LLMProvider, create_provider};
use triage_survey::{
    GitHubClient, IssuePipeline, IssueSource, LexicalScorer, LlmScorer, ReferenceGraphBuilder,
    SimilarityRanker, SimilarityScorer, TriageError,
};

pub struct TriageContext {
    config: TriageConfig,
    source: Arc<dyn IssueSource>,
    provider: Arc<dyn LLMProvider>,
    cache: Arc<AnalysisCache>,
}

impl TriageContext {
    /// Connect to GitHub and select the generator named in `config`.
    ///
    /// Nothing is contacted yet; a missing generator CLI surfaces on first
    /// use.
    pub fn from_config(config: TriageConfig) -> Result<Self, CliError> {
        let token = config.github_token();
        if token.is_none() {
            debug!(var = %config.github.token_env, "no GitHub token, using anonymous access");
        }

        let github = GitHubClient::new(
            token.as_deref(),
            config.github.api_url.as_deref(),
            config.github.timeout_secs,
        )
        .map_err(TriageError::from)?;

        let cli_path = config
            .llm
            .cli_path
            .as_ref()
            .map(|p| p.to_string_lossy().to_string());
        let provider = create_provider(&config.llm.provider, cli_path, config.llm.timeout_secs)
            .map_err(|e| TriageError::from(AnalysisError::from(e)))?;

        Ok(Self::from_parts(config, Arc::new(github), provider))
    }

    /// Assemble a context from ready-made parts.
    pub fn from_parts(
        config: TriageConfig,
        source: Arc<dyn IssueSource>,
        provider: Arc<dyn LLMProvider>,
    ) -> Self {
        let cache = Arc::new(AnalysisCache::new(config.analysis.cache_capacity));
        Self {
            config,
            source,
            provider,
            cache,
        }
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    pub fn source(&self) -> &Arc<dyn IssueSource> {
        &self.source
    }

    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    pub fn cache(&self) -> &Arc<AnalysisCache> {
        &self.cache
    }

    pub fn pipeline(&self) -> IssuePipeline {
        IssuePipeline::new(
            Arc::clone(&self.source),
            AnalysisEngine::new(Arc::clone(&self.provider)),
            Arc::clone(&self.cache),
        )
    }

    pub fn scorer(&self) -> Arc<dyn SimilarityScorer> {
        match self.config.similarity.scorer {
            ScorerKind::Lexical => Arc::new(LexicalScorer),
            ScorerKind::Llm => Arc::new(LlmScorer::new(Arc::clone(&self.provider))),
        }
    }

    pub fn ranker(&self) -> SimilarityRanker {
        SimilarityRanker::new(Arc::clone(&self.source), self.scorer())
    }

    pub fn graph_builder(&self) -> ReferenceGraphBuilder {
        ReferenceGraphBuilder::new(Arc::clone(&self.source)).with_max_fetches(self.config.graph.max_fetches)
    }
}

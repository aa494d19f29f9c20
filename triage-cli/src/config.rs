//! Configuration loading and validation for Triage.
//!
//! This module implements the `triage.yaml` configuration schema and provides
//! utilities for locating, loading and validating it.
//!
//! # Configuration File
//!
//! The file is looked up in order:
//! 1. the path given with `--config` (must exist)
//! 2. `./triage.yaml`
//! 3. `<config dir>/triage/triage.yaml` (e.g. `~/.config/triage/triage.yaml`)
//!
//! When none exists, built-in defaults are used. Every section and key is
//! optional.
//!
//! # Environment Variable Overrides
//!
//! - `TRIAGE_LLM_PROVIDER`: Override the LLM provider
//! - `TRIAGE_GITHUB_API_URL`: Override the GitHub API base URL
//! - `TRIAGE_SIMILARITY_SCORER`: Override the similarity scorer

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use triage_llm::SUPPORTED_PROVIDERS;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "triage.yaml";

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read the configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse the YAML configuration.
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Required environment variable is not set.
    #[error("Environment variable not set: {0}")]
    EnvVarMissing(String),
}

/// Root configuration structure for `triage.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriageConfig {
    /// GitHub API settings.
    #[serde(default)]
    pub github: GitHubConfig,

    /// Text generator settings.
    #[serde(default)]
    pub llm: LLMConfig,

    /// Analysis cache settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Dependency graph settings.
    #[serde(default)]
    pub graph: GraphConfig,

    /// Duplicate and similar-issue settings.
    #[serde(default)]
    pub similarity: SimilarityConfig,
}

/// GitHub-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Environment variable name containing the GitHub token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// GitHub API base URL (for GitHub Enterprise).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Deadline for each API request.
    #[serde(default = "default_github_timeout")]
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token_env: default_token_env(),
            api_url: None,
            timeout_secs: default_github_timeout(),
        }
    }
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_github_timeout() -> u64 {
    triage_survey::github::DEFAULT_TIMEOUT_SECS
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Provider name: `claude` or `gemini`.
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// Custom CLI path (if the CLI is not in PATH).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_path: Option<PathBuf>,

    /// Deadline for one generator invocation.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            cli_path: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_llm_provider() -> String {
    "claude".to_string()
}

fn default_llm_timeout() -> u64 {
    triage_llm::adapters::base::DEFAULT_TIMEOUT_SECS
}

/// Analysis cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Analyses kept in memory for the life of the process.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_cache_capacity() -> usize {
    triage_llm::cache::DEFAULT_CAPACITY
}

/// Dependency graph configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Referenced issues fetched per graph, root excluded.
    #[serde(default = "default_max_fetches")]
    pub max_fetches: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_fetches: default_max_fetches(),
        }
    }
}

fn default_max_fetches() -> usize {
    triage_survey::dependency_graph::DEFAULT_MAX_FETCHES
}

/// Which similarity scorer to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScorerKind {
    /// Term-frequency cosine similarity, no external calls.
    #[default]
    Lexical,
    /// Ask the configured LLM for a rating.
    Llm,
}

impl std::str::FromStr for ScorerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexical" => Ok(ScorerKind::Lexical),
            "llm" => Ok(ScorerKind::Llm),
            other => Err(ConfigError::ValidationError(format!(
                "Invalid similarity scorer '{}'. Expected one of: lexical, llm",
                other
            ))),
        }
    }
}

/// Similarity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityConfig {
    #[serde(default)]
    pub scorer: ScorerKind,

    /// Default duplicate threshold in `[0, 1]`.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            scorer: ScorerKind::default(),
            threshold: default_threshold(),
        }
    }
}

fn default_threshold() -> f64 {
    triage_survey::similarity::DEFAULT_THRESHOLD
}

impl TriageConfig {
    /// Load configuration using the lookup order described in the module
    /// docs, falling back to defaults when no file exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        match Self::discover() {
            Some(path) => Self::load_from_path(&path),
            None => {
                let mut config = Self::default();
                config.apply_env_overrides()?;
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// First existing config file among the implicit locations.
    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }

        dirs::config_dir()
            .map(|dir| dir.join("triage").join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        // An empty file is a valid, all-defaults config
        let mut config: TriageConfig = if content.trim().is_empty() {
            TriageConfig::default()
        } else {
            serde_yaml::from_str(&content)?
        };

        config.apply_env_overrides()?;
        config.expand_paths();
        config.validate()?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply `TRIAGE_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(provider) = lookup("TRIAGE_LLM_PROVIDER") {
            self.llm.provider = provider;
        }

        if let Some(url) = lookup("TRIAGE_GITHUB_API_URL") {
            self.github.api_url = Some(url);
        }

        if let Some(scorer) = lookup("TRIAGE_SIMILARITY_SCORER") {
            self.similarity.scorer = scorer.parse()?;
        }

        Ok(())
    }

    /// Expand `~` in the LLM CLI path to the home directory.
    fn expand_paths(&mut self) {
        let Some(home) = dirs::home_dir() else {
            return;
        };

        if let Some(path) = &self.llm.cli_path {
            if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/")) {
                self.llm.cli_path = Some(home.join(rest));
            }
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid LLM provider '{}'. Expected one of: {}",
                self.llm.provider,
                SUPPORTED_PROVIDERS.join(", ")
            )));
        }

        if !(0.0..=1.0).contains(&self.similarity.threshold) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid similarity threshold {}. Expected a value between 0 and 1",
                self.similarity.threshold
            )));
        }

        if self.github.timeout_secs == 0 || self.llm.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "Timeouts must be at least 1 second".into(),
            ));
        }

        if self.github.token_env.trim().is_empty() {
            return Err(ConfigError::ValidationError("github.token_env must not be empty".into()));
        }

        Ok(())
    }

    /// GitHub token from the configured environment variable, if set.
    pub fn github_token(&self) -> Option<String> {
        read_token(&self.github.token_env)
    }

    /// Token from `var`, required (used for write operations).
    pub fn required_token(var: &str) -> Result<String, ConfigError> {
        read_token(var).ok_or_else(|| ConfigError::EnvVarMissing(var.to_string()))
    }
}

fn read_token(var: &str) -> Option<String> {
    env::var(var).ok().filter(|token| !token.trim().is_empty())
}

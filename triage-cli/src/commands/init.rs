//! Implementation of the `triage init` command.
//!
//! This command generates a default `triage.yaml` configuration file with
//! comments explaining each section.
//!
//! # Usage
//!
//! ```bash
//! # Create triage.yaml in current directory
//! triage init
//!
//! # Pre-select the LLM provider
//! triage init --provider gemini
//!
//! # Overwrite existing file
//! triage init --force
//! ```

use std::io::Write;
use std::path::Path;
use thiserror::Error;
use triage_llm::SUPPORTED_PROVIDERS;

use crate::config::CONFIG_FILE_NAME;
use crate::output;

/// Errors that can occur during initialization.
#[derive(Debug, Error)]
pub enum InitError {
    /// Configuration file already exists and --force was not specified.
    #[error("Configuration file already exists: {path}. Use --force to overwrite.")]
    FileExists { path: String },

    #[error("Unknown provider '{0}'. Expected one of: claude, gemini")]
    UnknownProvider(String),

    /// Failed to write the configuration file.
    #[error("Failed to write configuration file: {0}")]
    WriteError(#[from] std::io::Error),
}

/// Default configuration template.
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# triage.yaml - Triage configuration file
# Every key is optional; the values below are the defaults.

# ===============================================================================
# GITHUB
# ===============================================================================

github:
  # Environment variable holding a GitHub personal access token.
  # Optional for public repositories, but raises the rate limit from
  # 60 to 5,000 requests per hour.
  token_env: "GITHUB_TOKEN"

  # For GitHub Enterprise, set the API base URL
  # api_url: "https://github.mycompany.com/api/v3"

  # Deadline for each API request
  timeout_secs: 30

# ===============================================================================
# LLM
# ===============================================================================
# Triage shells out to an installed coding-agent CLI and reuses its login.
# No API keys are stored here.

llm:
  # claude | gemini
  provider: "{provider}"

  # Override CLI path if not in PATH
  # cli_path: "/usr/local/bin/claude"

  # Deadline for one analysis
  timeout_secs: 180

# ===============================================================================
# ANALYSIS CACHE
# ===============================================================================

analysis:
  # Analyses remembered for the life of the process (least recently used
  # entries are evicted first)
  cache_capacity: 512

# ===============================================================================
# DEPENDENCY GRAPHS
# ===============================================================================

graph:
  # Referenced issues fetched per graph, not counting the root
  max_fetches: 25

# ===============================================================================
# SIMILARITY
# ===============================================================================

similarity:
  # lexical: word-overlap scoring, fast and offline
  # llm: ask the provider above to rate each pair (slower)
  scorer: "lexical"

  # Minimum score for `triage duplicates`
  threshold: 0.7
"#;

/// Options for the `triage init` command.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// LLM provider to pre-select.
    pub provider: Option<String>,
    /// Output path for the configuration file.
    pub output: Option<String>,
    /// Whether to overwrite an existing file.
    pub force: bool,
}

/// Run the `triage init` command.
///
/// # Errors
///
/// Fails if the file already exists (and `--force` was not specified), the
/// provider is unknown, or writing failed.
pub fn run_init(options: InitOptions) -> Result<(), InitError> {
    let output_path = options
        .output
        .unwrap_or_else(|| CONFIG_FILE_NAME.to_string());
    let path = Path::new(&output_path);

    let provider = options.provider.unwrap_or_else(|| "claude".to_string());
    if !SUPPORTED_PROVIDERS.contains(&provider.as_str()) {
        return Err(InitError::UnknownProvider(provider));
    }

    if path.exists() && !options.force {
        return Err(InitError::FileExists { path: output_path });
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let content = DEFAULT_CONFIG_TEMPLATE.replace("{provider}", &provider);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    output::success(&format!("Created configuration file: {}", output_path));
    output::info("");
    output::info("Next steps:");
    output::info(&format!("  1. Make sure the '{}' CLI is installed and logged in", provider));
    output::info("  2. Optionally set a GitHub token: export GITHUB_TOKEN=<your-token>");
    output::info("  3. Run: triage analyze owner/repo 123");

    Ok(())
}

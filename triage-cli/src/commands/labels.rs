//! Implementation of the `triage labels` command.
//!
//! Creates labels (typically the ones `triage analyze` suggested) in a
//! repository. Writing needs a token, so unlike the read-only commands this
//! one fails early when the token variable is unset.
//!
//! ```bash
//! triage labels acme/widgets bug ui needs-triage
//! triage labels acme/widgets bug --token-env ACME_BOT_TOKEN
//! ```

use crate::commands::{check_format, parse_repo, render};
use crate::config::TriageConfig;
use crate::errors::CliError;
use crate::output;
use crate::reports::LabelsReport;
use crate::serializers::{MarkdownSerializer, OutputFormat};
use triage_survey::{TriageError, create_labels_with_token};

#[derive(Debug, Clone)]
pub struct LabelsOptions {
    pub repo: String,
    pub labels: Vec<String>,
    /// Variable holding the token; defaults to `github.token_env`
    pub token_env: Option<String>,
    pub format: OutputFormat,
}

pub async fn run_labels(config: &TriageConfig, options: LabelsOptions) -> Result<String, CliError> {
    check_format("labels", options.format)?;
    let repo = parse_repo(&options.repo)?;
    if options.labels.iter().all(|l| l.trim().is_empty()) {
        return Err(TriageError::InvalidInput("no label names given".to_string()).into());
    }

    let token_env = options
        .token_env
        .unwrap_or_else(|| config.github.token_env.clone());
    let token = TriageConfig::required_token(&token_env)?;

    let reports = create_labels_with_token(
        &repo,
        &options.labels,
        &token,
        config.github.api_url.as_deref(),
        config.github.timeout_secs,
    )
    .await
    .map_err(TriageError::from)?;

    let report = LabelsReport::new(&repo.full_name(), reports);
    if report.failed > 0 {
        output::warning(&format!("{} label(s) could not be created", report.failed));
    }
    render("labels", options.format, &report, |r| MarkdownSerializer::new().labels(r))
}

//! Implementation of the `triage duplicates` command.
//!
//! ```bash
//! triage duplicates acme/widgets 42
//! triage duplicates acme/widgets 42 --threshold 0.5
//! ```

use crate::commands::{check_format, parse_repo, render};
use crate::context::TriageContext;
use crate::errors::CliError;
use crate::reports::{DuplicatesReport, IssueSummary};
use crate::serializers::{MarkdownSerializer, OutputFormat};

#[derive(Debug, Clone)]
pub struct DuplicatesOptions {
    pub repo: String,
    pub number: u64,
    /// Overrides `similarity.threshold` from the config
    pub threshold: Option<f64>,
    pub format: OutputFormat,
}

pub async fn run_duplicates(ctx: &TriageContext, options: DuplicatesOptions) -> Result<String, CliError> {
    check_format("duplicates", options.format)?;
    let repo = parse_repo(&options.repo)?;
    let threshold = options
        .threshold
        .unwrap_or(ctx.config().similarity.threshold);

    let ranker = ctx.ranker();
    let (issue, duplicates) = ranker.duplicates_for(&repo, options.number, threshold).await?;

    let report = DuplicatesReport {
        repo: repo.full_name(),
        issue: IssueSummary::from(&issue),
        scorer: ranker.scorer_name().to_string(),
        threshold,
        duplicates,
    };
    render("duplicates", options.format, &report, |r| {
        MarkdownSerializer::new().duplicates(r)
    })
}

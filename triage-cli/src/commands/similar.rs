//! Implementation of the `triage similar` command.
//!
//! Searches GitHub with keywords from the issue and ranks what it finds.
//!
//! ```bash
//! triage similar acme/widgets 42 --exclude-repo
//! ```

use crate::commands::{check_format, parse_repo, render};
use crate::context::TriageContext;
use crate::errors::CliError;
use crate::reports::{IssueSummary, SimilarReport};
use crate::serializers::{MarkdownSerializer, OutputFormat};

#[derive(Debug, Clone)]
pub struct SimilarOptions {
    pub repo: String,
    pub number: u64,
    /// Drop results from the issue's own repository
    pub exclude_repo: bool,
    pub format: OutputFormat,
}

pub async fn run_similar(ctx: &TriageContext, options: SimilarOptions) -> Result<String, CliError> {
    check_format("similar", options.format)?;
    let repo = parse_repo(&options.repo)?;

    let ranker = ctx.ranker();
    let (issue, similar) = ranker
        .similar_for(&repo, options.number, options.exclude_repo)
        .await?;

    let report = SimilarReport {
        repo: repo.full_name(),
        issue: IssueSummary::from(&issue),
        scorer: ranker.scorer_name().to_string(),
        exclude_same_repo: options.exclude_repo,
        similar,
    };
    render("similar", options.format, &report, |r| MarkdownSerializer::new().similar(r))
}

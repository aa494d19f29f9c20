//! Implementation of the `triage analyze` command.
//!
//! ```bash
//! triage analyze rust-lang/rust 12345
//! triage analyze acme/widgets 42 --refresh --format json
//! ```

use crate::commands::{check_format, parse_repo, render};
use crate::context::TriageContext;
use crate::errors::CliError;
use crate::output;
use crate::reports::AnalyzeReport;
use crate::serializers::{MarkdownSerializer, OutputFormat};

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub repo: String,
    pub number: u64,
    /// Ignore any cached analysis
    pub refresh: bool,
    pub format: OutputFormat,
}

pub async fn run_analyze(ctx: &TriageContext, options: AnalyzeOptions) -> Result<String, CliError> {
    check_format("analyze", options.format)?;
    let repo = parse_repo(&options.repo)?;
    output::verbose(&format!("Analyzing {}#{}", repo, options.number));

    let outcome = ctx.pipeline().analyze(&repo, options.number, options.refresh).await?;
    if outcome.truncated {
        output::warning("Issue text was shortened to fit the prompt; the analysis may miss details");
    }

    let report = AnalyzeReport::new(&repo.full_name(), &outcome);
    render("analyze", options.format, &report, |r| MarkdownSerializer::new().analysis(r))
}

//! Implementation of the `triage batch` command.
//!
//! ```bash
//! triage batch acme/widgets 1-5,8,10
//! ```
//!
//! At most ten distinct issues are analyzed; extra numbers are dropped with
//! a warning.

use crate::commands::{check_format, parse_repo, render};
use crate::context::TriageContext;
use crate::errors::CliError;
use crate::output;
use crate::progress::BatchProgress;
use crate::reports::BatchView;
use crate::serializers::{MarkdownSerializer, OutputFormat};
use std::sync::Arc;
use triage_survey::{BatchOrchestrator, parse_issue_numbers, prepare_numbers};

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub repo: String,
    /// Numbers and ranges, e.g. `1-5,8,10`
    pub numbers: String,
    pub format: OutputFormat,
}

pub async fn run_batch(ctx: &TriageContext, options: BatchOptions) -> Result<String, CliError> {
    check_format("batch", options.format)?;
    let repo = parse_repo(&options.repo)?;
    let numbers = parse_issue_numbers(&options.numbers)?;

    let selected = prepare_numbers(&numbers).len();
    if selected < numbers.len() {
        output::warning(&format!(
            "{} issue number(s) given; analyzing the first {} distinct",
            numbers.len(),
            selected
        ));
    }

    let orchestrator = BatchOrchestrator::new(Arc::new(ctx.pipeline()));
    let mut progress = BatchProgress::new(selected as u64, !output::is_quiet());
    let report = orchestrator
        .analyze_batch_with_progress(&repo, &numbers, |entry| progress.record(entry))
        .await;
    progress.finish();
    let report = report?;

    if report.statistics.failed > 0 {
        output::warning(&format!(
            "{} of {} issue(s) failed",
            report.statistics.failed, report.statistics.processed
        ));
    }

    let view = BatchView {
        repo: repo.full_name(),
        report,
    };
    render("batch", options.format, &view, |v| MarkdownSerializer::new().batch(v))
}

//! Implementation of the `triage deps` command.
//!
//! Follows `#N` references out of an issue, its comments, and (up to
//! `--depth` hops) the issues it references.
//!
//! ```bash
//! triage deps acme/widgets 42 --depth 2 --format mermaid
//! ```

use crate::commands::parse_repo;
use crate::context::TriageContext;
use crate::errors::CliError;
use crate::output;
use crate::reports::DepsReport;
use crate::serializers::{JsonSerializer, MarkdownSerializer, MermaidSerializer, OutputFormat};
use triage_survey::{clamp_depth, dependency_graph::DEFAULT_DEPTH};

#[derive(Debug, Clone)]
pub struct DepsOptions {
    pub repo: String,
    pub number: u64,
    /// Hops to follow; clamped to 1..=3
    pub depth: Option<u8>,
    pub format: OutputFormat,
}

pub async fn run_deps(ctx: &TriageContext, options: DepsOptions) -> Result<String, CliError> {
    let repo = parse_repo(&options.repo)?;

    let requested = options.depth.unwrap_or(DEFAULT_DEPTH);
    let depth = clamp_depth(requested);
    if depth != requested {
        output::warning(&format!("Depth {} is out of range; using {}", requested, depth));
    }

    let built = ctx.graph_builder().build(&repo, options.number, depth).await?;
    if !built.dropped.is_empty() {
        output::warning(&format!(
            "{} referenced issue(s) could not be fetched",
            built.dropped.len()
        ));
    }

    let report = DepsReport::new(&repo.full_name(), built);
    render_deps(&report, options.format)
}

/// Render a dependency report in any of the three formats.
pub fn render_deps(report: &DepsReport, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(JsonSerializer::new().success(report)?),
        OutputFormat::Markdown => Ok(MarkdownSerializer::new().dependencies(report)),
        OutputFormat::Mermaid => Ok(MermaidSerializer::new().serialize_graph(&report.graph)),
    }
}

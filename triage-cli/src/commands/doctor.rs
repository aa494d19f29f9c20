//! Implementation of the `triage doctor` command.
//!
//! Checks that GitHub answers (and how much request quota is left) and that
//! the configured generator CLI can be found. Nothing is analyzed.
//!
//! ```bash
//! triage doctor
//! triage doctor --format json
//! ```

use crate::commands::{check_format, render};
use crate::context::TriageContext;
use crate::errors::CliError;
use crate::output;
use crate::reports::{DoctorReport, HealthCheck};
use crate::serializers::{MarkdownSerializer, OutputFormat};

#[derive(Debug, Clone)]
pub struct DoctorOptions {
    pub format: OutputFormat,
}

pub async fn run_doctor(ctx: &TriageContext, options: DoctorOptions) -> Result<String, CliError> {
    check_format("doctor", options.format)?;

    let (github, generator) = tokio::join!(check_github(ctx), check_generator(ctx));
    let report = DoctorReport::new(vec![github, generator]);
    if !report.is_healthy() {
        output::warning("Some components are unavailable");
    }
    render("doctor", options.format, &report, |r| MarkdownSerializer::new().doctor(r))
}

async fn check_github(ctx: &TriageContext) -> HealthCheck {
    let access = if ctx.config().github_token().is_some() {
        "authenticated"
    } else {
        "anonymous"
    };

    match ctx.source().quota().await {
        Ok(Some(quota)) if quota.remaining == 0 => HealthCheck::failed(
            "github",
            format!("{access}, rate limit exhausted (0/{} requests left)", quota.limit),
        ),
        Ok(Some(quota)) => HealthCheck::passed(
            "github",
            format!("{access}, {}/{} requests left", quota.remaining, quota.limit),
        ),
        Ok(None) => HealthCheck::passed("github", format!("{access}, reachable")),
        Err(e) => HealthCheck::failed("github", format!("{e} ({})", e.kind())),
    }
}

async fn check_generator(ctx: &TriageContext) -> HealthCheck {
    let name = ctx.provider().name().to_string();
    if ctx.provider().is_available().await {
        HealthCheck::passed("llm", format!("`{name}` CLI found"))
    } else {
        HealthCheck::failed(
            "llm",
            format!("`{name}` CLI not found in PATH; install it or set llm.cli_path"),
        )
    }
}

//! CLI commands for Triage.
//!
//! - `triage init` - Write a commented `triage.yaml`
//! - `triage analyze` - Analyze one issue
//! - `triage deps` - Build the reference graph around an issue
//! - `triage duplicates` - Rank likely duplicates in the same repository
//! - `triage similar` - Search other repositories for related issues
//! - `triage batch` - Analyze up to ten issues with statistics
//! - `triage labels` - Create labels in a repository
//! - `triage doctor` - Check GitHub and the generator CLI
//!
//! Every command except `init` returns its rendered report; printing is left
//! to the caller.

pub mod analyze;
pub mod batch;
pub mod deps;
pub mod doctor;
pub mod duplicates;
pub mod init;
pub mod labels;
pub mod similar;

pub use analyze::{AnalyzeOptions, run_analyze};
pub use batch::{BatchOptions, run_batch};
pub use deps::{DepsOptions, run_deps};
pub use doctor::{DoctorOptions, run_doctor};
pub use duplicates::{DuplicatesOptions, run_duplicates};
pub use init::{InitOptions, run_init};
pub use labels::{LabelsOptions, run_labels};
pub use similar::{SimilarOptions, run_similar};

use crate::errors::CliError;
use crate::serializers::{JsonSerializer, OutputFormat};
use serde::Serialize;
use triage_graph::RepoId;
use triage_survey::TriageError;

/// Accepts `owner/name` or a GitHub URL.
pub(crate) fn parse_repo(input: &str) -> Result<RepoId, CliError> {
    Ok(RepoId::parse(input).map_err(TriageError::from)?)
}

/// Mermaid is only meaningful for graphs. Checked before any work is done.
pub(crate) fn check_format(command: &'static str, format: OutputFormat) -> Result<(), CliError> {
    if format == OutputFormat::Mermaid {
        return Err(CliError::UnsupportedFormat {
            command,
            format: format.to_string(),
        });
    }
    Ok(())
}

/// Render `report` as JSON, or as Markdown with `markdown`.
pub(crate) fn render<T: Serialize>(
    command: &'static str,
    format: OutputFormat,
    report: &T,
    markdown: impl FnOnce(&T) -> String,
) -> Result<String, CliError> {
    check_format(command, format)?;
    match format {
        OutputFormat::Json => Ok(JsonSerializer::new().success(report)?),
        _ => Ok(markdown(report)),
    }
}

//! Triage CLI library - commands, configuration and rendering.
//!
//! Exposed as a library so integration tests can drive the commands against
//! in-memory issue sources and scripted generators.
//!
//! # Modules
//!
//! - [`commands`]: One module per subcommand
//! - [`config`]: `triage.yaml` loading, environment overrides and validation
//! - [`context`]: Shared source, generator and cache for a process
//! - [`errors`]: [`CliError`] and the user-facing [`ErrorReport`]
//! - [`reports`]: Command results in their rendered shape
//! - [`serializers`]: Markdown, JSON and Mermaid output

pub mod commands;
pub mod config;
pub mod context;
pub mod errors;
pub mod output;
pub mod progress;
pub mod reports;
pub mod serializers;

pub use config::{ScorerKind, TriageConfig};
pub use context::TriageContext;
pub use errors::{CliError, ErrorReport};
pub use serializers::{Direction, JsonSerializer, MarkdownSerializer, MermaidSerializer, OutputFormat};

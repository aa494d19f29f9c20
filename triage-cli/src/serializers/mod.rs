//! Serializers for command results.
//!
//! - **Markdown**: Human-readable reports (the default)
//! - **JSON**: `{ "success": ... }` envelopes for scripts and agents
//! - **Mermaid**: Flowchart syntax, dependency graphs only

pub mod json;
pub mod markdown;
pub mod mermaid;

pub use json::JsonSerializer;
pub use markdown::MarkdownSerializer;
pub use mermaid::{Direction, MermaidSerializer};

use clap::ValueEnum;
use std::fmt;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
    Mermaid,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
            OutputFormat::Mermaid => "mermaid",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

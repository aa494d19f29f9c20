//! Triage CLI - AI-assisted triage for GitHub issues.
//!
//! # Commands
//!
//! - `triage init` - Write a commented `triage.yaml`
//! - `triage analyze` - Summarize, classify and prioritize one issue
//! - `triage deps` - Map the issues an issue references
//! - `triage duplicates` - Find likely duplicates in the same repository
//! - `triage similar` - Find related issues in other repositories
//! - `triage batch` - Analyze several issues at once
//! - `triage labels` - Create labels in a repository
//! - `triage doctor` - Check GitHub connectivity and generator availability
//!
//! # Usage
//!
//! ```bash
//! triage init
//! triage analyze acme/widgets 42
//! triage deps acme/widgets 42 --depth 2 --format mermaid
//! triage batch acme/widgets 1-5,8 --format json
//! triage doctor
//! ```

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use triage_cli::commands::{
    self, AnalyzeOptions, BatchOptions, DepsOptions, DoctorOptions, DuplicatesOptions, InitOptions,
    LabelsOptions, SimilarOptions,
};
use triage_cli::{CliError, JsonSerializer, OutputFormat, TriageConfig, TriageContext, output};

/// Triage - AI-assisted triage for GitHub issues
#[derive(Parser)]
#[command(name = "triage")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,

    /// Path to the configuration file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// More detailed logs (-v debug, -vv trace)
    #[arg(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Print only the report and errors
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new triage.yaml configuration file
    Init {
        /// LLM provider to pre-select: claude, gemini
        #[arg(long)]
        provider: Option<String>,

        /// Output path for the configuration file
        #[arg(long, short)]
        output: Option<String>,

        /// Overwrite existing configuration file
        #[arg(long, short)]
        force: bool,
    },

    /// Summarize, classify and prioritize an issue
    Analyze {
        /// Repository as owner/name or URL
        repo: String,

        /// Issue number
        number: u64,

        /// Ignore any cached analysis
        #[arg(long)]
        refresh: bool,
    },

    /// Build the dependency graph of an issue's #N references
    Deps {
        /// Repository as owner/name or URL
        repo: String,

        /// Issue number
        number: u64,

        /// Reference hops to follow (1-3)
        #[arg(long, short)]
        depth: Option<u8>,
    },

    /// Find likely duplicates among the repository's recent issues
    Duplicates {
        /// Repository as owner/name or URL
        repo: String,

        /// Issue number
        number: u64,

        /// Minimum similarity, 0.0-1.0 (default from config)
        #[arg(long, short)]
        threshold: Option<f64>,
    },

    /// Find related issues across GitHub
    Similar {
        /// Repository as owner/name or URL
        repo: String,

        /// Issue number
        number: u64,

        /// Leave out results from the issue's own repository
        #[arg(long)]
        exclude_repo: bool,
    },

    /// Analyze up to ten issues and summarize them
    Batch {
        /// Repository as owner/name or URL
        repo: String,

        /// Issue numbers and ranges, e.g. 1-5,8,10
        numbers: String,
    },

    /// Create labels in a repository (needs a token with write access)
    Labels {
        /// Repository as owner/name or URL
        repo: String,

        /// Label names
        #[arg(required = true)]
        labels: Vec<String>,

        /// Environment variable holding the token (default from config)
        #[arg(long)]
        token_env: Option<String>,
    },

    /// Check GitHub connectivity and generator availability
    Doctor,
}

fn main() {
    let cli = Cli::parse();

    output::set_quiet(cli.quiet);
    output::set_verbosity(cli.verbose);
    init_tracing(cli.verbose);

    let format = cli.format;
    let result = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Runtime(e.to_string()))
        .and_then(|runtime| runtime.block_on(dispatch(cli)));

    match result {
        Ok(Some(document)) => {
            if let Err(e) = output::document(&document) {
                fail(&CliError::Io(e), format);
            }
        }
        Ok(None) => {}
        Err(e) => fail(&e, format),
    }
}

/// Logs go to stderr; stdout carries only the report.
fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "triage=info",
        1 => "triage=debug",
        _ => "triage=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn context(config_path: Option<&std::path::Path>) -> Result<TriageContext, CliError> {
    TriageContext::from_config(TriageConfig::load(config_path)?)
}

async fn dispatch(cli: Cli) -> Result<Option<String>, CliError> {
    let format = cli.format;
    let config_path = cli.config.as_deref();

    let document = match cli.command {
        Commands::Init {
            provider,
            output,
            force,
        } => {
            commands::run_init(InitOptions {
                provider,
                output,
                force,
            })?;
            return Ok(None);
        }
        Commands::Analyze {
            repo,
            number,
            refresh,
        } => {
            let options = AnalyzeOptions {
                repo,
                number,
                refresh,
                format,
            };
            commands::run_analyze(&context(config_path)?, options).await?
        }
        Commands::Deps { repo, number, depth } => {
            let options = DepsOptions {
                repo,
                number,
                depth,
                format,
            };
            commands::run_deps(&context(config_path)?, options).await?
        }
        Commands::Duplicates {
            repo,
            number,
            threshold,
        } => {
            let options = DuplicatesOptions {
                repo,
                number,
                threshold,
                format,
            };
            commands::run_duplicates(&context(config_path)?, options).await?
        }
        Commands::Similar {
            repo,
            number,
            exclude_repo,
        } => {
            let options = SimilarOptions {
                repo,
                number,
                exclude_repo,
                format,
            };
            commands::run_similar(&context(config_path)?, options).await?
        }
        Commands::Batch { repo, numbers } => {
            let options = BatchOptions {
                repo,
                numbers,
                format,
            };
            commands::run_batch(&context(config_path)?, options).await?
        }
        Commands::Labels {
            repo,
            labels,
            token_env,
        } => {
            let options = LabelsOptions {
                repo,
                labels,
                token_env,
                format,
            };
            commands::run_labels(&TriageConfig::load(config_path)?, options).await?
        }
        Commands::Doctor => {
            commands::run_doctor(&context(config_path)?, DoctorOptions { format }).await?
        }
    };

    Ok(Some(document))
}

/// Report `error` in the requested format and exit with status 1.
fn fail(error: &CliError, format: OutputFormat) -> ! {
    tracing::debug!(error = ?error, "command failed");

    if format == OutputFormat::Json {
        let envelope = JsonSerializer::new().failure(&error.report());
        if output::document(&envelope).is_err() {
            output::error(&error.format_for_cli());
        }
    } else {
        output::error(&error.format_for_cli());
    }
    std::process::exit(1);
}

//! # repoview CLI
//!
//! Command-line host for repository overviews.
//!
//! - `github`: overview of a GitHub repository
//! - `local`: overview of a local directory
//! - `document`: print the assembled document without generating anything
//!
//! `GEMINI_API_KEY` (or `GEMINI_FREE_API_KEY` with `--free-tier`) must be
//! set for generation. `GITHUB_TOKEN` is used when present.

mod panel;
mod telemetry;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use panel::Outcome;
use repoview::model::{Client, DEFAULT_FREE_MODEL};
use repoview::prelude::*;
use repoview::source::DEFAULT_MAX_FILE_BYTES;
use tracing::instrument;

#[derive(Parser)]
#[command(author, version, about = "Generate a readable overview of a source repository", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Also write logs to .repoview/repoview.log
    #[arg(long, global = true)]
    log_file: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an overview of a GitHub repository
    Github(GithubArgs),

    /// Generate an overview of a local directory
    Local(LocalArgs),

    /// Print the assembled document without generating an overview
    Document {
        #[command(subcommand)]
        target: DocumentTarget,
    },
}

#[derive(Subcommand, Debug)]
enum DocumentTarget {
    /// Assemble a GitHub repository
    Github(GithubTarget),

    /// Assemble a local directory
    Local(LocalTarget),
}

#[derive(Args, Debug)]
struct GithubTarget {
    /// Repository owner
    #[arg(required = true)]
    owner: String,

    /// Repository name
    #[arg(required = true)]
    repo: String,

    /// Branch, tag or commit to read
    #[arg(short, long, default_value = "HEAD")]
    reference: String,

    /// Largest file size in bytes still included
    #[arg(long, default_value_t = DEFAULT_MAX_FILE_BYTES)]
    max_file_bytes: u64,
}

#[derive(Args, Debug)]
struct LocalTarget {
    /// Directory to read
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Largest file size in bytes still included
    #[arg(long, default_value_t = DEFAULT_MAX_FILE_BYTES)]
    max_file_bytes: u64,

    /// Additional directory names to skip (comma-separated)
    #[arg(short, long)]
    ignore: Option<String>,
}

#[derive(Args, Debug)]
struct GenerateOptions {
    /// LLM model to use (default: gemini-2.0-flash, or gemini-2.0-flash-lite with --free-tier)
    #[arg(short, long)]
    model: Option<String>,

    /// Print the overview as raw markdown
    #[arg(long)]
    plain: bool,

    /// Format the overview without colors
    #[arg(long)]
    no_color: bool,

    /// Use the free-tier API key and quota
    #[arg(long)]
    free_tier: bool,

    /// Wait for Enter before generating
    #[arg(long)]
    confirm: bool,
}

#[derive(Args, Debug)]
struct GithubArgs {
    #[command(flatten)]
    target: GithubTarget,

    #[command(flatten)]
    options: GenerateOptions,
}

#[derive(Args, Debug)]
struct LocalArgs {
    #[command(flatten)]
    target: LocalTarget,

    #[command(flatten)]
    options: GenerateOptions,
}

impl GithubTarget {
    fn config(&self) -> OverviewConfig {
        OverviewConfig::builder()
            .max_file_bytes(self.max_file_bytes)
            .build()
    }

    fn source(&self, config: &OverviewConfig) -> anyhow::Result<GithubSource> {
        Ok(GithubSource::from_env(&self.owner, &self.repo)?
            .with_reference(&self.reference)
            .with_options(config.source_options.clone()))
    }
}

impl LocalTarget {
    fn config(&self) -> OverviewConfig {
        let mut builder = OverviewConfig::builder().max_file_bytes(self.max_file_bytes);
        for name in self.ignore.iter().flat_map(|s| s.split(',')) {
            let name = name.trim();
            if !name.is_empty() {
                builder = builder.ignore_dir(name);
            }
        }
        builder.build()
    }

    fn source(&self, config: &OverviewConfig) -> LocalSource {
        LocalSource::new(&self.dir).with_options(config.source_options.clone())
    }
}

impl GenerateOptions {
    fn formatting(&self) -> Formatting {
        if self.plain {
            Formatting::Unavailable
        } else {
            let color = !self.no_color && std::io::stdout().is_terminal();
            Formatting::available(TerminalMarkdown::new(color))
        }
    }

    fn apply(&self, config: OverviewConfig) -> OverviewConfig {
        match (&self.model, self.free_tier) {
            (Some(model), _) => OverviewConfig {
                model: model.clone(),
                ..config
            },
            (None, true) => OverviewConfig {
                model: DEFAULT_FREE_MODEL.to_string(),
                ..config
            },
            (None, false) => config,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _otel = telemetry::init_tracing_subscriber(cli.log_file)?;

    match cli.command {
        Some(Commands::Github(args)) => {
            let config = args.options.apply(args.target.config());
            let source = args.target.source(&config)?;
            generate_command(source, config, &args.options).await
        }
        Some(Commands::Local(args)) => {
            let config = args.options.apply(args.target.config());
            let source = args.target.source(&config);
            generate_command(source, config, &args.options).await
        }
        Some(Commands::Document { target }) => match target {
            DocumentTarget::Github(target) => {
                let source = target.source(&target.config())?;
                document_command(source).await
            }
            DocumentTarget::Local(target) => {
                let source = target.source(&target.config());
                document_command(source).await
            }
        },
        None => {
            // If no command is provided, show help
            let _ = Cli::parse_from(["repoview", "--help"]);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// List the repository behind a spinner
async fn list_tree<S: RepositorySource>(source: &S) -> anyhow::Result<TreeNode> {
    let progress = ProgressBar::new_spinner();
    progress.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    progress.set_message(format!("Listing {}...", source.describe()));
    progress.enable_steady_tick(Duration::from_millis(100));

    let tree = source.fetch_tree().await;
    progress.finish_and_clear();
    let tree = tree?;
    eprintln!("Found {} files in {}", tree.files().len(), source.describe());
    Ok(tree)
}

#[instrument(skip_all, fields(source = %source.describe(), model = %config.model))]
async fn generate_command<S>(
    source: S,
    config: OverviewConfig,
    options: &GenerateOptions,
) -> anyhow::Result<ExitCode>
where
    S: RepositorySource + 'static,
{
    let tree = list_tree(&source).await?;

    let client = if options.free_tier {
        Client::new_gemini_free_from_env(&config.model)?
    } else {
        Client::new_gemini_from_env(&config.model)?
    };
    let orchestrator = Orchestrator::with_fetch_concurrency(
        source,
        client.generator(&config.preamble),
        config.source_options.fetch_concurrency,
    );

    let formatting = options.formatting();
    match panel::run(&orchestrator, tree, &formatting, options.confirm).await? {
        Outcome::Finished(GenerationState::Success(_)) | Outcome::Dismissed => Ok(ExitCode::SUCCESS),
        Outcome::Finished(_) => Ok(ExitCode::FAILURE),
    }
}

#[instrument(skip_all, fields(source = %source.describe()))]
async fn document_command<S: RepositorySource>(source: S) -> anyhow::Result<ExitCode> {
    let tree = list_tree(&source).await?;
    let aggregation = aggregate(&source, &tree).await?;
    if aggregation.is_empty() {
        eprintln!("{}", OverviewError::EmptyInput);
        return Ok(ExitCode::FAILURE);
    }

    println!("{}", assemble(&aggregation.files));
    if aggregation.skipped > 0 {
        eprintln!("Skipped {} unreadable files", aggregation.skipped);
    }
    if aggregation.duplicates > 0 {
        eprintln!("Ignored {} repeated paths", aggregation.duplicates);
    }
    Ok(ExitCode::SUCCESS)
}

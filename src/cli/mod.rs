//! Command-line interface for x-context

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{load_config, merge_cli_with_config, CliOverrides};
use crate::domain::ConversionSummary;
use crate::fetch::HttpDocumentSource;
use crate::pipeline::confirm::{AssumeYes, Confirm, InteractiveConfirm};
use crate::pipeline::credentials::ProcessEnv;
use crate::pipeline::progress::SpinnerProgress;
use crate::pipeline::{ConversionRequest, Converter, Outcome, SelectionOrigin};
use crate::provider::HttpGeneratorFactory;
use crate::registry::model_overview;
use crate::utils::format_with_commas;

/// Convert AI coding assistant context files between tool formats
#[derive(Parser)]
#[command(name = "x-context")]
#[command(author, version, about, long_about = None)]
#[command(after_help = format!("Supported models:\n{}", model_overview()))]
pub struct Cli {
    /// Source format (claude-code, copilot, cursor, gemini-cli)
    #[arg(long, value_name = "FORMAT")]
    from: String,

    /// Target format (claude-code, copilot, cursor, gemini-cli)
    #[arg(long, value_name = "FORMAT")]
    to: String,

    /// Model provider (openai, anthropic, gemini); inferred from --model when omitted
    #[arg(long, value_name = "PROVIDER")]
    provider: Option<String>,

    /// Model to use (defaults to the provider's default model)
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,

    /// Context file(s) to convert
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Directory the converted files are written under
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Write files without asking for confirmation
    #[arg(short, long)]
    yes: bool,

    /// Path to config file (defaults to ./x-context.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long)]
    verbose: bool,
}

pub async fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version print to stdout and exit 0; everything else is a usage error.
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    };

    // A set RUST_LOG is used as-is; otherwise --verbose picks DEBUG over the WARN default.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let cwd = std::env::current_dir()?;
    match dotenvy::from_path(cwd.join(".env")) {
        Ok(()) => debug!("loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => return Err(err).context("failed to load .env"),
    }

    let file_config = load_config(&cwd, cli.config.as_deref())?;
    let overrides = CliOverrides {
        provider: cli.provider,
        model: cli.model,
        output_dir: cli.output_dir,
        assume_yes: if cli.yes { Some(true) } else { None },
    };
    let selection_origin = if overrides.selects_model() {
        SelectionOrigin::CommandLine
    } else {
        SelectionOrigin::Config
    };
    let merged = merge_cli_with_config(file_config, overrides);

    let request = ConversionRequest {
        from: cli.from,
        to: cli.to,
        provider: merged.provider.clone(),
        model: merged.model.clone(),
        inputs: cli.files,
        output_dir: merged.output_dir.clone(),
        selection_origin,
    };

    let client = reqwest::Client::builder()
        .user_agent(concat!("x-context/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;
    let docs = HttpDocumentSource::new(client.clone());
    let generators = HttpGeneratorFactory::new(client, merged.endpoints.clone());
    let progress = SpinnerProgress::new();
    let interactive = InteractiveConfirm::stdio();
    let confirm: &dyn Confirm = if merged.assume_yes { &AssumeYes } else { &interactive };

    let converter =
        Converter::new(&docs, &generators, &ProcessEnv, confirm).progress(&progress).config(&merged);

    match converter.convert(&request).await? {
        Outcome::Completed(summary) => print_summary(&summary),
        Outcome::Declined { .. } => println!("Operation cancelled."),
    }
    Ok(())
}

fn print_summary(summary: &ConversionSummary) {
    println!();
    println!(
        "Converted {} context files to {} format!",
        summary.from.display_name(),
        summary.to.display_name()
    );
    println!();
    println!("Files written:");
    for path in &summary.written {
        println!("  {}", path.display());
    }
    println!();
    println!("Model:  {} ({})", summary.provider.display_name(), summary.model);
    println!(
        "Tokens: {} prompt + {} completion = {} total",
        format_with_commas(summary.usage.prompt_tokens),
        format_with_commas(summary.usage.completion_tokens),
        format_with_commas(summary.usage.total_tokens())
    );
}

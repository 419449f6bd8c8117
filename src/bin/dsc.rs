//! DSC engine CLI
//!
//! Runs scenario files against an in-memory engine.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::{style, Term};

use dsc_engine::cli::{OutputFormat, OutputFormatter, Scenario, ScenarioRunner};
use dsc_engine::core::config::{EngineConfig, EngineParams};

/// DSC engine CLI - over-collateralized synthetic dollar ledger
#[derive(Parser)]
#[command(name = "dsc")]
#[command(version = dsc_engine::VERSION)]
#[command(about = "Run collateral, mint and liquidation scenarios", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Engine configuration (JSON) whose parameters override the defaults
    #[arg(short, long, env = "DSC_CONFIG")]
    config: Option<PathBuf>,

    /// Output format (text, json, json-pretty)
    #[arg(short, long, env = "DSC_FORMAT", default_value = "text")]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show default protocol parameters
    Params,

    /// Write a sample scenario file
    Init {
        /// Destination path
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Execute a scenario file
    Run {
        /// Scenario path
        path: PathBuf,
    },
}

// ═══════════════════════════════════════════════════════════════════════════════
// MAIN
// ═══════════════════════════════════════════════════════════════════════════════

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let term = Term::stdout();
    if let Err(e) = run_command(&cli, &term) {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn run_command(cli: &Cli, term: &Term) -> anyhow::Result<()> {
    let output = OutputFormatter::new(cli.format);
    let params = load_params(cli.config.as_deref())?;
    match &cli.command {
        Commands::Params => {
            output.params(&params);
            Ok(())
        }
        Commands::Init { path, force } => cmd_init(path, *force, &output, term),
        Commands::Run { path } => cmd_run(path, cli.config.as_ref().map(|_| params), &output),
    }
}

fn load_params(path: Option<&Path>) -> anyhow::Result<EngineParams> {
    match path {
        Some(path) => {
            let config = EngineConfig::load(path)?;
            config.params.validate()?;
            tracing::debug!(path = %path.display(), "engine configuration loaded");
            Ok(config.params)
        }
        None => Ok(EngineParams::default()),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMMAND HANDLERS
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_init(path: &Path, force: bool, output: &OutputFormatter, term: &Term) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists. Use --force to overwrite.", path.display());
    }
    if output.format() == OutputFormat::Text {
        let _ = term.write_line(&format!("{} Writing sample scenario...", style("→").cyan()));
    }
    Scenario::sample().save(path)?;
    output.success(&format!("Scenario written to {}", path.display()));
    Ok(())
}

fn cmd_run(path: &Path, params: Option<EngineParams>, output: &OutputFormatter) -> anyhow::Result<()> {
    let mut scenario = Scenario::load(path)?;
    if let Some(params) = params {
        scenario.params = params;
    }
    let mut runner = ScenarioRunner::new(scenario)?;
    let report = runner.run()?;
    output.report(&report);
    Ok(())
}

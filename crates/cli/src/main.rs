//! placeprep CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: load `placeprep.toml` (or `--config`) and
//!    validate the derived [`pipeline::PipelineSettings`].
//! 2. **Wire logging**: configure `tracing-subscriber` with an env filter and a
//!    text or JSON formatter on stderr.
//! 3. **Construct infrastructure**: a [`storage::FsStore`] over the configured
//!    data directory serves as both raw source and tidy store.
//! 4. **Run stages**: execute the selected stages inside a `run` span, then
//!    write the run manifest, even when a stage fails.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pipeline::{PipelineRunId, RunManifest, StageName, StageReport, TidyStore, Timestamp};
use stages::{run_sequence, StageFailure};
use storage::FsStore;
use tracing::info_span;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::ConfigFile;

/// Prepare place-level home value and income data for mapping.
///
/// Reads block AVMs, a block-to-place crosswalk, ACS tables and boundary
/// layers from the raw data directory and writes tidy place and map outputs.
#[derive(Parser)]
#[command(name = "placeprep")]
#[command(author, version)]
#[command(propagate_version = true)]
#[command(after_help = "Examples:
  placeprep all                      Run every stage
  placeprep census-data              Refresh the ACS tables only
  placeprep --data-root /srv/d join  Re-run the join against another directory")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (default: ./placeprep.toml if present)
    #[arg(long, global = true, env = "PLACEPREP_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory root (overrides [data].root)
    #[arg(long, global = true)]
    data_root: Option<PathBuf>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Command {
    /// Aggregate block AVMs to places
    AvmToPlace,
    /// Parse ACS income and home value tables
    CensusData,
    /// Normalise place and CBSA boundary layers
    CensusGeo,
    /// Join places to CBSAs and write map data
    #[command(name = "join")]
    JoinPlaceCbsa,
    /// Run every stage in order
    All,
}

impl Command {
    fn stages(&self) -> Vec<StageName> {
        match self {
            Self::AvmToPlace => vec![StageName::AvmToPlace],
            Self::CensusData => vec![StageName::CensusData],
            Self::CensusGeo => vec![StageName::CensusGeo],
            Self::JoinPlaceCbsa => vec![StageName::JoinPlaceCbsa],
            Self::All => StageName::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn setup_logging(verbose: bool, quiet: bool, format: LogFormat) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(fmt::layer().with_writer(std::io::stderr)).init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_writer(std::io::stderr)).init(),
    }
}

fn print_summary(reports: &[StageReport]) {
    for report in reports {
        println!("{}: {} in, {} out", report.stage, report.rows_in, report.rows_out);
        for output in &report.outputs {
            println!(
                "  {:<26} {:>8}  {}",
                output.dataset.to_string(),
                output.rows,
                output.location
            );
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = ConfigFile::load(cli.config.as_deref())?;
    if let Some(root) = cli.data_root {
        config.data.root = root;
    }
    let settings = config.settings();
    settings.validate().context("invalid configuration")?;

    let run_id = PipelineRunId::new_random();
    let span = info_span!("run", run_id = %run_id);
    let _enter = span.enter();

    let source = FsStore::new(config.data);
    let mut store = source.clone();
    let started_at = Timestamp::now();

    let outcome = run_sequence(&cli.command.stages(), &source, &mut store, &settings);
    let (completed, failure) = match outcome {
        Ok(reports) => (reports, None),
        Err(StageFailure {
            stage,
            completed,
            error,
        }) => (completed, Some((stage, error))),
    };

    let manifest = RunManifest {
        run_id,
        started_at,
        finished_at: Timestamp::now(),
        stages: completed,
    };
    let written = store.write_manifest(&manifest).context("failed to write run manifest")?;
    print_summary(&manifest.stages);
    println!("manifest: {}", written.location);

    match failure {
        Some((stage, error)) => {
            Err(anyhow::Error::new(error).context(format!("stage {stage} failed")))
        }
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet, cli.log_format);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

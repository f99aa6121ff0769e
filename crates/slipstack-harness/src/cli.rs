#![forbid(unsafe_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use slipstack_core::config::EngineConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::{HarnessError, Result};
use crate::runner;
use crate::scenario::Scenario;
use crate::transcript::Transcript;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "warn,slipstack_core=info";

#[derive(Debug, Parser)]
#[command(
    name = "slipstack-harness",
    about = "Replay scripted touch scenarios through the SlipStack gesture engine",
    version
)]
pub struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay one scenario and print its transcript.
    Run(RunArgs),

    /// Replay scenarios and report which ones complete.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Scenario JSON file.
    pub scenario: PathBuf,

    /// Print the transcript as JSON.
    #[arg(long)]
    pub json: bool,

    /// Engine config (`.toml` or `.json`) overriding the scenario's.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Scenario JSON files.
    #[arg(required = true)]
    pub scenarios: Vec<PathBuf>,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Run(args) => run_one(&args, &mut out),
        Commands::Check(args) => check(&args, &mut out),
    }
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    // A subscriber may already be installed when embedded in tests.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn load_config(path: &Path) -> Result<EngineConfig> {
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let config = if is_toml {
        EngineConfig::from_toml_file(path)?
    } else {
        EngineConfig::from_json_file(path)?
    };
    Ok(config)
}

fn run_one(args: &RunArgs, out: &mut impl Write) -> Result<()> {
    let mut scenario = Scenario::from_file(&args.scenario)?;
    if let Some(path) = &args.config {
        scenario.engine = Some(load_config(path)?);
    }
    let transcript = runner::run(&scenario)?;
    write_transcript(&transcript, args.json, out)
}

fn write_transcript(transcript: &Transcript, json: bool, out: &mut impl Write) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(transcript).map_err(|e| HarnessError::Output(e.into()))?;
        writeln!(out, "{rendered}").map_err(HarnessError::Output)
    } else {
        write!(out, "{transcript}").map_err(HarnessError::Output)
    }
}

fn check(args: &CheckArgs, out: &mut impl Write) -> Result<()> {
    for path in &args.scenarios {
        let scenario = Scenario::from_file(path)?;
        let transcript = runner::run(&scenario)?;
        info!(
            scenario = %transcript.scenario,
            events = transcript.events.len(),
            "scenario replayed"
        );
        writeln!(
            out,
            "ok {} ({} events, {} screens mounted)",
            transcript.scenario,
            transcript.events.len(),
            transcript.screens.len()
        )
        .map_err(HarnessError::Output)?;
    }
    Ok(())
}

//! # primescan
//!
//! Command-line entry point: resumes from the checkpoint file, scans the next
//! `workers x batch-size` integers and appends the primes found.

use std::future::Future;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, warn};

use primescan::{
    logging, resolve_start, ConfigManager, FileCheckpointStore, PrimeScanConfig, PrimeScanEngine,
    PrimeScanError,
};

#[derive(Parser, Debug)]
#[command(name = "primescan")]
#[command(about = "Find the next primes after the last checkpoint and append them")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Checkpoint file, overriding the configured path
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Number of concurrent scan workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Width of each worker's partition
    #[arg(short, long)]
    batch_size: Option<u64>,

    /// Miller-Rabin rounds per candidate
    #[arg(long)]
    confidence: Option<u32>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format for the completion report
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan the next span and persist the primes found (default)
    Run,

    /// Show the last persisted prime and where the next run would start
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    };
    logging::init_with_level(level);

    if let Err(e) = execute(&cli).await {
        error!("primescan failed: {e:#}");
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

async fn execute(cli: &Cli) -> anyhow::Result<()> {
    let config = resolve_config(cli)?;
    let store = Arc::new(FileCheckpointStore::with_tail_window(
        &config.checkpoint_path,
        config.tail_window,
    ));

    match cli.command.as_ref().unwrap_or(&Commands::Run) {
        Commands::Run => run(cli, config, store).await,
        Commands::Status => status(cli, store.as_ref()).await,
    }
}

fn resolve_config(cli: &Cli) -> anyhow::Result<PrimeScanConfig> {
    let manager = ConfigManager::load(cli.config.as_deref()).context("loading configuration")?;
    let mut config = manager.config().clone();

    if let Some(path) = &cli.checkpoint {
        config.checkpoint_path = path.clone();
    }
    if let Some(workers) = cli.workers {
        config.worker_count = workers;
    }
    if let Some(batch_size) = cli.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(confidence) = cli.confidence {
        config.confidence = confidence;
    }

    config.validate().context("validating command line overrides")?;
    Ok(config)
}

async fn run(
    cli: &Cli,
    config: PrimeScanConfig,
    store: Arc<FileCheckpointStore>,
) -> anyhow::Result<()> {
    let engine = PrimeScanEngine::new(config, store)?;

    let report = match engine.run_until(shutdown_on(tokio::signal::ctrl_c())).await {
        Ok(report) => report,
        Err(PrimeScanError::Cancelled) => {
            anyhow::bail!("interrupted before persistence; checkpoint unchanged, safe to re-run")
        }
        Err(e) => return Err(e).context("prime scan run failed"),
    };

    match cli.format {
        OutputFormat::Text => println!("{report}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

/// Resolve when `signal` fires. If the signal cannot be listened for, never
/// resolve, so the run is not cancelled.
async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => warn!("Interrupt received, abandoning run"),
        Err(e) => {
            warn!("Could not listen for interrupts: {e}");
            std::future::pending::<()>().await;
        }
    }
}

async fn status(cli: &Cli, store: &FileCheckpointStore) -> anyhow::Result<()> {
    let (start, last) = resolve_start(store)
        .await
        .with_context(|| format!("reading checkpoint {}", store.path().display()))?;

    match cli.format {
        OutputFormat::Text => match last {
            Some(last) => println!("last prime {last}, next run starts at {start}"),
            None => println!("no primes stored yet, next run starts at {start}"),
        },
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "checkpoint": store.path().display().to_string(),
                "last_prime": last,
                "next_start": start,
            })
        ),
    }
    Ok(())
}

use analytics::{PortfolioReport, ReportAggregator, write_reports};
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::{Config, ConfigOverrides, load_config};
use database::{DbRepository, InMemorySink, PersistSummary, PersistenceSink, persist_accounts};
use engine::{DrainOutcome, LoadedBatch, ingest, load_trades};
use indicatif::{ProgressBar, ProgressStyle};
use ledger::{AccountSnapshot, AccountStore};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

mod logging;

/// The main entry point for the trade ledger application.
#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; every setting has another source.
    let _ = dotenvy::dotenv();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    // Held until `main` returns so the fatal event below still reaches the log file.
    let _log_guard = match logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to initialise logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Run aborted.");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Ingests a batch of trades and computes per-account positions and history.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./tradeledger.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, ingest, persist and report a trade file.
    Run(RunArgs),
    /// Only parse and validate a trade file, reporting rejected lines.
    Validate(ValidateArgs),
}

#[derive(Parser)]
struct RunArgs {
    #[command(flatten)]
    overrides: ConfigOverrides,

    /// Persist and report even if the drain timed out with trades in flight.
    #[arg(long)]
    allow_partial: bool,

    /// Skip the persistence sink entirely.
    #[arg(long)]
    no_persist: bool,
}

#[derive(Parser)]
struct ValidateArgs {
    /// Trade file to validate (defaults to the configured input path).
    #[arg(long)]
    input: Option<PathBuf>,
}

/// Loads the layered configuration and applies `run` overrides on top.
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Commands::Run(args) = &cli.command {
        args.overrides.apply(&mut config);
        config.validate().context("Invalid command-line overrides")?;
    }
    Ok(config)
}

async fn run(command: Commands, config: Config) -> anyhow::Result<()> {
    match command {
        Commands::Run(args) => handle_run(args, config).await,
        Commands::Validate(args) => {
            let path = args.input.unwrap_or(config.input.path);
            handle_validate(path).await
        }
    }
}

// ==============================================================================
// Run Command Logic
// ==============================================================================

/// Handles the orchestration of a full run: load -> ingest -> drain -> persist -> report.
async fn handle_run(args: RunArgs, config: Config) -> anyhow::Result<()> {
    tracing::info!(
        input = %config.input.path.display(),
        workers = config.ingestion.resolved_workers(),
        drain_timeout_secs = config.ingestion.drain_timeout_secs,
        "Starting run."
    );

    let batch = load_batch(config.input.path.clone()).await?;
    let invalid = batch.rejected.len();

    // Ingestion is CPU-bound and blocks on the drain, so keep it off the async workers.
    let store = Arc::new(AccountStore::new());
    let outcome = {
        let store = Arc::clone(&store);
        let settings = config.ingestion.clone();
        tokio::task::spawn_blocking(move || ingest(store, batch.trades, &settings)).await??
    };

    if let DrainOutcome::TimedOut { outstanding, .. } = &outcome {
        if !args.allow_partial {
            bail!(
                "Ingestion timed out with {outstanding} trades still in flight; refusing to publish partial results"
            );
        }
        tracing::error!(
            outstanding,
            "Publishing results from an incomplete drain; the store may still be changing."
        );
    }

    let snapshots = store.snapshot();

    if args.no_persist {
        tracing::info!("Persistence disabled for this run.");
    } else {
        let summary = persist(&config, &snapshots).await;
        if !summary.is_clean() {
            tracing::warn!(
                failed_accounts = summary.failures.len(),
                "Some accounts were not persisted; in-memory results are unaffected."
            );
        }
    }

    let report = ReportAggregator::new().aggregate(&snapshots, config.reports.top_n);
    write_reports(&report, &config.reports.output_dir).context("Failed to write reports")?;
    print_top_accounts(&report);

    let ingested = outcome.report();
    println!(
        "Processed {} trades: {} accepted, {} rejected, {} invalid lines, {} accounts.",
        ingested.submitted,
        ingested.accepted,
        ingested.rejected.len(),
        invalid,
        snapshots.len()
    );
    Ok(())
}

async fn load_batch(path: PathBuf) -> anyhow::Result<LoadedBatch> {
    let display = path.display().to_string();
    tokio::task::spawn_blocking(move || load_trades(&path))
        .await?
        .with_context(|| format!("Cannot read trade input {display}"))
}

/// Writes every account to the configured sink. Failures are logged, not fatal.
async fn persist(config: &Config, snapshots: &[AccountSnapshot]) -> PersistSummary {
    let sink: Box<dyn PersistenceSink> = match open_sink(config).await {
        Ok(sink) => sink,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Persistence unavailable; skipping.");
            return PersistSummary::default();
        }
    };

    // Set up the progress bar
    let progress_bar = ProgressBar::new(snapshots.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        progress_bar.set_style(style.progress_chars("#>-"));
    }
    progress_bar.set_message("Persisting accounts...");

    let summary = persist_accounts(sink.as_ref(), snapshots, |_| progress_bar.inc(1)).await;

    progress_bar.finish_with_message("Persistence complete!");
    tracing::info!(
        accounts_written = summary.accounts_written,
        failures = summary.failures.len(),
        "Persistence finished."
    );
    summary
}

async fn open_sink(config: &Config) -> anyhow::Result<Box<dyn PersistenceSink>> {
    if config.database.url.is_none() {
        tracing::warn!("No database configured; results are kept in memory only.");
        return Ok(Box::new(InMemorySink::new()));
    }

    let pool = database::connect(&config.database)
        .await
        .context("Failed to connect to the database")?;
    database::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(Box::new(DbRepository::new(pool)))
}

fn print_top_accounts(report: &PortfolioReport) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Rank", "Account", "Name", "Portfolio Value"]);
    for (rank, ranked) in report.top_accounts.iter().enumerate() {
        table.add_row(vec![
            (rank + 1).to_string(),
            ranked.account_id.to_string(),
            ranked.name.clone(),
            format!("{:.2}", ranked.portfolio_value),
        ]);
    }
    println!("Top {} accounts by portfolio value", report.top_n);
    println!("{table}");
}

// ==============================================================================
// Validate Command Logic
// ==============================================================================

async fn handle_validate(path: PathBuf) -> anyhow::Result<()> {
    let batch = load_batch(path.clone()).await?;

    for rejection in &batch.rejected {
        println!("line {}: {}", rejection.line, rejection.error);
    }
    println!(
        "{}: {} valid trades, {} invalid lines.",
        path.display(),
        batch.trades.len(),
        batch.rejected.len()
    );
    Ok(())
}

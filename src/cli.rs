//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::json_checkpoint_adapter::JsonCheckpointAdapter;
use crate::adapters::json_config_adapter::load_sweep_config;
use crate::adapters::replay_engine::ReplayEngine;
use crate::domain::config::{self, SweepConfig};
use crate::domain::error::MasweepError;
use crate::domain::orchestrator::run_sweep;
use crate::ports::checkpoint_port::CheckpointPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_MARGIN: f64 = 1000.0;
const DEFAULT_START_BALANCE: f64 = 10_000_000.0;

#[derive(Parser, Debug)]
#[command(name = "masweep", about = "Moving-average crossover sweep backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full sweep against replayed bar data
    Run {
        #[arg(long)]
        credentials: PathBuf,
        #[arg(long)]
        symbols: PathBuf,
        #[arg(long)]
        strategies: PathBuf,
        /// Directory of per-symbol bar CSVs (<SYMBOL>.csv)
        #[arg(long)]
        data_dir: PathBuf,
        #[arg(long, default_value = "completed_symbols.json")]
        checkpoint: PathBuf,
        #[arg(short, long, default_value = "backtest_records.csv")]
        output: PathBuf,
        /// Override the strategy pool's worker count
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Parse and validate the configuration documents without running
    Validate {
        #[arg(long)]
        credentials: PathBuf,
        #[arg(long)]
        symbols: PathBuf,
        #[arg(long)]
        strategies: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            credentials,
            symbols,
            strategies,
            data_dir,
            checkpoint,
            output,
            workers,
        } => run_command(
            &credentials,
            &symbols,
            &strategies,
            &data_dir,
            &checkpoint,
            &output,
            workers,
        ),
        Command::Validate {
            credentials,
            symbols,
            strategies,
        } => validate_command(&credentials, &symbols, &strategies),
    }
}

fn load_and_validate(
    credentials: &PathBuf,
    symbols: &PathBuf,
    strategies: &PathBuf,
    workers: Option<usize>,
) -> Result<SweepConfig, MasweepError> {
    let mut sweep = load_sweep_config(credentials, symbols, strategies)?;
    if let Some(workers) = workers {
        sweep.workers = workers;
    }
    config::validate(&sweep)?;
    Ok(sweep)
}

fn run_command(
    credentials: &PathBuf,
    symbols: &PathBuf,
    strategies: &PathBuf,
    data_dir: &PathBuf,
    checkpoint: &PathBuf,
    output: &PathBuf,
    workers: Option<usize>,
) -> ExitCode {
    eprintln!("Loading configuration");
    let sweep = match load_and_validate(credentials, symbols, strategies, workers) {
        Ok(sweep) => sweep,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };
    eprintln!(
        "Sweeping {} symbols x {} variants on {} workers",
        sweep.symbols.len(),
        sweep.variants.len(),
        sweep.workers
    );

    let checkpoint_store = JsonCheckpointAdapter::new(checkpoint.clone());
    let completed = checkpoint_store.load();
    if !completed.is_empty() {
        eprintln!("{} symbols already completed", completed.len());
    }

    // Ctrl-C drains in-flight sessions; their records and checkpoint
    // entries are still persisted below.
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        if let Err(e) = ctrlc::set_handler(move || {
            eprintln!("Interrupt received, draining in-flight sessions");
            cancel.store(true, Ordering::Relaxed);
        }) {
            eprintln!("Warning: running without an interrupt handler ({e})");
        }
    }

    let engine = ReplayEngine::new(data_dir.clone(), DEFAULT_MARGIN, DEFAULT_START_BALANCE);
    let outcome = run_sweep(&engine, &sweep, &completed, Some(&cancel));

    let report = CsvReportAdapter::new(output.clone());
    if let Err(e) = report.append(&outcome.records) {
        eprintln!("error: {e}");
        return ExitCode::from(&e);
    }
    if let Err(e) = checkpoint_store.save(&outcome.completed) {
        eprintln!("error: {e}");
        return ExitCode::from(&e);
    }

    eprintln!(
        "Wrote {} records to {} ({} sessions failed)",
        outcome.records.len(),
        output.display(),
        outcome.failures.len()
    );
    if cancel.load(Ordering::Relaxed) {
        let pending = sweep
            .symbols
            .iter()
            .filter(|s| !outcome.completed.contains(&s.symbol))
            .count();
        eprintln!("Interrupted: {pending} symbols left pending for the next run");
    }
    ExitCode::SUCCESS
}

fn validate_command(
    credentials: &PathBuf,
    symbols: &PathBuf,
    strategies: &PathBuf,
) -> ExitCode {
    match load_and_validate(credentials, symbols, strategies, None) {
        Ok(sweep) => {
            println!(
                "OK: {} symbols, {} variants, {} lots, {} workers",
                sweep.symbols.len(),
                sweep.variants.len(),
                sweep.lots,
                sweep.workers
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

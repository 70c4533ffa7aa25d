//! Concurrent backtest orchestration.
//!
//! One session per symbol: the session owns its bar window and one simulated
//! account per variant, drives the engine's update loop, and evaluates every
//! variant once per new closed bar. Symbols run on a bounded pool of worker
//! threads; each worker's finished session emits its records over a channel
//! to a single collection point, so no result state is shared under a lock.

use crate::domain::bar::{Bar, BarWindow};
use crate::domain::config::{Credentials, SweepConfig, SymbolSpec};
use crate::domain::error::MasweepError;
use crate::domain::signal;
use crate::domain::stats::{self, BacktestRecord};
use crate::domain::variant::{StrategyVariant, max_long_window};
use crate::ports::sim_port::{
    DAILY_BAR_SECONDS, SessionRequest, SessionUpdate, SimulationPort,
};
use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

/// Crossover confirmation needs 3 trailing points beyond the longest window.
const LOOKBACK_BARS: usize = 3;

/// Instrument identity for one session. Immutable once fetched from the
/// engine at session start.
#[derive(Debug, Clone)]
pub struct Instrument {
    pub symbol: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub margin: f64,
}

/// Per-symbol session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    Subscribed,
    Running,
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Init => "init",
            SessionState::Subscribed => "subscribed",
            SessionState::Running => "running",
            SessionState::Finished => "finished",
        };
        write!(f, "{name}")
    }
}

/// A session that failed before producing records. The symbol stays out of
/// the completed set so the next run retries it.
#[derive(Debug, Clone)]
pub struct SessionFailure {
    pub symbol: String,
    pub reason: String,
}

/// Merged result of one sweep.
#[derive(Debug)]
pub struct SweepOutcome {
    pub records: Vec<BacktestRecord>,
    pub completed: HashSet<String>,
    pub failures: Vec<SessionFailure>,
}

enum SessionOutcome {
    Completed {
        symbol: String,
        records: Vec<BacktestRecord>,
    },
    Failed {
        symbol: String,
        reason: String,
    },
}

/// Run one symbol's full session: open, subscribe, drive the bar loop, and
/// derive one record per variant on termination.
pub fn run_session(
    engine: &dyn SimulationPort,
    spec: &SymbolSpec,
    variants: &[StrategyVariant],
    credentials: &Credentials,
    lots: i64,
) -> Result<Vec<BacktestRecord>, MasweepError> {
    let mut state = SessionState::Init;
    eprintln!("{}: {}", spec.symbol, state);
    let depth = max_long_window(variants) + LOOKBACK_BARS;

    let request = SessionRequest {
        accounts: variants.len(),
        start_date: spec.start_date,
        end_date: spec.end_date,
        credentials,
    };
    let mut session = engine.open_session(&request)?;
    session.subscribe_bars(&spec.symbol, DAILY_BAR_SECONDS, depth)?;

    let instrument = Instrument {
        symbol: spec.symbol.clone(),
        start_date: spec.start_date,
        end_date: spec.end_date,
        margin: session.margin(&spec.symbol)?,
    };
    state = SessionState::Subscribed;
    eprintln!(
        "{}: {} ({} variants, margin {}, depth {})",
        spec.symbol,
        state,
        variants.len(),
        instrument.margin,
        depth
    );

    let mut window = BarWindow::new(depth);
    let mut last_seen: Option<NaiveDateTime> = None;
    state = SessionState::Running;
    eprintln!("{}: {}", spec.symbol, state);

    loop {
        match session.wait_update()? {
            SessionUpdate::Finished => break,
            SessionUpdate::Market => {
                let newest = session.bars().last().map(|b| b.timestamp);
                if newest.is_none() || newest == last_seen {
                    // Interim tick inside an unclosed bar.
                    continue;
                }
                let fresh: Vec<Bar> = session
                    .bars()
                    .iter()
                    .filter(|b| last_seen.is_none_or(|seen| b.timestamp > seen))
                    .cloned()
                    .collect();
                for bar in fresh {
                    window.push(bar);
                }
                last_seen = newest;

                for (account, variant) in variants.iter().enumerate() {
                    if let Some(command) = signal::evaluate(&window, variant, lots) {
                        session.set_target_volume(&spec.symbol, account, command.volume)?;
                    }
                }
            }
        }
    }

    session.close();
    state = SessionState::Finished;
    eprintln!("{}: {}", spec.symbol, state);

    let mut records = Vec::with_capacity(variants.len());
    for (account, variant) in variants.iter().enumerate() {
        let raw = session.read_statistics(account)?;
        records.push(stats::derive(
            &raw,
            instrument.margin,
            lots,
            variant,
            &instrument.symbol,
            instrument.start_date,
            instrument.end_date,
        ));
    }
    Ok(records)
}

/// Run the full sweep: every pending symbol on a bounded worker pool.
///
/// Symbols already in `completed` are skipped without opening a session.
/// Setting `cancel` stops workers from starting new sessions; in-flight
/// sessions drain to their natural end and their records are kept.
pub fn run_sweep(
    engine: &dyn SimulationPort,
    config: &SweepConfig,
    completed: &HashSet<String>,
    cancel: Option<&AtomicBool>,
) -> SweepOutcome {
    let pending: Vec<&SymbolSpec> = config
        .symbols
        .iter()
        .filter(|spec| {
            if completed.contains(&spec.symbol) {
                eprintln!("{}: already completed, skipping", spec.symbol);
                false
            } else {
                true
            }
        })
        .collect();

    let mut outcome = SweepOutcome {
        records: Vec::new(),
        completed: completed.clone(),
        failures: Vec::new(),
    };
    if pending.is_empty() {
        return outcome;
    }

    let workers = config.workers.min(pending.len());
    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<SessionOutcome>();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            let pending = &pending;
            scope.spawn(move || {
                loop {
                    if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                        break;
                    }
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(spec) = pending.get(index) else {
                        break;
                    };
                    let result = run_session(
                        engine,
                        spec,
                        &config.variants,
                        &config.credentials,
                        config.lots,
                    );
                    let message = match result {
                        Ok(records) => SessionOutcome::Completed {
                            symbol: spec.symbol.clone(),
                            records,
                        },
                        Err(err) => SessionOutcome::Failed {
                            symbol: spec.symbol.clone(),
                            reason: err.to_string(),
                        },
                    };
                    if tx.send(message).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);
    });

    // All senders are gone once the scope joins; drain whatever arrived.
    for message in rx {
        match message {
            SessionOutcome::Completed { symbol, records } => {
                outcome.records.extend(records);
                outcome.completed.insert(symbol);
            }
            SessionOutcome::Failed { symbol, reason } => {
                eprintln!("Warning: {symbol} session failed ({reason})");
                outcome.failures.push(SessionFailure { symbol, reason });
            }
        }
    }

    outcome
}

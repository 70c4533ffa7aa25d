#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use masweep::domain::bar::Bar;
use masweep::domain::config::{Credentials, SweepConfig, SymbolSpec};
use masweep::domain::error::MasweepError;
use masweep::domain::stats::RawAccountStatistics;
use masweep::domain::variant::{AveragingMethod, StrategyVariant};
use masweep::ports::sim_port::{SessionRequest, SessionUpdate, SimSession, SimulationPort};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap()
                + Duration::days(i as i64),
            close,
            volume: 1000.0,
        })
        .collect()
}

pub fn symbol_spec(symbol: &str) -> SymbolSpec {
    SymbolSpec {
        symbol: symbol.to_string(),
        start_date: date(2024, 1, 1),
        end_date: date(2024, 12, 31),
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        username: "researcher".into(),
        password: "secret".into(),
    }
}

pub fn sma_variant(short: usize, long: usize) -> StrategyVariant {
    StrategyVariant::new(AveragingMethod::Sma, short, long, 0.2).unwrap()
}

pub fn sweep_config(symbols: Vec<SymbolSpec>, variants: Vec<StrategyVariant>) -> SweepConfig {
    SweepConfig {
        credentials: credentials(),
        symbols,
        variants,
        lots: 10,
        workers: 2,
    }
}

/// Closes producing a golden cross (confirmed at bar 7) followed by a death
/// cross (confirmed at bar 9) under SMA(2)/SMA(4).
pub const CROSS_TWICE: [f64; 9] = [10.0, 10.0, 10.0, 10.0, 9.0, 11.0, 11.0, 9.0, 9.0];

pub const CANNED_STATS: RawAccountStatistics = RawAccountStatistics {
    start_balance: 10_000.0,
    end_balance: 10_500.0,
    max_drawdown: 0.05,
    profit_loss_ratio: 1.5,
    win_rate: 0.6,
};

/// Scripted stand-in for the market simulation engine: replays a fixed bar
/// sequence per symbol, records every target-position command, and can be
/// told to fail a symbol's session mid-run.
pub struct ScriptedEngine {
    bars: HashMap<String, Vec<Bar>>,
    failing: HashSet<String>,
    interim_ticks: usize,
    trip_on_open: Option<Arc<AtomicBool>>,
    pub opened: Arc<Mutex<usize>>,
    pub subscribed: Arc<Mutex<Vec<String>>>,
    /// (symbol, account, volume) in arrival order across all sessions.
    pub commands: Arc<Mutex<Vec<(String, usize, i64)>>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            bars: HashMap::new(),
            failing: HashSet::new(),
            interim_ticks: 0,
            trip_on_open: None,
            opened: Arc::new(Mutex::new(0)),
            subscribed: Arc::new(Mutex::new(Vec::new())),
            commands: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_bars(mut self, symbol: &str, closes: &[f64]) -> Self {
        self.bars.insert(symbol.to_string(), make_bars(closes));
        self
    }

    pub fn with_failure(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    /// Emit `n` extra updates per bar without closing a new bar, like a
    /// live feed ticking inside the current interval.
    pub fn with_interim_ticks(mut self, n: usize) -> Self {
        self.interim_ticks = n;
        self
    }

    /// Set `flag` the moment a session opens, simulating an interrupt that
    /// arrives while that session is in flight.
    pub fn tripping_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.trip_on_open = Some(flag);
        self
    }

    pub fn open_count(&self) -> usize {
        *self.opened.lock().unwrap()
    }

    pub fn commands_for(&self, symbol: &str) -> Vec<i64> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _, _)| s == symbol)
            .map(|(_, _, v)| *v)
            .collect()
    }
}

impl SimulationPort for ScriptedEngine {
    fn open_session(
        &self,
        request: &SessionRequest<'_>,
    ) -> Result<Box<dyn SimSession>, MasweepError> {
        *self.opened.lock().unwrap() += 1;
        if let Some(flag) = &self.trip_on_open {
            flag.store(true, Ordering::Relaxed);
        }
        Ok(Box::new(ScriptedSession {
            accounts: request.accounts,
            scripts: self.bars.clone(),
            failing: self.failing.clone(),
            subscribed: Arc::clone(&self.subscribed),
            commands: Arc::clone(&self.commands),
            symbol: String::new(),
            bars: Vec::new(),
            cursor: 0,
            depth: 0,
            fail_at: None,
            interim_ticks: self.interim_ticks,
            pending_ticks: 0,
        }))
    }
}

pub struct ScriptedSession {
    accounts: usize,
    scripts: HashMap<String, Vec<Bar>>,
    failing: HashSet<String>,
    subscribed: Arc<Mutex<Vec<String>>>,
    commands: Arc<Mutex<Vec<(String, usize, i64)>>>,
    symbol: String,
    bars: Vec<Bar>,
    cursor: usize,
    depth: usize,
    fail_at: Option<usize>,
    interim_ticks: usize,
    pending_ticks: usize,
}

impl SimSession for ScriptedSession {
    fn subscribe_bars(
        &mut self,
        symbol: &str,
        _bar_seconds: u64,
        depth: usize,
    ) -> Result<(), MasweepError> {
        self.subscribed.lock().unwrap().push(symbol.to_string());
        self.bars = self
            .scripts
            .get(symbol)
            .cloned()
            .ok_or_else(|| MasweepError::NoData {
                symbol: symbol.to_string(),
            })?;
        self.symbol = symbol.to_string();
        self.depth = depth;
        if self.failing.contains(symbol) {
            // Fail halfway through the replay.
            self.fail_at = Some(self.bars.len() / 2);
        }
        Ok(())
    }

    fn margin(&self, _symbol: &str) -> Result<f64, MasweepError> {
        Ok(1000.0)
    }

    fn wait_update(&mut self) -> Result<SessionUpdate, MasweepError> {
        // Interim ticks repeat the current state without closing a bar.
        if self.pending_ticks > 0 {
            self.pending_ticks -= 1;
            return Ok(SessionUpdate::Market);
        }
        if self.fail_at == Some(self.cursor) {
            return Err(MasweepError::Session {
                symbol: self.symbol.clone(),
                reason: "scripted engine failure".into(),
            });
        }
        if self.cursor >= self.bars.len() {
            return Ok(SessionUpdate::Finished);
        }
        self.cursor += 1;
        self.pending_ticks = self.interim_ticks;
        Ok(SessionUpdate::Market)
    }

    fn bars(&self) -> &[Bar] {
        let start = self.cursor.saturating_sub(self.depth);
        &self.bars[start..self.cursor]
    }

    fn set_target_volume(
        &mut self,
        symbol: &str,
        account: usize,
        volume: i64,
    ) -> Result<(), MasweepError> {
        self.commands
            .lock()
            .unwrap()
            .push((symbol.to_string(), account, volume));
        Ok(())
    }

    fn read_statistics(&self, account: usize) -> Result<RawAccountStatistics, MasweepError> {
        if account >= self.accounts {
            return Err(MasweepError::Session {
                symbol: self.symbol.clone(),
                reason: format!("unknown account {account}"),
            });
        }
        Ok(CANNED_STATS.clone())
    }

    fn close(&mut self) {}
}

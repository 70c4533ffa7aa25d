//! CSV replay simulation engine.
//!
//! A minimal stand-in for the external market simulation engine so the
//! binary can run end to end: daily bars replay from per-symbol CSV files
//! (`<SYMBOL>.csv`, columns `date,close,volume`), each account is marked to
//! market on every bar, and target-position commands fill at the current
//! close. No margin enforcement, matching, or slippage; those belong to a
//! real engine behind the same port.

use crate::domain::bar::Bar;
use crate::domain::error::MasweepError;
use crate::domain::stats::RawAccountStatistics;
use crate::ports::sim_port::{SessionRequest, SessionUpdate, SimSession, SimulationPort};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::PathBuf;

pub struct ReplayEngine {
    data_dir: PathBuf,
    margins: HashMap<String, f64>,
    default_margin: f64,
    start_balance: f64,
}

impl ReplayEngine {
    pub fn new(data_dir: PathBuf, default_margin: f64, start_balance: f64) -> Self {
        Self {
            data_dir,
            margins: HashMap::new(),
            default_margin,
            start_balance,
        }
    }

    pub fn with_margin(mut self, symbol: &str, margin: f64) -> Self {
        self.margins.insert(symbol.to_string(), margin);
        self
    }
}

fn load_bars(
    data_dir: &std::path::Path,
    symbol: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<Bar>, MasweepError> {
    let path = data_dir.join(format!("{symbol}.csv"));
    let session_err = |reason: String| MasweepError::Session {
        symbol: symbol.to_string(),
        reason,
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| session_err(format!("failed to read {}: {e}", path.display())))?;

    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut bars = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| session_err(format!("CSV parse error: {e}")))?;

        let date_str = record
            .get(0)
            .ok_or_else(|| session_err("missing date column".into()))?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|e| session_err(format!("invalid date {date_str:?}: {e}")))?;
        if date < start_date || date > end_date {
            continue;
        }

        let close: f64 = record
            .get(1)
            .ok_or_else(|| session_err("missing close column".into()))?
            .parse()
            .map_err(|e| session_err(format!("invalid close value: {e}")))?;
        let volume: f64 = record
            .get(2)
            .ok_or_else(|| session_err("missing volume column".into()))?
            .parse()
            .map_err(|e| session_err(format!("invalid volume value: {e}")))?;

        bars.push(Bar {
            timestamp: date.and_time(chrono::NaiveTime::MIN),
            close,
            volume,
        });
    }

    if bars.is_empty() {
        return Err(MasweepError::NoData {
            symbol: symbol.to_string(),
        });
    }
    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

impl SimulationPort for ReplayEngine {
    fn open_session(
        &self,
        request: &SessionRequest<'_>,
    ) -> Result<Box<dyn SimSession>, MasweepError> {
        Ok(Box::new(ReplaySession {
            data_dir: self.data_dir.clone(),
            margins: self.margins.clone(),
            default_margin: self.default_margin,
            start_date: request.start_date,
            end_date: request.end_date,
            accounts: (0..request.accounts)
                .map(|_| ReplayAccount::new(self.start_balance))
                .collect(),
            bars: Vec::new(),
            cursor: 0,
            depth: 0,
            symbol: None,
        }))
    }
}

#[derive(Debug, Clone)]
struct ReplayAccount {
    start_balance: f64,
    balance: f64,
    peak: f64,
    max_drawdown: f64,
    position: i64,
    entry_price: f64,
    marked_price: Option<f64>,
    win_count: usize,
    loss_count: usize,
    win_total: f64,
    loss_total: f64,
}

impl ReplayAccount {
    fn new(start_balance: f64) -> Self {
        Self {
            start_balance,
            balance: start_balance,
            peak: start_balance,
            max_drawdown: 0.0,
            position: 0,
            entry_price: 0.0,
            marked_price: None,
            win_count: 0,
            loss_count: 0,
            win_total: 0.0,
            loss_total: 0.0,
        }
    }

    fn mark(&mut self, close: f64) {
        if let Some(prev) = self.marked_price {
            self.balance += self.position as f64 * (close - prev);
        }
        self.marked_price = Some(close);

        if self.balance > self.peak {
            self.peak = self.balance;
        } else if self.start_balance > 0.0 {
            let drawdown = (self.peak - self.balance) / self.start_balance;
            if drawdown > self.max_drawdown {
                self.max_drawdown = drawdown;
            }
        }
    }

    fn set_target(&mut self, volume: i64, close: f64) {
        if volume == self.position {
            return;
        }
        if self.position != 0 {
            let realized = self.position as f64 * (close - self.entry_price);
            if realized > 0.0 {
                self.win_count += 1;
                self.win_total += realized;
            } else if realized < 0.0 {
                self.loss_count += 1;
                self.loss_total += realized.abs();
            }
        }
        self.position = volume;
        self.entry_price = close;
    }

    fn statistics(&self) -> RawAccountStatistics {
        let decided = self.win_count + self.loss_count;
        let win_rate = if decided > 0 {
            self.win_count as f64 / decided as f64
        } else {
            0.0
        };
        let profit_loss_ratio = if self.loss_count > 0 && self.loss_total > 0.0 {
            let avg_win = if self.win_count > 0 {
                self.win_total / self.win_count as f64
            } else {
                0.0
            };
            avg_win / (self.loss_total / self.loss_count as f64)
        } else {
            0.0
        };
        RawAccountStatistics {
            start_balance: self.start_balance,
            end_balance: self.balance,
            max_drawdown: self.max_drawdown,
            profit_loss_ratio,
            win_rate,
        }
    }
}

struct ReplaySession {
    data_dir: PathBuf,
    margins: HashMap<String, f64>,
    default_margin: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    accounts: Vec<ReplayAccount>,
    bars: Vec<Bar>,
    cursor: usize,
    depth: usize,
    symbol: Option<String>,
}

impl ReplaySession {
    fn current_close(&self) -> Option<f64> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.bars.get(i))
            .map(|b| b.close)
    }
}

impl SimSession for ReplaySession {
    fn subscribe_bars(
        &mut self,
        symbol: &str,
        _bar_seconds: u64,
        depth: usize,
    ) -> Result<(), MasweepError> {
        self.bars = load_bars(&self.data_dir, symbol, self.start_date, self.end_date)?;
        self.depth = depth;
        self.symbol = Some(symbol.to_string());
        Ok(())
    }

    fn margin(&self, symbol: &str) -> Result<f64, MasweepError> {
        Ok(self
            .margins
            .get(symbol)
            .copied()
            .unwrap_or(self.default_margin))
    }

    fn wait_update(&mut self) -> Result<SessionUpdate, MasweepError> {
        if self.cursor >= self.bars.len() {
            return Ok(SessionUpdate::Finished);
        }
        self.cursor += 1;
        let close = self.bars[self.cursor - 1].close;
        for account in &mut self.accounts {
            account.mark(close);
        }
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
        let Some(close) = self.current_close() else {
            return Ok(());
        };
        let account = self
            .accounts
            .get_mut(account)
            .ok_or_else(|| MasweepError::Session {
                symbol: symbol.to_string(),
                reason: format!("unknown account index {account}"),
            })?;
        account.set_target(volume, close);
        Ok(())
    }

    fn read_statistics(&self, account: usize) -> Result<RawAccountStatistics, MasweepError> {
        self.accounts
            .get(account)
            .map(ReplayAccount::statistics)
            .ok_or_else(|| MasweepError::Session {
                symbol: self.symbol.clone().unwrap_or_default(),
                reason: format!("unknown account index {account}"),
            })
    }

    fn close(&mut self) {}
}

//! Performance statistics and the derived comparison record.

use crate::domain::variant::StrategyVariant;
use chrono::NaiveDate;
use serde::Serialize;

/// Engine-produced snapshot of one simulated account at session end.
/// `max_drawdown` is the peak-to-trough decline as a fraction of the
/// starting balance.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAccountStatistics {
    pub start_balance: f64,
    pub end_balance: f64,
    pub max_drawdown: f64,
    pub profit_loss_ratio: f64,
    pub win_rate: f64,
}

/// One comparable result row per (symbol, variant) pair. Never mutated after
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestRecord {
    pub method: String,
    pub short_window: usize,
    pub long_window: usize,
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub margin: f64,
    pub capital_at_risk: f64,
    pub start_balance: f64,
    pub end_balance: f64,
    pub drawdown_pct: f64,
    pub profit_loss_ratio: f64,
    pub win_rate: f64,
    pub return_pct: f64,
}

/// Derive the comparison record for one account.
///
/// Capital-at-risk is the greater of a fixed nominal exposure bound
/// (margin x lots x 2) and twice the observed worst drawdown, so variants
/// with larger realized drawdown are normalized against a larger base.
pub fn derive(
    raw: &RawAccountStatistics,
    margin: f64,
    lots: i64,
    variant: &StrategyVariant,
    symbol: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> BacktestRecord {
    let nominal = margin * lots as f64 * 2.0;
    let drawdown_exposure = raw.max_drawdown * raw.start_balance * 2.0;
    let capital_at_risk = nominal.max(drawdown_exposure);

    let drawdown_pct = raw.max_drawdown * raw.start_balance / capital_at_risk * 100.0;
    let return_pct = (raw.end_balance - raw.start_balance) / capital_at_risk * 100.0;

    BacktestRecord {
        method: variant.method.name().to_string(),
        short_window: variant.short_window,
        long_window: variant.long_window,
        symbol: symbol.to_string(),
        start_date,
        end_date,
        margin,
        capital_at_risk,
        start_balance: raw.start_balance,
        end_balance: raw.end_balance,
        drawdown_pct,
        profit_loss_ratio: raw.profit_loss_ratio,
        win_rate: raw.win_rate,
        return_pct,
    }
}

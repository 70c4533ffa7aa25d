//! Sweep configuration value and validation.
//!
//! Configuration is loaded once at startup (adapters), validated here, then
//! passed by reference into the orchestrator. Lifecycle:
//! load -> validate -> run -> persist.

use crate::domain::error::MasweepError;
use crate::domain::variant::StrategyVariant;
use chrono::NaiveDate;
use serde::Deserialize;

pub const DEFAULT_LOTS: i64 = 10;
pub const DEFAULT_WORKERS: usize = 4;

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// One instrument to sweep, with its backtest date range.
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolSpec {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Fully expanded sweep: every variant runs against every symbol.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub credentials: Credentials,
    pub symbols: Vec<SymbolSpec>,
    pub variants: Vec<StrategyVariant>,
    /// Fixed target position magnitude per signal.
    pub lots: i64,
    /// Concurrent session bound: one worker per session slot.
    pub workers: usize,
}

pub fn validate(config: &SweepConfig) -> Result<(), MasweepError> {
    if config.symbols.is_empty() {
        return Err(MasweepError::ConfigInvalid {
            reason: "symbol pool is empty".into(),
        });
    }
    if config.variants.is_empty() {
        return Err(MasweepError::ConfigInvalid {
            reason: "strategy pool expanded to zero variants".into(),
        });
    }
    if config.lots < 1 {
        return Err(MasweepError::ConfigInvalid {
            reason: format!("lots must be at least 1, got {}", config.lots),
        });
    }
    if config.workers < 1 {
        return Err(MasweepError::ConfigInvalid {
            reason: "workers must be at least 1".into(),
        });
    }
    for spec in &config.symbols {
        if spec.symbol.trim().is_empty() {
            return Err(MasweepError::ConfigInvalid {
                reason: "symbol identifier is empty".into(),
            });
        }
        if spec.start_date >= spec.end_date {
            return Err(MasweepError::ConfigInvalid {
                reason: format!(
                    "{}: start date {} is not before end date {}",
                    spec.symbol, spec.start_date, spec.end_date
                ),
            });
        }
    }
    Ok(())
}

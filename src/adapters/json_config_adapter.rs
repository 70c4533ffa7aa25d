//! JSON configuration documents.
//!
//! Three documents feed a sweep: credentials, the symbol pool, and the
//! strategy pool. The strategy pool's method names and window pairs expand
//! into the full variant list as a cross product; unrecognized method names
//! are warned about and skipped so the rest of the pool still runs.

use crate::domain::config::{
    Credentials, DEFAULT_LOTS, DEFAULT_WORKERS, SweepConfig, SymbolSpec,
};
use crate::domain::error::MasweepError;
use crate::domain::variant::{AveragingMethod, DEFAULT_BAND_K, StrategyVariant};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SymbolPoolFile {
    symbols: BTreeMap<String, SymbolSpec>,
}

#[derive(Debug, Deserialize)]
struct StrategyPoolFile {
    /// Pool key -> averaging-method name.
    methods: BTreeMap<String, String>,
    /// Pool key -> [short_window, long_window].
    windows: BTreeMap<String, [usize; 2]>,
    band_k: Option<f64>,
    lots: Option<i64>,
    workers: Option<usize>,
}

fn parse_error(path: &Path, reason: impl ToString) -> MasweepError {
    MasweepError::ConfigParse {
        file: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, MasweepError> {
    let content = fs::read_to_string(path).map_err(|e| parse_error(path, e))?;
    serde_json::from_str(&content).map_err(|e| parse_error(path, e))
}

pub fn load_credentials(path: &Path) -> Result<Credentials, MasweepError> {
    read_json(path)
}

pub fn load_symbols(path: &Path) -> Result<Vec<SymbolSpec>, MasweepError> {
    let pool: SymbolPoolFile = read_json(path)?;
    Ok(pool.symbols.into_values().collect())
}

/// Expanded strategy pool plus its sweep-wide settings.
#[derive(Debug)]
pub struct StrategyPool {
    pub variants: Vec<StrategyVariant>,
    pub lots: i64,
    pub workers: usize,
}

pub fn load_strategies(path: &Path) -> Result<StrategyPool, MasweepError> {
    let pool: StrategyPoolFile = read_json(path)?;
    let band_k = pool.band_k.unwrap_or(DEFAULT_BAND_K);

    let mut variants = Vec::new();
    for (key, name) in &pool.methods {
        let Some(method) = AveragingMethod::from_name(name) else {
            eprintln!("Warning: skipping unknown averaging method {name:?} (pool key {key})");
            continue;
        };
        for (window_key, [short, long]) in &pool.windows {
            let variant =
                StrategyVariant::new(method, *short, *long, band_k).map_err(|e| {
                    parse_error(path, format!("window pair {window_key}: {e}"))
                })?;
            variants.push(variant);
        }
    }

    Ok(StrategyPool {
        variants,
        lots: pool.lots.unwrap_or(DEFAULT_LOTS),
        workers: pool.workers.unwrap_or(DEFAULT_WORKERS),
    })
}

/// Load all three documents into the explicit sweep configuration.
pub fn load_sweep_config(
    credentials_path: &Path,
    symbols_path: &Path,
    strategies_path: &Path,
) -> Result<SweepConfig, MasweepError> {
    let credentials = load_credentials(credentials_path)?;
    let symbols = load_symbols(symbols_path)?;
    let pool = load_strategies(strategies_path)?;
    Ok(SweepConfig {
        credentials,
        symbols,
        variants: pool.variants,
        lots: pool.lots,
        workers: pool.workers,
    })
}

//! Strategy variant descriptors.
//!
//! A variant is one signal rule: an averaging method plus its short/long
//! window lengths. The full sweep is the cross product of the configured
//! method and window pools.

use crate::domain::error::MasweepError;
use std::fmt;

/// Default band half-width coefficient for the banded family.
pub const DEFAULT_BAND_K: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AveragingMethod {
    Sma,
    Ema,
    Vwma,
    Banded,
}

impl AveragingMethod {
    /// Parse a pool name, case-insensitively. Returns `None` for names the
    /// engine does not recognize; callers skip those with a warning.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_uppercase().as_str() {
            "SMA" | "MA" => Some(AveragingMethod::Sma),
            "EMA" => Some(AveragingMethod::Ema),
            "VWMA" => Some(AveragingMethod::Vwma),
            "BANDED" => Some(AveragingMethod::Banded),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AveragingMethod::Sma => "SMA",
            AveragingMethod::Ema => "EMA",
            AveragingMethod::Vwma => "VWMA",
            AveragingMethod::Banded => "BANDED",
        }
    }
}

impl fmt::Display for AveragingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One signal rule. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyVariant {
    pub method: AveragingMethod,
    pub short_window: usize,
    pub long_window: usize,
    /// Band half-width coefficient; only consulted by the banded family.
    pub band_k: f64,
}

impl StrategyVariant {
    /// Construct a variant, enforcing `2 <= short < long`.
    pub fn new(
        method: AveragingMethod,
        short_window: usize,
        long_window: usize,
        band_k: f64,
    ) -> Result<Self, MasweepError> {
        if short_window < 2 {
            return Err(MasweepError::VariantInvalid {
                reason: format!("short window {short_window} must be at least 2"),
            });
        }
        if short_window >= long_window {
            return Err(MasweepError::VariantInvalid {
                reason: format!(
                    "short window {short_window} must be less than long window {long_window}"
                ),
            });
        }
        Ok(Self {
            method,
            short_window,
            long_window,
            band_k,
        })
    }
}

impl fmt::Display for StrategyVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.method {
            AveragingMethod::Banded => write!(
                f,
                "{}({},{},{})",
                self.method, self.short_window, self.long_window, self.band_k
            ),
            _ => write!(f, "{}({},{})", self.method, self.short_window, self.long_window),
        }
    }
}

/// The longest long window across `variants`. Drives the required trailing
/// bar depth for a symbol session.
pub fn max_long_window(variants: &[StrategyVariant]) -> usize {
    variants.iter().map(|v| v.long_window).max().unwrap_or(0)
}

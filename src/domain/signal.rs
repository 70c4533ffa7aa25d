//! Crossover signal evaluation.
//!
//! Evaluation runs once per new closed bar. The just-arrived bar sits at
//! series index -1, so the rules compare indices -3 and -2 to confirm a
//! crossover that completed on the previous bar:
//!
//! - non-banded: the short average crossing above the long average at
//!   (-3 → -2) targets a long position; the long average crossing above the
//!   short targets a short position.
//! - banded: the lower band crossing above the short average targets a short
//!   position; the short average crossing above the upper band targets a
//!   long position.
//!
//! When both rules fire on the same bar (possible only for a degenerate
//! band), the long-entry rule is evaluated second and wins.

use crate::domain::averaging::{
    banded_average, exponential_average, simple_average, volume_weighted_average,
};
use crate::domain::bar::BarWindow;
use crate::domain::variant::{AveragingMethod, StrategyVariant};

/// Signed target volume addressed to one variant's simulated account.
/// Positive is a net-long target, negative net-short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetPosition {
    pub volume: i64,
}

/// Evaluate one variant against the current window. Returns `None` when no
/// crossover completed on the previous bar or the consulted points are still
/// undefined.
pub fn evaluate(
    window: &BarWindow,
    variant: &StrategyVariant,
    lots: i64,
) -> Option<TargetPosition> {
    let closes = window.closes();
    if closes.len() < 3 {
        return None;
    }

    match variant.method {
        AveragingMethod::Sma => crossover(
            &simple_average(&closes, variant.short_window),
            &simple_average(&closes, variant.long_window),
            lots,
        ),
        AveragingMethod::Ema => crossover(
            &exponential_average(&closes, variant.short_window),
            &exponential_average(&closes, variant.long_window),
            lots,
        ),
        AveragingMethod::Vwma => {
            let volumes = window.volumes();
            crossover(
                &volume_weighted_average(&closes, &volumes, variant.short_window),
                &volume_weighted_average(&closes, &volumes, variant.long_window),
                lots,
            )
        }
        AveragingMethod::Banded => {
            let short = simple_average(&closes, variant.short_window);
            let bands = banded_average(&closes, variant.long_window, variant.band_k);
            band_breach(&short, &bands, lots)
        }
    }
}

/// Last two completed points of a series, skipping the just-arrived bar.
fn lookback(series: &[Option<f64>]) -> Option<(f64, f64)> {
    let n = series.len();
    if n < 3 {
        return None;
    }
    Some((series[n - 3]?, series[n - 2]?))
}

fn crossover(short: &[Option<f64>], long: &[Option<f64>], lots: i64) -> Option<TargetPosition> {
    let (s_prev, s_last) = lookback(short)?;
    let (l_prev, l_last) = lookback(long)?;

    let mut target = None;
    if l_prev < s_prev && l_last >= s_last {
        target = Some(TargetPosition { volume: -lots });
    }
    if s_prev < l_prev && s_last >= l_last {
        target = Some(TargetPosition { volume: lots });
    }
    target
}

fn band_breach(
    short: &[Option<f64>],
    bands: &[Option<crate::domain::averaging::Band>],
    lots: i64,
) -> Option<TargetPosition> {
    let (s_prev, s_last) = lookback(short)?;
    let n = bands.len();
    if n < 3 {
        return None;
    }
    let b_prev = bands[n - 3]?;
    let b_last = bands[n - 2]?;

    let mut target = None;
    if b_prev.lower < s_prev && b_last.lower >= s_last {
        target = Some(TargetPosition { volume: -lots });
    }
    if s_prev < b_prev.upper && s_last >= b_last.upper {
        target = Some(TargetPosition { volume: lots });
    }
    target
}

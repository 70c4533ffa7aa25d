//! Moving-average families used by the signal engine.
//!
//! All functions take a series ordered oldest to newest and return a vector
//! aligned 1:1 with the input. Points that cannot be computed yet (warmup, or
//! zero traded volume for VWMA) are `None`.

/// Upper/lower envelope produced by [`banded_average`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub upper: f64,
    pub lower: f64,
}

/// Arithmetic mean of the trailing `window` values.
/// Warmup: first (window - 1) points are `None`.
pub fn simple_average(prices: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; prices.len()];
    }

    let mut out = Vec::with_capacity(prices.len());
    let mut sum = 0.0;

    for (i, &price) in prices.iter().enumerate() {
        sum += price;
        if i >= window {
            sum -= prices[i - window];
        }
        if i + 1 >= window {
            out.push(Some(sum / window as f64));
        } else {
            out.push(None);
        }
    }

    out
}

/// Exponential smoothing with α = 2/(window + 1), seeded by the first value.
/// Defined from the first point on.
pub fn exponential_average(prices: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; prices.len()];
    }

    let alpha = 2.0 / (window as f64 + 1.0);
    let mut out = Vec::with_capacity(prices.len());
    let mut ema = 0.0;

    for (i, &price) in prices.iter().enumerate() {
        ema = if i == 0 {
            price
        } else {
            price * alpha + ema * (1.0 - alpha)
        };
        out.push(Some(ema));
    }

    out
}

/// Σ(price · volume) / Σ(volume) over the trailing `window`.
/// `None` during warmup or when the trailing volume sum is zero.
pub fn volume_weighted_average(
    prices: &[f64],
    volumes: &[f64],
    window: usize,
) -> Vec<Option<f64>> {
    let len = prices.len().min(volumes.len());
    if window == 0 {
        return vec![None; len];
    }

    let mut out = Vec::with_capacity(len);
    let mut pv_sum = 0.0;
    let mut v_sum = 0.0;

    for i in 0..len {
        pv_sum += prices[i] * volumes[i];
        v_sum += volumes[i];
        if i >= window {
            pv_sum -= prices[i - window] * volumes[i - window];
            v_sum -= volumes[i - window];
        }
        if i + 1 >= window && v_sum != 0.0 {
            out.push(Some(pv_sum / v_sum));
        } else {
            out.push(None);
        }
    }

    out
}

/// Simple average ± k × trailing sample standard deviation.
/// Warmup: first (window - 1) points are `None`.
pub fn banded_average(prices: &[f64], window: usize, k: f64) -> Vec<Option<Band>> {
    if window == 0 {
        return vec![None; prices.len()];
    }

    let mut out = Vec::with_capacity(prices.len());

    for i in 0..prices.len() {
        if i + 1 < window {
            out.push(None);
            continue;
        }
        let slice = &prices[i + 1 - window..=i];
        let mean = slice.iter().sum::<f64>() / window as f64;
        // Sample deviation (n - 1 denominator); zero for a window of one.
        let stddev = if window > 1 {
            let variance = slice
                .iter()
                .map(|p| {
                    let diff = p - mean;
                    diff * diff
                })
                .sum::<f64>()
                / (window - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };
        out.push(Some(Band {
            upper: mean + k * stddev,
            lower: mean - k * stddev,
        }));
    }

    out
}

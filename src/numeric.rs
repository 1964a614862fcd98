//! Small numeric helpers shared by the feature table.
//!
//! Only the two documented division sites are guarded. Everything else lets
//! degenerate prices surface as `NaN` or `±inf`.

use crate::candle::Candle;

/// Denominator substituted when the 15-bar range is exactly zero.
pub const RANGE_RATIO_EPS: f64 = 1e-10;

/// `num / den`, with `fallback` standing in for an exactly-zero denominator.
pub fn guarded_div(num: f64, den: f64, fallback: f64) -> f64 {
    let den = if den == 0.0 { fallback } else { den };
    num / den
}

/// Natural log of `a / b`.
pub fn log_ratio(a: f64, b: f64) -> f64 {
    (a / b).ln()
}

/// Adjacent close-to-close log returns inside the window (k bars give k-1 returns).
pub fn log_returns(window: &[Candle]) -> Vec<f64> {
    window
        .windows(2)
        .map(|w| log_ratio(w[1].close, w[0].close))
        .collect()
}

/// Population standard deviation. An empty slice has no dispersion.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    var.sqrt()
}

/// Volume-weighted average close. Zero total volume divides by one instead.
pub fn vwap(window: &[Candle]) -> f64 {
    let total_volume: f64 = window.iter().map(|c| c.volume).sum();
    let notional: f64 = window.iter().map(|c| c.close * c.volume).sum();
    guarded_div(notional, total_volume, 1.0)
}

/// Highest high in the window; any NaN high makes the result NaN.
pub fn max_high(window: &[Candle]) -> f64 {
    window
        .iter()
        .map(|c| c.high)
        .fold(f64::NEG_INFINITY, |acc, v| nan_or(acc, v, f64::max))
}

/// Lowest low in the window; any NaN low makes the result NaN.
pub fn min_low(window: &[Candle]) -> f64 {
    window
        .iter()
        .map(|c| c.low)
        .fold(f64::INFINITY, |acc, v| nan_or(acc, v, f64::min))
}

fn nan_or(a: f64, b: f64, pick: fn(f64, f64) -> f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        pick(a, b)
    }
}

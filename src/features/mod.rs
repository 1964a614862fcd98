//! Fixed 15-slot volatility/momentum feature vector.
//!
//! Each slot is one row of [`FEATURES`]: its display name, its weight in the
//! volatility estimate and the function that computes it. Output order, names
//! and weights all come from that single table.

pub mod window;

use crate::candle::Candle;
use crate::error::{FeeError, FeeResult};
use crate::numeric::{
    guarded_div, log_ratio, log_returns, max_high, min_low, population_std, vwap,
    RANGE_RATIO_EPS,
};

pub use window::{Window, MIN_HISTORY};

pub const FEATURE_COUNT: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    HlRange1m,
    HlRange5m,
    HlRange15m,
    HighLogRet1m,
    HighLogRet5m,
    HighLogRet15m,
    LowLogRet1m,
    LowLogRet5m,
    LowLogRet15m,
    RollStd5m,
    RollStd15m,
    RollStd30m,
    RangeRatio,
    Momentum5m,
    VolWtProxy,
}

impl FeatureKind {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn spec(self) -> &'static FeatureSpec {
        &FEATURES[self.index()]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FeatureSpec {
    pub kind: FeatureKind,
    pub name: &'static str,
    /// Default weight in the volatility estimate; the column sums to 1.0.
    pub weight: f64,
    pub compute: fn(&Window<'_>) -> f64,
}

pub const FEATURES: [FeatureSpec; FEATURE_COUNT] = [
    FeatureSpec {
        kind: FeatureKind::HlRange1m,
        name: "HL Range 1m",
        weight: 0.15,
        compute: hl_range_1m,
    },
    FeatureSpec {
        kind: FeatureKind::HlRange5m,
        name: "HL Range 5m",
        weight: 0.12,
        compute: |w: &Window<'_>| hl_range(w, 5),
    },
    FeatureSpec {
        kind: FeatureKind::HlRange15m,
        name: "HL Range 15m",
        weight: 0.08,
        compute: |w: &Window<'_>| hl_range(w, 15),
    },
    FeatureSpec {
        kind: FeatureKind::HighLogRet1m,
        name: "High LogRet 1m",
        weight: 0.05,
        compute: |w: &Window<'_>| log_ratio(w.last().high, w.ago(1).high),
    },
    FeatureSpec {
        kind: FeatureKind::HighLogRet5m,
        name: "High LogRet 5m",
        weight: 0.04,
        compute: |w: &Window<'_>| log_ratio(w.last().high, w.ago(5).high),
    },
    FeatureSpec {
        kind: FeatureKind::HighLogRet15m,
        name: "High LogRet 15m",
        weight: 0.03,
        compute: |w: &Window<'_>| log_ratio(w.last().high, w.ago(15).high),
    },
    FeatureSpec {
        kind: FeatureKind::LowLogRet1m,
        name: "Low LogRet 1m",
        weight: 0.05,
        compute: |w: &Window<'_>| log_ratio(w.last().low, w.ago(1).low),
    },
    FeatureSpec {
        kind: FeatureKind::LowLogRet5m,
        name: "Low LogRet 5m",
        weight: 0.04,
        compute: |w: &Window<'_>| log_ratio(w.last().low, w.ago(5).low),
    },
    FeatureSpec {
        kind: FeatureKind::LowLogRet15m,
        name: "Low LogRet 15m",
        weight: 0.03,
        compute: |w: &Window<'_>| log_ratio(w.last().low, w.ago(15).low),
    },
    FeatureSpec {
        kind: FeatureKind::RollStd5m,
        name: "RollStd 5m",
        weight: 0.12,
        compute: |w: &Window<'_>| roll_std(w, 5),
    },
    FeatureSpec {
        kind: FeatureKind::RollStd15m,
        name: "RollStd 15m",
        weight: 0.10,
        compute: |w: &Window<'_>| roll_std(w, 15),
    },
    FeatureSpec {
        kind: FeatureKind::RollStd30m,
        name: "RollStd 30m",
        weight: 0.07,
        compute: |w: &Window<'_>| roll_std(w, 30),
    },
    FeatureSpec {
        kind: FeatureKind::RangeRatio,
        name: "Range Ratio",
        weight: 0.02,
        compute: |w: &Window<'_>| {
            guarded_div(hl_range_1m(w), hl_range(w, 15), RANGE_RATIO_EPS)
        },
    },
    FeatureSpec {
        kind: FeatureKind::Momentum5m,
        name: "Momentum 5m",
        weight: 0.03,
        compute: |w: &Window<'_>| log_ratio(w.last().close, w.ago(5).close),
    },
    FeatureSpec {
        kind: FeatureKind::VolWtProxy,
        name: "Vol-Wt Proxy",
        weight: 0.07,
        compute: |w: &Window<'_>| log_ratio(w.last().close, vwap(w.trailing(5))).abs(),
    },
];

/// Default weight column of [`FEATURES`].
pub fn default_weights() -> [f64; FEATURE_COUNT] {
    FEATURES.map(|spec| spec.weight)
}

pub fn names() -> [&'static str; FEATURE_COUNT] {
    FEATURES.map(|spec| spec.name)
}

fn hl_range_1m(w: &Window<'_>) -> f64 {
    let last = w.last();
    log_ratio(last.high, last.low)
}

fn hl_range(w: &Window<'_>, len: usize) -> f64 {
    let bars = w.trailing(len);
    log_ratio(max_high(bars), min_low(bars))
}

fn roll_std(w: &Window<'_>, len: usize) -> f64 {
    population_std(&log_returns(w.trailing(len)))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Wraps externally supplied values; anything but exactly 15 is rejected.
    pub fn from_values(values: &[f64]) -> FeeResult<Self> {
        let values: [f64; FEATURE_COUNT] =
            values
                .try_into()
                .map_err(|_| FeeError::MalformedFeatureVector {
                    got: values.len(),
                    expected: FEATURE_COUNT,
                })?;
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn get(&self, kind: FeatureKind) -> f64 {
        self.values[kind.index()]
    }

    /// `(name, value)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURES
            .iter()
            .zip(self.values.iter())
            .map(|(spec, value)| (spec.name, *value))
    }

    pub fn first_non_finite(&self) -> Option<(&'static str, f64)> {
        self.iter().find(|(_, value)| !value.is_finite())
    }
}

/// Computes the feature vector from the trailing 30 bars of `candles`.
pub fn engineer(candles: &[Candle]) -> FeeResult<FeatureVector> {
    let window = match Window::new(candles) {
        Ok(window) => window,
        Err(err) => {
            tracing::warn!(target: "features", error = %err, "rejecting candle history");
            return Err(err);
        }
    };

    let values = FEATURES.map(|spec| (spec.compute)(&window));
    tracing::debug!(
        target: "features",
        candles = window.len(),
        last_time = window.last().time,
        "engineered feature vector"
    );
    Ok(FeatureVector { values })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "expected {b}, got {a} (tol {tol})");
    }

    /// 30 bars, closes 100.00..=101.00 in equal steps, highs/lows at +-0.1, volume 10.
    fn rising_history() -> Vec<Candle> {
        (0..30)
            .map(|i| {
                let close = 100.0 + i as f64 / 29.0;
                Candle {
                    time: 1_700_000_000 + i as i64 * 60,
                    open: close,
                    high: close + 0.1,
                    low: close - 0.1,
                    close,
                    volume: 10.0,
                }
            })
            .collect()
    }

    #[test]
    fn table_order_matches_kinds() {
        for (i, spec) in FEATURES.iter().enumerate() {
            assert_eq!(spec.kind.index(), i, "{}", spec.name);
            assert_eq!(spec.kind.name(), spec.name);
        }
    }

    #[test]
    fn nan_high_surfaces_as_non_finite_range() {
        let mut candles = rising_history();
        candles[27].high = f64::NAN;
        let fv = engineer(&candles).unwrap();
        assert!(fv.get(FeatureKind::HlRange5m).is_nan());
        assert!(fv.get(FeatureKind::HlRange15m).is_nan());
        assert!(fv.get(FeatureKind::HlRange1m).is_finite());
        assert_eq!(
            fv.first_non_finite().map(|(n, _)| n),
            Some(FeatureKind::HlRange5m.name())
        );
    }

    #[test]
    fn names_are_fixed() {
        assert_eq!(
            names(),
            [
                "HL Range 1m",
                "HL Range 5m",
                "HL Range 15m",
                "High LogRet 1m",
                "High LogRet 5m",
                "High LogRet 15m",
                "Low LogRet 1m",
                "Low LogRet 5m",
                "Low LogRet 15m",
                "RollStd 5m",
                "RollStd 15m",
                "RollStd 30m",
                "Range Ratio",
                "Momentum 5m",
                "Vol-Wt Proxy",
            ]
        );
    }

    #[test]
    fn default_weights_sum_to_one() {
        let sum: f64 = default_weights().iter().sum();
        assert_close(sum, 1.0, 1e-12);
        assert!(default_weights().iter().all(|w| *w >= 0.0));
    }

    #[test]
    fn short_history_is_rejected_without_output() {
        let candles = rising_history();
        let err = engineer(&candles[..29]).unwrap_err();
        assert!(matches!(
            err,
            FeeError::InsufficientHistory {
                got: 29,
                required: 30
            }
        ));
        assert!(engineer(&[]).is_err());
    }

    #[test]
    fn rising_series_features() {
        let candles = rising_history();
        let fv = engineer(&candles).unwrap();
        let step: f64 = 1.0 / 29.0;
        let last: f64 = 101.0;

        assert_close(fv.get(FeatureKind::HlRange1m), (101.1f64 / 100.9).ln(), 1e-12);
        assert_close(
            fv.get(FeatureKind::HlRange5m),
            ((last + 0.1) / (last - 4.0 * step - 0.1)).ln(),
            1e-12,
        );
        assert_close(
            fv.get(FeatureKind::HighLogRet5m),
            ((last + 0.1) / (last - 5.0 * step + 0.1)).ln(),
            1e-12,
        );
        assert!(fv.get(FeatureKind::Momentum5m) > 0.0);
        assert_close(
            fv.get(FeatureKind::Momentum5m),
            (last / (last - 5.0 * step)).ln(),
            1e-12,
        );
        // equal price steps give nearly equal log returns
        assert!(fv.get(FeatureKind::RollStd5m) < 1e-6);
        assert!(fv.get(FeatureKind::RollStd30m) >= 0.0);
        assert_close(
            fv.get(FeatureKind::RangeRatio),
            fv.get(FeatureKind::HlRange1m) / fv.get(FeatureKind::HlRange15m),
            1e-15,
        );
        // vwap of equal volumes is the mean close, two steps under the last
        assert_close(
            fv.get(FeatureKind::VolWtProxy),
            (last / (last - 2.0 * step)).ln(),
            1e-9,
        );
    }

    #[test]
    fn only_trailing_thirty_bars_matter() {
        let mut candles = rising_history();
        let baseline = engineer(&candles).unwrap();

        let mut prefix: Vec<Candle> = (0..10)
            .map(|i| Candle {
                time: i,
                open: 5.0,
                high: 500.0,
                low: 0.5,
                close: 5.0,
                volume: 1e6,
            })
            .collect();
        prefix.append(&mut candles);
        assert_eq!(engineer(&prefix).unwrap(), baseline);
    }

    #[test]
    fn flat_market_hits_both_guards() {
        let candles: Vec<Candle> = (0..30)
            .map(|i| Candle {
                time: i,
                open: 100.0,
                high: 100.0,
                low: 100.0,
                close: 100.0,
                volume: 0.0,
            })
            .collect();
        let fv = engineer(&candles).unwrap();

        assert_eq!(fv.get(FeatureKind::HlRange15m), 0.0);
        assert_eq!(fv.get(FeatureKind::RangeRatio), 0.0);
        assert_eq!(fv.get(FeatureKind::RollStd30m), 0.0);
        // zero volume: vwap = 0 / 1, so the proxy blows up instead of erroring
        assert!(fv.get(FeatureKind::VolWtProxy).is_infinite());
        assert_eq!(fv.first_non_finite().map(|(n, _)| n), Some("Vol-Wt Proxy"));
    }

    #[test]
    fn zero_low_propagates_non_finite() {
        let mut candles = rising_history();
        candles[28].low = 0.0;
        let fv = engineer(&candles).unwrap();
        assert!(fv.get(FeatureKind::LowLogRet1m).is_infinite());
        assert!(fv.get(FeatureKind::HlRange5m).is_infinite());
    }

    #[test]
    fn from_values_checks_length() {
        let err = FeatureVector::from_values(&[0.0; 14]).unwrap_err();
        assert!(matches!(
            err,
            FeeError::MalformedFeatureVector {
                got: 14,
                expected: 15
            }
        ));
        assert!(FeatureVector::from_values(&[0.0; 16]).is_err());
        let fv = FeatureVector::from_values(&[0.5; 15]).unwrap();
        assert_eq!(fv.iter().count(), FEATURE_COUNT);
    }
}

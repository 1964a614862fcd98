use serde::Serialize;

use crate::config::{FeeCurve, FeeModelConfig};
use crate::error::FeeResult;
use crate::features::{FeatureVector, FEATURES};

const LOW_VOL_LLMAD: f64 = 0.001;
const MEDIUM_VOL_LLMAD: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityLevel {
    Low,
    Medium,
    High,
}

impl VolatilityLevel {
    pub fn classify(llmad: f64) -> Self {
        let magnitude = llmad.abs();
        if magnitude < LOW_VOL_LLMAD {
            Self::Low
        } else if magnitude < MEDIUM_VOL_LLMAD {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// Whether the dynamic fee sits above the static reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeDirection {
    Raised,
    Lowered,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeQuote {
    pub fee: f64,
    pub llmad: f64,
    pub fee_diff_percent: f64,
    pub static_fee: f64,
}

impl FeeQuote {
    pub fn volatility_level(&self) -> VolatilityLevel {
        VolatilityLevel::classify(self.llmad)
    }

    pub fn direction(&self) -> FeeDirection {
        if self.fee > self.static_fee {
            FeeDirection::Raised
        } else {
            FeeDirection::Lowered
        }
    }
}

/// Deterministic weighted-feature volatility estimate and fee mapping.
#[derive(Debug, Clone, Default)]
pub struct FeeEstimator {
    cfg: FeeModelConfig,
}

impl FeeEstimator {
    pub fn new(cfg: FeeModelConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &FeeModelConfig {
        &self.cfg
    }

    /// `sum(|feature_i| * weight_i) / calibration_divisor`.
    pub fn estimate(&self, features: &FeatureVector) -> f64 {
        let raw = features
            .values()
            .iter()
            .zip(self.cfg.weights.iter())
            .fold(0.0, |acc, (value, weight)| acc + value.abs() * weight);
        raw / self.cfg.calibration_divisor
    }

    /// Same as [`estimate`](Self::estimate) for an unchecked slice.
    pub fn estimate_values(&self, values: &[f64]) -> FeeResult<f64> {
        let features = FeatureVector::from_values(values)?;
        Ok(self.estimate(&features))
    }

    pub fn to_fee(&self, llmad: f64) -> FeeQuote {
        let fee = self.fee_for(llmad);
        let static_fee = self.cfg.static_fee;
        FeeQuote {
            fee,
            llmad,
            fee_diff_percent: (fee - static_fee) / static_fee * 100.0,
            static_fee,
        }
    }

    pub fn quote(&self, features: &FeatureVector) -> FeeQuote {
        let llmad = self.estimate(features);
        let quote = self.to_fee(llmad);
        tracing::debug!(
            target: "fee",
            llmad,
            fee = quote.fee,
            fee_diff_percent = quote.fee_diff_percent,
            dominant = dominant_feature(features, &self.cfg.weights),
            "scored feature vector"
        );
        quote
    }

    fn fee_for(&self, llmad: f64) -> f64 {
        let cfg = &self.cfg;
        match cfg.curve {
            FeeCurve::Interpolated => {
                // f64::min drops NaN, so a NaN estimate saturates
                let normalized = (llmad.abs() / cfg.llmad_max).min(1.0);
                if normalized >= 1.0 {
                    return cfg.max_fee;
                }
                // min/max rather than clamp: unvalidated bounds may be inverted or NaN
                (cfg.min_fee + normalized * (cfg.max_fee - cfg.min_fee))
                    .min(cfg.max_fee)
                    .max(cfg.min_fee)
            }
            FeeCurve::Linear {
                base_fee,
                scale,
                floor,
                cap,
            } => (base_fee + llmad.abs() * scale).min(cap).max(floor),
        }
    }
}

fn dominant_feature(features: &FeatureVector, weights: &[f64]) -> &'static str {
    FEATURES
        .iter()
        .zip(features.values().iter().zip(weights.iter()))
        .map(|(spec, (value, weight))| (spec.name, value.abs() * weight))
        .fold(("none", 0.0), |best, cur| if cur.1 > best.1 { cur } else { best })
        .0
}

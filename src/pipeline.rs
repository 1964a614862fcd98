//! Request-level entry points: candles -> features -> volatility estimate -> fee.

use serde::Serialize;

use crate::candle::{Candle, PriceSummary};
use crate::config::{AppConfig, FeatureConfig};
use crate::error::{FeeError, FeeResult};
use crate::features::{self, FeatureVector, FEATURE_COUNT};
use crate::fee::{FeeDirection, FeeEstimator, FeeQuote, VolatilityLevel};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureResponse {
    pub features: Vec<f64>,
    pub names: Vec<&'static str>,
}

impl From<&FeatureVector> for FeatureResponse {
    fn from(fv: &FeatureVector) -> Self {
        Self {
            features: fv.values().to_vec(),
            names: features::names().to_vec(),
        }
    }
}

pub type FeeResponse = FeeQuote;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    #[serde(flatten)]
    pub features: FeatureResponse,
    #[serde(flatten)]
    pub quote: FeeResponse,
    pub volatility_level: VolatilityLevel,
    pub direction: FeeDirection,
    #[serde(flatten)]
    pub price: PriceSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

impl From<&FeeError> for ErrorResponse {
    fn from(err: &FeeError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    estimator: FeeEstimator,
    features: FeatureConfig,
}

impl Pipeline {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            estimator: FeeEstimator::new(cfg.fee.clone()),
            features: cfg.features.clone(),
        }
    }

    pub fn estimator(&self) -> &FeeEstimator {
        &self.estimator
    }

    pub fn feature_vector(&self, candles: &[Candle]) -> FeeResult<FeatureVector> {
        let fv = features::engineer(candles)?;
        if self.features.reject_non_finite {
            if let Some((name, value)) = fv.first_non_finite() {
                tracing::warn!(
                    target: "pipeline",
                    feature = name,
                    value,
                    "rejecting non-finite feature"
                );
                return Err(FeeError::NonFiniteFeature { name, value });
            }
        }
        Ok(fv)
    }

    /// Fails with `InsufficientHistory` for fewer than 30 candles.
    pub fn engineer_features(&self, candles: &[Candle]) -> FeeResult<FeatureResponse> {
        let fv = self.feature_vector(candles)?;
        Ok(FeatureResponse::from(&fv))
    }

    /// Fails with `MalformedFeatureVector` unless given exactly 15 values.
    pub fn score_fee(&self, features: &[f64]) -> FeeResult<FeeResponse> {
        let fv = FeatureVector::from_values(features)?;
        Ok(self.estimator.quote(&fv))
    }

    pub fn evaluate(&self, candles: &[Candle]) -> FeeResult<Evaluation> {
        let fv = self.feature_vector(candles)?;
        let quote = self.estimator.quote(&fv);
        let price = PriceSummary::from_candles(candles)?;

        tracing::debug!(
            target: "pipeline",
            candles = candles.len(),
            features = FEATURE_COUNT,
            llmad = quote.llmad,
            fee = quote.fee,
            "evaluated candle history"
        );

        Ok(Evaluation {
            features: FeatureResponse::from(&fv),
            volatility_level: quote.volatility_level(),
            direction: quote.direction(),
            quote,
            price,
        })
    }
}

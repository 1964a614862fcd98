//! Volatility feature engineering and dynamic AMM fee scoring over one-minute
//! OHLCV candles.
//!
//! ```text
//! candles -> features::engineer -> FeeEstimator::estimate -> FeeEstimator::to_fee
//! ```

pub mod candle;
pub mod config;
pub mod error;
pub mod features;
pub mod fee;
pub mod numeric;
pub mod ops;
pub mod pipeline;

pub use candle::{Candle, PriceSummary};
pub use config::{AppConfig, FeeCurve, FeeModelConfig};
pub use error::{FeeError, FeeResult};
pub use features::{FeatureKind, FeatureVector, FEATURES, FEATURE_COUNT, MIN_HISTORY};
pub use fee::{FeeDirection, FeeEstimator, FeeQuote, VolatilityLevel};
pub use pipeline::{Evaluation, Pipeline};

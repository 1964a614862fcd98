use serde::{Deserialize, Serialize};

use crate::error::{FeeError, FeeResult};

/// One fixed-duration (one-minute) OHLCV bar. Sequences are ordered oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(alias = "volumefrom")]
    pub volume: f64,
}

/// Latest price and its change against the previous bar, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSummary {
    pub current_price: f64,
    pub price_change_pct: f64,
}

impl PriceSummary {
    pub fn from_candles(candles: &[Candle]) -> FeeResult<Self> {
        let [.., prev, current] = candles else {
            return Err(FeeError::InsufficientHistory {
                got: candles.len(),
                required: 2,
            });
        };

        Ok(Self {
            current_price: current.close,
            price_change_pct: (current.close - prev.close) / prev.close * 100.0,
        })
    }
}

use crate::candle::Candle;
use crate::error::{FeeError, FeeResult};

/// Longest lookback any feature needs.
pub const MIN_HISTORY: usize = 30;

/// Read-only view over a candle history anchored at its most recent bar.
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    candles: &'a [Candle],
}

impl<'a> Window<'a> {
    pub fn new(candles: &'a [Candle]) -> FeeResult<Self> {
        if candles.len() < MIN_HISTORY {
            return Err(FeeError::InsufficientHistory {
                got: candles.len(),
                required: MIN_HISTORY,
            });
        }
        Ok(Self { candles })
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn last(&self) -> &'a Candle {
        self.ago(0)
    }

    /// The bar `bars` steps before the last one (`ago(1)` is index `n-2`).
    pub fn ago(&self, bars: usize) -> &'a Candle {
        &self.candles[self.candles.len() - 1 - bars]
    }

    /// The last `len` bars, oldest first.
    pub fn trailing(&self, len: usize) -> &'a [Candle] {
        &self.candles[self.candles.len() - len..]
    }
}

//! Average True Range.
//!
//! TR[0] = high - low; TR[i] = max(high - low, |high - prev_close|,
//! |low - prev_close|). ATR = EMA(TR, n) with the first-value seed, so it is
//! defined from index 0 onward.

use crate::domain::indicator::{ema, nan_max};
use crate::domain::symbols::Series;

pub const DEFAULT_LENGTH: usize = 14;

pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Series {
    let len = high.len().min(low.len()).min(close.len());
    (0..len)
        .map(|i| {
            let hl = high[i] - low[i];
            if i == 0 {
                return hl;
            }
            let hc = (high[i] - close[i - 1]).abs();
            let lc = (low[i] - close[i - 1]).abs();
            nan_max(nan_max(hl, hc), lc)
        })
        .collect()
}

pub fn atr(high: &[f64], low: &[f64], close: &[f64], length: usize) -> Series {
    ema(&true_range(high, low, close), length)
}

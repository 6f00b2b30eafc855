//! Stochastic oscillator, smoothed %D line.
//!
//! %K[i] = (close - lowest_low(k)) / (highest_high(k) - lowest_low(k)) * 100,
//! or 50 when the high-low range is zero. %D = SMA(%K, d).
//! Warmup: %K is not-a-number below k-1, so %D is defined from k+d-2.
//!
//! Default parameters: k=14, d=3

use crate::domain::indicator::{nan_max, nan_min, sma};
use crate::domain::symbols::Series;

pub const DEFAULT_K: usize = 14;
pub const DEFAULT_D: usize = 3;

pub fn stochastic_k(high: &[f64], low: &[f64], close: &[f64], k_length: usize) -> Series {
    let len = high.len().min(low.len()).min(close.len());
    let mut values = Vec::with_capacity(len);

    for i in 0..len {
        if k_length == 0 || i + 1 < k_length {
            values.push(f64::NAN);
            continue;
        }

        let mut highest = f64::NEG_INFINITY;
        let mut lowest = f64::INFINITY;
        for j in 0..k_length {
            highest = nan_max(highest, high[i - j]);
            lowest = nan_min(lowest, low[i - j]);
        }

        let range = highest - lowest;
        // An undefined range compares false and lands on 50 as well.
        values.push(if range > 0.0 {
            (close[i] - lowest) / range * 100.0
        } else {
            50.0
        });
    }

    values
}

pub fn stochastic(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    k_length: usize,
    d_length: usize,
) -> Series {
    sma(&stochastic_k(high, low, close, k_length), d_length)
}

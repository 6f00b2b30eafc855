//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the first value (not a lagged SMA), then
//! EMA[i] = data[i]*k + EMA[i-1]*(1-k). Defined from index 0 onward.

use crate::domain::symbols::Series;

pub fn ema(data: &[f64], length: usize) -> Series {
    let Some(&seed) = data.first() else {
        return Vec::new();
    };

    let k = 2.0 / (length as f64 + 1.0);
    let mut values = Vec::with_capacity(data.len());
    let mut prev = seed;
    values.push(seed);

    for &value in &data[1..] {
        prev = value * k + prev * (1.0 - k);
        values.push(prev);
    }

    values
}

//! Simple Moving Average.
//!
//! SMA[i] = (data[i] + data[i-1] + ... + data[i-n+1]) / n
//! Warmup: indices below n-1 are not-a-number.

use crate::domain::symbols::Series;

pub fn sma(data: &[f64], length: usize) -> Series {
    let mut values = Vec::with_capacity(data.len());

    for i in 0..data.len() {
        if length == 0 || i + 1 < length {
            values.push(f64::NAN);
            continue;
        }
        let mut sum = 0.0;
        for j in 0..length {
            sum += data[i - j];
        }
        values.push(sum / length as f64);
    }

    values
}

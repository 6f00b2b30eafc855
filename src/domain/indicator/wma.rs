//! Weighted Moving Average.
//!
//! WMA(n) = (n*P[i] + (n-1)*P[i-1] + ... + 1*P[i-n+1]) / (n*(n+1)/2)
//! Warmup: indices below n-1 are not-a-number.

use crate::domain::symbols::Series;

pub fn wma(data: &[f64], length: usize) -> Series {
    let mut values = Vec::with_capacity(data.len());
    let n = length as f64;
    let divisor = n * (n + 1.0) / 2.0;

    for i in 0..data.len() {
        if length == 0 || i + 1 < length {
            values.push(f64::NAN);
            continue;
        }
        let mut sum = 0.0;
        for j in 0..length {
            sum += data[i - j] * (length - j) as f64;
        }
        values.push(sum / divisor);
    }

    values
}

//! RSI (Relative Strength Index) using Wilder's smoothing.
//!
//! - Seed: simple mean of gains/losses over the first n price changes,
//!   landing at index n
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss)); avg_loss == 0 gives 100.
//! Warmup: indices below n are not-a-number.

use crate::domain::symbols::Series;

pub fn rsi(data: &[f64], length: usize) -> Series {
    let mut values = vec![f64::NAN; data.len()];
    if length == 0 || data.len() <= length {
        return values;
    }

    let changes: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for &change in &changes[..length] {
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss += change.abs();
        }
    }
    avg_gain /= length as f64;
    avg_loss /= length as f64;
    values[length] = strength_index(avg_gain, avg_loss);

    let n = length as f64;
    for i in (length + 1)..data.len() {
        let change = changes[i - 1];
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { change.abs() } else { 0.0 };

        avg_gain = (avg_gain * (n - 1.0) + gain) / n;
        avg_loss = (avg_loss * (n - 1.0) + loss) / n;
        values[i] = strength_index(avg_gain, avg_loss);
    }

    values
}

fn strength_index(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn rsi_warmup_period() {
        let data: Vec<f64> = (1..=15).map(|i| 100.0 + (i as f64 % 5.0) * 2.0).collect();
        let values = rsi(&data, 14);

        assert_eq!(values.len(), 15);
        for (i, v) in values.iter().enumerate().take(14) {
            assert!(v.is_nan(), "index {} should be undefined", i);
        }
        assert!(!values[14].is_nan());
    }

    #[test]
    fn rsi_all_gains_no_losses() {
        let data: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        assert_relative_eq!(rsi(&data, 14)[14], 100.0);
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let data: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        assert_relative_eq!(rsi(&data, 14)[14], 0.0);
    }

    #[test]
    fn rsi_flat_prices_are_100() {
        let values = rsi(&[50.0; 6], 3);
        assert!(values[..3].iter().all(|v| v.is_nan()));
        for v in &values[3..] {
            assert_relative_eq!(*v, 100.0);
        }
    }

    #[test]
    fn rsi_known_calculation() {
        // changes: +2, -1, +2 → seed gain 4/3, loss 1/3
        let values = rsi(&[10.0, 12.0, 11.0, 13.0, 12.0], 3);
        let (g, l) = (4.0 / 3.0, 1.0 / 3.0);
        assert_relative_eq!(values[3], 100.0 - 100.0 / (1.0 + g / l));

        // next change -1: gain (g*2+0)/3, loss (l*2+1)/3
        let (g, l) = (g * 2.0 / 3.0, (l * 2.0 + 1.0) / 3.0);
        assert_relative_eq!(values[4], 100.0 - 100.0 / (1.0 + g / l), epsilon = 1e-12);
    }

    #[test]
    fn rsi_insufficient_data() {
        let values = rsi(&[1.0, 2.0, 3.0], 3);
        assert_eq!(values.len(), 3);
        assert!(values.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rsi_empty() {
        assert!(rsi(&[], 14).is_empty());
    }

    proptest! {
        #[test]
        fn bounded_and_warmup_exact(
            data in prop::collection::vec(1.0f64..1000.0, 0..80),
            length in 1usize..20,
        ) {
            let values = rsi(&data, length);
            prop_assert_eq!(values.len(), data.len());
            for (i, v) in values.iter().enumerate() {
                prop_assert_eq!(v.is_nan(), i < length);
                if !v.is_nan() {
                    prop_assert!((0.0..=100.0).contains(v), "RSI {} out of range", v);
                }
            }
        }
    }
}

//! MACD line.
//!
//! MACD Line = EMA(fast) - EMA(slow), index-aligned. Only the line is
//! produced; the signal length is carried by the call but no signal or
//! histogram series is derived from it.
//!
//! Default parameters: fast=12, slow=26, signal=9

use crate::domain::indicator::ema;
use crate::domain::symbols::Series;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn macd_line(data: &[f64], fast: usize, slow: usize) -> Series {
    let ema_fast = ema(data, fast);
    let ema_slow = ema(data, slow);
    ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect()
}

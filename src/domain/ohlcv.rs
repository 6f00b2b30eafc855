//! OHLCV bar representation.
//!
//! Bars are ordered ascending by `time`; index position is the unit of
//! alignment for every derived series.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Seconds since the Unix epoch.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A provider row. Any price may be absent for a gap bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct RawBar {
    pub time: i64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl RawBar {
    /// `None` when `open` or `close` is missing. Other missing fields become NaN.
    pub fn into_bar(self) -> Option<Bar> {
        Some(Bar {
            time: self.time,
            open: self.open?,
            high: self.high.unwrap_or(f64::NAN),
            low: self.low.unwrap_or(f64::NAN),
            close: self.close?,
            volume: self.volume.unwrap_or(f64::NAN),
        })
    }
}

/// Drop gap rows and order the rest ascending by time.
pub fn clean_bars(rows: impl IntoIterator<Item = RawBar>) -> Vec<Bar> {
    let mut bars: Vec<Bar> = rows.into_iter().filter_map(RawBar::into_bar).collect();
    bars.sort_by_key(|b| b.time);
    bars
}

/// Extract one price field across all bars.
pub fn field(bars: &[Bar], get: impl Fn(&Bar) -> f64) -> Vec<f64> {
    bars.iter().map(get).collect()
}

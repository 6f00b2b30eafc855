#![allow(dead_code)]

use plotscript::domain::error::PlotscriptError;
pub use plotscript::domain::ohlcv::Bar;
use plotscript::ports::data_port::BarSource;
use std::collections::HashMap;

pub const START_TIME: i64 = 1_704_067_200;
pub const DAY: i64 = 86_400;

pub struct MockBarSource {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockBarSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl BarSource for MockBarSource {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<Bar>, PlotscriptError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(PlotscriptError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, PlotscriptError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn make_bar(time: i64, close: f64) -> Bar {
    Bar {
        time,
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000.0,
    }
}

/// One bar per day from [`START_TIME`].
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(START_TIME + i as i64 * DAY, close))
        .collect()
}

/// `count` daily bars rising by one from `start_price`.
pub fn generate_bars(count: usize, start_price: f64) -> Vec<Bar> {
    let closes: Vec<f64> = (0..count).map(|i| start_price + i as f64).collect();
    bars_from_closes(&closes)
}

/// Deterministic oscillating closes.
pub fn wave_bars(count: usize) -> Vec<Bar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| 100.0 + (i as f64 * 0.4).sin() * 8.0 + i as f64 * 0.1)
        .collect();
    bars_from_closes(&closes)
}

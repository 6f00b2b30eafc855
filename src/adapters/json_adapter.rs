//! JSON file bar source.
//!
//! One file per symbol at `<base>/<SYMBOL>.json` holding an array of provider
//! rows: `{"time": 1700000000, "open": 1.0, "high": null, ...}`.

use crate::adapters::csv_adapter::list_with_extension;
use crate::domain::error::PlotscriptError;
use crate::domain::ohlcv::{Bar, RawBar, clean_bars};
use crate::ports::data_port::BarSource;
use std::fs;
use std::path::PathBuf;

const EXTENSION: &str = "json";

pub struct JsonAdapter {
    base_path: PathBuf,
}

impl JsonAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn json_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.{}", symbol, EXTENSION))
    }
}

impl BarSource for JsonAdapter {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<Bar>, PlotscriptError> {
        let path = self.json_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| PlotscriptError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let rows: Vec<RawBar> =
            serde_json::from_str(&content).map_err(|e| PlotscriptError::Data {
                reason: format!("JSON parse error in {}: {}", path.display(), e),
            })?;
        Ok(clean_bars(rows))
    }

    fn list_symbols(&self) -> Result<Vec<String>, PlotscriptError> {
        list_with_extension(&self.base_path, EXTENSION)
    }
}

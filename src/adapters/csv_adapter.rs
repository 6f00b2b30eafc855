//! CSV file bar source.
//!
//! One file per symbol at `<base>/<SYMBOL>.csv` with the header
//! `time,open,high,low,close,volume`. `time` is epoch seconds or `YYYY-MM-DD`
//! (midnight UTC). Empty price cells mark gap rows.

use crate::domain::error::PlotscriptError;
use crate::domain::ohlcv::{Bar, RawBar, clean_bars};
use crate::ports::data_port::BarSource;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "csv";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.{}", symbol, EXTENSION))
    }
}

impl BarSource for CsvAdapter {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<Bar>, PlotscriptError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| PlotscriptError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut rows = Vec::new();

        for (idx, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| PlotscriptError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            let row = idx + 2;

            let time_str = record.get(0).ok_or_else(|| PlotscriptError::Data {
                reason: format!("row {row}: missing time column"),
            })?;
            let time = parse_time(time_str).ok_or_else(|| PlotscriptError::Data {
                reason: format!("row {row}: invalid time '{time_str}'"),
            })?;

            rows.push(RawBar {
                time,
                open: price(&record, 1, "open", row)?,
                high: price(&record, 2, "high", row)?,
                low: price(&record, 3, "low", row)?,
                close: price(&record, 4, "close", row)?,
                volume: price(&record, 5, "volume", row)?,
            });
        }

        let total = rows.len();
        let bars = clean_bars(rows);
        if bars.len() < total {
            tracing::debug!(symbol, dropped = total - bars.len(), "dropped gap rows");
        }
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, PlotscriptError> {
        list_with_extension(&self.base_path, EXTENSION)
    }
}

/// Epoch seconds, or an ISO date taken as midnight UTC.
fn parse_time(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<i64>() {
        return Some(seconds);
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

/// Empty or absent cells are `None`; anything else must be a number.
fn price(
    record: &csv::StringRecord,
    column: usize,
    name: &str,
    row: usize,
) -> Result<Option<f64>, PlotscriptError> {
    match record.get(column).map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|e| PlotscriptError::Data {
                reason: format!("row {row}: invalid {name} value '{value}': {e}"),
            }),
    }
}

/// File stems in `dir` carrying `extension`, sorted.
pub(crate) fn list_with_extension(
    dir: &Path,
    extension: &str,
) -> Result<Vec<String>, PlotscriptError> {
    let entries = fs::read_dir(dir).map_err(|e| PlotscriptError::Data {
        reason: format!("failed to read directory {}: {}", dir.display(), e),
    })?;

    let mut symbols = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PlotscriptError::Data {
            reason: format!("directory entry error: {}", e),
        })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            symbols.push(stem.to_string());
        }
    }

    symbols.sort();
    Ok(symbols)
}

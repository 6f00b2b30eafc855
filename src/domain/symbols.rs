//! Per-run symbol table mapping variable names to bar-aligned series.

use std::collections::HashMap;

use crate::domain::ohlcv::{Bar, field};

/// One value per bar index. `f64::NAN` marks "undefined at this index".
pub type Series = Vec<f64>;

/// Names pre-populated from the bar series, with the bar field each reads.
pub const BUILTIN_SYMBOLS: [(&str, fn(&Bar) -> f64); 5] = [
    ("close", |b: &Bar| b.close),
    ("open", |b: &Bar| b.open),
    ("high", |b: &Bar| b.high),
    ("low", |b: &Bar| b.low),
    ("volume", |b: &Bar| b.volume),
];

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    series: HashMap<String, Series>,
    bar_count: usize,
}

impl SymbolTable {
    pub fn from_bars(bars: &[Bar]) -> Self {
        let series = BUILTIN_SYMBOLS
            .iter()
            .map(|(name, get)| (name.to_string(), field(bars, get)))
            .collect();
        Self {
            series,
            bar_count: bars.len(),
        }
    }

    /// Length every stored series shares.
    pub fn bar_count(&self) -> usize {
        self.bar_count
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.series.contains_key(name)
    }

    /// Add or wholly replace the series bound to `name`.
    pub fn insert(&mut self, name: impl Into<String>, series: Series) {
        debug_assert_eq!(series.len(), self.bar_count);
        self.series.insert(name.into(), series);
    }

    /// Sorted variable names, for diagnostics.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.series.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars() -> Vec<Bar> {
        (0..3)
            .map(|i| Bar {
                time: 1_700_000_000 + i * 86_400,
                open: 10.0 + i as f64,
                high: 12.0 + i as f64,
                low: 9.0 + i as f64,
                close: 11.0 + i as f64,
                volume: 100.0 * (i + 1) as f64,
            })
            .collect()
    }

    #[test]
    fn builtins_populated_from_bars() {
        let table = SymbolTable::from_bars(&bars());
        assert_eq!(table.bar_count(), 3);
        assert_eq!(table.get("close"), Some(&[11.0, 12.0, 13.0][..]));
        assert_eq!(table.get("open"), Some(&[10.0, 11.0, 12.0][..]));
        assert_eq!(table.get("high"), Some(&[12.0, 13.0, 14.0][..]));
        assert_eq!(table.get("low"), Some(&[9.0, 10.0, 11.0][..]));
        assert_eq!(table.get("volume"), Some(&[100.0, 200.0, 300.0][..]));
        assert_eq!(table.names(), vec!["close", "high", "low", "open", "volume"]);
    }

    #[test]
    fn insert_replaces_whole_series() {
        let mut table = SymbolTable::from_bars(&bars());
        table.insert("x", vec![1.0, 2.0, 3.0]);
        table.insert("x", vec![4.0, 5.0, 6.0]);
        assert_eq!(table.get("x"), Some(&[4.0, 5.0, 6.0][..]));
    }

    #[test]
    fn builtins_can_be_overwritten() {
        let mut table = SymbolTable::from_bars(&bars());
        table.insert("close", vec![0.0; 3]);
        assert_eq!(table.get("close"), Some(&[0.0, 0.0, 0.0][..]));
    }

    #[test]
    fn unknown_name_is_none() {
        let table = SymbolTable::from_bars(&bars());
        assert!(table.get("rsi").is_none());
        assert!(!table.contains("rsi"));
    }

    #[test]
    fn empty_bars_give_empty_series() {
        let table = SymbolTable::from_bars(&[]);
        assert_eq!(table.bar_count(), 0);
        assert_eq!(table.get("close"), Some(&[][..]));
    }
}

//! Bar data access port trait.

use crate::domain::error::PlotscriptError;
use crate::domain::ohlcv::Bar;

pub trait BarSource {
    /// Bars for `symbol`, ascending by time, with gap rows already removed.
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<Bar>, PlotscriptError>;

    fn list_symbols(&self) -> Result<Vec<String>, PlotscriptError>;
}

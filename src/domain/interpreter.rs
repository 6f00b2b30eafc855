//! Sequential statement execution over one bar series.
//!
//! A run owns its [`SymbolTable`]: it is built from the bars, updated by each
//! assignment in order, and dropped when the run returns. Plot statements read
//! the table as it stands at their line.

use tracing::{debug, info};

use crate::domain::error::ScriptError;
use crate::domain::ohlcv::Bar;
use crate::domain::plot::{ExecutionResult, PlotResult};
use crate::domain::script::{Line, PlotStatement, Statement, StatementKind, parse_lines};
use crate::domain::symbols::SymbolTable;

/// State of one script run.
pub struct Interpreter<'a> {
    bars: &'a [Bar],
    symbols: SymbolTable,
    results: Vec<PlotResult>,
}

impl<'a> Interpreter<'a> {
    pub fn new(bars: &'a [Bar]) -> Self {
        Self {
            bars,
            symbols: SymbolTable::from_bars(bars),
            results: Vec::new(),
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn execute(&mut self, statement: &Statement) -> Result<(), ScriptError> {
        match &statement.kind {
            StatementKind::Assignment { target, expression } => {
                let series = expression
                    .evaluate(&self.symbols)
                    .map_err(|kind| ScriptError::new(statement.line, kind))?;
                debug!(line = statement.line, target = target.as_str(), %expression, "assigned");
                self.symbols.insert(target.clone(), series);
            }
            StatementKind::Plot(plot) => self.plot(statement.line, plot),
        }
        Ok(())
    }

    fn plot(&mut self, line: usize, plot: &PlotStatement) {
        let Some(series) = self.symbols.get(&plot.series) else {
            debug!(
                line,
                series = plot.series.as_str(),
                defined = ?self.symbols.names(),
                "plot target not defined, skipping"
            );
            return;
        };
        let result = PlotResult::assemble(&plot.title, &plot.color, self.bars, series);
        debug!(line, name = result.name.as_str(), points = result.data.len(), "plotted");
        self.results.push(result);
    }

    pub fn finish(self) -> Vec<PlotResult> {
        self.results
    }
}

/// Parse and run `text` line by line. A line is parsed only after every
/// earlier line has executed, so the first failing line in order aborts the run.
pub fn run_text(text: &str, bars: &[Bar]) -> Result<Vec<PlotResult>, ScriptError> {
    let mut interpreter = Interpreter::new(bars);
    for line in parse_lines(text) {
        match line? {
            Line::Declaration(title) => {
                debug!(title = title.as_deref().unwrap_or(""), "declaration");
            }
            Line::Statement(statement) => interpreter.execute(&statement)?,
        }
    }
    Ok(interpreter.finish())
}

/// Parse and run `text` against `bars`, folding any failure into the result.
pub fn execute(text: &str, bars: &[Bar]) -> ExecutionResult {
    info!(bars = bars.len(), "running script");
    match run_text(text, bars) {
        Ok(results) => ExecutionResult::Success { results },
        Err(err) => {
            debug!(error = %err, "script run failed");
            ExecutionResult::Failure {
                message: err.to_string(),
            }
        }
    }
}

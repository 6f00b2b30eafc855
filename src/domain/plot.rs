//! Plot results and the run outcome handed to the chart renderer.

use serde::{Deserialize, Serialize};

use crate::domain::ohlcv::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub time: i64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotResult {
    pub name: String,
    pub color: String,
    pub data: Vec<PlotPoint>,
}

impl PlotResult {
    /// Pair `series` with bar timestamps index-for-index, dropping NaN and
    /// infinite entries.
    pub fn assemble(name: &str, color: &str, bars: &[Bar], series: &[f64]) -> Self {
        let data = bars
            .iter()
            .zip(series)
            .filter(|(_, value)| value.is_finite())
            .map(|(bar, &value)| PlotPoint {
                time: bar.time,
                value,
            })
            .collect();
        Self {
            name: name.to_string(),
            color: color.to_string(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExecutionResult {
    Success { results: Vec<PlotResult> },
    Failure { message: String },
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    /// Plot results of a successful run; empty for a failure.
    pub fn results(&self) -> &[PlotResult] {
        match self {
            ExecutionResult::Success { results } => results,
            ExecutionResult::Failure { .. } => &[],
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ExecutionResult::Success { .. } => None,
            ExecutionResult::Failure { message } => Some(message),
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

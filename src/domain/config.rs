//! Engine configuration read through [`ConfigPort`].
//!
//! ```ini
//! [data]
//! dir = ./bars
//! format = csv
//!
//! [output]
//! pretty = true
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::error::PlotscriptError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_DATA_DIR: &str = ".";

/// On-disk layout of bar files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataFormat {
    #[default]
    Csv,
    Json,
}

impl DataFormat {
    pub fn extension(self) -> &'static str {
        match self {
            DataFormat::Csv => "csv",
            DataFormat::Json => "json",
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for DataFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(DataFormat::Csv),
            "json" => Ok(DataFormat::Json),
            other => Err(format!("unknown format '{other}', expected csv or json")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    pub format: DataFormat,
    pub pretty: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            format: DataFormat::default(),
            pretty: false,
        }
    }
}

impl EngineConfig {
    /// Build from config values, falling back to defaults for missing keys.
    pub fn from_port(config: &dyn ConfigPort) -> Result<Self, PlotscriptError> {
        validate_config(config)?;
        let format = match config.get_string("data", "format") {
            Some(value) => value.parse().map_err(|reason| invalid("data", "format", reason))?,
            None => DataFormat::default(),
        };
        Ok(Self {
            data_dir: config
                .get_string("data", "dir")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            format,
            pretty: config.get_bool("output", "pretty", false),
        })
    }
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), PlotscriptError> {
    validate_data_dir(config)?;
    validate_format(config)?;
    Ok(())
}

fn validate_data_dir(config: &dyn ConfigPort) -> Result<(), PlotscriptError> {
    match config.get_string("data", "dir") {
        Some(dir) if dir.trim().is_empty() => Err(invalid(
            "data",
            "dir",
            "dir must not be empty".to_string(),
        )),
        _ => Ok(()),
    }
}

fn validate_format(config: &dyn ConfigPort) -> Result<(), PlotscriptError> {
    if let Some(value) = config.get_string("data", "format") {
        value
            .parse::<DataFormat>()
            .map_err(|reason| invalid("data", "format", reason))?;
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: String) -> PlotscriptError {
    PlotscriptError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

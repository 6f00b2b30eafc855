//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_adapter::JsonAdapter;
use crate::domain::config::{DataFormat, EngineConfig};
use crate::domain::error::{PlotscriptError, ScriptError, ScriptErrorKind};
use crate::domain::expr::Expression;
use crate::domain::interpreter;
use crate::domain::plot::ExecutionResult;
use crate::domain::script::{StatementKind, parse_script};
use crate::ports::data_port::BarSource;

/// Exit status for a script that ran but failed.
const SCRIPT_FAILURE: u8 = 4;

#[derive(Parser, Debug)]
#[command(name = "plotscript", about = "Run indicator scripts over OHLCV bars")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a script against a symbol's bars and print the JSON result
    Run {
        #[arg(short, long)]
        script: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        format: Option<DataFormat>,
        #[arg(long)]
        pretty: bool,
    },
    /// Parse a script without running it
    Check {
        #[arg(short, long)]
        script: PathBuf,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        format: Option<DataFormat>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            script,
            symbol,
            config,
            data_dir,
            format,
            pretty,
        } => run_script(&script, &symbol, config.as_ref(), data_dir, format, pretty),
        Command::Check { script } => run_check(&script),
        Command::ListSymbols {
            config,
            data_dir,
            format,
        } => run_list_symbols(config.as_ref(), data_dir, format),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Engine settings from the optional config file, with CLI flags applied on top.
pub fn resolve_config(
    config: Option<&FileConfigAdapter>,
    data_dir: Option<PathBuf>,
    format: Option<DataFormat>,
    pretty: bool,
) -> Result<EngineConfig, PlotscriptError> {
    let mut engine = match config {
        Some(adapter) => EngineConfig::from_port(adapter)?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = data_dir {
        engine.data_dir = dir;
    }
    if let Some(format) = format {
        engine.format = format;
    }
    engine.pretty |= pretty;
    Ok(engine)
}

pub fn bar_source(config: &EngineConfig) -> Box<dyn BarSource> {
    match config.format {
        DataFormat::Csv => Box::new(CsvAdapter::new(config.data_dir.clone())),
        DataFormat::Json => Box::new(JsonAdapter::new(config.data_dir.clone())),
    }
}

/// Fetch bars for `symbol` and execute `script` over them.
///
/// Data problems are errors; a script that fails to run is still an
/// `ExecutionResult`.
pub fn run_script_pipeline(
    source: &dyn BarSource,
    script: &str,
    symbol: &str,
) -> Result<ExecutionResult, PlotscriptError> {
    let bars = source.fetch_bars(symbol)?;
    if bars.is_empty() {
        return Err(PlotscriptError::NoData {
            symbol: symbol.to_string(),
        });
    }
    tracing::info!(symbol, bars = bars.len(), "loaded bars");
    Ok(interpreter::execute(script, &bars))
}

fn engine_config(
    config_path: Option<&PathBuf>,
    data_dir: Option<PathBuf>,
    format: Option<DataFormat>,
    pretty: bool,
) -> Result<EngineConfig, ExitCode> {
    let adapter = match config_path {
        Some(path) => Some(load_config(path)?),
        None => None,
    };
    resolve_config(adapter.as_ref(), data_dir, format, pretty).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn read_script(path: &Path) -> Result<String, ExitCode> {
    fs::read_to_string(path).map_err(|e| {
        let err = PlotscriptError::from(e);
        eprintln!("error: failed to read {}: {err}", path.display());
        ExitCode::from(&err)
    })
}

fn run_script(
    script_path: &Path,
    symbol: &str,
    config_path: Option<&PathBuf>,
    data_dir: Option<PathBuf>,
    format: Option<DataFormat>,
    pretty: bool,
) -> ExitCode {
    let engine = match engine_config(config_path, data_dir, format, pretty) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let script = match read_script(script_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let source = bar_source(&engine);
    let result = match run_script_pipeline(source.as_ref(), &script, symbol) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match result.to_json(engine.pretty) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            let err = PlotscriptError::from(e);
            eprintln!("error: {err}");
            return (&err).into();
        }
    }

    if let Some(message) = result.message() {
        eprintln!("error: {message}");
        return ExitCode::from(SCRIPT_FAILURE);
    }
    ExitCode::SUCCESS
}

fn run_check(script_path: &Path) -> ExitCode {
    eprintln!("Checking script: {}", script_path.display());
    let text = match read_script(script_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let script = match parse_script(&text) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", check_report(&e));
            return (&PlotscriptError::from(e)).into();
        }
    };

    if let Some(title) = script.declared_title() {
        println!("Title: {title}");
    }
    for statement in &script.statements {
        println!("{:>4}: {}", statement.line, statement.kind);
        if let StatementKind::Assignment {
            expression: Expression::Invalid { text, error },
            ..
        } = &statement.kind
        {
            eprintln!(
                "warning: line {}: series is undefined\n{}",
                statement.line,
                error.display_with_context(text)
            );
        }
    }
    eprintln!("{} statements OK", script.statements.len());
    ExitCode::SUCCESS
}

/// Render a parse failure for `check`, pointing a caret at malformed calls.
pub fn check_report(err: &ScriptError) -> String {
    match &err.kind {
        ScriptErrorKind::MalformedCall { call, error } => {
            format!("line {}:\n{}", err.line, error.display_with_context(call))
        }
        _ => err.to_string(),
    }
}

fn run_list_symbols(
    config_path: Option<&PathBuf>,
    data_dir: Option<PathBuf>,
    format: Option<DataFormat>,
) -> ExitCode {
    let engine = match engine_config(config_path, data_dir, format, false) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let symbols = match bar_source(&engine).list_symbols() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if symbols.is_empty() {
        eprintln!(
            "No {} files found in {}",
            engine.format,
            engine.data_dir.display()
        );
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

//! Built-in `ta.*` indicator transforms.
//!
//! Every transform consumes series aligned to the bars and returns a series
//! of the same length, with `f64::NAN` wherever lookback is insufficient.
//! - `Indicator`: a decoded call, one variant per built-in with typed parameters
//! - `IndicatorKind`: the reserved names under the `ta.` namespace

pub mod atr;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod wma;

pub use atr::atr;
pub use ema::ema;
pub use macd::macd_line;
pub use rsi::rsi;
pub use sma::sma;
pub use stochastic::stochastic;
pub use wma::wma;

use std::fmt;

use crate::domain::args::{enclosed, is_identifier, split_arguments};
use crate::domain::error::{ParseError, ScriptErrorKind};
use crate::domain::symbols::{Series, SymbolTable};

pub const NAMESPACE: &str = "ta.";

pub const DEFAULT_BB_LENGTH: usize = 20;
pub const DEFAULT_BB_MULT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Rsi,
    Sma,
    Ema,
    Wma,
    Macd,
    Atr,
    Stoch,
    Bb,
}

impl IndicatorKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rsi" => Some(Self::Rsi),
            "sma" => Some(Self::Sma),
            "ema" => Some(Self::Ema),
            "wma" => Some(Self::Wma),
            "macd" => Some(Self::Macd),
            "atr" => Some(Self::Atr),
            "stoch" => Some(Self::Stoch),
            "bb" => Some(Self::Bb),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Rsi => "rsi",
            Self::Sma => "sma",
            Self::Ema => "ema",
            Self::Wma => "wma",
            Self::Macd => "macd",
            Self::Atr => "atr",
            Self::Stoch => "stoch",
            Self::Bb => "bb",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Indicator {
    Sma {
        source: String,
        length: usize,
    },
    Ema {
        source: String,
        length: usize,
    },
    Wma {
        source: String,
        length: usize,
    },
    Rsi {
        source: String,
        length: usize,
    },
    Macd {
        source: String,
        fast: usize,
        slow: usize,
        signal: usize,
    },
    /// Reads the run's `high`, `low` and `close` symbols.
    Atr {
        length: usize,
    },
    /// Reads the run's `high`, `low` and `close` symbols.
    Stoch {
        k_length: usize,
        d_length: usize,
    },
    /// Bollinger basis (middle band).
    Bb {
        source: String,
        length: usize,
        mult: f64,
    },
}

impl Indicator {
    /// Recognise `ta.<name>(...)` at the start of `text`.
    ///
    /// Returns `None` when the text is not a call to a reserved name, so the
    /// caller can fall back to arithmetic evaluation.
    pub fn parse_call(text: &str) -> Option<Result<Self, ScriptErrorKind>> {
        let rest = text.strip_prefix(NAMESPACE)?;
        let name_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        let kind = IndicatorKind::from_name(&rest[..name_len])?;
        Some(Self::parse_arguments(kind, text, NAMESPACE.len() + name_len))
    }

    fn parse_arguments(
        kind: IndicatorKind,
        text: &str,
        name_end: usize,
    ) -> Result<Self, ScriptErrorKind> {
        let after_name = &text[name_end..];
        let open = name_end + (after_name.len() - after_name.trim_start().len());
        let (inner, rest) = enclosed(text, open).map_err(|e| malformed(text, e))?;

        let trailing = rest.trim();
        if !trailing.is_empty() {
            let position = text.len() - rest.trim_start().len();
            return Err(malformed(
                text,
                ParseError::new(format!("unexpected input after call: '{trailing}'"), position),
            ));
        }

        Self::decode(kind, &split_arguments(inner))
    }

    /// Decode a split argument list into the typed variant for `kind`.
    pub fn decode(kind: IndicatorKind, args: &[String]) -> Result<Self, ScriptErrorKind> {
        let mut a = Arguments::new(kind, args);
        let indicator = match kind {
            IndicatorKind::Sma => Self::Sma {
                source: a.source("source")?,
                length: a.length("length", None)?,
            },
            IndicatorKind::Ema => Self::Ema {
                source: a.source("source")?,
                length: a.length("length", None)?,
            },
            IndicatorKind::Wma => Self::Wma {
                source: a.source("source")?,
                length: a.length("length", None)?,
            },
            IndicatorKind::Rsi => Self::Rsi {
                source: a.source("source")?,
                length: a.length("length", None)?,
            },
            IndicatorKind::Macd => Self::Macd {
                source: a.source("source")?,
                fast: a.length("fast", Some(macd::DEFAULT_FAST))?,
                slow: a.length("slow", Some(macd::DEFAULT_SLOW))?,
                signal: a.length("signal", Some(macd::DEFAULT_SIGNAL))?,
            },
            IndicatorKind::Atr => Self::Atr {
                length: a.length("length", Some(atr::DEFAULT_LENGTH))?,
            },
            IndicatorKind::Stoch => Self::Stoch {
                k_length: a.length("k", Some(stochastic::DEFAULT_K))?,
                d_length: a.length("d", Some(stochastic::DEFAULT_D))?,
            },
            IndicatorKind::Bb => Self::Bb {
                source: a.source("source")?,
                length: a.length("length", Some(DEFAULT_BB_LENGTH))?,
                mult: a.number("mult", DEFAULT_BB_MULT)?,
            },
        };
        a.finish()?;
        Ok(indicator)
    }

    /// Evaluate against the symbols bound so far in the run.
    pub fn compute(&self, symbols: &SymbolTable) -> Result<Series, ScriptErrorKind> {
        let series = match self {
            Self::Sma { source, length } => sma(lookup(symbols, source, self)?, *length),
            Self::Ema { source, length } => ema(lookup(symbols, source, self)?, *length),
            Self::Wma { source, length } => wma(lookup(symbols, source, self)?, *length),
            Self::Rsi { source, length } => rsi(lookup(symbols, source, self)?, *length),
            Self::Macd {
                source, fast, slow, ..
            } => macd_line(lookup(symbols, source, self)?, *fast, *slow),
            Self::Atr { length } => atr(
                lookup(symbols, "high", self)?,
                lookup(symbols, "low", self)?,
                lookup(symbols, "close", self)?,
                *length,
            ),
            Self::Stoch { k_length, d_length } => stochastic(
                lookup(symbols, "high", self)?,
                lookup(symbols, "low", self)?,
                lookup(symbols, "close", self)?,
                *k_length,
                *d_length,
            ),
            Self::Bb { source, length, .. } => sma(lookup(symbols, source, self)?, *length),
        };
        Ok(series)
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sma { source, length } => write!(f, "SMA({}, {})", source, length),
            Self::Ema { source, length } => write!(f, "EMA({}, {})", source, length),
            Self::Wma { source, length } => write!(f, "WMA({}, {})", source, length),
            Self::Rsi { source, length } => write!(f, "RSI({}, {})", source, length),
            Self::Macd {
                source,
                fast,
                slow,
                signal,
            } => write!(f, "MACD({}, {}, {}, {})", source, fast, slow, signal),
            Self::Atr { length } => write!(f, "ATR({})", length),
            Self::Stoch { k_length, d_length } => write!(f, "STOCH({}, {})", k_length, d_length),
            Self::Bb {
                source,
                length,
                mult,
            } => write!(f, "BB({}, {}, {})", source, length, mult),
        }
    }
}

fn lookup<'s>(
    symbols: &'s SymbolTable,
    name: &str,
    call: &Indicator,
) -> Result<&'s [f64], ScriptErrorKind> {
    symbols
        .get(name)
        .ok_or_else(|| ScriptErrorKind::UndefinedVariable {
            name: name.to_string(),
            call: call.to_string(),
        })
}

fn malformed(text: &str, error: ParseError) -> ScriptErrorKind {
    ScriptErrorKind::MalformedCall {
        call: text.to_string(),
        error,
    }
}

/// Positional cursor over a call's arguments.
struct Arguments<'a> {
    kind: IndicatorKind,
    args: &'a [String],
    next: usize,
}

impl<'a> Arguments<'a> {
    fn new(kind: IndicatorKind, args: &'a [String]) -> Self {
        Self {
            kind,
            args,
            next: 0,
        }
    }

    fn invalid(&self, reason: String) -> ScriptErrorKind {
        ScriptErrorKind::InvalidArgument {
            indicator: format!("{}{}", NAMESPACE, self.kind.name()),
            reason,
        }
    }

    fn take(&mut self) -> Option<&'a str> {
        let arg = self.args.get(self.next)?;
        self.next += 1;
        Some(arg.as_str())
    }

    fn source(&mut self, param: &str) -> Result<String, ScriptErrorKind> {
        match self.take() {
            Some(arg) if is_identifier(arg) => Ok(arg.to_string()),
            Some(arg) => Err(self.invalid(format!(
                "expected series name for `{param}`, found '{arg}'"
            ))),
            None => Err(self.invalid(format!("missing `{param}`"))),
        }
    }

    fn length(&mut self, param: &str, default: Option<usize>) -> Result<usize, ScriptErrorKind> {
        let Some(arg) = self.take() else {
            return default.ok_or_else(|| self.invalid(format!("missing `{param}`")));
        };
        match arg.parse::<usize>() {
            Ok(0) => Err(self.invalid(format!("`{param}` must be positive"))),
            Ok(n) => Ok(n),
            Err(_) => Err(self.invalid(format!(
                "expected positive integer for `{param}`, found '{arg}'"
            ))),
        }
    }

    fn number(&mut self, param: &str, default: f64) -> Result<f64, ScriptErrorKind> {
        let Some(arg) = self.take() else {
            return Ok(default);
        };
        match arg.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(self.invalid(format!("expected number for `{param}`, found '{arg}'"))),
        }
    }

    fn finish(self) -> Result<(), ScriptErrorKind> {
        match self.args.get(self.next) {
            Some(extra) => Err(self.invalid(format!("unexpected argument '{extra}'"))),
            None => Ok(()),
        }
    }
}

/// `max` that yields NaN when either side is NaN.
pub(crate) fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

/// `min` that yields NaN when either side is NaN.
pub(crate) fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::Bar;

    fn parse(text: &str) -> Result<Indicator, ScriptErrorKind> {
        Indicator::parse_call(text).expect("recognised built-in")
    }

    fn symbols(closes: &[f64]) -> SymbolTable {
        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                time: i as i64 * 60,
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000.0,
            })
            .collect();
        SymbolTable::from_bars(&bars)
    }

    #[test]
    fn kind_round_trips_names() {
        for name in ["rsi", "sma", "ema", "wma", "macd", "atr", "stoch", "bb"] {
            let kind = IndicatorKind::from_name(name).unwrap();
            assert_eq!(kind.name(), name);
        }
        assert_eq!(IndicatorKind::from_name("vwap"), None);
    }

    #[test]
    fn parse_sma() {
        assert_eq!(
            parse("ta.sma(close, 3)").unwrap(),
            Indicator::Sma {
                source: "close".into(),
                length: 3
            }
        );
    }

    #[test]
    fn parse_allows_space_before_paren() {
        assert_eq!(
            parse("ta.rsi (close, 14)").unwrap(),
            Indicator::Rsi {
                source: "close".into(),
                length: 14
            }
        );
    }

    #[test]
    fn parse_macd_defaults() {
        assert_eq!(
            parse("ta.macd(close)").unwrap(),
            Indicator::Macd {
                source: "close".into(),
                fast: 12,
                slow: 26,
                signal: 9
            }
        );
        assert_eq!(
            parse("ta.macd(close, 5, 10)").unwrap(),
            Indicator::Macd {
                source: "close".into(),
                fast: 5,
                slow: 10,
                signal: 9
            }
        );
    }

    #[test]
    fn parse_atr_and_stoch_defaults() {
        assert_eq!(parse("ta.atr()").unwrap(), Indicator::Atr { length: 14 });
        assert_eq!(parse("ta.atr(7)").unwrap(), Indicator::Atr { length: 7 });
        assert_eq!(
            parse("ta.stoch(10)").unwrap(),
            Indicator::Stoch {
                k_length: 10,
                d_length: 3
            }
        );
    }

    #[test]
    fn parse_bb_with_float_multiplier() {
        assert_eq!(
            parse("ta.bb(close, 20, 2.5)").unwrap(),
            Indicator::Bb {
                source: "close".into(),
                length: 20,
                mult: 2.5
            }
        );
    }

    #[test]
    fn unreserved_names_fall_through() {
        assert!(Indicator::parse_call("ta.vwap(close)").is_none());
        assert!(Indicator::parse_call("ta.rsix(close, 14)").is_none());
        assert!(Indicator::parse_call("close * 2").is_none());
        assert!(Indicator::parse_call("sma(close, 3)").is_none());
    }

    #[test]
    fn missing_close_paren_is_malformed() {
        let err = parse("ta.sma(close, 3").unwrap_err();
        match err {
            ScriptErrorKind::MalformedCall { call, error } => {
                assert_eq!(call, "ta.sma(close, 3");
                assert!(error.message.contains("expected ')'"));
            }
            other => panic!("expected MalformedCall, got {other:?}"),
        }
    }

    #[test]
    fn missing_open_paren_is_malformed() {
        let err = parse("ta.sma close, 3").unwrap_err();
        assert!(matches!(err, ScriptErrorKind::MalformedCall { .. }));
    }

    #[test]
    fn trailing_input_is_malformed() {
        let err = parse("ta.sma(close, 3) * 2").unwrap_err();
        match err {
            ScriptErrorKind::MalformedCall { error, .. } => {
                assert!(error.message.contains("unexpected input"));
                assert_eq!(error.position, 17);
            }
            other => panic!("expected MalformedCall, got {other:?}"),
        }
    }

    #[test]
    fn invalid_lengths_rejected() {
        for text in [
            "ta.sma(close, 0)",
            "ta.sma(close, -3)",
            "ta.sma(close, 3.5)",
            "ta.sma(close, abc)",
            "ta.sma(close)",
        ] {
            let err = parse(text).unwrap_err();
            assert!(
                matches!(err, ScriptErrorKind::InvalidArgument { ref indicator, .. } if indicator == "ta.sma"),
                "{text}: {err:?}"
            );
        }
    }

    #[test]
    fn source_must_be_a_name() {
        let err = parse("ta.rsi(14, close)").unwrap_err();
        assert!(err.to_string().contains("expected series name"));
    }

    #[test]
    fn extra_arguments_rejected() {
        let err = parse("ta.ema(close, 3, 4)").unwrap_err();
        assert!(err.to_string().contains("unexpected argument '4'"));
    }

    #[test]
    fn display_names_parameters() {
        assert_eq!(parse("ta.sma(close, 3)").unwrap().to_string(), "SMA(close, 3)");
        assert_eq!(
            parse("ta.macd(close)").unwrap().to_string(),
            "MACD(close, 12, 26, 9)"
        );
        assert_eq!(parse("ta.atr(5)").unwrap().to_string(), "ATR(5)");
        assert_eq!(parse("ta.stoch()").unwrap().to_string(), "STOCH(14, 3)");
        assert_eq!(parse("ta.bb(close)").unwrap().to_string(), "BB(close, 20, 2)");
    }

    #[test]
    fn compute_sma_on_close() {
        let table = symbols(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let values = parse("ta.sma(close, 3)").unwrap().compute(&table).unwrap();
        assert!(values[0].is_nan());
        assert!(values[1].is_nan());
        assert_eq!(&values[2..], &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn compute_undefined_source() {
        let table = symbols(&[1.0, 2.0]);
        let err = parse("ta.ema(missing, 3)").unwrap().compute(&table).unwrap_err();
        assert_eq!(
            err,
            ScriptErrorKind::UndefinedVariable {
                name: "missing".into(),
                call: "EMA(missing, 3)".into()
            }
        );
    }

    #[test]
    fn compute_bb_is_sma_basis() {
        let table = symbols(&[2.0, 4.0, 6.0, 8.0]);
        let bb = parse("ta.bb(close, 2)").unwrap().compute(&table).unwrap();
        let basis = sma(table.get("close").unwrap(), 2);
        assert!(bb[0].is_nan());
        assert_eq!(&bb[1..], &basis[1..]);
    }

    #[test]
    fn compute_atr_reads_price_symbols() {
        let table = symbols(&[10.0, 10.0, 10.0]);
        let values = parse("ta.atr(3)").unwrap().compute(&table).unwrap();
        // high - low is 2 on every bar and closes never gap.
        assert_eq!(values, vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn every_kind_preserves_length() {
        let table = symbols(&[5.0, 6.0, 4.0, 7.0, 8.0, 6.0, 9.0, 10.0]);
        for text in [
            "ta.sma(close, 3)",
            "ta.ema(close, 3)",
            "ta.wma(close, 3)",
            "ta.rsi(close, 3)",
            "ta.macd(close, 2, 4, 3)",
            "ta.atr(3)",
            "ta.stoch(3, 2)",
            "ta.bb(close, 3, 2)",
        ] {
            let indicator = parse(text).unwrap();
            let values = indicator.compute(&table).unwrap();
            assert_eq!(values.len(), 8, "{}", indicator);
        }
    }

    #[test]
    fn nan_aware_extremes() {
        assert!(nan_max(1.0, f64::NAN).is_nan());
        assert!(nan_min(f64::NAN, 1.0).is_nan());
        assert_eq!(nan_max(1.0, 2.0), 2.0);
        assert_eq!(nan_min(1.0, 2.0), 1.0);
    }
}

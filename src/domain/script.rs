//! Script text to statements.
//!
//! Each line is trimmed and classified on its own:
//! - blank lines, `//` comments and the `indicator(...)` declaration are skipped
//! - `plot(...)` lines become [`StatementKind::Plot`]
//! - `name = expression` lines become [`StatementKind::Assignment`]
//!
//! Any other line is ignored. Trailing `//` comments are stripped first.

use std::fmt;

use tracing::debug;

use crate::domain::args::{enclosed, is_identifier, named_argument, split_arguments};
use crate::domain::color::resolve_color;
use crate::domain::error::{ScriptError, ScriptErrorKind};
use crate::domain::expr::Expression;

pub const PLOT_KEYWORD: &str = "plot";
pub const DECLARATION_KEYWORD: &str = "indicator";
pub const DEFAULT_TITLE: &str = "Indicator";

#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    /// Title from the `indicator("...")` declaration, if any.
    pub title: Option<String>,
    pub statements: Vec<Statement>,
}

impl Script {
    pub fn declared_title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// 1-based line number.
    pub line: usize,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Assignment {
        target: String,
        expression: Expression,
    },
    Plot(PlotStatement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotStatement {
    /// Variable to plot, verbatim from the first argument.
    pub series: String,
    pub title: String,
    pub color: String,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Assignment { target, expression } => {
                write!(f, "{} = {}", target, expression)
            }
            StatementKind::Plot(plot) => {
                write!(f, "plot {} as \"{}\" in {}", plot.series, plot.title, plot.color)
            }
        }
    }
}

/// One recognised script line.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// `indicator(...)` and its title, if one was given.
    Declaration(Option<String>),
    Statement(Statement),
}

/// Classify the lines of `text` in order. Each line is parsed only when the
/// iterator reaches it, so a caller can stop at the first failure.
pub fn parse_lines(text: &str) -> impl Iterator<Item = Result<Line, ScriptError>> + '_ {
    text.lines()
        .enumerate()
        .filter_map(|(idx, raw)| parse_line(idx + 1, raw).transpose())
}

/// Parse the whole script up front, failing on the first bad line.
pub fn parse_script(text: &str) -> Result<Script, ScriptError> {
    let mut title = None;
    let mut statements = Vec::new();
    for parsed in parse_lines(text) {
        match parsed? {
            Line::Declaration(declared) => {
                if title.is_none() {
                    title = declared;
                }
            }
            Line::Statement(statement) => statements.push(statement),
        }
    }
    Ok(Script { title, statements })
}

fn parse_line(line: usize, raw: &str) -> Result<Option<Line>, ScriptError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with("//") {
        return Ok(None);
    }
    let code = strip_comment(trimmed).trim_end();

    if let Some(rest) = call_arguments(code, DECLARATION_KEYWORD) {
        return Ok(Some(Line::Declaration(declaration_title(rest))));
    }

    if let Some(rest) = call_arguments(code, PLOT_KEYWORD) {
        let plot = parse_plot(code, rest).map_err(|kind| ScriptError::new(line, kind))?;
        return Ok(Some(Line::Statement(Statement {
            line,
            kind: StatementKind::Plot(plot),
        })));
    }

    match classify_assignment(code) {
        Assignment::Statement { target, expression } => {
            let expression =
                Expression::parse(expression).map_err(|kind| ScriptError::new(line, kind))?;
            Ok(Some(Line::Statement(Statement {
                line,
                kind: StatementKind::Assignment {
                    target: target.to_string(),
                    expression,
                },
            })))
        }
        Assignment::InvalidTarget(target) => Err(ScriptError::new(
            line,
            ScriptErrorKind::InvalidTarget {
                target: target.to_string(),
            },
        )),
        Assignment::None => {
            debug!(line, text = code, "ignoring unrecognised line");
            Ok(None)
        }
    }
}

/// If `code` starts with `keyword` followed by `(`, return the text from the
/// parenthesis onward.
fn call_arguments<'a>(code: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = code.strip_prefix(keyword)?;
    let rest = rest.trim_start();
    rest.starts_with('(').then_some(rest)
}

fn declaration_title(args: &str) -> Option<String> {
    let (inner, _) = enclosed(args, 0).ok()?;
    let first = split_arguments(inner).into_iter().next()?;
    let value = match named_argument(&first) {
        Some(("title", value)) => value.to_string(),
        Some(_) => return None,
        None => first,
    };
    let title = unquote(&value);
    (!title.is_empty()).then_some(title)
}

fn parse_plot(code: &str, args: &str) -> Result<PlotStatement, ScriptErrorKind> {
    let (inner, rest) = enclosed(args, 0).map_err(|e| ScriptErrorKind::MalformedPlot {
        reason: e.message,
    })?;
    if !rest.trim().is_empty() {
        return Err(ScriptErrorKind::MalformedPlot {
            reason: format!("unexpected input after plot(...): '{}'", rest.trim()),
        });
    }

    let mut positional = Vec::new();
    let mut title = None;
    let mut color = None;
    for arg in split_arguments(inner) {
        match named_argument(&arg) {
            Some(("title", value)) => title = Some(value.to_string()),
            Some(("color", value)) => color = Some(value.to_string()),
            Some((key, _)) => debug!(argument = key, "ignoring plot argument"),
            None => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let series = match positional.next() {
        Some(series) if !series.is_empty() => series,
        _ => {
            return Err(ScriptErrorKind::MalformedPlot {
                reason: format!("missing series in `{}`", code),
            });
        }
    };
    let title = title.or_else(|| positional.next());
    let color = color.or_else(|| positional.next());

    let title = title
        .map(|t| unquote(&t))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    Ok(PlotStatement {
        series,
        title,
        color: resolve_color(color.as_deref()),
    })
}

enum Assignment<'a> {
    Statement { target: &'a str, expression: &'a str },
    InvalidTarget(&'a str),
    None,
}

fn classify_assignment(code: &str) -> Assignment<'_> {
    let Some((lhs, rhs)) = code.split_once('=') else {
        return Assignment::None;
    };
    // `==`, `!=`, `<=`, `>=`
    if rhs.starts_with('=') || lhs.ends_with(['!', '<', '>']) {
        return Assignment::None;
    }
    let target = lhs.trim();
    if is_identifier(target) {
        return Assignment::Statement {
            target,
            expression: rhs.trim(),
        };
    }
    // Calls with named arguments, e.g. `hline(50, color=color.gray)`.
    if target.contains('(') {
        return Assignment::None;
    }
    Assignment::InvalidTarget(target)
}

/// Drop a trailing `//` comment that sits outside quotes.
fn strip_comment(code: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    for (i, ch) in code.char_indices() {
        match ch {
            '"' | '\'' if prev != Some('\\') => match quote {
                Some(q) if q == ch => quote = None,
                None => quote = Some(ch),
                Some(_) => {}
            },
            '/' if quote.is_none() && prev == Some('/') => return &code[..i - 1],
            _ => {}
        }
        prev = Some(ch);
    }
    code
}

/// Remove every quote character.
fn unquote(text: &str) -> String {
    text.chars().filter(|c| *c != '"' && *c != '\'').collect()
}

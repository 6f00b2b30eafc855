//! Domain error types.

/// A parse error with position information, produced by the arithmetic
/// parser and the indicator-call decoder.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }

    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// A failure that aborts a whole script run. The display string becomes the
/// `message` of a failed execution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("line {line}: {kind}")]
pub struct ScriptError {
    /// 1-based script line the failure was raised on.
    pub line: usize,
    pub kind: ScriptErrorKind,
}

impl ScriptError {
    pub fn new(line: usize, kind: ScriptErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScriptErrorKind {
    #[error("malformed indicator call `{call}`: {error}")]
    MalformedCall {
        call: String,
        #[source]
        error: ParseError,
    },

    #[error("invalid argument to {indicator}: {reason}")]
    InvalidArgument { indicator: String, reason: String },

    #[error("undefined variable '{name}' in {call}")]
    UndefinedVariable { name: String, call: String },

    #[error("malformed plot statement: {reason}")]
    MalformedPlot { reason: String },

    #[error("invalid assignment target '{target}'")]
    InvalidTarget { target: String },
}

/// Top-level error type for plotscript.
#[derive(Debug, thiserror::Error)]
pub enum PlotscriptError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no bars for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PlotscriptError> for std::process::ExitCode {
    fn from(err: &PlotscriptError) -> Self {
        let code: u8 = match err {
            PlotscriptError::Io(_) | PlotscriptError::Json(_) => 1,
            PlotscriptError::ConfigParse { .. } | PlotscriptError::ConfigInvalid { .. } => 2,
            PlotscriptError::Data { .. } => 3,
            PlotscriptError::Script(_) => 4,
            PlotscriptError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

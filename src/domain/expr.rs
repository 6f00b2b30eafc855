//! Right-hand side expressions of assignments.
//!
//! An expression is either a built-in `ta.*` call or plain arithmetic over
//! variables. Arithmetic goes through a small tokenizer and recursive descent
//! parser into an [`Expr`] tree, which is then evaluated once per bar index:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := ('+' | '-') unary | atom
//! atom   := number | identifier | '(' expr ')'
//! ```

use std::fmt;

use tracing::warn;

use crate::domain::error::{ParseError, ScriptErrorKind};
use crate::domain::indicator::Indicator;
use crate::domain::symbols::{Series, SymbolTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(String),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// Failure evaluating an [`Expr`] at one bar index.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not finite")]
    NonFinite,
}

impl Expr {
    /// Parse arithmetic text into an expression tree.
    pub fn parse(input: &str) -> Result<Expr, ParseError> {
        let tokens = tokenize(input)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            end: input.len(),
        };
        let expr = parser.expr()?;
        if let Some(token) = parser.peek() {
            return Err(ParseError::new(
                format!("unexpected {} after expression", token.kind),
                token.position,
            ));
        }
        Ok(expr)
    }

    /// Evaluate at bar `index`. Not-a-number inputs propagate and are not
    /// errors in themselves.
    pub fn eval_at(&self, symbols: &SymbolTable, index: usize) -> Result<f64, EvalError> {
        let value = match self {
            Expr::Number(n) => *n,
            Expr::Variable(name) => symbols
                .get(name)
                .and_then(|series| series.get(index).copied())
                .ok_or_else(|| EvalError::UnknownVariable(name.clone()))?,
            Expr::Neg(inner) => -inner.eval_at(symbols, index)?,
            Expr::Binary { op, left, right } => {
                let l = left.eval_at(symbols, index)?;
                let r = right.eval_at(symbols, index)?;
                match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div if r == 0.0 => return Err(EvalError::DivisionByZero),
                    BinaryOp::Div => l / r,
                }
            }
        };
        if value.is_infinite() {
            return Err(EvalError::NonFinite);
        }
        Ok(value)
    }

    /// Evaluate every index independently. An index that fails evaluation
    /// becomes not-a-number without affecting its neighbours.
    pub fn evaluate(&self, symbols: &SymbolTable) -> Series {
        (0..symbols.bar_count())
            .map(|i| self.eval_at(symbols, i).unwrap_or(f64::NAN))
            .collect()
    }

    /// Variable names referenced by the expression, in first-use order.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Number(_) => {}
            Expr::Variable(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Expr::Neg(inner) => inner.collect_variables(names),
            Expr::Binary { left, right, .. } => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Variable(name) => write!(f, "{}", name),
            Expr::Neg(inner) => write!(f, "-{}", inner),
            Expr::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
        }
    }
}

/// Decoded right-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Indicator(Indicator),
    Arithmetic(Expr),
    /// Arithmetic that failed to parse. Evaluates to an all-NaN series.
    Invalid { text: String, error: ParseError },
}

impl Expression {
    /// Classify and decode expression text. Only malformed built-in calls are
    /// errors; everything else decodes to arithmetic (possibly invalid).
    pub fn parse(text: &str) -> Result<Expression, ScriptErrorKind> {
        let text = text.trim();
        if let Some(call) = Indicator::parse_call(text) {
            return call.map(Expression::Indicator);
        }
        Ok(match Expr::parse(text) {
            Ok(expr) => Expression::Arithmetic(expr),
            Err(error) => Expression::Invalid {
                text: text.to_string(),
                error,
            },
        })
    }

    pub fn evaluate(&self, symbols: &SymbolTable) -> Result<Series, ScriptErrorKind> {
        match self {
            Expression::Indicator(indicator) => indicator.compute(symbols),
            Expression::Arithmetic(expr) => {
                for name in expr.variables() {
                    if !symbols.contains(name) {
                        warn!(variable = name, expression = %expr, "unknown variable, series is undefined");
                    }
                }
                Ok(expr.evaluate(symbols))
            }
            Expression::Invalid { text, error } => {
                warn!(
                    expression = text.as_str(),
                    error = %error,
                    "expression does not parse, series is undefined"
                );
                Ok(vec![f64::NAN; symbols.bar_count()])
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Indicator(indicator) => write!(f, "{}", indicator),
            Expression::Arithmetic(expr) => write!(f, "{}", expr),
            Expression::Invalid { text, .. } => write!(f, "<invalid: {}>", text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Ident(String),
    Op(BinaryOp),
    LParen,
    RParen,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::Ident(name) => write!(f, "'{}'", name),
            TokenKind::Op(op) => write!(f, "'{}'", op.symbol()),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    position: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let ch = bytes[pos];
        let kind = match ch {
            b' ' | b'\t' | b'\r' | b'\n' => {
                pos += 1;
                continue;
            }
            b'+' => TokenKind::Op(BinaryOp::Add),
            b'-' => TokenKind::Op(BinaryOp::Sub),
            b'*' => TokenKind::Op(BinaryOp::Mul),
            b'/' => TokenKind::Op(BinaryOp::Div),
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'0'..=b'9' | b'.' => {
                let start = pos;
                let end = scan_number(bytes, pos);
                let text = &input[start..end];
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ParseError::new(format!("invalid number: {}", text), start))?;
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    position: start,
                });
                pos = end;
                continue;
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                let start = pos;
                while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_')
                {
                    pos += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(input[start..pos].to_string()),
                    position: start,
                });
                continue;
            }
            _ => {
                let found = input[pos..].chars().next().unwrap_or_default();
                return Err(ParseError::new(
                    format!("unexpected character '{}'", found),
                    pos,
                ));
            }
        };
        tokens.push(Token {
            kind,
            position: pos,
        });
        pos += 1;
    }

    Ok(tokens)
}

/// End offset of `digits [. digits] [e [+-] digits]` starting at `pos`.
fn scan_number(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
        pos += 1;
    }
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut exp = pos + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        if exp < bytes.len() && bytes[exp].is_ascii_digit() {
            pos = exp;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }
    pos
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    end: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn peek_op(&self, ops: &[BinaryOp]) -> Option<BinaryOp> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Op(op),
                ..
            }) if ops.contains(op) => Some(*op),
            _ => None,
        }
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.term()?;
        while let Some(op) = self.peek_op(&[BinaryOp::Add, BinaryOp::Sub]) {
            self.pos += 1;
            let right = self.term()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.unary()?;
        while let Some(op) = self.peek_op(&[BinaryOp::Mul, BinaryOp::Div]) {
            self.pos += 1;
            let right = self.unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        match self.peek_op(&[BinaryOp::Add, BinaryOp::Sub]) {
            Some(BinaryOp::Sub) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(_) => {
                self.pos += 1;
                self.unary()
            }
            None => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.advance() else {
            return Err(ParseError::new(
                "expected number, variable or '(', found end of input",
                self.end,
            ));
        };
        match &token.kind {
            TokenKind::Number(n) => Ok(Expr::Number(*n)),
            TokenKind::Ident(name) => Ok(Expr::Variable(name.clone())),
            TokenKind::LParen => {
                let inner = self.expr()?;
                match self.advance() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(ParseError::new(
                        format!("expected ')', found {}", other.kind),
                        other.position,
                    )),
                    None => Err(ParseError::new("expected ')', found end of input", self.end)),
                }
            }
            other => Err(ParseError::new(
                format!("expected number, variable or '(', found {}", other),
                token.position,
            )),
        }
    }
}

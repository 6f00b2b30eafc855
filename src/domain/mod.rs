//! Core domain types and logic.
//!
//! [`interpreter::execute`] is the entry point: script text and bars in, an
//! [`plot::ExecutionResult`] out.

pub mod args;
pub mod color;
pub mod config;
pub mod error;
pub mod expr;
pub mod indicator;
pub mod interpreter;
pub mod ohlcv;
pub mod plot;
pub mod script;
pub mod symbols;

//! Evaluation error types for the expression engine.
//!
//! Evaluation never panics: every operation that would trap (overflow,
//! division by zero, a bad subscript, an operand of the wrong variant)
//! reports one of these instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while evaluating an expression against concrete values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum EvalError {
    #[error("unsupported operand for {op}: {got}")]
    TypeMismatch { op: String, got: String },

    #[error("division by zero in {op}")]
    DivideByZero { op: String },

    #[error("integer overflow in {op}")]
    IntegerOverflow { op: String },

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("key not found: {key:?}")]
    KeyNotFound { key: String },

    #[error("{type_name} has no attribute `{name}`")]
    AttributeNotFound { type_name: String, name: String },

    /// A sequence would grow past the size evaluation is willing to build.
    #[error("result of {op} would exceed {limit} bytes")]
    TooLarge { op: String, limit: usize },

    #[error("negative shift count: {count}")]
    NegativeShift { count: i64 },

    #[error("invalid literal for {target}: {text:?}")]
    InvalidLiteral { target: String, text: String },

    /// Fewer values were supplied than the expression has inputs.
    #[error("expression needs {needed} input value(s), got {supplied}")]
    MissingInput { needed: usize, supplied: usize },
}

impl EvalError {
    pub(crate) fn mismatch(op: impl Into<String>, got: impl Into<String>) -> Self {
        EvalError::TypeMismatch {
            op: op.into(),
            got: got.into(),
        }
    }
}

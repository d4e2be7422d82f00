//! Error types for binding calls and enforcing contracts.

use sanity_core::EvalError;
use thiserror::Error;

use crate::contracts::ContractViolation;

/// A call's arguments do not fit the function's signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("`{function}` takes {max} positional argument(s) but {got} were given")]
    TooManyPositional {
        function: String,
        max: usize,
        got: usize,
    },

    #[error("`{function}` got an unexpected keyword argument `{name}`")]
    UnexpectedKeyword { function: String, name: String },

    #[error("`{function}` got multiple values for argument `{name}`")]
    DuplicateArgument { function: String, name: String },

    #[error("`{function}` is missing required argument `{name}`")]
    MissingArgument { function: String, name: String },
}

/// A contract could not be looked up or evaluated.
///
/// This is distinct from a contract that evaluated and came out falsy,
/// which is reported as a [`ContractViolation`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractError {
    #[error("contract on `{function}` refers to unknown parameter `{name}`")]
    UnknownParameter { function: String, name: String },

    #[error("contract `{expression}` on `{function}` could not be evaluated: {source}")]
    Evaluation {
        function: String,
        expression: String,
        #[source]
        source: EvalError,
    },
}

/// Everything that can go wrong calling a contract-checked function.
///
/// `E` is the wrapped body's own error type and is passed through untouched.
#[derive(Debug, Error)]
pub enum CallError<E> {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("{0}")]
    Precondition(ContractViolation),

    #[error("{0}")]
    Postcondition(ContractViolation),

    #[error(transparent)]
    Body(E),
}

impl<E> CallError<E> {
    /// The violation carried by a pre- or postcondition failure.
    pub fn violation(&self) -> Option<&ContractViolation> {
        match self {
            CallError::Precondition(v) | CallError::Postcondition(v) => Some(v),
            _ => None,
        }
    }

    /// The body's own error, if that is what failed.
    pub fn into_body(self) -> Option<E> {
        match self {
            CallError::Body(e) => Some(e),
            _ => None,
        }
    }
}

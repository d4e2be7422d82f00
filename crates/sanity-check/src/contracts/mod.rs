//! Contract declarations and the diagnostics produced when they fail.
//!
//! A [`Contracts`] table attaches one deferred expression to any number of
//! parameters, plus at most one to the return value. Preconditions are
//! checked after binding and before the body runs; the postcondition is
//! checked after the body returns successfully.

pub mod check;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use sanity_core::{Expr, Input, Value};

/// The kind of contract that was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractKind {
    /// Checked on a bound argument before the body runs.
    Precondition,
    /// Checked on the return value after the body returns.
    Postcondition,
}

/// A structured contract violation diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractViolation {
    pub kind: ContractKind,
    /// The checked function's name.
    pub function: String,
    /// The parameter the contract is attached to; `None` for the return value.
    pub parameter: Option<String>,
    /// The expression with `P` / `P.name` labels, e.g. `(P) > 0`.
    pub expression: String,
    /// The expression with the resolved values substituted, e.g. `(-3) > 0`.
    pub message: String,
    /// Resolved input values, in the expression's input order.
    pub inputs: Vec<Value>,
    /// For postconditions, the value the body returned.
    pub actual_return: Option<Value>,
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, &self.parameter) {
            (ContractKind::Precondition, Some(param)) => write!(
                f,
                "precondition on `{}` of `{}` failed: {}",
                param, self.function, self.message
            ),
            (ContractKind::Precondition, None) => write!(
                f,
                "precondition of `{}` failed: {}",
                self.function, self.message
            ),
            (ContractKind::Postcondition, _) => write!(
                f,
                "postcondition of `{}` failed: {}",
                self.function, self.message
            ),
        }
    }
}

/// Statically declared contracts for one function.
#[derive(Debug, Clone, Default)]
pub struct Contracts {
    params: IndexMap<String, Expr>,
    returns: Option<Expr>,
}

impl Contracts {
    pub fn new() -> Self {
        Contracts::default()
    }

    /// Attaches `expr` to parameter `name`, replacing any earlier one.
    pub fn require(mut self, name: impl Into<String>, expr: Expr) -> Self {
        self.params.insert(name.into(), expr);
        self
    }

    /// Attaches `expr` to the return value, replacing any earlier one.
    pub fn ensure(mut self, expr: Expr) -> Self {
        self.returns = Some(expr);
        self
    }

    /// Parameter contracts in declaration order.
    pub fn preconditions(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.params.iter().map(|(name, expr)| (name.as_str(), expr))
    }

    /// The contract attached to parameter `name`, if any.
    pub fn precondition(&self, name: &str) -> Option<&Expr> {
        self.params.get(name)
    }

    pub fn postcondition(&self) -> Option<&Expr> {
        self.returns.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty() && self.returns.is_none()
    }

    /// Every parameter name the table mentions, either as a contract key
    /// or as a named selector inside an expression. May repeat.
    pub fn referenced_params(&self) -> impl Iterator<Item = &str> {
        let keys = self.params.keys().map(String::as_str);
        let selectors = self
            .params
            .values()
            .chain(self.returns.iter())
            .flat_map(|expr| expr.inputs())
            .filter_map(|input| match input {
                Input::Param(name) => Some(name.as_str()),
                Input::Subject => None,
            });
        keys.chain(selectors)
    }
}

//! Evaluation trace recording for checked calls.
//!
//! When tracing is on, every contract evaluated during a call leaves a
//! [`TraceEntry`], whether it passed or not.

use serde::{Deserialize, Serialize};

use sanity_core::Value;

use crate::contracts::ContractKind;

/// One evaluated contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub kind: ContractKind,
    /// `None` for the return-value contract.
    pub parameter: Option<String>,
    /// Labelled form, e.g. `(P) < (P.b)`.
    pub expression: String,
    /// Value-substituted form, e.g. `(1) < (2)`.
    pub rendered: String,
    pub values: Vec<Value>,
    pub passed: bool,
}

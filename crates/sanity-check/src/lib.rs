//! Runtime contract enforcement for functions with explicit signatures.
//!
//! ```
//! use std::convert::Infallible;
//! use sanity_check::{Args, Bindings, CallError, CheckedFn, Contracts, Signature};
//! use sanity_core::{Value, P};
//!
//! let double = CheckedFn::new(
//!     Signature::new("double").param("a"),
//!     Contracts::new().require("a", P.gt(0)),
//!     |b: &Bindings| -> Result<Value, Infallible> {
//!         match &b["a"] {
//!             Value::Int(a) => Ok(Value::Int(a * 2)),
//!             other => Ok(other.clone()),
//!         }
//!     },
//! )
//! .unwrap();
//!
//! assert_eq!(double.call(&Args::positional([3])).unwrap(), Value::Int(6));
//! let err = double.call(&Args::positional([-3])).unwrap_err();
//! assert!(matches!(err, CallError::Precondition(_)));
//! ```

pub mod checked;
pub mod contracts;
pub mod error;
pub mod property;
pub mod signature;
pub mod trace;

pub use checked::{CheckConfig, CheckedFn};
pub use contracts::{ContractKind, ContractViolation, Contracts};
pub use error::{BindError, CallError, ContractError};
pub use property::{run_property_tests, PropertyTestConfig, PropertyTestFailure, PropertyTestResult};
pub use signature::{Args, Bindings, Param, Signature, ValueKind};
pub use trace::TraceEntry;

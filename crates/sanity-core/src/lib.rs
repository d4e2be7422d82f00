//! Deferred contract expressions.
//!
//! Build an expression once from the placeholder [`P`] (or a named
//! parameter via [`Expr::param`]) and evaluate it later against concrete
//! [`Value`]s:
//!
//! ```
//! use sanity_core::{Expr, Value, P};
//!
//! let positive = P.gt(0);
//! assert!(positive.check(&[Value::Int(3)]).unwrap());
//! assert_eq!(positive.render(&[Value::Int(-3)]), "(-3) > 0");
//!
//! let below_b = P.lt(Expr::param("b"));
//! assert!(below_b.check(&[Value::Int(1), Value::Int(2)]).unwrap());
//! ```

pub mod error;
pub mod eval;
pub mod expr;
pub mod operators;
pub mod ops;
pub mod value;

pub use error::EvalError;
pub use expr::{all, any, contains, float, int, len, Expr, Input, Operand, P};
pub use ops::{ArithOp, BinaryOp, BitOp, CmpOp, UnaryOp};
pub use value::Value;

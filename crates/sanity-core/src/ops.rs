//! Operator vocabulary for contract expressions.
//!
//! Operators are grouped the same way they are evaluated:
//! - [`CmpOp`]: the six comparisons, always producing `Bool`
//! - [`ArithOp`]: arithmetic including floor division, `divmod` and power
//! - [`BitOp`]: shifts and bitwise and/xor/or
//! - [`UnaryOp`]: sign, magnitude, inversion, conversions and length
//!
//! [`BinaryOp`] wraps the first three and adds the structural binary forms
//! (attribute access by computed name, subscript, membership), so a single
//! node kind in the expression tree covers every two-operand operation.

use serde::{Deserialize, Serialize};

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
        }
    }
}

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    /// Always produces a `Float` (or `Complex`).
    TrueDiv,
    /// Rounds toward negative infinity.
    FloorDiv,
    /// Result takes the sign of the divisor.
    Mod,
    /// `(floor_div, mod)` as a 2-tuple.
    DivMod,
    Pow,
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::TrueDiv => "/",
            ArithOp::FloorDiv => "floor_div",
            ArithOp::Mod => "%",
            ArithOp::DivMod => "divmod",
            ArithOp::Pow => "pow",
        }
    }
}

/// Shift and bitwise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitOp {
    Shl,
    Shr,
    And,
    Xor,
    Or,
}

impl BitOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BitOp::Shl => "<<",
            BitOp::Shr => ">>",
            BitOp::And => "&",
            BitOp::Xor => "^",
            BitOp::Or => "|",
        }
    }
}

/// Single-operand operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Pos,
    Abs,
    /// Bitwise NOT.
    Invert,
    ToComplex,
    ToInt,
    ToFloat,
    /// Round half to even; `Some(n)` keeps `n` decimal digits.
    Round(Option<i32>),
    Len,
}

/// Every two-operand operation an expression node can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Cmp(CmpOp),
    Arith(ArithOp),
    Bit(BitOp),
    /// `lhs.<rhs>` where rhs evaluates to a string.
    Attr,
    /// `lhs[rhs]`.
    Index,
    /// `rhs` is an element/key/substring of `lhs`.
    Contains,
}

/// How an operator is written in an expression's display template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    /// `(lhs) op (rhs)`
    Infix(&'static str),
    /// `name(lhs, rhs)`
    Call(&'static str),
    /// `(lhs).rhs`
    Attr,
    /// `(lhs)[rhs]`
    Index,
}

impl BinaryOp {
    pub fn notation(self) -> Notation {
        match self {
            BinaryOp::Cmp(op) => Notation::Infix(op.symbol()),
            BinaryOp::Arith(op @ (ArithOp::FloorDiv | ArithOp::DivMod | ArithOp::Pow)) => {
                Notation::Call(op.symbol())
            }
            BinaryOp::Arith(op) => Notation::Infix(op.symbol()),
            BinaryOp::Bit(op) => Notation::Infix(op.symbol()),
            BinaryOp::Attr => Notation::Attr,
            BinaryOp::Index => Notation::Index,
            BinaryOp::Contains => Notation::Call("contains"),
        }
    }

    /// Human-readable operator name.
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Cmp(op) => op.symbol(),
            BinaryOp::Arith(op) => op.symbol(),
            BinaryOp::Bit(op) => op.symbol(),
            BinaryOp::Attr => "attribute access",
            BinaryOp::Index => "subscript",
            BinaryOp::Contains => "contains",
        }
    }
}

impl From<CmpOp> for BinaryOp {
    fn from(op: CmpOp) -> Self {
        BinaryOp::Cmp(op)
    }
}

impl From<ArithOp> for BinaryOp {
    fn from(op: ArithOp) -> Self {
        BinaryOp::Arith(op)
    }
}

impl From<BitOp> for BinaryOp {
    fn from(op: BitOp) -> Self {
        BinaryOp::Bit(op)
    }
}

impl UnaryOp {
    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Abs => "abs",
            UnaryOp::Invert => "!",
            UnaryOp::ToComplex => "complex",
            UnaryOp::ToInt => "int",
            UnaryOp::ToFloat => "float",
            UnaryOp::Round(_) => "round",
            UnaryOp::Len => "len",
        }
    }
}

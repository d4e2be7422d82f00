//! `std::ops` overloads for building expressions with ordinary syntax.
//!
//! `P + 1`, `&e * P`, `-P` and `!P` all build new [`Expr`]s. Reflected forms
//! with a literal on the left (`2 * P`, `1.5 - P`) are provided for the
//! common literal types. Comparisons cannot be overloaded to return an
//! expression, so they are the named builders `lt`/`le`/`gt`/`ge`/`eq`/`ne`.
//!
//! `/` is true division; floor division, `divmod` and power are the
//! `floor_div`, `divmod` and `pow` builders.

use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Rem, Shl, Shr, Sub};

use crate::expr::{Expr, Operand};
use crate::ops::{ArithOp, BitOp, UnaryOp};
use crate::value::Value;

macro_rules! expr_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<R: Into<Operand>> $trait<R> for Expr {
            type Output = Expr;

            fn $method(self, rhs: R) -> Expr {
                Expr::binary($op, self, rhs)
            }
        }

        impl<R: Into<Operand>> $trait<R> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: R) -> Expr {
                Expr::binary($op, self.clone(), rhs)
            }
        }
    };
}

macro_rules! reflected_operator {
    ($lit:ty, $trait:ident, $method:ident, $op:expr) => {
        impl $trait<Expr> for $lit {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, self, rhs)
            }
        }

        impl $trait<&Expr> for $lit {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                Expr::binary($op, self, rhs.clone())
            }
        }
    };
}

macro_rules! reflected_operators {
    ($($lit:ty),+ $(,)?) => {
        $(
            reflected_operator!($lit, Add, add, ArithOp::Add);
            reflected_operator!($lit, Sub, sub, ArithOp::Sub);
            reflected_operator!($lit, Mul, mul, ArithOp::Mul);
            reflected_operator!($lit, Div, div, ArithOp::TrueDiv);
            reflected_operator!($lit, Rem, rem, ArithOp::Mod);
            reflected_operator!($lit, Shl, shl, BitOp::Shl);
            reflected_operator!($lit, Shr, shr, BitOp::Shr);
            reflected_operator!($lit, BitAnd, bitand, BitOp::And);
            reflected_operator!($lit, BitXor, bitxor, BitOp::Xor);
            reflected_operator!($lit, BitOr, bitor, BitOp::Or);
        )+
    };
}

expr_operator!(Add, add, ArithOp::Add);
expr_operator!(Sub, sub, ArithOp::Sub);
expr_operator!(Mul, mul, ArithOp::Mul);
expr_operator!(Div, div, ArithOp::TrueDiv);
expr_operator!(Rem, rem, ArithOp::Mod);
expr_operator!(Shl, shl, BitOp::Shl);
expr_operator!(Shr, shr, BitOp::Shr);
expr_operator!(BitAnd, bitand, BitOp::And);
expr_operator!(BitXor, bitxor, BitOp::Xor);
expr_operator!(BitOr, bitor, BitOp::Or);

// One integer type only, so an unsuffixed literal like `10 - P` resolves.
// Wider integers go through `Value`.
reflected_operators!(i32, f64, bool, Value);

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self.unary(UnaryOp::Neg)
    }
}

impl Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self.unary(UnaryOp::Neg)
    }
}

/// Bitwise NOT, matching `!` on Rust integers.
impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        self.unary(UnaryOp::Invert)
    }
}

impl Not for &Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        self.unary(UnaryOp::Invert)
    }
}

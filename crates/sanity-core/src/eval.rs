//! Per-operation evaluation over concrete [`Value`]s.
//!
//! [`eval_binary`] and [`eval_unary`] are the leaves of expression
//! evaluation: by the time they run, every operand has already been
//! reduced to a concrete value. Integer arithmetic is checked and every
//! trap condition is reported as an [`EvalError`].

use std::cmp::Ordering;

use crate::error::EvalError;
use crate::ops::{ArithOp, BinaryOp, BitOp, CmpOp, UnaryOp};
use crate::value::Value;

/// Evaluates a two-operand operation.
pub fn eval_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Cmp(cmp_op) => eval_compare(cmp_op, lhs, rhs),
        BinaryOp::Arith(arith_op) => eval_arith(arith_op, lhs, rhs),
        BinaryOp::Bit(bit_op) => eval_bit(bit_op, lhs, rhs),
        BinaryOp::Attr => eval_attr(lhs, rhs),
        BinaryOp::Index => eval_index(lhs, rhs),
        BinaryOp::Contains => eval_contains(lhs, rhs),
    }
}

/// Evaluates a single-operand operation.
pub fn eval_unary(op: UnaryOp, val: &Value) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Neg => match num(val) {
            Some(Num::Int(n)) => n
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| overflow("-")),
            Some(Num::Float(x)) => Ok(Value::Float(-x)),
            Some(Num::Complex(re, im)) => Ok(complex(-re, -im)),
            None => Err(EvalError::mismatch("-", val.type_name())),
        },
        UnaryOp::Pos => match num(val) {
            Some(n) => Ok(n.into_value()),
            None => Err(EvalError::mismatch("+", val.type_name())),
        },
        UnaryOp::Abs => match num(val) {
            Some(Num::Int(n)) => n
                .checked_abs()
                .map(Value::Int)
                .ok_or_else(|| overflow("abs")),
            Some(Num::Float(x)) => Ok(Value::Float(x.abs())),
            Some(Num::Complex(re, im)) => Ok(Value::Float(re.hypot(im))),
            None => Err(EvalError::mismatch("abs", val.type_name())),
        },
        UnaryOp::Invert => match int(val) {
            Some(n) => Ok(Value::Int(!n)),
            None => Err(EvalError::mismatch("!", val.type_name())),
        },
        UnaryOp::ToComplex => match num(val) {
            Some(Num::Int(n)) => Ok(complex(n as f64, 0.0)),
            Some(Num::Float(x)) => Ok(complex(x, 0.0)),
            Some(Num::Complex(re, im)) => Ok(complex(re, im)),
            None => Err(EvalError::mismatch("complex", val.type_name())),
        },
        UnaryOp::ToInt => to_int(val),
        UnaryOp::ToFloat => to_float(val),
        UnaryOp::Round(digits) => round(val, digits),
        UnaryOp::Len => match val {
            Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
            Value::List(items) | Value::Tuple(items) => Ok(Value::Int(items.len() as i64)),
            Value::Map(map) => Ok(Value::Int(map.len() as i64)),
            Value::Record { fields, .. } => Ok(Value::Int(fields.len() as i64)),
            _ => Err(EvalError::mismatch("len", val.type_name())),
        },
    }
}

// ---------------------------------------------------------------------------
// Numeric views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
    Complex(f64, f64),
}

impl Num {
    fn into_value(self) -> Value {
        match self {
            Num::Int(n) => Value::Int(n),
            Num::Float(x) => Value::Float(x),
            Num::Complex(re, im) => complex(re, im),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(x) => x,
            Num::Complex(re, _) => re,
        }
    }

    fn as_complex(self) -> (f64, f64) {
        match self {
            Num::Complex(re, im) => (re, im),
            other => (other.as_f64(), 0.0),
        }
    }
}

/// Numeric view of a value; `Bool` counts as `0`/`1`.
fn num(v: &Value) -> Option<Num> {
    match v {
        Value::Bool(b) => Some(Num::Int(*b as i64)),
        Value::Int(n) => Some(Num::Int(*n)),
        Value::Float(x) => Some(Num::Float(*x)),
        Value::Complex { re, im } => Some(Num::Complex(*re, *im)),
        _ => None,
    }
}

fn int(v: &Value) -> Option<i64> {
    match v {
        Value::Bool(b) => Some(*b as i64),
        Value::Int(n) => Some(*n),
        _ => None,
    }
}

fn complex(re: f64, im: f64) -> Value {
    Value::Complex { re, im }
}

fn overflow(op: &str) -> EvalError {
    EvalError::IntegerOverflow { op: op.into() }
}

fn div_zero(op: &str) -> EvalError {
    EvalError::DivideByZero { op: op.into() }
}

fn pair_mismatch(op: &str, lhs: &Value, rhs: &Value) -> EvalError {
    EvalError::mismatch(op, format!("{} and {}", lhs.type_name(), rhs.type_name()))
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

fn eval_compare(op: CmpOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    // An unordered pair (NaN involved) compares false
    let ord = |lhs: &Value, rhs: &Value| compare_values(op.symbol(), lhs, rhs);
    let result = match op {
        CmpOp::Eq => values_equal(lhs, rhs),
        CmpOp::Ne => !values_equal(lhs, rhs),
        CmpOp::Lt => ord(lhs, rhs)? == Some(Ordering::Less),
        CmpOp::Le => matches!(ord(lhs, rhs)?, Some(Ordering::Less | Ordering::Equal)),
        CmpOp::Gt => ord(lhs, rhs)? == Some(Ordering::Greater),
        CmpOp::Ge => matches!(ord(lhs, rhs)?, Some(Ordering::Greater | Ordering::Equal)),
    };
    Ok(Value::Bool(result))
}

/// Structural equality with numeric values compared across variants.
pub fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (num(lhs), num(rhs)) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => return a == b,
        (Some(a @ Num::Complex(..)), Some(b)) | (Some(b), Some(a @ Num::Complex(..))) => {
            return a.as_complex() == b.as_complex()
        }
        (Some(a), Some(b)) => return a.as_f64() == b.as_f64(),
        _ => {}
    }
    match (lhs, rhs) {
        (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Map(a), Value::Map(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(k, v)| b.get(k).is_some_and(|w| values_equal(v, w)))
        }
        (
            Value::Record { name: na, fields: fa },
            Value::Record { name: nb, fields: fb },
        ) => {
            na == nb
                && fa.len() == fb.len()
                && fa
                    .iter()
                    .all(|(k, v)| fb.get(k).is_some_and(|w| values_equal(v, w)))
        }
        _ => lhs == rhs,
    }
}

/// Ordering for `<`, `<=`, `>`, `>=`. `Ok(None)` when a NaN is involved.
fn compare_values(op: &str, lhs: &Value, rhs: &Value) -> Result<Option<Ordering>, EvalError> {
    match (num(lhs), num(rhs)) {
        (Some(Num::Complex(..)), _) | (_, Some(Num::Complex(..))) => {
            return Err(pair_mismatch(op, lhs, rhs))
        }
        (Some(Num::Int(a)), Some(Num::Int(b))) => return Ok(Some(a.cmp(&b))),
        (Some(a), Some(b)) => return Ok(a.as_f64().partial_cmp(&b.as_f64())),
        _ => {}
    }
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
            for (x, y) in a.iter().zip(b) {
                if !values_equal(x, y) {
                    return compare_values(op, x, y);
                }
            }
            Ok(Some(a.len().cmp(&b.len())))
        }
        _ => Err(pair_mismatch(op, lhs, rhs)),
    }
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

fn eval_arith(op: ArithOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    if let Some(result) = eval_sequence_arith(op, lhs, rhs) {
        return result;
    }

    let (a, b) = match (num(lhs), num(rhs)) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(pair_mismatch(op.symbol(), lhs, rhs)),
    };

    match (a, b) {
        (Num::Int(x), Num::Int(y)) => int_arith(op, x, y),
        (Num::Complex(..), _) | (_, Num::Complex(..)) => {
            complex_arith(op, a.as_complex(), b.as_complex())
        }
        _ => float_arith(op, a.as_f64(), b.as_f64()),
    }
}

/// Concatenation and repetition of strings, lists and tuples.
fn eval_sequence_arith(
    op: ArithOp,
    lhs: &Value,
    rhs: &Value,
) -> Option<Result<Value, EvalError>> {
    match (op, lhs, rhs) {
        (ArithOp::Add, Value::Str(a), Value::Str(b)) => Some(Ok(Value::Str(format!("{a}{b}")))),
        (ArithOp::Add, Value::List(a), Value::List(b)) => {
            Some(Ok(Value::List(a.iter().chain(b).cloned().collect())))
        }
        (ArithOp::Add, Value::Tuple(a), Value::Tuple(b)) => {
            Some(Ok(Value::Tuple(a.iter().chain(b).cloned().collect())))
        }
        (ArithOp::Mul, seq @ (Value::Str(_) | Value::List(_) | Value::Tuple(_)), count)
        | (ArithOp::Mul, count, seq @ (Value::Str(_) | Value::List(_) | Value::Tuple(_))) => {
            let n = int(count)?;
            Some(repeat(seq, n))
        }
        _ => None,
    }
}

/// Largest sequence, in bytes, that repetition will allocate.
const MAX_REPEAT_BYTES: usize = 1 << 30;

fn repeat(seq: &Value, n: i64) -> Result<Value, EvalError> {
    let too_large = || EvalError::TooLarge {
        op: "*".into(),
        limit: MAX_REPEAT_BYTES,
    };
    let times = usize::try_from(n.max(0)).map_err(|_| too_large())?;
    let unit_bytes = match seq {
        Value::Str(s) => s.len(),
        Value::List(items) | Value::Tuple(items) => {
            items.len().saturating_mul(std::mem::size_of::<Value>())
        }
        other => return Err(EvalError::mismatch("*", other.type_name())),
    };
    match unit_bytes.checked_mul(times) {
        Some(total) if total <= MAX_REPEAT_BYTES => {}
        _ => return Err(too_large()),
    }
    Ok(match seq {
        Value::Str(s) => Value::Str(s.repeat(times)),
        Value::List(items) => Value::List(repeat_items(items, times)),
        Value::Tuple(items) => Value::Tuple(repeat_items(items, times)),
        other => return Err(EvalError::mismatch("*", other.type_name())),
    })
}

fn repeat_items(items: &[Value], times: usize) -> Vec<Value> {
    let mut out = Vec::with_capacity(items.len().saturating_mul(times));
    for _ in 0..times {
        out.extend_from_slice(items);
    }
    out
}

fn floor_div_i64(x: i64, y: i64) -> Option<i64> {
    let q = x.checked_div(y)?;
    if x % y != 0 && ((x < 0) != (y < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

fn floor_mod_i64(x: i64, y: i64) -> i64 {
    let r = x.wrapping_rem(y);
    if r != 0 && ((r < 0) != (y < 0)) {
        r + y
    } else {
        r
    }
}

fn int_arith(op: ArithOp, x: i64, y: i64) -> Result<Value, EvalError> {
    let sym = op.symbol();
    match op {
        ArithOp::Add => x.checked_add(y).map(Value::Int).ok_or_else(|| overflow(sym)),
        ArithOp::Sub => x.checked_sub(y).map(Value::Int).ok_or_else(|| overflow(sym)),
        ArithOp::Mul => x.checked_mul(y).map(Value::Int).ok_or_else(|| overflow(sym)),
        ArithOp::TrueDiv => {
            if y == 0 {
                return Err(div_zero(sym));
            }
            Ok(Value::Float(x as f64 / y as f64))
        }
        ArithOp::FloorDiv | ArithOp::Mod | ArithOp::DivMod => {
            if y == 0 {
                return Err(div_zero(sym));
            }
            let q = floor_div_i64(x, y).ok_or_else(|| overflow(sym))?;
            let r = floor_mod_i64(x, y);
            Ok(match op {
                ArithOp::FloorDiv => Value::Int(q),
                ArithOp::Mod => Value::Int(r),
                _ => Value::tuple([Value::Int(q), Value::Int(r)]),
            })
        }
        ArithOp::Pow => {
            if y >= 0 {
                let exp = u32::try_from(y).map_err(|_| overflow(sym))?;
                x.checked_pow(exp).map(Value::Int).ok_or_else(|| overflow(sym))
            } else if x == 0 {
                Err(div_zero(sym))
            } else {
                Ok(Value::Float((x as f64).powf(y as f64)))
            }
        }
    }
}

fn float_arith(op: ArithOp, x: f64, y: f64) -> Result<Value, EvalError> {
    let sym = op.symbol();
    let needs_divisor = matches!(
        op,
        ArithOp::TrueDiv | ArithOp::FloorDiv | ArithOp::Mod | ArithOp::DivMod
    );
    if needs_divisor && y == 0.0 {
        return Err(div_zero(sym));
    }
    let floor_mod = || {
        let r = x % y;
        if r != 0.0 && ((r < 0.0) != (y < 0.0)) {
            r + y
        } else {
            r
        }
    };
    Ok(match op {
        ArithOp::Add => Value::Float(x + y),
        ArithOp::Sub => Value::Float(x - y),
        ArithOp::Mul => Value::Float(x * y),
        ArithOp::TrueDiv => Value::Float(x / y),
        ArithOp::FloorDiv => Value::Float((x / y).floor()),
        ArithOp::Mod => Value::Float(floor_mod()),
        ArithOp::DivMod => Value::tuple([Value::Float((x / y).floor()), Value::Float(floor_mod())]),
        ArithOp::Pow => Value::Float(x.powf(y)),
    })
}

fn complex_mul((ar, ai): (f64, f64), (br, bi): (f64, f64)) -> (f64, f64) {
    (ar * br - ai * bi, ar * bi + ai * br)
}

fn complex_div(op: &str, (ar, ai): (f64, f64), (br, bi): (f64, f64)) -> Result<(f64, f64), EvalError> {
    let denom = br * br + bi * bi;
    if denom == 0.0 {
        return Err(div_zero(op));
    }
    Ok(((ar * br + ai * bi) / denom, (ai * br - ar * bi) / denom))
}

fn complex_arith(op: ArithOp, a: (f64, f64), b: (f64, f64)) -> Result<Value, EvalError> {
    let sym = op.symbol();
    let (re, im) = match op {
        ArithOp::Add => (a.0 + b.0, a.1 + b.1),
        ArithOp::Sub => (a.0 - b.0, a.1 - b.1),
        ArithOp::Mul => complex_mul(a, b),
        ArithOp::TrueDiv => complex_div(sym, a, b)?,
        // Only integral real exponents: exponentiation by squaring
        ArithOp::Pow if b.1 == 0.0 && b.0.fract() == 0.0 && b.0.abs() <= i64::MAX as f64 => {
            let mut exp = (b.0 as i64).unsigned_abs();
            let mut base = a;
            let mut acc = (1.0, 0.0);
            while exp > 0 {
                if exp & 1 == 1 {
                    acc = complex_mul(acc, base);
                }
                base = complex_mul(base, base);
                exp >>= 1;
            }
            if b.0 < 0.0 {
                complex_div(sym, (1.0, 0.0), acc)?
            } else {
                acc
            }
        }
        _ => return Err(EvalError::mismatch(sym, "Complex")),
    };
    Ok(complex(re, im))
}

// ---------------------------------------------------------------------------
// Bitwise
// ---------------------------------------------------------------------------

fn eval_bit(op: BitOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    if let (Value::Bool(a), Value::Bool(b)) = (lhs, rhs) {
        match op {
            BitOp::And => return Ok(Value::Bool(a & b)),
            BitOp::Or => return Ok(Value::Bool(a | b)),
            BitOp::Xor => return Ok(Value::Bool(a ^ b)),
            BitOp::Shl | BitOp::Shr => {}
        }
    }

    let (x, y) = match (int(lhs), int(rhs)) {
        (Some(x), Some(y)) => (x, y),
        _ => return Err(pair_mismatch(op.symbol(), lhs, rhs)),
    };

    match op {
        BitOp::And => Ok(Value::Int(x & y)),
        BitOp::Or => Ok(Value::Int(x | y)),
        BitOp::Xor => Ok(Value::Int(x ^ y)),
        BitOp::Shl => {
            if y < 0 {
                return Err(EvalError::NegativeShift { count: y });
            }
            if x == 0 {
                return Ok(Value::Int(0));
            }
            if y >= 64 {
                return Err(overflow("<<"));
            }
            let shifted = x << y;
            if shifted >> y != x {
                return Err(overflow("<<"));
            }
            Ok(Value::Int(shifted))
        }
        BitOp::Shr => {
            if y < 0 {
                return Err(EvalError::NegativeShift { count: y });
            }
            // Arithmetic shift saturates at the sign
            Ok(Value::Int(if y >= 64 { x >> 63 } else { x >> y }))
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

fn float_to_int(op: &str, x: f64) -> Result<i64, EvalError> {
    if !x.is_finite() || x < i64::MIN as f64 || x >= i64::MAX as f64 {
        return Err(overflow(op));
    }
    Ok(x as i64)
}

fn to_int(val: &Value) -> Result<Value, EvalError> {
    match val {
        Value::Bool(b) => Ok(Value::Int(*b as i64)),
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Float(x) => float_to_int("int", x.trunc()).map(Value::Int),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| EvalError::InvalidLiteral {
                target: "int".into(),
                text: s.clone(),
            }),
        _ => Err(EvalError::mismatch("int", val.type_name())),
    }
}

fn to_float(val: &Value) -> Result<Value, EvalError> {
    match val {
        Value::Bool(b) => Ok(Value::Float(*b as i64 as f64)),
        Value::Int(n) => Ok(Value::Float(*n as f64)),
        Value::Float(x) => Ok(Value::Float(*x)),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| EvalError::InvalidLiteral {
                target: "float".into(),
                text: s.clone(),
            }),
        _ => Err(EvalError::mismatch("float", val.type_name())),
    }
}

fn round(val: &Value, digits: Option<i32>) -> Result<Value, EvalError> {
    match (num(val), digits) {
        (Some(Num::Int(n)), None) => Ok(Value::Int(n)),
        (Some(Num::Float(x)), None) => float_to_int("round", x.round_ties_even()).map(Value::Int),
        (Some(Num::Float(x)), Some(d)) => {
            let scale = 10f64.powi(d);
            if scale == 0.0 && x.is_finite() {
                return Ok(Value::Float(0.0f64.copysign(x)));
            }
            let scaled = x * scale;
            // Too many digits to matter: the value is already exact
            if !scale.is_finite() || !scaled.is_finite() {
                return Ok(Value::Float(x));
            }
            Ok(Value::Float(scaled.round_ties_even() / scale))
        }
        (Some(Num::Int(n)), Some(d)) if d >= 0 => Ok(Value::Int(n)),
        (Some(Num::Int(n)), Some(d)) => round_int(n, d.unsigned_abs()),
        _ => Err(EvalError::mismatch("round", val.type_name())),
    }
}

/// Rounds an integer to a multiple of `10^places`, half to even.
fn round_int(n: i64, places: u32) -> Result<Value, EvalError> {
    let factor = match 10i64.checked_pow(places) {
        Some(f) => f,
        None => return Ok(Value::Int(0)),
    };
    // factor > 0, so floor division cannot overflow
    let q = floor_div_i64(n, factor).ok_or_else(|| overflow("round"))?;
    let r = floor_mod_i64(n, factor) as i128;
    let twice = 2 * r;
    let factor_wide = factor as i128;
    let q = if twice > factor_wide || (twice == factor_wide && q % 2 != 0) {
        q + 1
    } else {
        q
    };
    q.checked_mul(factor)
        .map(Value::Int)
        .ok_or_else(|| overflow("round"))
}

// ---------------------------------------------------------------------------
// Structural access
// ---------------------------------------------------------------------------

fn eval_attr(target: &Value, name: &Value) -> Result<Value, EvalError> {
    let name = match name {
        Value::Str(s) => s,
        other => return Err(EvalError::mismatch("attribute access", other.type_name())),
    };
    let found = match target {
        Value::Record { fields, .. } => fields.get(name).cloned(),
        Value::Complex { re, im } => match name.as_str() {
            "re" | "real" => Some(Value::Float(*re)),
            "im" | "imag" => Some(Value::Float(*im)),
            _ => None,
        },
        _ => None,
    };
    found.ok_or_else(|| EvalError::AttributeNotFound {
        type_name: target.type_name().into(),
        name: name.clone(),
    })
}

/// Resolves a possibly negative index against a length.
fn normalize_index(index: i64, len: usize) -> Result<usize, EvalError> {
    let resolved = if index < 0 {
        index + len as i64
    } else {
        index
    };
    if resolved < 0 || resolved >= len as i64 {
        return Err(EvalError::IndexOutOfRange { index, len });
    }
    Ok(resolved as usize)
}

fn eval_index(target: &Value, key: &Value) -> Result<Value, EvalError> {
    match (target, key) {
        (Value::List(items) | Value::Tuple(items), _) => {
            let idx = int(key).ok_or_else(|| EvalError::mismatch("subscript", key.type_name()))?;
            Ok(items[normalize_index(idx, items.len())?].clone())
        }
        (Value::Str(s), _) => {
            let idx = int(key).ok_or_else(|| EvalError::mismatch("subscript", key.type_name()))?;
            let len = s.chars().count();
            let pos = normalize_index(idx, len)?;
            Ok(s.chars()
                .nth(pos)
                .map(|c| Value::Str(c.to_string()))
                .unwrap_or(Value::Unit))
        }
        (Value::Map(map), Value::Str(k)) => map
            .get(k)
            .cloned()
            .ok_or_else(|| EvalError::KeyNotFound { key: k.clone() }),
        _ => Err(pair_mismatch("subscript", target, key)),
    }
}

fn eval_contains(container: &Value, item: &Value) -> Result<Value, EvalError> {
    let found = match (container, item) {
        (Value::Str(haystack), Value::Str(needle)) => haystack.contains(needle.as_str()),
        (Value::List(items) | Value::Tuple(items), _) => {
            items.iter().any(|x| values_equal(x, item))
        }
        (Value::Map(map), Value::Str(k)) => map.contains_key(k),
        _ => return Err(pair_mismatch("contains", container, item)),
    };
    Ok(Value::Bool(found))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arith(op: ArithOp, a: impl Into<Value>, b: impl Into<Value>) -> Result<Value, EvalError> {
        eval_binary(BinaryOp::Arith(op), &a.into(), &b.into())
    }

    #[test]
    fn test_floor_semantics_follow_divisor_sign() {
        assert_eq!(arith(ArithOp::FloorDiv, -7, 2).unwrap(), Value::Int(-4));
        assert_eq!(arith(ArithOp::Mod, -7, 2).unwrap(), Value::Int(1));
        assert_eq!(arith(ArithOp::Mod, 7, -2).unwrap(), Value::Int(-1));
        assert_eq!(
            arith(ArithOp::DivMod, 7, 2).unwrap(),
            Value::tuple([Value::Int(3), Value::Int(1)])
        );
        assert_eq!(arith(ArithOp::Mod, -7.5, 2.0).unwrap(), Value::Float(0.5));
    }

    #[test]
    fn test_true_division_yields_float() {
        assert_eq!(arith(ArithOp::TrueDiv, 7, 2).unwrap(), Value::Float(3.5));
        assert_eq!(arith(ArithOp::TrueDiv, 4, 2).unwrap(), Value::Float(2.0));
    }

    #[test]
    fn test_divide_by_zero_traps() {
        for op in [ArithOp::TrueDiv, ArithOp::FloorDiv, ArithOp::Mod, ArithOp::DivMod] {
            assert!(matches!(
                arith(op, 1, 0),
                Err(EvalError::DivideByZero { .. })
            ));
        }
        assert!(matches!(
            arith(ArithOp::TrueDiv, 1.0, 0.0),
            Err(EvalError::DivideByZero { .. })
        ));
    }

    #[test]
    fn test_integer_overflow_traps() {
        assert!(matches!(
            arith(ArithOp::Add, i64::MAX, 1),
            Err(EvalError::IntegerOverflow { .. })
        ));
        assert!(matches!(
            arith(ArithOp::Pow, 10, 40),
            Err(EvalError::IntegerOverflow { .. })
        ));
        assert!(matches!(
            eval_unary(UnaryOp::Neg, &Value::Int(i64::MIN)),
            Err(EvalError::IntegerOverflow { .. })
        ));
    }

    #[test]
    fn test_power() {
        assert_eq!(arith(ArithOp::Pow, 2, 10).unwrap(), Value::Int(1024));
        assert_eq!(arith(ArithOp::Pow, 2, -1).unwrap(), Value::Float(0.5));
        assert_eq!(arith(ArithOp::Pow, 4.0, 0.5).unwrap(), Value::Float(2.0));
        let i = Value::Complex { re: 0.0, im: 1.0 };
        assert_eq!(
            eval_binary(BinaryOp::Arith(ArithOp::Pow), &i, &Value::Int(2)).unwrap(),
            Value::Complex { re: -1.0, im: 0.0 }
        );
    }

    #[test]
    fn test_bool_coerces_in_arithmetic() {
        assert_eq!(arith(ArithOp::Add, true, 2).unwrap(), Value::Int(3));
        assert_eq!(
            eval_binary(BinaryOp::Bit(BitOp::And), &Value::Bool(true), &Value::Bool(false))
                .unwrap(),
            Value::Bool(false)
        );
        assert_eq!(eval_unary(UnaryOp::Invert, &Value::Bool(true)).unwrap(), Value::Int(-2));
    }

    #[test]
    fn test_sequence_concat_and_repeat() {
        assert_eq!(arith(ArithOp::Add, "ab", "cd").unwrap(), Value::Str("abcd".into()));
        assert_eq!(arith(ArithOp::Mul, 2, "ab").unwrap(), Value::Str("abab".into()));
        assert_eq!(
            arith(ArithOp::Mul, Value::List(vec![Value::Int(1)]), 3).unwrap(),
            Value::List(vec![Value::Int(1), Value::Int(1), Value::Int(1)])
        );
        assert_eq!(arith(ArithOp::Mul, "ab", -1).unwrap(), Value::Str(String::new()));
    }

    #[test]
    fn test_mixed_numeric_comparison() {
        let lt = BinaryOp::Cmp(CmpOp::Lt);
        assert_eq!(eval_binary(lt, &Value::Int(1), &Value::Float(1.5)).unwrap(), Value::Bool(true));
        assert_eq!(
            eval_binary(BinaryOp::Cmp(CmpOp::Eq), &Value::Int(2), &Value::Float(2.0)).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            eval_binary(BinaryOp::Cmp(CmpOp::Eq), &Value::Int(2), &Value::Str("2".into()))
                .unwrap(),
            Value::Bool(false)
        );
        assert!(matches!(
            eval_binary(lt, &Value::Int(1), &Value::Str("a".into())),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_lexicographic_sequence_comparison() {
        let a = Value::List(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::List(vec![Value::Int(1), Value::Int(3)]);
        let short = Value::List(vec![Value::Int(1)]);
        let lt = BinaryOp::Cmp(CmpOp::Lt);
        assert_eq!(eval_binary(lt, &a, &b).unwrap(), Value::Bool(true));
        assert_eq!(eval_binary(lt, &short, &a).unwrap(), Value::Bool(true));
        assert_eq!(
            eval_binary(lt, &Value::Str("abc".into()), &Value::Str("abd".into())).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_shifts() {
        let shl = BinaryOp::Bit(BitOp::Shl);
        let shr = BinaryOp::Bit(BitOp::Shr);
        assert_eq!(eval_binary(shl, &Value::Int(3), &Value::Int(2)).unwrap(), Value::Int(12));
        assert_eq!(eval_binary(shr, &Value::Int(-8), &Value::Int(1)).unwrap(), Value::Int(-4));
        assert_eq!(eval_binary(shr, &Value::Int(-8), &Value::Int(100)).unwrap(), Value::Int(-1));
        assert!(matches!(
            eval_binary(shl, &Value::Int(1), &Value::Int(-1)),
            Err(EvalError::NegativeShift { count: -1 })
        ));
        assert!(matches!(
            eval_binary(shl, &Value::Int(1), &Value::Int(63)),
            Err(EvalError::IntegerOverflow { .. })
        ));
    }

    #[test]
    fn test_huge_repetition_is_an_error_not_a_panic() {
        let list = Value::List(vec![Value::Int(1)]);
        assert!(matches!(
            arith(ArithOp::Mul, list, i64::MAX),
            Err(EvalError::TooLarge { .. })
        ));
        assert!(matches!(
            arith(ArithOp::Mul, "ab", 1i64 << 62),
            Err(EvalError::TooLarge { .. })
        ));
        assert!(matches!(
            arith(ArithOp::Mul, 1i64 << 40, "x"),
            Err(EvalError::TooLarge { .. })
        ));
        // Empty sequences never grow
        assert_eq!(
            arith(ArithOp::Mul, Value::List(vec![]), i64::MAX).unwrap(),
            Value::List(vec![])
        );
    }

    #[test]
    fn test_round_half_to_even() {
        let r = |v: Value, d| eval_unary(UnaryOp::Round(d), &v).unwrap();
        assert_eq!(r(Value::Float(2.5), None), Value::Int(2));
        assert_eq!(r(Value::Float(3.5), None), Value::Int(4));
        assert_eq!(r(Value::Float(-0.5), None), Value::Int(0));
        assert_eq!(r(Value::Float(1.25), Some(1)), Value::Float(1.2));
        assert_eq!(r(Value::Int(1250), Some(-2)), Value::Int(1200));
        assert_eq!(r(Value::Int(1350), Some(-2)), Value::Int(1400));
        assert_eq!(r(Value::Int(-1251), Some(-2)), Value::Int(-1300));
        assert_eq!(r(Value::Int(7), Some(2)), Value::Int(7));
    }

    #[test]
    fn test_round_with_extreme_digits_keeps_value_finite() {
        let r = |v: f64, d| eval_unary(UnaryOp::Round(Some(d)), &Value::Float(v)).unwrap();
        assert_eq!(r(1.25, 400), Value::Float(1.25));
        assert_eq!(r(1e300, 10), Value::Float(1e300));
        assert_eq!(r(123.4, -400), Value::Float(0.0));
        assert_eq!(r(-123.4, -400), Value::Float(-0.0));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(eval_unary(UnaryOp::ToInt, &Value::Float(-2.7)).unwrap(), Value::Int(-2));
        assert_eq!(eval_unary(UnaryOp::ToInt, &Value::Str(" 42 ".into())).unwrap(), Value::Int(42));
        assert_eq!(eval_unary(UnaryOp::ToFloat, &Value::Int(3)).unwrap(), Value::Float(3.0));
        assert_eq!(
            eval_unary(UnaryOp::ToComplex, &Value::Int(3)).unwrap(),
            Value::Complex { re: 3.0, im: 0.0 }
        );
        assert!(matches!(
            eval_unary(UnaryOp::ToInt, &Value::Str("x1".into())),
            Err(EvalError::InvalidLiteral { .. })
        ));
        assert!(matches!(
            eval_unary(UnaryOp::ToInt, &Value::Float(f64::NAN)),
            Err(EvalError::IntegerOverflow { .. })
        ));
    }

    #[test]
    fn test_abs_of_complex_is_magnitude() {
        let z = Value::Complex { re: 3.0, im: 4.0 };
        assert_eq!(eval_unary(UnaryOp::Abs, &z).unwrap(), Value::Float(5.0));
    }

    #[test]
    fn test_subscript_and_len() {
        let xs = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(4)]);
        assert_eq!(eval_index(&xs, &Value::Int(-1)).unwrap(), Value::Int(4));
        assert!(matches!(
            eval_index(&xs, &Value::Int(3)),
            Err(EvalError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert_eq!(eval_index(&Value::Str("héllo".into()), &Value::Int(1)).unwrap(), Value::Str("é".into()));
        assert_eq!(eval_unary(UnaryOp::Len, &Value::Str("héllo".into())).unwrap(), Value::Int(5));
        assert!(matches!(
            eval_unary(UnaryOp::Len, &Value::Int(5)),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_attribute_access() {
        let p = Value::record("Point", [("x", 1), ("y", 2)]);
        assert_eq!(eval_attr(&p, &Value::Str("y".into())).unwrap(), Value::Int(2));
        assert!(matches!(
            eval_attr(&p, &Value::Str("z".into())),
            Err(EvalError::AttributeNotFound { .. })
        ));
        let z = Value::Complex { re: 1.0, im: 2.0 };
        assert_eq!(eval_attr(&z, &Value::Str("im".into())).unwrap(), Value::Float(2.0));
    }

    #[test]
    fn test_membership() {
        let xs = Value::List(vec![Value::Int(1), Value::Float(2.0)]);
        assert_eq!(eval_contains(&xs, &Value::Int(2)).unwrap(), Value::Bool(true));
        assert_eq!(
            eval_contains(&Value::Str("haystack".into()), &Value::Str("st".into())).unwrap(),
            Value::Bool(true)
        );
        assert!(matches!(
            eval_contains(&Value::Int(1), &Value::Int(1)),
            Err(EvalError::TypeMismatch { .. })
        ));
    }
}

//! Deferred expressions over named inputs.
//!
//! An [`Expr`] is an immutable tree describing a computation that has not
//! run yet. Building one never touches a concrete value; only
//! [`Expr::evaluate`] does. Every builder returns a new `Expr` and leaves
//! its operands untouched, so one expression can be reused inside several
//! larger ones.
//!
//! # Inputs and partitioning
//!
//! Each expression carries an ordered list of [`Input`] selectors, one per
//! value its evaluation consumes. Composing `lhs OP rhs` concatenates the
//! two lists (`lhs` first) and, at evaluation time, hands the first
//! `lhs.arity()` values to `lhs` and the remainder to `rhs`. Literal
//! operands consume nothing. The `any`/`all` combinators generalize the
//! same prefix/suffix split to N operands.
//!
//! # Display templates
//!
//! Each expression also carries a template with one `{}` slot per input,
//! in input order (literal braces are doubled). [`Expr::render`] fills the
//! slots with concrete values, which is how contract failures get their
//! messages; `Display` fills them with `P` / `P.name` labels.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::eval::{eval_binary, eval_unary};
use crate::ops::{ArithOp, BinaryOp, CmpOp, Notation, UnaryOp};
use crate::value::Value;

/// Which value an expression slot binds to at call time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Input {
    /// The value the contract is attached to (the parameter itself, or the
    /// return value for a return contract).
    Subject,
    /// The value bound to another named parameter in the same call.
    Param(String),
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Subject => write!(f, "P"),
            Input::Param(name) => write!(f, "P.{}", name),
        }
    }
}

/// Either side of a binary operation.
#[derive(Debug, Clone)]
pub enum Operand {
    Expr(Expr),
    Value(Value),
}

impl Operand {
    fn arity(&self) -> usize {
        match self {
            Operand::Expr(e) => e.arity(),
            Operand::Value(_) => 0,
        }
    }

    fn inputs(&self) -> &[Input] {
        match self {
            Operand::Expr(e) => e.inputs(),
            Operand::Value(_) => &[],
        }
    }

    fn eval(&self, values: &[Value]) -> Result<Value, EvalError> {
        match self {
            Operand::Expr(e) => e.eval_node(values),
            Operand::Value(v) => Ok(v.clone()),
        }
    }

    /// Template text for this operand; expressions are parenthesized when
    /// `wrap` is set, literals never are.
    fn template(&self, wrap: bool) -> String {
        match self {
            Operand::Expr(e) if wrap => format!("({})", e.template),
            Operand::Expr(e) => e.template.to_string(),
            Operand::Value(v) => escape(&v.repr()),
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    /// Consumes exactly one value and returns it.
    Input,
    Const(Value),
    Unary {
        op: UnaryOp,
        operand: Arc<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Arc<Operand>,
        rhs: Arc<Operand>,
    },
    Any(Arc<[Expr]>),
    All(Arc<[Expr]>),
}

/// An immutable, deferred computation over zero or more input values.
#[derive(Debug, Clone)]
pub struct Expr {
    node: Node,
    inputs: Cow<'static, [Input]>,
    template: Cow<'static, str>,
}

const SUBJECT_ONLY: &[Input] = &[Input::Subject];

/// The placeholder: identity over the contract's own subject.
pub const P: Expr = Expr {
    node: Node::Input,
    inputs: Cow::Borrowed(SUBJECT_ONLY),
    template: Cow::Borrowed("{}"),
};

#[allow(clippy::should_implement_trait, clippy::len_without_is_empty)]
impl Expr {
    /// Placeholder for the value bound to parameter `name` in the same call.
    pub fn param(name: impl Into<String>) -> Expr {
        Expr {
            node: Node::Input,
            inputs: Cow::Owned(vec![Input::Param(name.into())]),
            template: Cow::Borrowed("{}"),
        }
    }

    /// An expression that ignores its inputs and always yields `value`.
    pub fn constant(value: impl Into<Value>) -> Expr {
        let value = value.into();
        Expr {
            template: Cow::Owned(escape(&value.repr())),
            node: Node::Const(value),
            inputs: Cow::Owned(Vec::new()),
        }
    }

    /// Replaces this expression with a constant (zero inputs).
    pub fn instead(&self, value: impl Into<Value>) -> Expr {
        Expr::constant(value)
    }

    /// Input selectors in the order [`Expr::evaluate`] consumes values.
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// Number of values [`Expr::evaluate`] expects.
    pub fn arity(&self) -> usize {
        self.inputs.len()
    }

    /// Display template with one `{}` slot per input.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Runs the computation against `values`, one per input, in input order.
    ///
    /// Pure: the same values always produce the same result.
    pub fn evaluate(&self, values: &[Value]) -> Result<Value, EvalError> {
        if values.len() < self.arity() {
            return Err(EvalError::MissingInput {
                needed: self.arity(),
                supplied: values.len(),
            });
        }
        self.eval_node(values)
    }

    /// Evaluates and reports whether the result is truthy.
    pub fn check(&self, values: &[Value]) -> Result<bool, EvalError> {
        self.evaluate(values).map(|v| v.is_truthy())
    }

    /// Fills the template slots with the reprs of `values`, positionally.
    pub fn render(&self, values: &[Value]) -> String {
        let mut reprs = values.iter().map(Value::repr);
        fill(&self.template, || reprs.next())
    }

    fn eval_node(&self, values: &[Value]) -> Result<Value, EvalError> {
        match &self.node {
            Node::Input => values.first().cloned().ok_or(EvalError::MissingInput {
                needed: 1,
                supplied: 0,
            }),
            Node::Const(v) => Ok(v.clone()),
            Node::Unary { op, operand } => eval_unary(*op, &operand.eval_node(values)?),
            Node::Binary { op, lhs, rhs } => {
                let (head, tail) = split(values, lhs.arity());
                let l = lhs.eval(head)?;
                let r = rhs.eval(tail)?;
                eval_binary(*op, &l, &r)
            }
            Node::Any(exprs) => {
                let mut rest = values;
                for expr in exprs.iter() {
                    let (head, tail) = split(rest, expr.arity());
                    if expr.eval_node(head)?.is_truthy() {
                        return Ok(Value::Bool(true));
                    }
                    rest = tail;
                }
                Ok(Value::Bool(false))
            }
            Node::All(exprs) => {
                let mut rest = values;
                for expr in exprs.iter() {
                    let (head, tail) = split(rest, expr.arity());
                    if !expr.eval_node(head)?.is_truthy() {
                        return Ok(Value::Bool(false));
                    }
                    rest = tail;
                }
                Ok(Value::Bool(true))
            }
        }
    }

    // -- builders ----------------------------------------------------------

    /// `lhs OP rhs` with either side an expression or a literal.
    ///
    /// This is also the reflected form: `Expr::binary(ArithOp::Pow, 2, P)`
    /// builds `2 ** P`.
    pub fn binary(
        op: impl Into<BinaryOp>,
        lhs: impl Into<Operand>,
        rhs: impl Into<Operand>,
    ) -> Expr {
        let op = op.into();
        let lhs = lhs.into();
        let rhs = rhs.into();

        let template = match op.notation() {
            Notation::Infix(sym) => format!("{} {} {}", lhs.template(true), sym, rhs.template(true)),
            Notation::Call(name) => {
                format!("{}({}, {})", name, lhs.template(false), rhs.template(false))
            }
            Notation::Attr => match &rhs {
                Operand::Value(Value::Str(name)) => {
                    format!("{}.{}", lhs.template(true), escape(name))
                }
                _ => format!("attr({}, {})", lhs.template(false), rhs.template(false)),
            },
            Notation::Index => format!("{}[{}]", lhs.template(true), rhs.template(false)),
        };

        let inputs = concat_inputs(lhs.inputs(), rhs.inputs());
        Expr {
            node: Node::Binary {
                op,
                lhs: Arc::new(lhs),
                rhs: Arc::new(rhs),
            },
            inputs,
            template: Cow::Owned(template),
        }
    }

    /// Applies a single-operand operation.
    pub fn unary(&self, op: UnaryOp) -> Expr {
        let template = match op {
            UnaryOp::Round(Some(digits)) => format!("round({}, {})", self.template, digits),
            _ => format!("{}({})", op.name(), self.template),
        };
        Expr {
            node: Node::Unary {
                op,
                operand: Arc::new(self.clone()),
            },
            inputs: self.inputs.clone(),
            template: Cow::Owned(template),
        }
    }

    fn cmp(&self, op: CmpOp, other: impl Into<Operand>) -> Expr {
        Expr::binary(op, self.clone(), other)
    }

    pub fn lt(&self, other: impl Into<Operand>) -> Expr {
        self.cmp(CmpOp::Lt, other)
    }

    pub fn le(&self, other: impl Into<Operand>) -> Expr {
        self.cmp(CmpOp::Le, other)
    }

    pub fn gt(&self, other: impl Into<Operand>) -> Expr {
        self.cmp(CmpOp::Gt, other)
    }

    pub fn ge(&self, other: impl Into<Operand>) -> Expr {
        self.cmp(CmpOp::Ge, other)
    }

    pub fn eq(&self, other: impl Into<Operand>) -> Expr {
        self.cmp(CmpOp::Eq, other)
    }

    pub fn ne(&self, other: impl Into<Operand>) -> Expr {
        self.cmp(CmpOp::Ne, other)
    }

    pub fn floor_div(&self, other: impl Into<Operand>) -> Expr {
        Expr::binary(ArithOp::FloorDiv, self.clone(), other)
    }

    pub fn divmod(&self, other: impl Into<Operand>) -> Expr {
        Expr::binary(ArithOp::DivMod, self.clone(), other)
    }

    pub fn pow(&self, other: impl Into<Operand>) -> Expr {
        Expr::binary(ArithOp::Pow, self.clone(), other)
    }

    /// `other floor_div self`
    pub fn rfloor_div(&self, other: impl Into<Operand>) -> Expr {
        Expr::binary(ArithOp::FloorDiv, other, self.clone())
    }

    /// `divmod(other, self)`
    pub fn rdivmod(&self, other: impl Into<Operand>) -> Expr {
        Expr::binary(ArithOp::DivMod, other, self.clone())
    }

    /// `other ** self`
    pub fn rpow(&self, other: impl Into<Operand>) -> Expr {
        Expr::binary(ArithOp::Pow, other, self.clone())
    }

    pub fn pos(&self) -> Expr {
        self.unary(UnaryOp::Pos)
    }

    pub fn abs(&self) -> Expr {
        self.unary(UnaryOp::Abs)
    }

    /// Bitwise NOT; same as `!expr`.
    pub fn invert(&self) -> Expr {
        self.unary(UnaryOp::Invert)
    }

    pub fn to_complex(&self) -> Expr {
        self.unary(UnaryOp::ToComplex)
    }

    pub fn to_int(&self) -> Expr {
        self.unary(UnaryOp::ToInt)
    }

    pub fn to_float(&self) -> Expr {
        self.unary(UnaryOp::ToFloat)
    }

    pub fn round(&self, digits: Option<i32>) -> Expr {
        self.unary(UnaryOp::Round(digits))
    }

    pub fn len(&self) -> Expr {
        self.unary(UnaryOp::Len)
    }

    /// Attribute access; `name` may itself be an expression yielding a string.
    pub fn attr(&self, name: impl Into<Operand>) -> Expr {
        Expr::binary(BinaryOp::Attr, self.clone(), name)
    }

    /// Subscript; `key` may itself be an expression.
    pub fn index(&self, key: impl Into<Operand>) -> Expr {
        Expr::binary(BinaryOp::Index, self.clone(), key)
    }

    /// `item` is a member of this (container) expression.
    pub fn contains(&self, item: impl Into<Operand>) -> Expr {
        Expr::binary(BinaryOp::Contains, self.clone(), item)
    }

    /// This expression is a member of `container`.
    pub fn is_in(&self, container: impl Into<Operand>) -> Expr {
        Expr::binary(BinaryOp::Contains, container, self.clone())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut labels = self.inputs.iter().map(Input::to_string);
        f.write_str(&fill(&self.template, || labels.next()))
    }
}

// ---------------------------------------------------------------------------
// Combinators and call-style helpers
// ---------------------------------------------------------------------------

fn combine(name: &str, exprs: Vec<Expr>, all: bool) -> Expr {
    let template = format!(
        "{}({})",
        name,
        exprs
            .iter()
            .map(|e| e.template.as_ref())
            .collect::<Vec<_>>()
            .join(", ")
    );
    let inputs: Vec<Input> = exprs.iter().flat_map(|e| e.inputs().iter().cloned()).collect();
    let exprs: Arc<[Expr]> = exprs.into();
    Expr {
        node: if all { Node::All(exprs) } else { Node::Any(exprs) },
        inputs: Cow::Owned(inputs),
        template: Cow::Owned(template),
    }
}

/// True as soon as one expression is truthy; false for no expressions.
pub fn any(exprs: impl IntoIterator<Item = Expr>) -> Expr {
    combine("any", exprs.into_iter().collect(), false)
}

/// False as soon as one expression is falsy; true for no expressions.
pub fn all(exprs: impl IntoIterator<Item = Expr>) -> Expr {
    combine("all", exprs.into_iter().collect(), true)
}

pub fn len(expr: &Expr) -> Expr {
    expr.len()
}

pub fn int(expr: &Expr) -> Expr {
    expr.to_int()
}

pub fn float(expr: &Expr) -> Expr {
    expr.to_float()
}

/// `item` is a member of `container`.
pub fn contains(container: impl Into<Operand>, item: impl Into<Operand>) -> Expr {
    Expr::binary(BinaryOp::Contains, container, item)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn split(values: &[Value], at: usize) -> (&[Value], &[Value]) {
    values.split_at(at.min(values.len()))
}

fn concat_inputs(lhs: &[Input], rhs: &[Input]) -> Cow<'static, [Input]> {
    if rhs.is_empty() && lhs == SUBJECT_ONLY {
        return Cow::Borrowed(SUBJECT_ONLY);
    }
    let mut inputs = Vec::with_capacity(lhs.len() + rhs.len());
    inputs.extend_from_slice(lhs);
    inputs.extend_from_slice(rhs);
    Cow::Owned(inputs)
}

/// Makes literal text safe to embed in a template.
fn escape(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}

/// Expands `{}` slots from `next`, and `{{`/`}}` to single braces.
/// Slots left over once `next` runs dry are kept verbatim.
fn fill(template: &str, mut next: impl FnMut() -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('{', Some('{')) | ('}', Some('}')) => {
                chars.next();
                out.push(c);
            }
            ('{', Some('}')) => {
                chars.next();
                match next() {
                    Some(text) => out.push_str(&text),
                    None => out.push_str("{}"),
                }
            }
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Operand conversions
// ---------------------------------------------------------------------------

impl From<Expr> for Operand {
    fn from(e: Expr) -> Self {
        Operand::Expr(e)
    }
}

impl From<&Expr> for Operand {
    fn from(e: &Expr) -> Self {
        Operand::Expr(e.clone())
    }
}

macro_rules! literal_operand {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(v: $ty) -> Self {
                    Operand::Value(Value::from(v))
                }
            }
        )+
    };
}

literal_operand!(Value, bool, i32, i64, f64, &str, String, Vec<Value>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_identity() {
        assert_eq!(P.arity(), 1);
        assert_eq!(P.evaluate(&[Value::Int(7)]).unwrap(), Value::Int(7));
        assert_eq!(P.to_string(), "P");
    }

    #[test]
    fn test_literal_operand_does_not_grow_arity() {
        let e = P.gt(0);
        assert_eq!(e.inputs(), &[Input::Subject]);
        assert_eq!(e.template(), "({}) > 0");
        assert_eq!(e.render(&[Value::Int(-3)]), "(-3) > 0");
    }

    #[test]
    fn test_composed_expressions_partition_values_left_first() {
        // (a - b) > c
        let diff = Expr::binary(ArithOp::Sub, Expr::param("a"), Expr::param("b"));
        let e = diff.gt(Expr::param("c"));
        assert_eq!(
            e.inputs(),
            &[
                Input::Param("a".into()),
                Input::Param("b".into()),
                Input::Param("c".into())
            ]
        );
        let vals = [Value::Int(10), Value::Int(3), Value::Int(6)];
        assert_eq!(e.evaluate(&vals).unwrap(), Value::Bool(true));
        let vals = [Value::Int(10), Value::Int(3), Value::Int(7)];
        assert_eq!(e.evaluate(&vals).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_reflected_binary_puts_literal_first() {
        let e = Expr::binary(ArithOp::Sub, 10, P);
        assert_eq!(e.evaluate(&[Value::Int(3)]).unwrap(), Value::Int(7));
        assert_eq!(e.template(), "10 - ({})");
        assert_eq!(P.rpow(2).evaluate(&[Value::Int(3)]).unwrap(), Value::Int(8));
        assert_eq!(
            P.rdivmod(7).evaluate(&[Value::Int(2)]).unwrap(),
            Value::tuple([Value::Int(3), Value::Int(1)])
        );
    }

    #[test]
    fn test_expression_as_subscript_key() {
        // xs[i] where xs is the subject and i another parameter
        let e = P.index(Expr::param("i"));
        assert_eq!(e.inputs(), &[Input::Subject, Input::Param("i".into())]);
        let xs = Value::List(vec![Value::Int(5), Value::Int(6)]);
        assert_eq!(e.evaluate(&[xs, Value::Int(1)]).unwrap(), Value::Int(6));
        assert_eq!(e.to_string(), "(P)[P.i]");
    }

    #[test]
    fn test_expression_as_attribute_name() {
        let point = Value::record("Point", [("x", 1), ("y", 2)]);
        let e = P.attr(Expr::param("field"));
        assert_eq!(
            e.evaluate(&[point.clone(), Value::Str("y".into())]).unwrap(),
            Value::Int(2)
        );
        assert_eq!(P.attr("x").evaluate(&[point]).unwrap(), Value::Int(1));
        assert_eq!(P.attr("x").to_string(), "(P).x");
    }

    #[test]
    fn test_membership_both_directions() {
        let xs = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert!(P.contains(2).check(&[xs.clone()]).unwrap());
        assert!(P.is_in(xs).check(&[Value::Int(1)]).unwrap());
        let e = P.is_in(Expr::param("allowed"));
        assert_eq!(e.inputs(), &[Input::Param("allowed".into()), Input::Subject]);
    }

    #[test]
    fn test_constant_ignores_inputs() {
        let always = P.instead(true);
        assert_eq!(always.arity(), 0);
        assert!(always.check(&[]).unwrap());
        assert_eq!(Expr::constant("{x}").template(), "\"{{x}}\"");
        assert_eq!(Expr::constant("{x}").render(&[]), "\"{x}\"");
    }

    #[test]
    fn test_too_few_values_is_missing_input() {
        let e = P.lt(Expr::param("b"));
        assert_eq!(
            e.evaluate(&[Value::Int(1)]),
            Err(EvalError::MissingInput {
                needed: 2,
                supplied: 1
            })
        );
    }

    #[test]
    fn test_combinators_slice_per_operand() {
        let e = all([P.gt(0), P.lt(10)]);
        assert_eq!(e.arity(), 2);
        assert!(e.check(&[Value::Int(1), Value::Int(9)]).unwrap());
        // second slice alone fails
        assert!(!e.check(&[Value::Int(1), Value::Int(11)]).unwrap());

        let e = any([P.gt(0), P.lt(10)]);
        assert!(e.check(&[Value::Int(-1), Value::Int(9)]).unwrap());
        assert!(!e.check(&[Value::Int(-1), Value::Int(10)]).unwrap());
    }

    #[test]
    fn test_empty_combinators() {
        assert!(all([]).check(&[]).unwrap());
        assert!(!any([]).check(&[]).unwrap());
        assert_eq!(all([]).template(), "all()");
    }

    #[test]
    fn test_fill_keeps_unfilled_slots() {
        assert_eq!(fill("({}) < ({})", || None), "({}) < ({})");
        let mut it = vec!["1".to_string()].into_iter();
        assert_eq!(fill("{} {{}}", || it.next()), "1 {}");
    }
}

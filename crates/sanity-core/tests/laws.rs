//! Algebraic laws of the expression engine, checked with proptest, plus
//! display snapshots for composite expressions.

use proptest::prelude::*;

use sanity_core::eval::eval_binary;
use sanity_core::{all, len, ArithOp, BinaryOp, CmpOp, EvalError, Expr, Value, P};

fn small_int() -> impl Strategy<Value = i64> {
    -1000i64..1000
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        any::<bool>().prop_map(Value::Bool),
        (-1e9f64..1e9).prop_map(Value::Float),
        "[a-z]{0,8}".prop_map(Value::Str),
    ]
}

fn closed_op() -> impl Strategy<Value = BinaryOp> {
    prop_oneof![
        Just(BinaryOp::Arith(ArithOp::Add)),
        Just(BinaryOp::Arith(ArithOp::Sub)),
        Just(BinaryOp::Arith(ArithOp::Mul)),
        Just(BinaryOp::Cmp(CmpOp::Lt)),
        Just(BinaryOp::Cmp(CmpOp::Ge)),
        Just(BinaryOp::Cmp(CmpOp::Eq)),
    ]
}

/// A one-input and a two-input building block.
fn blocks(k: i64) -> (Expr, Expr) {
    let unary = P * k;
    let binary = Expr::param("a") - Expr::param("b");
    (unary, binary)
}

proptest! {
    #[test]
    fn placeholder_is_identity(v in scalar()) {
        prop_assert_eq!(P.evaluate(&[v.clone()]).unwrap(), v);
    }

    #[test]
    fn composition_partitions_left_prefix(
        op in closed_op(),
        k in small_int(),
        x in small_int(),
        y in small_int(),
        z in small_int(),
        swap in any::<bool>(),
    ) {
        let (one, two) = blocks(k);
        let (lhs, rhs) = if swap { (two, one) } else { (one, two) };
        let composite = Expr::binary(op, lhs.clone(), rhs.clone());

        prop_assert_eq!(composite.arity(), lhs.arity() + rhs.arity());

        let values = [Value::Int(x), Value::Int(y), Value::Int(z)];
        let (head, tail) = values.split_at(lhs.arity());
        let expected = eval_binary(
            op,
            &lhs.evaluate(head).unwrap(),
            &rhs.evaluate(tail).unwrap(),
        )
        .unwrap();
        prop_assert_eq!(composite.evaluate(&values).unwrap(), expected);
    }

    #[test]
    fn reflected_matches_direct_application(
        op in closed_op(),
        c in small_int(),
        v in small_int(),
    ) {
        let inner = P + 1;
        let reflected = Expr::binary(op, c, inner.clone());
        let values = [Value::Int(v)];
        let expected = eval_binary(op, &Value::Int(c), &inner.evaluate(&values).unwrap()).unwrap();
        prop_assert_eq!(reflected.evaluate(&values).unwrap(), expected);
    }

    #[test]
    fn reusing_a_block_does_not_disturb_it(k in small_int(), v in small_int()) {
        let block = P * k;
        let _bigger = &block + &block;
        let _other = block.gt(0);
        prop_assert_eq!(
            block.evaluate(&[Value::Int(v)]).unwrap(),
            Value::Int(v * k)
        );
    }
}

#[test]
fn building_never_evaluates() {
    // Would divide by zero, but only once evaluated.
    let e = P.floor_div(0).gt(0);
    assert_eq!(e.arity(), 1);
    assert!(matches!(
        e.evaluate(&[Value::Int(1)]),
        Err(EvalError::DivideByZero { .. })
    ));
}

#[test]
fn empty_combinators() {
    assert_eq!(all([]).evaluate(&[]).unwrap(), Value::Bool(true));
    assert_eq!(sanity_core::any([]).evaluate(&[]).unwrap(), Value::Bool(false));
}

#[test]
fn all_short_circuits_before_later_operands() {
    // The second operand divides by zero, but is never reached.
    let e = all([P.gt(0), P.floor_div(0).gt(0)]);
    assert_eq!(
        e.evaluate(&[Value::Int(-1), Value::Int(5)]).unwrap(),
        Value::Bool(false)
    );
    let e = sanity_core::any([P.gt(0), P.floor_div(0).gt(0)]);
    assert_eq!(
        e.evaluate(&[Value::Int(1), Value::Int(5)]).unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn nested_subscript_and_length() {
    let e = len(&P.index(0).index(0)).gt(2);
    let nested = Value::from(serde_json::json!([[[1, 2, 4]]]));
    assert!(e.check(&[nested]).unwrap());
}

#[test]
fn display_snapshots() {
    insta::assert_snapshot!((P.gt(0)).to_string(), @"(P) > 0");
    insta::assert_snapshot!(((2 + P) >> 1).gt(5).to_string(), @"((2 + (P)) >> 1) > 5");
    insta::assert_snapshot!(P.index("dict").eq("Yo").to_string(), @r#"((P)["dict"]) == "Yo""#);
    insta::assert_snapshot!(P.lt(Expr::param("b")).to_string(), @"(P) < (P.b)");
    insta::assert_snapshot!(P.divmod(3).round(Some(2)).to_string(), @"round(divmod(P, 3), 2)");
    insta::assert_snapshot!(
        sanity_core::any([P.lt(0), P.abs().ge(10)]).to_string(),
        @"any((P) < 0, (abs(P)) >= 10)"
    );
}

#[test]
fn render_substitutes_values_in_input_order() {
    let e = (P - Expr::param("lo")).lt(Expr::param("width"));
    let msg = e.render(&[Value::Int(12), Value::Int(2), Value::Int(10)]);
    assert_eq!(msg, "((12) - (2)) < (10)");
}

#[test]
fn shared_expression_evaluates_concurrently() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Expr>();

    let e = std::sync::Arc::new((P * 2).gt(Expr::param("limit")));
    let handles: Vec<_> = (0..8i64)
        .map(|i| {
            let e = std::sync::Arc::clone(&e);
            std::thread::spawn(move || e.check(&[Value::Int(i), Value::Int(6)]).unwrap())
        })
        .collect();
    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, (0..8).map(|i| i * 2 > 6).collect::<Vec<_>>());
}

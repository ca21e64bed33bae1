//! Integration tests for end-to-end REX evaluation.
//!
//! These tests exercise the full pipeline over the public API:
//! build tree → compile → evaluate → verify value.

use std::sync::Arc;

use rex_eval::{CompiledFunction, Context};
use rex_expr::ExprNode;
use rex_foundation::{BinaryOp, UnaryOp, Value};
use rex_tensor::{SimpleTensor, SimpleTensorEngine, TensorAddress};
use rex_tests::{eval_expr, eval_with, init_test_logging, CountingEngine};

/// `2 + 3 * 4` with no params.
#[test]
fn arithmetic_with_precedence_shape() {
    init_test_logging();
    let node = ExprNode::add(
        ExprNode::number(2.0),
        ExprNode::mul(ExprNode::number(3.0), ExprNode::number(4.0)),
    );
    assert_eq!(eval_expr(&node, vec![]).as_double(), Some(14.0));
}

/// `if (a > 0, 1/a, -1)` with `a = 0`: the division never runs.
#[test]
fn conditional_takes_the_false_branch_lazily() {
    let node = ExprNode::if_(
        ExprNode::binary(BinaryOp::Greater, ExprNode::symbol(0), ExprNode::number(0.0)),
        ExprNode::binary(BinaryOp::Div, ExprNode::number(1.0), ExprNode::symbol(0)),
        ExprNode::number(-1.0),
    );
    let result = eval_expr(&node, vec![Value::Double(0.0)]);
    assert_eq!(result.as_double(), Some(-1.0));
}

/// `let x = 5 in x * x + x`.
#[test]
fn let_binding_feeds_its_body() {
    let node = ExprNode::let_(
        ExprNode::number(5.0),
        ExprNode::add(
            ExprNode::mul(ExprNode::symbol(-1), ExprNode::symbol(-1)),
            ExprNode::symbol(-1),
        ),
    );
    assert_eq!(eval_expr(&node, vec![]).as_double(), Some(30.0));
}

/// `"red" in ["red","green","blue"]` and the miss case.
#[test]
fn string_set_membership() {
    let set = || {
        ExprNode::Array(vec![
            ExprNode::string("red"),
            ExprNode::string("green"),
            ExprNode::string("blue"),
        ])
    };
    let hit = ExprNode::in_(ExprNode::string("red"), set());
    assert_eq!(eval_expr(&hit, vec![]).as_double(), Some(1.0));

    let miss = ExprNode::in_(ExprNode::string("yellow"), set());
    assert_eq!(eval_expr(&miss, vec![]).as_double(), Some(0.0));
}

/// `sum(t)` over `{ {x:a}:1, {x:b}:2, {x:c}:4 }`.
#[test]
fn full_tensor_sum() {
    let node = ExprNode::tensor_sum(ExprNode::tensor(vec![
        (vec![("x", "a")], 1.0),
        (vec![("x", "b")], 2.0),
        (vec![("x", "c")], 4.0),
    ]));
    assert_eq!(eval_expr(&node, vec![]).as_double(), Some(7.0));
}

/// `sum(t, x)` over a 2-d tensor leaves a tensor over `y`.
#[test]
fn dimension_sum_keeps_the_other_dimension() {
    let node = ExprNode::tensor_sum_dim(
        ExprNode::tensor(vec![
            (vec![("x", "a"), ("y", "p")], 1.0),
            (vec![("x", "b"), ("y", "p")], 2.0),
            (vec![("x", "a"), ("y", "q")], 4.0),
        ]),
        "x",
    );
    let result = eval_expr(&node, vec![]);
    let tensor = result
        .as_tensor()
        .and_then(|handle| handle.downcast_ref::<SimpleTensor>())
        .expect("expected a tensor over y");
    assert_eq!(tensor.dimensions(), ["y".to_string()]);
    assert_eq!(tensor.cell(&TensorAddress::from_pairs(vec![("y", "p")])), Some(3.0));
    assert_eq!(tensor.cell(&TensorAddress::from_pairs(vec![("y", "q")])), Some(4.0));
}

/// `sum(match(t, weights))`: the element-wise product runs in the
/// engine, then the full reduction collapses it.
#[test]
fn tensor_match_then_sum() {
    let node = ExprNode::tensor_sum(ExprNode::tensor_match(
        ExprNode::tensor(vec![
            (vec![("x", "a")], 1.0),
            (vec![("x", "b")], 2.0),
            (vec![("x", "c")], 4.0),
        ]),
        ExprNode::tensor(vec![(vec![("x", "a")], 10.0), (vec![("x", "c")], 100.0)]),
    ));
    // Only the shared cells survive the match: 1*10 + 4*100.
    assert_eq!(eval_expr(&node, vec![]).as_double(), Some(410.0));
}

/// Candidates past the first match are never evaluated: a reduction
/// sitting in a later candidate must not reach the engine.
#[test]
fn membership_short_circuits_after_a_match() {
    let tensor = ExprNode::tensor(vec![(vec![("x", "a")], 5.0)]);
    let node = ExprNode::in_(
        ExprNode::number(2.0),
        ExprNode::Array(vec![
            ExprNode::number(2.0),
            ExprNode::tensor_sum(tensor.clone()),
        ]),
    );
    let engine = Arc::new(CountingEngine::new());
    let result = eval_with(engine.clone(), &node, vec![]);
    assert_eq!(result.as_double(), Some(1.0));
    assert_eq!(engine.reductions(), 0);

    // Without a match the reduction runs; sum(t) = 5 != 3, so miss.
    let node = ExprNode::in_(
        ExprNode::number(3.0),
        ExprNode::Array(vec![ExprNode::number(2.0), ExprNode::tensor_sum(tensor)]),
    );
    let engine = Arc::new(CountingEngine::new());
    let result = eval_with(engine.clone(), &node, vec![]);
    assert_eq!(result.as_double(), Some(0.0));
    assert_eq!(engine.reductions(), 1);
}

/// An error in the unselected branch does not reach the result.
#[test]
fn conditional_hides_errors_in_the_dead_branch() {
    let node = ExprNode::if_(
        ExprNode::symbol(0),
        ExprNode::number(42.0),
        ExprNode::unary(UnaryOp::Sqrt, ExprNode::Error),
    );
    let result = eval_expr(&node, vec![Value::Double(1.0)]);
    assert_eq!(result.as_double(), Some(42.0));

    let result = eval_expr(&node, vec![Value::Double(0.0)]);
    assert!(result.is_error());
}

/// Errors absorb through enclosing operations.
#[test]
fn errors_propagate_to_the_result() {
    let node = ExprNode::add(
        ExprNode::number(1.0),
        ExprNode::tensor_sum(ExprNode::number(2.0)),
    );
    assert!(eval_expr(&node, vec![]).is_error());
}

/// A let body is unaffected by bindings of sibling expressions, and
/// the let stack unwinds between them.
#[test]
fn sibling_lets_do_not_interfere() {
    // (let x = 2 in x) + (let y = 40 in y)
    let node = ExprNode::add(
        ExprNode::let_(ExprNode::number(2.0), ExprNode::symbol(-1)),
        ExprNode::let_(ExprNode::number(40.0), ExprNode::symbol(-1)),
    );
    assert_eq!(eval_expr(&node, vec![]).as_double(), Some(42.0));
}

/// Two contexts against one function with equal params agree; the
/// function itself is never mutated.
#[test]
fn evaluation_is_pure_across_contexts() {
    let node = ExprNode::binary(
        BinaryOp::Pow,
        ExprNode::symbol(0),
        ExprNode::unary(UnaryOp::Sqrt, ExprNode::symbol(1)),
    );
    let function = CompiledFunction::compile(Arc::new(SimpleTensorEngine::new()), &node, 2);
    let params = vec![Value::Double(2.0), Value::Double(9.0)];

    let mut first_ctx = Context::new();
    first_ctx.set_params(params.clone());
    let first = function.eval(&mut first_ctx).as_double().unwrap();

    let mut second_ctx = Context::new();
    second_ctx.set_params(params);
    let second = function.eval(&mut second_ctx).as_double().unwrap();

    assert_eq!(first.to_bits(), second.to_bits());
    assert_eq!(first, 8.0);
}

/// Strings and membership compose with conditionals: a small ranking
/// snippet using one of everything.
#[test]
fn mixed_expression_end_to_end() {
    // if (field in ["title", "body"], weight * 2, weight)
    let node = ExprNode::if_(
        ExprNode::in_(
            ExprNode::symbol(0),
            ExprNode::Array(vec![ExprNode::string("title"), ExprNode::string("body")]),
        ),
        ExprNode::mul(ExprNode::symbol(1), ExprNode::number(2.0)),
        ExprNode::symbol(1),
    );
    let function = CompiledFunction::compile(Arc::new(SimpleTensorEngine::new()), &node, 2);
    let mut ctx = Context::new();

    // Params arrive pre-hashed the same way literals are lowered.
    let title = rex_foundation::fnv1a64_str("title") as f64;
    ctx.set_params(vec![Value::Double(title), Value::Double(3.0)]);
    assert_eq!(function.eval(&mut ctx).as_double(), Some(6.0));
    assert_eq!(ctx.if_count(), 1);

    let anchor = rex_foundation::fnv1a64_str("anchor") as f64;
    ctx.set_params(vec![Value::Double(anchor), Value::Double(3.0)]);
    assert_eq!(function.eval(&mut ctx).as_double(), Some(3.0));
}

//! Integration tests for closure capture tracking
//!
//! Tests which free variables a compiled closure reports, across shadowing
//! and nesting.

use std::collections::HashMap;

use conch_foundation::Type;
use conch_language::ast::Chunk;
use conch_language::build::{chunk, closure, simple, var, word};
use conch_language::{ChunkOp, ClosureOp, ValuesOp, compile};
use proptest::prelude::*;

fn root(names: &[&str]) -> HashMap<String, Type> {
    names.iter().map(|n| ((*n).to_string(), Type::Any)).collect()
}

/// Compiles `put CLOSURE` and returns the closure op.
fn put_closure(names: &[&str], params: &[&str], body: Chunk) -> ChunkOp {
    compile(
        "t",
        "",
        &chunk(vec![simple("put", vec![closure(params, body)])]),
        &root(names),
    )
    .expect("compile failed")
}

fn first_closure(op: &ChunkOp) -> &ClosureOp {
    let form = op.forms().next().expect("no forms");
    match form.args.as_ref() {
        Some(ValuesOp::Spaced(args)) => args[0].as_closure().expect("not a closure"),
        other => panic!("unexpected args {other:?}"),
    }
}

fn capture_names(op: &ClosureOp) -> Vec<&str> {
    op.captures.keys().map(String::as_str).collect()
}

// =============================================================================
// Examples
// =============================================================================

#[test]
fn parameter_closure_captures_nothing() {
    let op = put_closure(&[], &["x"], chunk(vec![simple("echo", vec![var("x")])]));
    assert!(first_closure(&op).captures.is_empty());
}

#[test]
fn free_variable_is_captured_with_its_type() {
    let body = chunk(vec![simple("echo", vec![var("f")])]);
    let root = HashMap::from([("f".to_string(), Type::Closure)]);
    let op = compile(
        "t",
        "",
        &chunk(vec![simple("put", vec![closure(&[], body)])]),
        &root,
    )
    .unwrap();
    assert_eq!(first_closure(&op).captures.get("f"), Some(&Type::Closure));
}

#[test]
fn user_function_call_is_a_capture() {
    let body = chunk(vec![simple("greet", vec![])]);
    let root = HashMap::from([("fn-greet".to_string(), Type::Closure)]);
    let op = compile(
        "t",
        "",
        &chunk(vec![simple("put", vec![closure(&[], body)])]),
        &root,
    )
    .unwrap();
    assert_eq!(capture_names(first_closure(&op)), ["fn-greet"]);
}

#[test]
fn three_levels_deep() {
    let innermost = closure(&[], chunk(vec![simple("echo", vec![var("a"), var("b")])]));
    let middle = closure(&["b"], chunk(vec![simple("put", vec![innermost])]));
    let op = put_closure(&["a"], &[], chunk(vec![simple("put", vec![middle])]));

    // `b` is a parameter of the middle closure, so only `a` reaches the top.
    assert_eq!(capture_names(first_closure(&op)), ["a"]);
}

#[test]
fn del_then_reference_is_undefined() {
    let body = chunk(vec![
        simple("var", vec![word("t")]),
        simple("del", vec![word("t")]),
        simple("echo", vec![var("t")]),
    ]);
    let result = compile(
        "t",
        "",
        &chunk(vec![simple("put", vec![closure(&[], body)])]),
        &HashMap::new(),
    );
    assert!(result.is_err());
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn captures_are_exactly_the_free_references(
        bound in proptest::collection::btree_set("[a-m]{1,4}", 0..5),
        free in proptest::collection::btree_set("[n-z]{1,4}", 0..5),
    ) {
        let mut pipelines: Vec<_> = bound
            .iter()
            .map(|n| simple("var", vec![word(n), word("="), word("v")]))
            .collect();
        let refs = bound.iter().chain(free.iter()).map(|n| var(n)).collect();
        pipelines.push(simple("echo", refs));

        let names: Vec<&str> = free.iter().map(String::as_str).collect();
        let op = put_closure(&names, &[], chunk(pipelines));
        let captured: Vec<&str> = capture_names(first_closure(&op));
        prop_assert_eq!(captured, names);
    }

    #[test]
    fn shadow_decides_capture(reference_first in any::<bool>()) {
        let echo = simple("echo", vec![var("x")]);
        let decl = simple("var", vec![word("x"), word("="), word("v")]);
        let body = if reference_first {
            chunk(vec![echo, decl])
        } else {
            chunk(vec![decl, echo])
        };
        let op = put_closure(&["x"], &[], body);
        prop_assert_eq!(first_closure(&op).captures.contains_key("x"), reference_first);
    }
}

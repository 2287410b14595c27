//! Integration tests for closure values
//!
//! Compiles a closure literal and freezes it against runtime bindings.

use std::collections::HashMap;

use conch_foundation::{Callable, ErrorKind, Type, Value};
use conch_language::build::{chunk, closure, simple, var};
use conch_language::{Bindings, ChunkOp, ValuesOp, compile};

fn compiled(names: &[&str]) -> ChunkOp {
    let body = chunk(vec![simple("echo", vec![var("p"), var("greeting")])]);
    compile(
        "t",
        "",
        &chunk(vec![simple("put", vec![closure(&["p"], body)])]),
        &names.iter().map(|n| ((*n).to_string(), Type::Any)).collect(),
    )
    .unwrap()
}

fn closure_values_op(op: &ChunkOp) -> &ValuesOp {
    match op.forms().next().unwrap().args.as_ref() {
        Some(ValuesOp::Spaced(args)) => &args[0],
        other => panic!("unexpected args {other:?}"),
    }
}

/// Bindings that count lookups.
struct Counting {
    inner: HashMap<String, Value>,
    lookups: std::cell::Cell<usize>,
}

impl Bindings for Counting {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.lookups.set(self.lookups.get() + 1);
        self.inner.get(name).cloned()
    }
}

#[test]
fn freeze_reads_only_captured_names() {
    let op = compiled(&["greeting", "other"]);
    let closure_op = closure_values_op(&op).as_closure().unwrap();
    let bindings = Counting {
        inner: HashMap::from([
            ("greeting".to_string(), Value::string("hello")),
            ("other".to_string(), Value::string("unused")),
        ]),
        lookups: std::cell::Cell::new(0),
    };

    let closure = closure_op.freeze(&bindings).unwrap();
    assert_eq!(bindings.lookups.get(), 1);
    assert_eq!(closure.params(), ["p".to_string()]);
    assert_eq!(closure.captured().len(), 1);
}

#[test]
fn frozen_closure_becomes_a_value() {
    let op = compiled(&["greeting"]);
    let closure_op = closure_values_op(&op).as_closure().unwrap();
    let bindings = HashMap::from([("greeting".to_string(), Value::string("hi"))]);

    let value = closure_op.freeze(&bindings).unwrap().into_value();
    assert_eq!(value.value_type(), Type::Closure);
    assert_eq!(value, value.clone());
    assert_eq!(value.to_string(), "<closure>");
}

#[test]
fn freeze_without_binding_fails() {
    let op = compiled(&["greeting"]);
    let closure_op = closure_values_op(&op).as_closure().unwrap();
    let err = closure_op.freeze(&HashMap::new()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UndefinedVariable(ref n) if n == "greeting"));
}

//! Integration tests for the compiler
//!
//! Tests command resolution, argument compilation, sigils, and errors
//! through the public entry points.

use std::collections::HashMap;
use std::sync::Arc;

use conch_foundation::{ErrorKind, Type};
use conch_language::ast::Chunk;
use conch_language::build::{
    chunk, closure, cmd, form, pipeline, sigiled, simple, var, var_at, word,
};
use conch_language::{
    Builtins, ChunkOp, CommandKind, CompileOptions, Compiler, PortOp, PortSlot, RedirMode,
    UnsetPort, ValuesOp, compile,
};

fn kinds(op: &ChunkOp) -> Vec<CommandKind> {
    op.forms().map(|f| f.resolution.kind()).collect()
}

// =============================================================================
// Command Resolution
// =============================================================================

#[test]
fn user_function_shadows_builtin() {
    let root = HashMap::from([("fn-echo".to_string(), Type::Closure)]);
    let op = compile("t", "", &chunk(vec![simple("echo", vec![])]), &root).unwrap();
    assert_eq!(kinds(&op), [CommandKind::UserFunction]);
}

#[test]
fn special_beats_function_of_same_name() {
    let mut builtins = Builtins::standard();
    builtins.register_function("set");
    let op = Compiler::with_builtins(builtins)
        .compile(
            "t",
            "",
            &chunk(vec![simple("set", vec![word("x"), word("="), word("1")])]),
            &HashMap::from([("x".to_string(), Type::Any)]),
        )
        .unwrap();
    assert_eq!(kinds(&op), [CommandKind::BuiltinSpecial]);
}

#[test]
fn fn_defined_function_is_callable_later_in_the_script() {
    let script = chunk(vec![
        simple(
            "fn",
            vec![
                word("hello"),
                closure(&[], chunk(vec![simple("echo", vec![word("hi")])])),
            ],
        ),
        pipeline(vec![cmd("hello", vec![]), cmd("cat", vec![])]),
    ]);
    let op = compile("t", "", &script, &HashMap::new()).unwrap();
    assert_eq!(
        kinds(&op),
        [
            CommandKind::BuiltinSpecial,
            CommandKind::UserFunction,
            CommandKind::BuiltinFunction,
        ]
    );
}

#[test]
fn empty_registry_sends_everything_external() {
    let op = Compiler::with_builtins(Builtins::new())
        .compile(
            "t",
            "",
            &chunk(vec![simple("echo", vec![]), simple("var", vec![])]),
            &HashMap::new(),
        )
        .unwrap();
    assert_eq!(kinds(&op), [CommandKind::External, CommandKind::External]);
}

#[test]
fn closure_literal_command() {
    let script = chunk(vec![pipeline(vec![form(
        closure(&["a"], chunk(vec![simple("echo", vec![var("a")])])),
        vec![word("arg")],
    )])]);
    let op = compile("t", "", &script, &HashMap::new()).unwrap();
    assert_eq!(kinds(&op), [CommandKind::Closure]);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn first_error_wins() {
    let script = chunk(vec![
        simple("echo", vec![var_at("first", 5)]),
        simple("echo", vec![var_at("second", 20)]),
    ]);
    let err = compile("t", "", &script, &HashMap::new()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UndefinedVariable(ref n) if n == "first"));
    assert_eq!(err.offset(), Some(5));
}

#[test]
fn bad_command_word() {
    let script = chunk(vec![pipeline(vec![form(sigiled('@', "cmd"), vec![])])]);
    let err = compile("t", "", &script, &HashMap::new()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::BadCommand));
}

#[test]
fn error_context_names_the_script() {
    let text = "echo ok\necho $missing";
    let script = chunk(vec![
        simple("echo", vec![word("ok")]),
        simple("echo", vec![var_at("missing", 13)]),
    ]);
    let err = compile("demo.conch", text, &script, &HashMap::new()).unwrap_err();
    let ctx = err.context.unwrap();
    assert_eq!(ctx.position(), Some((2, 6)));
    assert!(format!("{ctx}").starts_with("at demo.conch:2:6"));
}

// =============================================================================
// Sigils
// =============================================================================

#[test]
fn sigil_versus_plain_word() {
    let op = compile(
        "t",
        "",
        &chunk(vec![simple("put", vec![sigiled('@', "foo"), word("foo")])]),
        &HashMap::new(),
    )
    .unwrap();
    let form = op.forms().next().unwrap();
    let Some(ValuesOp::Spaced(args)) = &form.args else {
        panic!("expected spaced args");
    };
    let capture = args[0].as_chan_capture().expect("sigil did not expand");
    assert_eq!(capture.stages[0].command.as_literal(), Some("@"));
    assert_eq!(args[1].as_literal(), Some("foo"));
}

#[test]
fn sigil_as_user_function() {
    let root = HashMap::from([("fn-@".to_string(), Type::Closure)]);
    let script = chunk(vec![simple("put", vec![sigiled('@', "x")])]);
    let op = compile("t", "", &script, &root).unwrap();
    let Some(ValuesOp::Spaced(args)) = &op.forms().next().unwrap().args else {
        panic!("expected spaced args");
    };
    let capture = args[0].as_chan_capture().unwrap();
    assert_eq!(capture.stages[0].resolution.kind(), CommandKind::UserFunction);
}

// =============================================================================
// Ports
// =============================================================================

#[test]
fn port_table_for_fd_two() {
    let f = cmd("echo", vec![]).redirect(conch_language::build::dup_fd(2, 1));
    let op = compile("t", "", &chunk(vec![pipeline(vec![f])]), &HashMap::new()).unwrap();
    let ports = &op.forms().next().unwrap().ports;
    assert_eq!(ports.len(), 3);
    assert!(matches!(ports.slot(1), PortSlot::Inherit));
    assert!(matches!(ports.get(2), Some(PortOp::Dup { old_fd: 1 })));
}

#[test]
fn ports_without_redirections_are_empty() {
    let op = compile("t", "", &chunk(vec![simple("echo", vec![])]), &HashMap::new()).unwrap();
    let ports = &op.forms().next().unwrap().ports;
    assert!(ports.is_empty());
    assert!(matches!(ports.slot(0), PortSlot::Inherit));
}

#[test]
fn close_policy_and_file_mode_are_configurable() {
    let compiler = Compiler::new().with_options(
        CompileOptions::default()
            .with_unset_ports(UnsetPort::Close)
            .with_file_mode(0o600),
    );
    let f = cmd("echo", vec![])
        .redirect(conch_language::build::close_fd(0))
        .redirect(conch_language::build::to_file(3, RedirMode::ReadWrite, word("f")));
    let op = compiler
        .compile("t", "", &chunk(vec![pipeline(vec![f])]), &HashMap::new())
        .unwrap();
    let ports = &op.forms().next().unwrap().ports;
    assert_eq!(ports.unset_policy(), UnsetPort::Close);
    assert!(matches!(ports.get(0), Some(PortOp::Close)));
    assert!(matches!(ports.slot(2), PortSlot::Close));
    assert!(matches!(
        ports.get(3),
        Some(PortOp::File { mode: RedirMode::ReadWrite, file_mode: 0o600, .. })
    ));
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn one_compiler_many_threads() {
    let compiler = Arc::new(Compiler::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let compiler = Arc::clone(&compiler);
            std::thread::spawn(move || {
                let name = format!("v{i}");
                let script: Chunk = chunk(vec![
                    simple("var", vec![word(&name), word("="), word("x")]),
                    simple("echo", vec![var(&name)]),
                ]);
                compiler.compile("t", "", &script, &HashMap::new()).map(|op| op.len())
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 2);
    }
}

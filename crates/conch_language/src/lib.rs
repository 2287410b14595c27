//! Compiler for the conch shell language.
//!
//! This crate provides:
//! - `ast` - Syntax tree produced by an external parser
//! - `Compiler` - Compiling syntax trees to op trees, with closure capture
//!   tracking and command resolution
//! - `Builtins` - Registries of special forms and builtin functions
//! - `op` and `port` - The op tree and the runtime contract for ports
//!   and closures

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod build;
pub mod builtins;
pub mod closure;
pub mod compiler;
pub mod op;
pub mod options;
pub mod port;
pub mod resolver;
pub mod scope;
pub mod span;
pub mod specials;

pub use ast::{Chunk, Compound, Form, Pipeline, Primary, PrimaryKind, Redir, RedirMode};
pub use builtins::{BuiltinFn, Builtins, SpecialForm, SpecialOp};
pub use closure::{Bindings, Closure};
pub use compiler::{CompileUnit, Compiler, compile};
pub use op::{ChunkOp, ClosureOp, FormOp, MAX_FD, PipelineOp, PortSlot, PortTable, ValuesOp};
pub use options::{CompileOptions, UnsetPort};
pub use port::{Port, PortEnv, PortOp, SharedFile, ValueChannel};
pub use resolver::{CommandKind, CommandResolution, Resolved};
pub use scope::{CaptureSet, ScopeStack};
pub use span::{Site, Span};

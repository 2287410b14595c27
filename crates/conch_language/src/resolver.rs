//! Command resolution.
//!
//! A literal command name resolves in strict priority order: a closure
//! bound to `fn-<name>`, then a builtin special form, then a builtin
//! function, and finally an external program looked up at runtime.
//! Closure-literal commands never reach the resolver.

use std::sync::Arc;

use tracing::trace;

use crate::builtins::{BuiltinFn, SpecialForm, SpecialOp};
use crate::compiler::CompileUnit;

/// Prefix of the variable that holds a user-defined function.
pub const FN_PREFIX: &str = "fn-";

/// The five ways a form can dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// A closure bound to `fn-<name>`.
    UserFunction,
    /// A builtin whose arguments it compiles itself.
    BuiltinSpecial,
    /// A builtin function.
    BuiltinFunction,
    /// The command word is a closure literal.
    Closure,
    /// An external program.
    External,
}

/// How a compiled form dispatches, with whatever the evaluator needs.
#[derive(Clone, Debug)]
pub enum CommandResolution {
    /// Call the closure bound to `fn-<name>`.
    UserFunction,
    /// Run a special form's precompiled sub-op.
    BuiltinSpecial {
        /// The special form.
        special: Arc<dyn SpecialForm>,
        /// What it compiled the form into.
        op: SpecialOp,
    },
    /// Call a builtin function.
    BuiltinFunction(BuiltinFn),
    /// Call the closure the command word evaluates to.
    Closure,
    /// Spawn an external program.
    External,
}

impl CommandResolution {
    /// The dispatch kind.
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::UserFunction => CommandKind::UserFunction,
            Self::BuiltinSpecial { .. } => CommandKind::BuiltinSpecial,
            Self::BuiltinFunction(_) => CommandKind::BuiltinFunction,
            Self::Closure => CommandKind::Closure,
            Self::External => CommandKind::External,
        }
    }
}

/// A command name after lookup, before any special form has compiled.
#[derive(Clone, Debug)]
pub enum Resolved {
    /// `fn-<name>` holds a closure.
    UserFunction,
    /// A registered special form.
    Special(Arc<dyn SpecialForm>),
    /// A registered builtin function.
    Function(BuiltinFn),
    /// Nothing matched.
    External,
}

impl Resolved {
    /// The dispatch kind this lookup leads to.
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::UserFunction => CommandKind::UserFunction,
            Self::Special(_) => CommandKind::BuiltinSpecial,
            Self::Function(_) => CommandKind::BuiltinFunction,
            Self::External => CommandKind::External,
        }
    }
}

impl CompileUnit<'_> {
    /// Resolves a literal command name.
    ///
    /// Looking up `fn-<name>` goes through the scope stack, so a user
    /// function defined in an enclosing closure is captured like any other
    /// free variable.
    pub fn resolve_command(&mut self, name: &str) -> Resolved {
        let fn_var = format!("{FN_PREFIX}{name}");
        let resolved = if self
            .resolve_variable(&fn_var)
            .is_some_and(|ty| ty.is_closure())
        {
            Resolved::UserFunction
        } else if let Some(special) = self.builtins.special(name) {
            Resolved::Special(Arc::clone(special))
        } else if let Some(function) = self.builtins.function(name) {
            Resolved::Function(function.clone())
        } else {
            Resolved::External
        };
        trace!(command = name, kind = ?resolved.kind(), "resolved command");
        resolved
    }
}

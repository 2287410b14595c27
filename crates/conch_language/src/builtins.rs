//! Builtin registries.
//!
//! The compiler only needs to know which names are special forms and which
//! are builtin functions; function bodies belong to the evaluator. Both
//! tables are filled before compilation and only read while compiling, so
//! one registry can serve any number of concurrent compile calls.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use conch_foundation::Result;

use crate::ast::Form;
use crate::compiler::CompileUnit;
use crate::op::ValuesOp;
use crate::specials;

/// Handle to a builtin function. The evaluator dispatches on `index`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BuiltinFn {
    /// Registered name.
    pub name: Arc<str>,
    /// Registration order.
    pub index: usize,
}

/// A command whose arguments are compiled by its own routine.
///
/// The implementation receives the raw form node and the active compile
/// unit. It validates its own syntax and may resolve, bind and unbind
/// names through the unit so capture tracking stays correct.
pub trait SpecialForm: fmt::Debug + Send + Sync {
    /// The command name this form is registered under.
    fn name(&self) -> &str;

    /// Compiles `form` into the form's sub-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the form's syntax is invalid or an operand
    /// fails to compile.
    fn compile(&self, unit: &mut CompileUnit<'_>, form: &Form) -> Result<SpecialOp>;
}

/// The sub-op a special form compiles to.
#[derive(Clone, Debug)]
pub struct SpecialOp {
    /// Name of the special form that produced it.
    pub form: String,
    /// Variable names the form assigns, declares or deletes.
    pub targets: Vec<String>,
    /// Compiled operands.
    pub operands: Vec<ValuesOp>,
}

/// Read-only lookup tables for special forms and builtin functions.
#[derive(Clone, Debug, Default)]
pub struct Builtins {
    specials: HashMap<String, Arc<dyn SpecialForm>>,
    functions: HashMap<String, BuiltinFn>,
}

impl Builtins {
    /// Creates empty registries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates registries holding the standard special forms and functions.
    #[must_use]
    pub fn standard() -> Self {
        let mut builtins = Self::new();
        for special in specials::standard() {
            builtins.register_special(special);
        }
        let functions = [
            "echo", "print", "put", "typeof", "ok", "failure", "each", "cat",
        ];
        for name in functions {
            builtins.register_function(name);
        }
        builtins
    }

    /// Registers a special form under its own name, replacing any previous one.
    pub fn register_special(&mut self, special: Arc<dyn SpecialForm>) {
        self.specials.insert(special.name().to_string(), special);
    }

    /// Registers a builtin function and returns its handle.
    ///
    /// Registering a name twice returns the existing handle.
    pub fn register_function(&mut self, name: &str) -> BuiltinFn {
        let index = self.functions.len();
        self.functions
            .entry(name.to_string())
            .or_insert_with(|| BuiltinFn {
                name: name.into(),
                index,
            })
            .clone()
    }

    /// Looks up a special form.
    #[must_use]
    pub fn special(&self, name: &str) -> Option<&Arc<dyn SpecialForm>> {
        self.specials.get(name)
    }

    /// Looks up a builtin function.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&BuiltinFn> {
        self.functions.get(name)
    }
}

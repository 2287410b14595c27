//! Standard special forms: `var`, `set`, `del` and `fn`.
//!
//! Each compiles its own argument syntax and talks to the scope stack
//! directly, which is why they cannot be ordinary builtin functions.

use std::sync::Arc;

use conch_foundation::{Error, Result, Type};

use crate::ast::{Compound, Form};
use crate::builtins::{SpecialForm, SpecialOp};
use crate::compiler::CompileUnit;
use crate::resolver::FN_PREFIX;

/// The standard special forms.
#[must_use]
pub fn standard() -> Vec<Arc<dyn SpecialForm>> {
    vec![Arc::new(Var), Arc::new(Set), Arc::new(Del), Arc::new(Function)]
}

/// Splits `names... = values...` at the first bare `=`.
fn split_assignment(args: &[Compound]) -> (&[Compound], Option<&[Compound]>) {
    match args.iter().position(|c| c.as_bare_string() == Some("=")) {
        Some(i) => (&args[..i], Some(&args[i + 1..])),
        None => (args, None),
    }
}

fn target_names(
    unit: &CompileUnit<'_>,
    form: &str,
    words: &[Compound],
) -> Result<Vec<String>> {
    words
        .iter()
        .map(|w| {
            w.as_bare_string().map(str::to_string).ok_or_else(|| {
                unit.error_at(
                    w.span,
                    Error::bad_special_form(form, "variable name must be a bare string"),
                )
            })
        })
        .collect()
}

/// `var NAME... [= VALUE...]`: declares variables in the current frame.
///
/// Values compile before the names are bound, so `var x = $x` reads an
/// enclosing `x`.
#[derive(Debug)]
pub struct Var;

impl SpecialForm for Var {
    fn name(&self) -> &str {
        "var"
    }

    fn compile(&self, unit: &mut CompileUnit<'_>, form: &Form) -> Result<SpecialOp> {
        let (names, values) = split_assignment(&form.args.compounds);
        let targets = target_names(unit, self.name(), names)?;
        if targets.is_empty() {
            return Err(unit.error_at(
                form.span,
                Error::bad_special_form(self.name(), "expected at least one name"),
            ));
        }

        let mut operands = Vec::new();
        if let Some(values) = values {
            operands.push(unit.compile_compounds(values)?);
        }

        // A name gets the closure type only when its value is visibly a
        // closure literal; anything else is unknown until runtime.
        let types: Vec<Type> = match values {
            Some(values) if values.len() == targets.len() => values
                .iter()
                .map(|v| {
                    if v.is_closure_literal() {
                        Type::Closure
                    } else {
                        Type::Any
                    }
                })
                .collect(),
            _ => vec![Type::Any; targets.len()],
        };
        for (name, ty) in targets.iter().zip(types) {
            unit.bind(name.clone(), ty);
        }

        Ok(SpecialOp {
            form: self.name().to_string(),
            targets,
            operands,
        })
    }
}

/// `set NAME... = VALUE...`: assigns existing variables.
#[derive(Debug)]
pub struct Set;

impl SpecialForm for Set {
    fn name(&self) -> &str {
        "set"
    }

    fn compile(&self, unit: &mut CompileUnit<'_>, form: &Form) -> Result<SpecialOp> {
        let (names, Some(values)) = split_assignment(&form.args.compounds) else {
            return Err(unit.error_at(
                form.span,
                Error::bad_special_form(self.name(), "expected `=`"),
            ));
        };
        let targets = target_names(unit, self.name(), names)?;
        if targets.is_empty() {
            return Err(unit.error_at(
                form.span,
                Error::bad_special_form(self.name(), "expected at least one name"),
            ));
        }
        for (name, word) in targets.iter().zip(names) {
            if unit.resolve_variable(name).is_none() {
                return Err(
                    unit.error_at(word.span, Error::undefined_variable(name.as_str()))
                );
            }
        }
        let operands = vec![unit.compile_compounds(values)?];

        Ok(SpecialOp {
            form: self.name().to_string(),
            targets,
            operands,
        })
    }
}

/// `del NAME...`: removes variables from the current frame.
#[derive(Debug)]
pub struct Del;

impl SpecialForm for Del {
    fn name(&self) -> &str {
        "del"
    }

    fn compile(&self, unit: &mut CompileUnit<'_>, form: &Form) -> Result<SpecialOp> {
        let words = &form.args.compounds;
        let targets = target_names(unit, self.name(), words)?;
        for (name, word) in targets.iter().zip(words) {
            if unit.unbind(name).is_none() {
                return Err(unit.error_at(
                    word.span,
                    Error::bad_special_form(
                        self.name(),
                        format!("${name} is not a local variable"),
                    ),
                ));
            }
        }

        Ok(SpecialOp {
            form: self.name().to_string(),
            targets,
            operands: Vec::new(),
        })
    }
}

/// `fn NAME {CLOSURE}`: binds a closure to `fn-NAME`.
///
/// The name is bound before the body compiles so the function can call
/// itself.
#[derive(Debug)]
pub struct Function;

impl SpecialForm for Function {
    fn name(&self) -> &str {
        "fn"
    }

    fn compile(&self, unit: &mut CompileUnit<'_>, form: &Form) -> Result<SpecialOp> {
        let [word, body] = form.args.compounds.as_slice() else {
            return Err(unit.error_at(
                form.span,
                Error::bad_special_form(self.name(), "expected a name and a closure"),
            ));
        };
        let Some(name) = word.as_bare_string() else {
            return Err(unit.error_at(
                word.span,
                Error::bad_special_form(self.name(), "function name must be a bare string"),
            ));
        };
        if !body.is_closure_literal() {
            return Err(unit.error_at(
                body.span,
                Error::bad_special_form(self.name(), "function body must be a closure"),
            ));
        }

        let var = format!("{FN_PREFIX}{name}");
        unit.bind(var.clone(), Type::Closure);
        let closure = unit.compile_compound(body)?;

        Ok(SpecialOp {
            form: self.name().to_string(),
            targets: vec![var],
            operands: vec![closure],
        })
    }
}

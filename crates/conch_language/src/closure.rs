//! Runtime closure values.
//!
//! A `ClosureOp` knows which names its body captured. Freezing it copies
//! the current value of each of those names out of the evaluator's
//! bindings, so later assignments in the enclosing scope are not seen by
//! the closure.

use std::collections::HashMap;
use std::sync::Arc;

use conch_foundation::{Callable, ConchMap, Error, Result, Value};
use tracing::trace;

use crate::op::ClosureOp;

/// Read access to the evaluator's current bindings.
pub trait Bindings {
    /// The current value of `name`, if bound.
    fn lookup(&self, name: &str) -> Option<Value>;
}

impl Bindings for HashMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// A closure value: compiled body plus frozen captures.
#[derive(Debug, Clone)]
pub struct Closure {
    /// The compiled literal.
    pub op: Arc<ClosureOp>,
    captured: ConchMap<Arc<str>, Value>,
}

impl Closure {
    /// Wraps this closure as a runtime value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Closure(Arc::new(self))
    }
}

impl Callable for Closure {
    fn params(&self) -> &[String] {
        &self.op.params
    }

    fn captured(&self) -> &ConchMap<Arc<str>, Value> {
        &self.captured
    }
}

impl ClosureOp {
    /// Creates a closure value by copying every captured binding.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedVariable` if a captured name has no value in
    /// `bindings`.
    pub fn freeze(self: &Arc<Self>, bindings: &impl Bindings) -> Result<Closure> {
        let captured = self
            .captures
            .keys()
            .map(|name| {
                let value = bindings.lookup(name).ok_or_else(|| {
                    Error::undefined_variable(name.as_str()).with_context(self.site.context())
                })?;
                Ok((Arc::from(name.as_str()), value))
            })
            .collect::<Result<ConchMap<Arc<str>, Value>>>()?;
        trace!(captures = captured.len(), "froze closure");
        Ok(Closure {
            op: Arc::clone(self),
            captured,
        })
    }
}

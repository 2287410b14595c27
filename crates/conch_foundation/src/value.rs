//! Runtime values exchanged between compiled ops and the evaluator.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::collections::{ConchMap, ConchVec};
use crate::types::Type;

/// A runtime value.
///
/// Values are immutable and cheap to clone; tables share structure through
/// persistent collections and closures are reference counted.
#[derive(Clone)]
pub enum Value {
    /// String value. Every bare word evaluates to one of these.
    String(Arc<str>),
    /// Boolean value.
    Bool(bool),
    /// Exit status of a command.
    Exitus(Exitus),
    /// Composite list + dict.
    Table(Table),
    /// A frozen closure.
    Closure(Arc<dyn Callable>),
}

/// Exit status of a pipeline stage.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Exitus {
    /// Success.
    Ok,
    /// Failure with a message.
    Failure(Arc<str>),
}

/// A table: an ordered list part plus an associative dict part.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Table {
    /// Positional elements.
    pub list: ConchVec<Value>,
    /// Keyed elements.
    pub dict: ConchMap<Value, Value>,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// A callable closure value.
///
/// Implemented by the language layer, which owns the compiled body; the
/// foundation only needs to see the frozen captures.
pub trait Callable: fmt::Debug + Send + Sync {
    /// Declared parameter names.
    fn params(&self) -> &[String];

    /// Captured bindings, frozen when the closure value was created.
    fn captured(&self) -> &ConchMap<Arc<str>, Value>;
}

impl Value {
    /// Creates a string value.
    #[must_use]
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Self::String(s.into())
    }

    /// Returns the type tag of this value.
    #[must_use]
    pub fn value_type(&self) -> Type {
        match self {
            Self::String(_) => Type::String,
            Self::Bool(_) => Type::Bool,
            Self::Exitus(_) => Type::Exitus,
            Self::Table(_) => Type::Table,
            Self::Closure(_) => Type::Closure,
        }
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a closure.
    #[must_use]
    pub fn as_closure(&self) -> Option<&Arc<dyn Callable>> {
        match self {
            Self::Closure(c) => Some(c),
            _ => None,
        }
    }
}

// Closures compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Exitus(a), Self::Exitus(b)) => a == b,
            (Self::Table(a), Self::Table(b)) => a == b,
            (Self::Closure(a), Self::Closure(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::String(s) => s.hash(state),
            Self::Bool(b) => b.hash(state),
            Self::Exitus(e) => e.hash(state),
            Self::Table(t) => t.hash(state),
            Self::Closure(c) => Arc::as_ptr(c).cast::<()>().hash(state),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Exitus(e) => write!(f, "{e:?}"),
            Self::Table(t) => write!(f, "{t:?}"),
            Self::Closure(c) => write!(f, "{c:?}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Exitus(Exitus::Ok) => write!(f, "ok"),
            Self::Exitus(Exitus::Failure(msg)) => write!(f, "failure: {msg}"),
            Self::Table(t) => {
                write!(f, "[")?;
                let mut first = true;
                for item in t.list.iter() {
                    if !first {
                        write!(f, " ")?;
                    }
                    first = false;
                    write!(f, "{item}")?;
                }
                for (k, v) in t.dict.iter() {
                    if !first {
                        write!(f, " ")?;
                    }
                    first = false;
                    write!(f, "&{k} {v}")?;
                }
                write!(f, "]")
            }
            Self::Closure(_) => write!(f, "<closure>"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Self::Table(t)
    }
}

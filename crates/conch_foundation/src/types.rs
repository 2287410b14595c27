//! Value type tags.
//!
//! The compiler only compares tags by identity; it never looks inside a
//! value. The one question it asks is whether a binding holds a closure.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tag describing what kind of value a binding or expression produces.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Type {
    /// A string.
    String,
    /// A boolean.
    Bool,
    /// An exit status (ok, or a failure with a message).
    Exitus,
    /// A composite list + dict table.
    Table,
    /// A callable closure.
    Closure,
    /// Statically unknown; any value may be stored.
    Any,
}

impl Type {
    /// Returns true if this type is `Closure`.
    ///
    /// Command resolution treats a `fn-<name>` binding as a user function
    /// only when this holds.
    #[must_use]
    pub const fn is_closure(&self) -> bool {
        matches!(self, Self::Closure)
    }

    /// Returns the lowercase name used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Exitus => "exitus",
            Self::Table => "table",
            Self::Closure => "closure",
            Self::Any => "any",
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

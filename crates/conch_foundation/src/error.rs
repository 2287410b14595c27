//! Error types for conch.
//!
//! Uses `thiserror` for the error kinds. Compile errors carry the script
//! name, the raw source and a byte offset so a driver can point at the
//! offending text.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::types::Type;

/// The main error type for conch operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an undefined variable error.
    #[must_use]
    pub fn undefined_variable(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UndefinedVariable(name.into()))
    }

    /// Creates a bad command word error.
    #[must_use]
    pub fn bad_command() -> Self {
        Self::new(ErrorKind::BadCommand)
    }

    /// Creates a special form syntax error.
    #[must_use]
    pub fn bad_special_form(form: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadSpecialForm {
            form: form.into(),
            message: message.into(),
        })
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: Type, actual: Type) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates a bad redirection error for `fd`.
    #[must_use]
    pub fn bad_redirection(fd: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRedirection {
            fd,
            message: message.into(),
        })
    }

    /// Returns the byte offset recorded in the context, if any.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        self.context.as_ref().and_then(|ctx| ctx.offset)
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A variable was referenced but is bound in no visible frame.
    #[error("undefined variable ${0}")]
    UndefinedVariable(String),

    /// The command word is neither a single literal string nor a closure.
    #[error("command must be a string or closure")]
    BadCommand,

    /// A special form rejected its own syntax.
    #[error("{form}: {message}")]
    BadSpecialForm {
        /// The special form name.
        form: String,
        /// What was wrong.
        message: String,
    },

    /// An expression that must reduce to one string produced a different
    /// number of values.
    #[error("{what} must be a single string, got {count} values")]
    NotSingleString {
        /// What the value was used for (e.g. "filename").
        what: String,
        /// How many values were produced.
        count: usize,
    },

    /// A value had the wrong type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: Type,
        /// The actual type encountered.
        actual: Type,
    },

    /// A redirection duplicated a descriptor that has no port.
    #[error("bad file descriptor {0}")]
    UndefinedPort(usize),

    /// A file could not be opened for redirection.
    #[error("failed to open file {path:?}: {message}")]
    Io {
        /// The path that was opened.
        path: String,
        /// The underlying I/O error message.
        message: String,
    },

    /// A redirection names a descriptor the port table cannot hold.
    #[error("bad redirection of fd {fd}: {message}")]
    BadRedirection {
        /// The descriptor as written.
        fd: usize,
        /// What was wrong.
        message: String,
    },
}

/// Context about where an error occurred.
///
/// Line and column are not stored; they are derived from `text` and
/// `offset` when displayed.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Script name.
    pub source: Option<String>,
    /// Full source text of the script.
    pub text: Option<Arc<str>>,
    /// Byte offset into `text`.
    pub offset: Option<usize>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the script name.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the source text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<Arc<str>>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the byte offset.
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns the 1-based line and column of `offset` in `text`.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        let text = self.text.as_deref()?;
        let offset = self.offset?.min(text.len());
        let before = text.get(..offset)?;
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Some((line, column))
    }

    /// Returns the full source line containing `offset`.
    #[must_use]
    pub fn source_line(&self) -> Option<&str> {
        let text = self.text.as_deref()?;
        let offset = self.offset?.min(text.len());
        let start = text.get(..offset)?.rfind('\n').map_or(0, |i| i + 1);
        let end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
        Some(&text[start..end])
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
            match (self.position(), self.offset) {
                (Some((line, col)), _) => write!(f, ":{line}:{col}")?,
                (None, Some(offset)) => write!(f, " (offset {offset})")?,
                (None, None) => {}
            }
        }
        if let (Some(line), Some((_, col))) = (self.source_line(), self.position()) {
            writeln!(f)?;
            writeln!(f, "  {line}")?;
            write!(f, "  {:>width$}", "^", width = col)?;
        }
        Ok(())
    }
}

//! Source location tracking.
//!
//! `Span` records the byte range a syntax node covers in the script text.
//! Diagnostics only need the start offset; line and column are derived
//! from the text when an error is rendered.
//!
//! `Site` ties a span to the script it came from. Ops that can fail at
//! runtime keep one so their errors render like compile errors.

use std::sync::Arc;

use conch_foundation::ErrorContext;

/// A span of source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub struct Span {
    /// Byte offset where this span starts.
    pub start: usize,
    /// Byte offset where this span ends (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Creates an empty span at `pos`.
    #[must_use]
    pub const fn at(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Creates a span covering the range from this span to another.
    #[must_use]
    pub fn to(self, other: Self) -> Self {
        Self {
            start: self.start,
            end: other.end,
        }
    }

    /// Returns the length of this span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if this span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the text this span covers in the given source.
    ///
    /// Returns `None` if the span is out of range for `source`.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start..self.end)
    }
}

/// A span in a named script.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Site {
    /// Script name.
    pub script: Arc<str>,
    /// Full script text.
    pub text: Arc<str>,
    /// Location within `text`.
    pub span: Span,
}

impl Site {
    /// Creates a site.
    #[must_use]
    pub fn new(script: impl Into<Arc<str>>, text: impl Into<Arc<str>>, span: Span) -> Self {
        Self {
            script: script.into(),
            text: text.into(),
            span,
        }
    }

    /// Error context pointing at the start of this site.
    #[must_use]
    pub fn context(&self) -> ErrorContext {
        ErrorContext::new()
            .with_source(&*self.script)
            .with_text(Arc::clone(&self.text))
            .with_offset(self.span.start)
    }
}

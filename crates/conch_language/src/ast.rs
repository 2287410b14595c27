//! Syntax tree consumed by the compiler.
//!
//! The parser lives outside this crate; these types are the boundary it
//! produces. Every node category is a closed type, so the compiler's
//! dispatch over node kinds is an exhaustive `match`.

use crate::span::Span;

/// A sequence of pipelines executed in source order.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Chunk {
    /// The pipelines, in source order.
    pub pipelines: Vec<Pipeline>,
    /// Source span.
    pub span: Span,
}

/// Forms whose outputs feed the inputs of the next form.
#[derive(Clone, Debug, PartialEq)]
pub struct Pipeline {
    /// The stages, in source order.
    pub forms: Vec<Form>,
    /// Source span.
    pub span: Span,
}

/// One pipeline stage: a command, its arguments and its redirections.
#[derive(Clone, Debug, PartialEq)]
pub struct Form {
    /// The command word.
    pub command: Compound,
    /// Space-separated arguments.
    pub args: Spaced,
    /// Redirections, in source order.
    pub redirs: Vec<Redir>,
    /// Source span.
    pub span: Span,
}

/// How a filename redirection opens its file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RedirMode {
    /// `<`: read only.
    Read,
    /// `>`: write, creating or truncating.
    Write,
    /// `>>`: write, creating or appending.
    Append,
    /// `<>`: read and write, creating.
    ReadWrite,
}

/// A redirection attached to a form.
#[derive(Clone, Debug, PartialEq)]
pub enum Redir {
    /// `fd>&-`: close the descriptor.
    Close {
        /// Target descriptor.
        fd: usize,
        /// Source span.
        span: Span,
    },
    /// `fd>&old_fd`: duplicate an existing descriptor.
    Fd {
        /// Target descriptor.
        fd: usize,
        /// Descriptor being copied.
        old_fd: usize,
        /// Source span.
        span: Span,
    },
    /// `fd>filename` and friends.
    File {
        /// Target descriptor.
        fd: usize,
        /// How to open the file.
        mode: RedirMode,
        /// Expression producing the filename.
        filename: Compound,
        /// Source span.
        span: Span,
    },
}

impl Redir {
    /// Returns the descriptor this redirection configures.
    #[must_use]
    pub const fn fd(&self) -> usize {
        match self {
            Self::Close { fd, .. } | Self::Fd { fd, .. } | Self::File { fd, .. } => *fd,
        }
    }

    /// Returns the source span of this redirection.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Close { span, .. } | Self::Fd { span, .. } | Self::File { span, .. } => *span,
        }
    }
}

/// Space-separated compound words.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Spaced {
    /// The words.
    pub compounds: Vec<Compound>,
    /// Source span.
    pub span: Span,
}

/// A word built by concatenating subscript expressions, optionally
/// prefixed by a sigil.
#[derive(Clone, Debug, PartialEq)]
pub struct Compound {
    /// Leading sigil character; `None` means the word is unsigiled.
    pub sigil: Option<char>,
    /// The concatenated parts.
    pub subscripts: Vec<Subscript>,
    /// Source span.
    pub span: Span,
}

impl Compound {
    /// Returns the primary if this word is exactly one unindexed primary.
    #[must_use]
    pub fn single_primary(&self) -> Option<&Primary> {
        match self.subscripts.as_slice() {
            [Subscript {
                left, right: None, ..
            }] => Some(left),
            _ => None,
        }
    }

    /// Returns the literal text if this word is one bare string.
    #[must_use]
    pub fn as_bare_string(&self) -> Option<&str> {
        if self.sigil.is_some() {
            return None;
        }
        match &self.single_primary()?.kind {
            PrimaryKind::String(text) => Some(text),
            _ => None,
        }
    }

    /// Returns true if this word is exactly one closure literal.
    #[must_use]
    pub fn is_closure_literal(&self) -> bool {
        self.sigil.is_none()
            && matches!(
                self.single_primary().map(|p| &p.kind),
                Some(PrimaryKind::Closure(_))
            )
    }
}

/// A primary optionally indexed by a compound: `left[right]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Subscript {
    /// The value being indexed.
    pub left: Primary,
    /// The index, if any.
    pub right: Option<Compound>,
    /// Source span.
    pub span: Span,
}

/// An atomic expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Primary {
    /// What kind of primary this is.
    pub kind: PrimaryKind,
    /// Source span.
    pub span: Span,
}

/// The kinds of primary expression.
#[derive(Clone, Debug, PartialEq)]
pub enum PrimaryKind {
    /// Bare or quoted string.
    String(String),
    /// `$name`.
    Variable(String),
    /// `[a b &k v]`.
    Table(TableNode),
    /// `{|params| body}`.
    Closure(ClosureNode),
    /// `(a b c)`: a space-separated list spliced into the word.
    List(Spaced),
    /// `(cmd | cmd)`: the pipeline's output channel becomes the value.
    ChanCapture(Pipeline),
    /// `?(cmd | cmd)`: the pipeline's exit statuses become the value.
    StatusCapture(Pipeline),
}

/// Table literal contents.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct TableNode {
    /// Positional elements.
    pub list: Vec<Compound>,
    /// Key/value pairs.
    pub dict: Vec<(Compound, Compound)>,
}

/// Closure literal.
#[derive(Clone, Debug, PartialEq)]
pub struct ClosureNode {
    /// Declared parameter names.
    pub params: Vec<String>,
    /// Body.
    pub chunk: Chunk,
    /// Source span.
    pub span: Span,
}

//! Terse constructors for syntax trees.
//!
//! Drivers that synthesize code (and tests) use these instead of spelling
//! out every node. Spans default to empty; the `*_at` variants take the
//! byte offset diagnostics should point at.

use crate::ast::{
    Chunk, ClosureNode, Compound, Form, Pipeline, Primary, PrimaryKind, Redir, RedirMode, Spaced,
    Subscript, TableNode,
};
use crate::span::Span;

/// A chunk of pipelines.
#[must_use]
pub fn chunk(pipelines: Vec<Pipeline>) -> Chunk {
    Chunk {
        pipelines,
        span: Span::default(),
    }
}

/// A pipeline of forms.
#[must_use]
pub fn pipeline(forms: Vec<Form>) -> Pipeline {
    Pipeline {
        forms,
        span: Span::default(),
    }
}

/// A form with an arbitrary command word.
#[must_use]
pub fn form(command: Compound, args: Vec<Compound>) -> Form {
    Form {
        command,
        args: spaced(args),
        redirs: Vec::new(),
        span: Span::default(),
    }
}

/// A form whose command is a bare name.
#[must_use]
pub fn cmd(name: &str, args: Vec<Compound>) -> Form {
    form(word(name), args)
}

/// A single-form pipeline `name args...`, the common case.
#[must_use]
pub fn simple(name: &str, args: Vec<Compound>) -> Pipeline {
    pipeline(vec![cmd(name, args)])
}

/// Space-separated words.
#[must_use]
pub fn spaced(compounds: Vec<Compound>) -> Spaced {
    Spaced {
        compounds,
        span: Span::default(),
    }
}

/// A string primary.
#[must_use]
pub fn string(text: &str) -> Primary {
    primary(PrimaryKind::String(text.to_string()), Span::default())
}

/// A variable primary.
#[must_use]
pub fn variable(name: &str) -> Primary {
    variable_at(name, 0)
}

/// A variable primary at `pos`.
#[must_use]
pub fn variable_at(name: &str, pos: usize) -> Primary {
    primary(
        PrimaryKind::Variable(name.to_string()),
        Span::new(pos, pos + name.len() + 1),
    )
}

/// A table primary.
#[must_use]
pub fn table(list: Vec<Compound>, dict: Vec<(Compound, Compound)>) -> Primary {
    primary(PrimaryKind::Table(TableNode { list, dict }), Span::default())
}

/// A list primary.
#[must_use]
pub fn list(compounds: Vec<Compound>) -> Primary {
    primary(PrimaryKind::List(spaced(compounds)), Span::default())
}

/// A closure primary.
#[must_use]
pub fn closure_primary(params: &[&str], body: Chunk) -> Primary {
    primary(
        PrimaryKind::Closure(ClosureNode {
            params: params.iter().map(|p| (*p).to_string()).collect(),
            chunk: body,
            span: Span::default(),
        }),
        Span::default(),
    )
}

/// An output-capture primary.
#[must_use]
pub fn chan_capture(p: Pipeline) -> Primary {
    primary(PrimaryKind::ChanCapture(p), Span::default())
}

/// A status-capture primary.
#[must_use]
pub fn status_capture(p: Pipeline) -> Primary {
    primary(PrimaryKind::StatusCapture(p), Span::default())
}

fn primary(kind: PrimaryKind, span: Span) -> Primary {
    Primary { kind, span }
}

/// A word made of concatenated primaries.
#[must_use]
pub fn concat(primaries: Vec<Primary>) -> Compound {
    Compound {
        sigil: None,
        subscripts: primaries.into_iter().map(|p| index(p, None)).collect(),
        span: Span::default(),
    }
}

/// A word made of one primary.
#[must_use]
pub fn single(p: Primary) -> Compound {
    let span = p.span;
    Compound {
        span,
        ..concat(vec![p])
    }
}

/// A bare string word.
#[must_use]
pub fn word(text: &str) -> Compound {
    single(string(text))
}

/// A `$name` word.
#[must_use]
pub fn var(name: &str) -> Compound {
    single(variable(name))
}

/// A `$name` word at `pos`.
#[must_use]
pub fn var_at(name: &str, pos: usize) -> Compound {
    single(variable_at(name, pos))
}

/// A closure literal word.
#[must_use]
pub fn closure(params: &[&str], body: Chunk) -> Compound {
    single(closure_primary(params, body))
}

/// A word with a leading sigil.
#[must_use]
pub fn sigiled(sigil: char, text: &str) -> Compound {
    Compound {
        sigil: Some(sigil),
        ..word(text)
    }
}

/// `left[right]`, or just `left` when `right` is `None`.
#[must_use]
pub fn index(left: Primary, right: Option<Compound>) -> Subscript {
    let span = left.span;
    Subscript { left, right, span }
}

/// A word that indexes `left` by `right`.
#[must_use]
pub fn indexed(left: Primary, right: Compound) -> Compound {
    Compound {
        sigil: None,
        subscripts: vec![index(left, Some(right))],
        span: Span::default(),
    }
}

/// `fd>&-`
#[must_use]
pub fn close_fd(fd: usize) -> Redir {
    Redir::Close {
        fd,
        span: Span::default(),
    }
}

/// `fd>&old_fd`
#[must_use]
pub fn dup_fd(fd: usize, old_fd: usize) -> Redir {
    Redir::Fd {
        fd,
        old_fd,
        span: Span::default(),
    }
}

/// `fd>filename` with the given mode.
#[must_use]
pub fn to_file(fd: usize, mode: RedirMode, filename: Compound) -> Redir {
    Redir::File {
        fd,
        mode,
        filename,
        span: Span::default(),
    }
}

impl Form {
    /// Adds a redirection.
    #[must_use]
    pub fn redirect(mut self, redir: Redir) -> Self {
        self.redirs.push(redir);
        self
    }
}

//! Executable op tree.
//!
//! The compiler's output is a tree of immutable ops. There are four
//! shapes: values ops produce a sequence of values, form ops are one
//! pipeline stage, port ops produce a descriptor binding, and chunk and
//! pipeline ops sequence stages. Ops hold only what execution needs; no
//! op points back into the syntax tree or the scope stack.
//!
//! The `combine_*` and `make_*` functions are the only place ops are
//! assembled.

use std::sync::Arc;

use conch_foundation::{Error, Result};

use crate::options::UnsetPort;
use crate::port::PortOp;
use crate::resolver::CommandResolution;
use crate::scope::CaptureSet;
use crate::span::{Site, Span};

/// An op producing an ordered sequence of values.
#[derive(Clone, Debug)]
pub enum ValuesOp {
    /// A constant string.
    Literal(Arc<str>),
    /// The current value of a binding.
    Variable {
        /// Binding name.
        name: String,
        /// Where the reference appears.
        span: Span,
    },
    /// Positional concatenation of the parts of a word.
    Compound(Vec<ValuesOp>),
    /// The values of each element, one after another.
    Spaced(Vec<ValuesOp>),
    /// Builds a table from a list part and key/value pairs.
    Table {
        /// Positional elements.
        list: Box<ValuesOp>,
        /// Key/value pairs.
        pairs: Vec<(ValuesOp, ValuesOp)>,
        /// Source span.
        span: Span,
    },
    /// Freezes captured bindings into a closure value.
    Closure(Arc<ClosureOp>),
    /// Indexes the left value by the right value.
    Subscript {
        /// Value being indexed.
        left: Box<ValuesOp>,
        /// Index or key.
        right: Box<ValuesOp>,
        /// Span of the indexed value.
        left_span: Span,
        /// Span of the index.
        right_span: Span,
    },
    /// Runs a pipeline and collects its output channel.
    ChanCapture(Box<PipelineOp>),
    /// Runs a pipeline and yields its exit statuses.
    StatusCapture(Box<PipelineOp>),
}

impl ValuesOp {
    /// Returns the text if this op is a constant string.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the pipeline if this op captures a pipeline's output.
    #[must_use]
    pub fn as_chan_capture(&self) -> Option<&PipelineOp> {
        match self {
            Self::ChanCapture(p) => Some(p),
            _ => None,
        }
    }

    /// Returns the closure op if this op creates a closure.
    #[must_use]
    pub fn as_closure(&self) -> Option<&Arc<ClosureOp>> {
        match self {
            Self::Closure(c) => Some(c),
            _ => None,
        }
    }
}

/// A compiled closure literal.
#[derive(Clone, Debug)]
pub struct ClosureOp {
    /// Declared parameter names.
    pub params: Vec<String>,
    /// Compiled body.
    pub body: ChunkOp,
    /// Free variables to freeze when the closure value is created.
    pub captures: CaptureSet,
    /// Where the literal appears.
    pub site: Site,
}

/// Highest descriptor a redirection may name.
pub const MAX_FD: usize = 255;

/// Descriptor overrides for one form, indexed by fd.
#[derive(Clone, Debug, Default)]
pub struct PortTable {
    ports: Vec<Option<PortOp>>,
    unset: UnsetPort,
}

/// What a descriptor resolves to for one form.
#[derive(Clone, Copy, Debug)]
pub enum PortSlot<'a> {
    /// The form redirects this descriptor.
    Override(&'a PortOp),
    /// Use the enclosing context's stream.
    Inherit,
    /// The descriptor is closed.
    Close,
}

impl PortTable {
    /// Creates a table with no overrides.
    #[must_use]
    pub fn empty(unset: UnsetPort) -> Self {
        Self {
            ports: Vec::new(),
            unset,
        }
    }

    /// Number of slots (highest redirected fd + 1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Returns true if the form redirects nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// The explicit override for `fd`, if any.
    #[must_use]
    pub fn get(&self, fd: usize) -> Option<&PortOp> {
        self.ports.get(fd).and_then(Option::as_ref)
    }

    /// The policy applied to unconfigured slots.
    #[must_use]
    pub fn unset_policy(&self) -> UnsetPort {
        self.unset
    }

    /// Resolves `fd` for this form.
    ///
    /// Unconfigured slots inside the table follow the unset policy;
    /// descriptors beyond the table are always inherited.
    #[must_use]
    pub fn slot(&self, fd: usize) -> PortSlot<'_> {
        match self.ports.get(fd) {
            Some(Some(op)) => PortSlot::Override(op),
            Some(None) => match self.unset {
                UnsetPort::Inherit => PortSlot::Inherit,
                UnsetPort::Close => PortSlot::Close,
            },
            None => PortSlot::Inherit,
        }
    }
}

/// One pipeline stage: the evaluator's state-updates op.
#[derive(Clone, Debug)]
pub struct FormOp {
    /// Produces the command value (name or closure).
    pub command: ValuesOp,
    /// Produces the arguments; absent for special forms.
    pub args: Option<ValuesOp>,
    /// Descriptor overrides.
    pub ports: PortTable,
    /// How the command dispatches.
    pub resolution: CommandResolution,
    /// Source span.
    pub span: Span,
}

/// Stages run concurrently, stdout of each feeding stdin of the next.
#[derive(Clone, Debug)]
pub struct PipelineOp {
    /// The stages, in source order.
    pub stages: Vec<FormOp>,
    /// Source span.
    pub span: Span,
}

/// Pipelines run one after another.
#[derive(Clone, Debug, Default)]
pub struct ChunkOp {
    /// The pipelines, in source order.
    pub pipelines: Vec<PipelineOp>,
}

impl ChunkOp {
    /// Number of pipelines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// Returns true if the chunk has no pipelines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Iterates over every form in every pipeline.
    pub fn forms(&self) -> impl Iterator<Item = &FormOp> {
        self.pipelines.iter().flat_map(|p| p.stages.iter())
    }
}

/// A constant string.
#[must_use]
pub fn make_string(text: &str) -> ValuesOp {
    ValuesOp::Literal(text.into())
}

/// A read of the binding `name`.
#[must_use]
pub fn make_var(name: &str, span: Span) -> ValuesOp {
    ValuesOp::Variable {
        name: name.to_string(),
        span,
    }
}

/// Sequences pipelines.
#[must_use]
pub fn combine_chunk(pipelines: Vec<PipelineOp>) -> ChunkOp {
    ChunkOp { pipelines }
}

/// Wraps a compiled body and its captures into a closure-producing op.
#[must_use]
pub fn combine_closure(
    params: Vec<String>,
    body: ChunkOp,
    captures: CaptureSet,
    site: Site,
) -> ClosureOp {
    ClosureOp {
        params,
        body,
        captures,
        site,
    }
}

/// Chains stages into a pipeline.
#[must_use]
pub fn combine_pipeline(stages: Vec<FormOp>, span: Span) -> PipelineOp {
    PipelineOp { stages, span }
}

/// Assembles one pipeline stage.
#[must_use]
pub fn combine_form(
    command: ValuesOp,
    args: Option<ValuesOp>,
    ports: PortTable,
    resolution: CommandResolution,
    span: Span,
) -> FormOp {
    FormOp {
        command,
        args,
        ports,
        resolution,
        span,
    }
}

/// Builds a port table sized to the highest redirected fd + 1.
///
/// A later redirection of the same fd replaces an earlier one.
///
/// # Errors
///
/// Returns `BadRedirection` if a descriptor is above [`MAX_FD`].
pub fn combine_ports(redirs: Vec<(usize, PortOp)>, unset: UnsetPort) -> Result<PortTable> {
    let mut len = 0;
    for &(fd, _) in &redirs {
        if fd > MAX_FD {
            return Err(Error::bad_redirection(
                fd,
                format!("fd must be at most {MAX_FD}"),
            ));
        }
        len = len.max(fd + 1);
    }
    let mut ports = vec![None; len];
    for (fd, op) in redirs {
        ports[fd] = Some(op);
    }
    Ok(PortTable { ports, unset })
}

/// Splices the values of several ops.
#[must_use]
pub fn combine_spaced(ops: Vec<ValuesOp>) -> ValuesOp {
    ValuesOp::Spaced(ops)
}

/// Concatenates the parts of a word; a one-part word is just that part.
#[must_use]
pub fn combine_compound(mut ops: Vec<ValuesOp>) -> ValuesOp {
    if ops.len() == 1 {
        if let Some(op) = ops.pop() {
            return op;
        }
    }
    ValuesOp::Compound(ops)
}

/// Indexes `left` by `right`.
#[must_use]
pub fn combine_subscript(
    left: ValuesOp,
    right: ValuesOp,
    left_span: Span,
    right_span: Span,
) -> ValuesOp {
    ValuesOp::Subscript {
        left: Box::new(left),
        right: Box::new(right),
        left_span,
        right_span,
    }
}

/// Builds a table.
#[must_use]
pub fn combine_table(list: ValuesOp, pairs: Vec<(ValuesOp, ValuesOp)>, span: Span) -> ValuesOp {
    ValuesOp::Table {
        list: Box::new(list),
        pairs,
        span,
    }
}

/// Collects a pipeline's output channel as values.
#[must_use]
pub fn combine_chan_capture(pipeline: PipelineOp) -> ValuesOp {
    ValuesOp::ChanCapture(Box::new(pipeline))
}

/// Yields a pipeline's exit statuses as values.
#[must_use]
pub fn combine_status_capture(pipeline: PipelineOp) -> ValuesOp {
    ValuesOp::StatusCapture(Box::new(pipeline))
}

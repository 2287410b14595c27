//! Compiler from syntax tree to op tree.
//!
//! `Compiler` holds what outlives a single call: the builtin registry and
//! the options. Everything that changes while compiling (the scope stack
//! and capture sets) lives in a `CompileUnit` created at the top of each
//! call and dropped at the end, so one `Compiler` can be shared freely.
//!
//! Compilation stops at the first error. Errors carry the script name,
//! the source text and the byte offset of the offending node.

use std::collections::HashMap;
use std::sync::Arc;

use conch_foundation::{Error, Result, Type};
use tracing::{debug, trace};

use crate::ast::{
    Chunk, ClosureNode, Compound, Form, Pipeline, Primary, PrimaryKind, Redir, Spaced, Subscript,
};
use crate::builtins::Builtins;
use crate::op::{
    ChunkOp, ClosureOp, FormOp, MAX_FD, PipelineOp, PortTable, ValuesOp, combine_chan_capture,
    combine_chunk, combine_closure, combine_compound, combine_form, combine_pipeline,
    combine_ports, combine_spaced, combine_status_capture, combine_subscript, combine_table,
    make_string, make_var,
};
use crate::options::CompileOptions;
use crate::port::PortOp;
use crate::resolver::{CommandResolution, Resolved};
use crate::scope::{CaptureSet, ScopeStack};
use crate::span::{Site, Span};

/// Compiles syntax trees against a fixed builtin registry and options.
#[derive(Clone, Debug)]
pub struct Compiler {
    builtins: Builtins,
    options: CompileOptions,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// Creates a compiler with the standard builtins and default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_builtins(Builtins::standard())
    }

    /// Creates a compiler with a custom builtin registry.
    #[must_use]
    pub fn with_builtins(builtins: Builtins) -> Self {
        Self {
            builtins,
            options: CompileOptions::default(),
        }
    }

    /// Builder method to set the options.
    #[must_use]
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// The builtin registry.
    #[must_use]
    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    /// The options.
    #[must_use]
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compiles a chunk.
    ///
    /// `name` and `text` are only used for diagnostics. `root` holds the
    /// names visible before the script runs; references to them are not
    /// captures.
    ///
    /// # Errors
    ///
    /// Returns the first user error found: an undefined variable, a bad
    /// command word or a special form rejecting its syntax.
    pub fn compile(
        &self,
        name: &str,
        text: &str,
        chunk: &Chunk,
        root: &HashMap<String, Type>,
    ) -> Result<ChunkOp> {
        debug!(script = name, pipelines = chunk.pipelines.len(), "compiling");
        let mut unit = CompileUnit::new(name, text, &self.builtins, &self.options, root.clone());
        let op = unit.compile_chunk(chunk)?;
        debug!(script = name, forms = op.forms().count(), "compiled");
        Ok(op)
    }
}

/// Compiles a chunk with the standard builtins and default options.
///
/// # Errors
///
/// See [`Compiler::compile`].
pub fn compile(
    name: &str,
    text: &str,
    chunk: &Chunk,
    root: &HashMap<String, Type>,
) -> Result<ChunkOp> {
    Compiler::new().compile(name, text, chunk, root)
}

/// State for one compile call.
///
/// Special forms receive the unit so they can compile operands and manage
/// bindings themselves.
#[derive(Debug)]
pub struct CompileUnit<'a> {
    script: Arc<str>,
    text: Arc<str>,
    pub(crate) builtins: &'a Builtins,
    options: &'a CompileOptions,
    scopes: ScopeStack,
}

impl<'a> CompileUnit<'a> {
    /// Creates a unit whose root frame holds `root`.
    #[must_use]
    pub fn new(
        name: &str,
        text: &str,
        builtins: &'a Builtins,
        options: &'a CompileOptions,
        root: HashMap<String, Type>,
    ) -> Self {
        Self {
            script: name.into(),
            text: text.into(),
            builtins,
            options,
            scopes: ScopeStack::new(root),
        }
    }

    /// The options in effect.
    #[must_use]
    pub fn options(&self) -> &CompileOptions {
        self.options
    }

    /// Resolves a variable, recording a capture if it comes from an
    /// enclosing closure frame.
    pub fn resolve_variable(&mut self, name: &str) -> Option<Type> {
        self.scopes.resolve(name)
    }

    /// Binds `name` in the innermost frame.
    pub fn bind(&mut self, name: impl Into<String>, ty: Type) {
        self.scopes.bind(name, ty);
    }

    /// Removes `name` from the innermost frame, returning its type.
    pub fn unbind(&mut self, name: &str) -> Option<Type> {
        self.scopes.unbind(name)
    }

    /// Returns true if `name` is bound in the innermost frame.
    #[must_use]
    pub fn has_local(&self, name: &str) -> bool {
        self.scopes.has_local(name)
    }

    /// Captures recorded so far by the closure being compiled.
    #[must_use]
    pub fn captures(&self) -> &CaptureSet {
        self.scopes.captures()
    }

    /// `span` located in this script.
    #[must_use]
    pub fn site(&self, span: Span) -> Site {
        Site::new(Arc::clone(&self.script), Arc::clone(&self.text), span)
    }

    /// Attaches this script's location to `err`, unless it already has one.
    #[must_use]
    pub fn error_at(&self, span: Span, err: Error) -> Error {
        if err.context.is_some() {
            return err;
        }
        err.with_context(self.site(span).context())
    }

    /// Compiles pipelines in the current frame.
    ///
    /// # Errors
    ///
    /// Propagates the first error from any pipeline.
    pub fn compile_chunk(&mut self, chunk: &Chunk) -> Result<ChunkOp> {
        let pipelines = chunk
            .pipelines
            .iter()
            .map(|p| self.compile_pipeline(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(combine_chunk(pipelines))
    }

    /// Compiles a closure body in a fresh frame.
    ///
    /// Returns the closure op and the names it captured. The caller decides
    /// whether to re-offer those names to its own frame.
    ///
    /// # Errors
    ///
    /// Propagates the first error in the body.
    pub fn compile_closure(&mut self, node: &ClosureNode) -> Result<(ClosureOp, CaptureSet)> {
        self.scopes.push();
        for param in &node.params {
            self.scopes.bind(param.clone(), Type::Any);
        }
        let body = self.compile_chunk(&node.chunk);
        let captures = self.scopes.pop().unwrap_or_default();
        let body = body?;
        trace!(
            params = node.params.len(),
            captures = captures.len(),
            "compiled closure"
        );
        let op = combine_closure(
            node.params.clone(),
            body,
            captures.clone(),
            self.site(node.span),
        );
        Ok((op, captures))
    }

    /// Compiles the stages of a pipeline.
    ///
    /// # Errors
    ///
    /// Propagates the first error from any stage.
    pub fn compile_pipeline(&mut self, pipeline: &Pipeline) -> Result<PipelineOp> {
        let stages = pipeline
            .forms
            .iter()
            .map(|f| self.compile_form(f))
            .collect::<Result<Vec<_>>>()?;
        Ok(combine_pipeline(stages, pipeline.span))
    }

    /// Compiles one form.
    ///
    /// The command word is checked and compiled first, then redirections,
    /// then arguments (or the special form's own syntax).
    ///
    /// # Errors
    ///
    /// Returns `BadCommand` if the command word is neither a bare string
    /// nor a closure literal, and propagates errors from redirections,
    /// arguments and special forms.
    pub fn compile_form(&mut self, form: &Form) -> Result<FormOp> {
        if form.command.is_closure_literal() {
            let command = self.compile_compound(&form.command)?;
            let ports = self.compile_redirs(&form.redirs)?;
            let args = self.compile_spaced(&form.args)?;
            return Ok(combine_form(
                command,
                Some(args),
                ports,
                CommandResolution::Closure,
                form.span,
            ));
        }

        let Some(name) = form.command.as_bare_string() else {
            return Err(self.error_at(form.command.span, Error::bad_command()));
        };
        let command = make_string(name);
        let resolved = self.resolve_command(name);
        let ports = self.compile_redirs(&form.redirs)?;
        let (args, resolution) = match resolved {
            Resolved::Special(special) => {
                let op = special.compile(self, form)?;
                (None, CommandResolution::BuiltinSpecial { special, op })
            }
            Resolved::UserFunction => (
                Some(self.compile_spaced(&form.args)?),
                CommandResolution::UserFunction,
            ),
            Resolved::Function(function) => (
                Some(self.compile_spaced(&form.args)?),
                CommandResolution::BuiltinFunction(function),
            ),
            Resolved::External => (
                Some(self.compile_spaced(&form.args)?),
                CommandResolution::External,
            ),
        };
        Ok(combine_form(command, args, ports, resolution, form.span))
    }

    fn compile_redirs(&mut self, redirs: &[Redir]) -> Result<PortTable> {
        let ports = redirs
            .iter()
            .map(|r| self.compile_redir(r))
            .collect::<Result<Vec<_>>>()?;
        combine_ports(ports, self.options.unset_ports)
    }

    /// Compiles a redirection into the fd it configures and its port op.
    ///
    /// # Errors
    ///
    /// Returns `BadRedirection` if either descriptor is above [`MAX_FD`],
    /// and propagates errors from the filename expression.
    pub fn compile_redir(&mut self, redir: &Redir) -> Result<(usize, PortOp)> {
        let old_fd = match redir {
            Redir::Fd { old_fd, .. } => Some(*old_fd),
            _ => None,
        };
        if let Some(fd) = std::iter::once(redir.fd())
            .chain(old_fd)
            .find(|fd| *fd > MAX_FD)
        {
            return Err(self.error_at(
                redir.span(),
                Error::bad_redirection(fd, format!("fd must be at most {MAX_FD}")),
            ));
        }

        let op = match redir {
            Redir::Close { .. } => PortOp::Close,
            Redir::Fd { old_fd, .. } => PortOp::Dup { old_fd: *old_fd },
            Redir::File {
                mode,
                filename,
                span,
                ..
            } => PortOp::File {
                filename: self.compile_compound(filename)?,
                mode: *mode,
                file_mode: self.options.file_mode,
                site: self.site(*span),
            },
        };
        Ok((redir.fd(), op))
    }

    /// Compiles words into one op that yields all their values in order.
    ///
    /// # Errors
    ///
    /// Propagates the first error from any word.
    pub fn compile_compounds(&mut self, compounds: &[Compound]) -> Result<ValuesOp> {
        let ops = compounds
            .iter()
            .map(|c| self.compile_compound(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(combine_spaced(ops))
    }

    /// Compiles space-separated words.
    ///
    /// # Errors
    ///
    /// Propagates the first error from any word.
    pub fn compile_spaced(&mut self, spaced: &Spaced) -> Result<ValuesOp> {
        self.compile_compounds(&spaced.compounds)
    }

    /// Compiles a word, expanding its sigil if it has one.
    ///
    /// A sigiled word `@foo` becomes the output of running the command
    /// named `@` with the word's value as its only argument.
    ///
    /// # Errors
    ///
    /// Propagates errors from the word's parts. A sigil that names a
    /// special form is a `BadSpecialForm` error.
    pub fn compile_compound(&mut self, compound: &Compound) -> Result<ValuesOp> {
        let parts = compound
            .subscripts
            .iter()
            .map(|s| self.compile_subscript(s))
            .collect::<Result<Vec<_>>>()?;
        let value = combine_compound(parts);
        match compound.sigil {
            None => Ok(value),
            Some(sigil) => self.expand_sigil(sigil, value, compound.span),
        }
    }

    fn expand_sigil(&mut self, sigil: char, value: ValuesOp, span: Span) -> Result<ValuesOp> {
        let name = sigil.to_string();
        let resolution = match self.resolve_command(&name) {
            Resolved::Special(special) => {
                return Err(self.error_at(
                    span,
                    Error::bad_special_form(special.name(), "cannot be used as a sigil"),
                ));
            }
            Resolved::UserFunction => CommandResolution::UserFunction,
            Resolved::Function(function) => CommandResolution::BuiltinFunction(function),
            Resolved::External => CommandResolution::External,
        };
        trace!(%sigil, kind = ?resolution.kind(), "expanded sigil");
        let stage = combine_form(
            make_string(&name),
            Some(value),
            PortTable::empty(self.options.unset_ports),
            resolution,
            span,
        );
        Ok(combine_chan_capture(combine_pipeline(vec![stage], span)))
    }

    /// Compiles `left[right]`, or just `left` when there is no index.
    ///
    /// # Errors
    ///
    /// Propagates errors from either side.
    pub fn compile_subscript(&mut self, subscript: &Subscript) -> Result<ValuesOp> {
        let left = self.compile_primary(&subscript.left)?;
        match &subscript.right {
            None => Ok(left),
            Some(right) => {
                let index = self.compile_compound(right)?;
                Ok(combine_subscript(left, index, subscript.left.span, right.span))
            }
        }
    }

    /// Compiles a primary expression.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedVariable` for a name bound in no visible frame,
    /// and propagates errors from nested nodes.
    pub fn compile_primary(&mut self, primary: &Primary) -> Result<ValuesOp> {
        match &primary.kind {
            PrimaryKind::String(text) => Ok(make_string(text)),
            PrimaryKind::Variable(name) => {
                if self.resolve_variable(name).is_none() {
                    return Err(
                        self.error_at(primary.span, Error::undefined_variable(name.as_str()))
                    );
                }
                Ok(make_var(name, primary.span))
            }
            PrimaryKind::Table(table) => {
                let list = self.compile_compounds(&table.list)?;
                let pairs = table
                    .dict
                    .iter()
                    .map(|(k, v)| Ok((self.compile_compound(k)?, self.compile_compound(v)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(combine_table(list, pairs, primary.span))
            }
            PrimaryKind::Closure(node) => {
                let (op, captures) = self.compile_closure(node)?;
                self.scopes.inherit(&captures);
                Ok(ValuesOp::Closure(Arc::new(op)))
            }
            PrimaryKind::List(spaced) => self.compile_spaced(spaced),
            PrimaryKind::ChanCapture(pipeline) => {
                Ok(combine_chan_capture(self.compile_pipeline(pipeline)?))
            }
            PrimaryKind::StatusCapture(pipeline) => {
                Ok(combine_status_capture(self.compile_pipeline(pipeline)?))
            }
        }
    }
}

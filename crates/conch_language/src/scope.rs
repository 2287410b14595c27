//! Lexical scope stack with capture tracking.
//!
//! Frame 0 holds the caller-supplied root bindings and is never popped.
//! Every closure being compiled gets its own frame, and each frame keeps
//! the set of names it resolved from an enclosing frame. Popping a frame
//! hands that set back to the caller, which decides what to re-export.

use std::collections::{BTreeMap, HashMap};

use conch_foundation::Type;
use tracing::trace;

/// Names a closure body resolved in an enclosing frame, with their types.
pub type CaptureSet = BTreeMap<String, Type>;

#[derive(Debug, Default)]
struct Frame {
    bindings: HashMap<String, Type>,
    captures: CaptureSet,
}

/// Stack of binding frames.
#[derive(Debug)]
pub struct ScopeStack {
    root: Frame,
    inner: Vec<Frame>,
}

impl ScopeStack {
    /// Creates a stack whose root frame holds `root`.
    #[must_use]
    pub fn new(root: HashMap<String, Type>) -> Self {
        Self {
            root: Frame {
                bindings: root,
                captures: CaptureSet::new(),
            },
            inner: Vec::new(),
        }
    }

    /// Index of the innermost frame (0 when only the root is present).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.inner.len()
    }

    /// Pushes an empty frame.
    pub fn push(&mut self) {
        self.inner.push(Frame::default());
    }

    /// Pops the innermost frame and returns what it captured.
    ///
    /// The root frame cannot be popped; `None` is returned instead.
    pub fn pop(&mut self) -> Option<CaptureSet> {
        self.inner.pop().map(|frame| frame.captures)
    }

    /// Binds `name` in the innermost frame.
    pub fn bind(&mut self, name: impl Into<String>, ty: Type) {
        self.innermost_mut().bindings.insert(name.into(), ty);
    }

    /// Removes `name` from the innermost frame.
    pub fn unbind(&mut self, name: &str) -> Option<Type> {
        self.innermost_mut().bindings.remove(name)
    }

    /// Returns true if `name` is bound in the innermost frame.
    #[must_use]
    pub fn has_local(&self, name: &str) -> bool {
        self.innermost().bindings.contains_key(name)
    }

    /// Looks `name` up from the innermost frame outwards.
    ///
    /// A hit in any frame other than the innermost one is recorded in the
    /// innermost frame's capture set.
    pub fn resolve(&mut self, name: &str) -> Option<Type> {
        let depth = self.depth();
        let (index, ty) = self
            .inner
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, frame)| frame.bindings.get(name).map(|ty| (i + 1, *ty)))
            .or_else(|| self.root.bindings.get(name).map(|ty| (0, *ty)))?;

        if index < depth {
            trace!(variable = name, from = index, into = depth, "captured");
            self.innermost_mut().captures.insert(name.to_string(), ty);
        }
        Some(ty)
    }

    /// Re-offers a nested closure's captures to the innermost frame.
    ///
    /// Names bound locally here satisfy the requirement and are dropped;
    /// everything else becomes a capture of this frame too.
    pub fn inherit(&mut self, captured: &CaptureSet) {
        let frame = self.innermost_mut();
        for (name, ty) in captured {
            if !frame.bindings.contains_key(name) {
                frame.captures.insert(name.clone(), *ty);
            }
        }
    }

    /// The innermost frame's capture set so far.
    #[must_use]
    pub fn captures(&self) -> &CaptureSet {
        &self.innermost().captures
    }

    fn innermost(&self) -> &Frame {
        self.inner.last().unwrap_or(&self.root)
    }

    fn innermost_mut(&mut self) -> &mut Frame {
        self.inner.last_mut().unwrap_or(&mut self.root)
    }
}

//! Compiler configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What an unredirected descriptor below the highest redirected one means.
///
/// A form redirecting only fd 2 gets a port table of length 3; slots 0 and
/// 1 carry no override and this policy tells the evaluator what to do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum UnsetPort {
    /// Use the stream the enclosing context provides.
    #[default]
    Inherit,
    /// Treat the descriptor as closed.
    Close,
}

/// Options for one compile call.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompileOptions {
    /// Policy for port table slots with no redirection.
    pub unset_ports: UnsetPort,
    /// Permission bits for files created by redirections.
    pub file_mode: u32,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            unset_ports: UnsetPort::Inherit,
            file_mode: 0o644,
        }
    }
}

impl CompileOptions {
    /// Builder method to set the unset-port policy.
    #[must_use]
    pub fn with_unset_ports(mut self, policy: UnsetPort) -> Self {
        self.unset_ports = policy;
        self
    }

    /// Builder method to set the file creation mode.
    #[must_use]
    pub fn with_file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }
}

//! Core types, values, and persistent collections for conch.
//!
//! This crate provides:
//! - [`Type`] - Value type tags consulted by the compiler
//! - [`Value`] - Runtime values passed between ops and the evaluator
//! - [`Error`] - Rich error types with source context
//! - Persistent collections ([`ConchVec`], [`ConchMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod collections;
mod error;
mod types;
mod value;

pub use collections::{ConchMap, ConchVec};
pub use error::{Error, ErrorContext, ErrorKind};
pub use types::Type;
pub use value::{Callable, Exitus, Table, Value};

/// Result type alias using conch's Error.
pub type Result<T> = std::result::Result<T, Error>;

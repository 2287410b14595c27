//! Conch - compiler core for an interactive shell language
//!
//! This crate re-exports all layers of the conch system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 1: conch_language   : Syntax tree, scopes, command resolution, op compiler
//! Layer 0: conch_foundation : Core types (Type, Value, Error)
//! ```

pub use conch_foundation as foundation;
pub use conch_language as language;

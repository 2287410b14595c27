//! Integration tests for Layer 1: Language
//!
//! Tests for the compiler, capture tracking, closures, and ports.

mod captures;
mod closures;
mod compiler;

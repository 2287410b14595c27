//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Type, Value, Error, and persistent collections.

mod collections;
mod values;

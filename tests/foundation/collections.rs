//! Integration tests for persistent collections
//!
//! Tests ConchVec and ConchMap with structural sharing and immutability.

use conch_foundation::{ConchMap, ConchVec, Value};

// =============================================================================
// ConchVec
// =============================================================================

#[test]
fn vector_empty() {
    let v: ConchVec<Value> = ConchVec::new();
    assert!(v.is_empty());
    assert_eq!(v.len(), 0);
}

#[test]
fn vector_push_back_leaves_original() {
    let empty = ConchVec::new();
    let one = empty.push_back(Value::string("a"));
    let two = one.push_back(Value::string("b"));

    assert!(empty.is_empty());
    assert_eq!(one.len(), 1);
    assert_eq!(two.get(1), Some(&Value::string("b")));
    assert_eq!(two.get(2), None);
}

#[test]
fn vector_from_iter_preserves_order() {
    let v: ConchVec<&str> = ["x", "y", "z"].into_iter().collect();
    let items: Vec<&str> = v.iter().copied().collect();
    assert_eq!(items, ["x", "y", "z"]);
}

// =============================================================================
// ConchMap
// =============================================================================

#[test]
fn map_insert_leaves_original() {
    let empty: ConchMap<&str, i32> = ConchMap::new();
    let one = empty.insert("a", 1);
    let replaced = one.insert("a", 2);

    assert!(empty.is_empty());
    assert_eq!(one.get(&"a"), Some(&1));
    assert_eq!(replaced.get(&"a"), Some(&2));
    assert_eq!(replaced.len(), 1);
}

#[test]
fn map_equality_ignores_insertion_order() {
    let a: ConchMap<&str, i32> = [("x", 1), ("y", 2)].into_iter().collect();
    let b: ConchMap<&str, i32> = [("y", 2), ("x", 1)].into_iter().collect();
    assert_eq!(a, b);
    assert!(a.contains_key(&"y"));
    assert!(!a.contains_key(&"z"));
}

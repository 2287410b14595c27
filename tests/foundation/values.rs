//! Integration tests for Value types
//!
//! Tests Value variants, equality, hashing, display, and type tags.

use std::collections::HashSet;

use conch_foundation::{ConchMap, ConchVec, Exitus, Table, Type, Value};

// =============================================================================
// Value Construction
// =============================================================================

#[test]
fn value_string() {
    let v = Value::string("hello");
    assert_eq!(v.as_str(), Some("hello"));
    assert_eq!(v.value_type(), Type::String);
    assert_eq!(v, Value::from("hello"));
    assert_eq!(v, Value::from("hello".to_string()));
}

#[test]
fn value_types() {
    assert_eq!(Value::from(true).value_type(), Type::Bool);
    assert_eq!(Value::Exitus(Exitus::Ok).value_type(), Type::Exitus);
    assert_eq!(Value::from(Table::new()).value_type(), Type::Table);
}

// =============================================================================
// Tables
// =============================================================================

#[test]
fn table_display() {
    let t = Table {
        list: [Value::string("a"), Value::string("b")].into_iter().collect(),
        dict: ConchMap::new().insert(Value::string("k"), Value::string("v")),
    };
    assert_eq!(format!("{}", Value::from(t)), "[a b &k v]");
}

#[test]
fn copied_table_shares_until_extended() {
    let empty = Table::new();
    let mut one = empty.clone();
    one.list = one.list.push_back(Value::string("x"));
    assert!(empty.list.is_empty());
    assert_eq!(one.list.len(), 1);
    assert_ne!(Value::from(empty), Value::from(one));
}

#[test]
fn tables_with_reordered_dicts_are_equal() {
    let a = Table {
        list: ConchVec::new(),
        dict: [("x", "1"), ("y", "2")]
            .into_iter()
            .map(|(k, v)| (Value::from(k), Value::from(v)))
            .collect(),
    };
    let b = Table {
        list: ConchVec::new(),
        dict: [("y", "2"), ("x", "1")]
            .into_iter()
            .map(|(k, v)| (Value::from(k), Value::from(v)))
            .collect(),
    };
    let mut set = HashSet::new();
    set.insert(Value::from(a));
    set.insert(Value::from(b));
    assert_eq!(set.len(), 1);
}

#[test]
fn values_hash_by_content() {
    let mut set = HashSet::new();
    set.insert(Value::string("a"));
    set.insert(Value::string("a"));
    set.insert(Value::from(Table {
        list: [Value::string("a")].into_iter().collect(),
        dict: ConchMap::new(),
    }));
    assert_eq!(set.len(), 2);
}

// =============================================================================
// Type Tags
// =============================================================================

#[test]
fn only_closures_resolve_as_functions() {
    assert!(Type::Closure.is_closure());
    assert!(!Type::Any.is_closure());
}

#[test]
fn type_display() {
    assert_eq!(format!("{}", Type::Exitus), "exitus");
    assert_eq!(format!("{:?}", Type::Closure), "closure");
}

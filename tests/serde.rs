//! Serialization of guarded containers as their contents

#![cfg(feature = "serde")]

use bulwark::prelude::*;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

#[test]
fn guarded_map_serializes_as_a_map() {
    let mut ports = GuardedMap::builder(BTreeMap::new())
        .value_transformer(parse::<u16>())
        .value_predicate(greater_than(0u16))
        .build()
        .unwrap();
    ports.put("http", "80").unwrap();
    ports.put("https", "443").unwrap();

    let value = serde_json::to_value(&ports).unwrap();
    assert_eq!(value, json!({ "http": 80, "https": 443 }));
}

#[test]
fn guarded_collection_serializes_as_a_sequence() {
    let mut tags = GuardedCollection::builder(BTreeSet::new())
        .transformer(from_fn(|s: &str| s.trim().to_lowercase()))
        .predicate(|s: &String| !s.is_empty())
        .build()
        .unwrap();
    tags.add_all(["  Rust ", "serde", "RUST"]).unwrap();

    let text = serde_json::to_string(&tags).unwrap();
    assert_eq!(text, r#"["rust","serde"]"#);
}

#[test]
fn composite_serializes_its_union() {
    let low: BTreeSet<u8> = [1, 2].into_iter().collect();
    let high: BTreeSet<u8> = [3].into_iter().collect();
    let union = CompositeSet::with_delegates([low, high]).unwrap();

    let value = serde_json::to_value(&union).unwrap();
    assert_eq!(value, json!([1, 2, 3]));
}

#[test]
fn validation_error_serializes_role_element_and_reason() {
    let mut evens = GuardedCollection::predicated(
        BTreeSet::new(),
        named("must be even", |n: &i32| n % 2 == 0),
    )
    .unwrap();

    let err = match evens.add(7) {
        Err(GuardError::Validation(err)) => err,
        other => panic!("expected a validation error, got {:?}", other),
    };

    let value = serde_json::to_value(&err).unwrap();
    assert_eq!(
        value,
        json!({ "role": "member", "element": "7", "reason": "must be even" })
    );
}

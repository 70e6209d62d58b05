//! End-to-end scenarios for guarded maps, collections and composites

use bulwark::prelude::*;
use bulwark::store::{Bounded, CapacityError};
use bulwark::{assert_accepted, assert_rejected, WrapError};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

// Values of mixed kinds, as a loosely typed config map would hold.
#[derive(Debug, Clone, PartialEq)]
enum Value {
    Text(String),
    Int(i64),
}

fn text_only() -> GuardedMap<HashMap<String, Value>> {
    GuardedMap::predicated(HashMap::new(), always(), |v: &Value| {
        matches!(v, Value::Text(_))
    })
    .unwrap()
}

#[test]
fn scenario_value_must_be_text() {
    let mut map = text_only();

    assert_eq!(map.put("A".to_string(), Value::Text("a".into())), Ok(None));
    assert_eq!(map.get(&"A".to_string()), Some(&Value::Text("a".into())));

    let err = map.put("B".to_string(), Value::Int(3)).unwrap_err();
    let validation = err.as_validation().expect("validation error");
    assert_eq!(validation.role(), Role::Value);
    assert_eq!(validation.element(), "Int(3)");

    assert_eq!(map.len(), 1);
    assert!(!map.contains_key(&"B".to_string()));
}

#[test]
fn scenario_value_must_be_text_through_entries() {
    let mut map = text_only();
    map.put("A".to_string(), Value::Text("a".into())).unwrap();

    for mut entry in map.iter_mut() {
        assert_rejected!(entry.set_value(Value::Int(1)), Role::Value);
        assert_accepted!(entry.set_value(Value::Text("b".into())));
    }
    assert_eq!(map.get(&"A".to_string()), Some(&Value::Text("b".into())));
}

#[test]
fn scenario_key_parsed_to_integer() {
    let mut map = GuardedMap::builder(BTreeMap::new())
        .key_transformer(parse::<i32>())
        .build()
        .unwrap();

    map.put("1", "one").unwrap();
    assert!(map.contains_key(&1));
    assert_eq!(map.get(&1), Some(&"one"));

    let err = map.put("x", "ex").unwrap_err();
    match err {
        GuardError::Transform(t) => {
            assert_eq!(t.role(), Some(Role::Key));
            assert!(t.message().contains("\"x\""));
        }
        other => panic!("expected a transform error, got {:?}", other),
    }
    assert_eq!(map.len(), 1);
}

#[test]
fn scenario_composite_membership() {
    let a: HashSet<i32> = [1, 2].into_iter().collect();
    let b: HashSet<i32> = [3, 4].into_iter().collect();
    let union = CompositeSet::with_delegates([a, b]).unwrap();

    assert!(union.contains(&3));
    assert!(!union.contains(&5));
    assert_eq!(union.len(), 4);
}

#[test]
fn rewrapping_a_transformed_store_accepts_everything() {
    let mut first = GuardedMap::builder(BTreeMap::new())
        .key_transformer(from_fn(|s: &str| s.to_lowercase()))
        .key_predicate(|k: &String| k.chars().all(char::is_lowercase))
        .build()
        .unwrap();
    first.put_all(vec![("Alpha", 1), ("BETA", 2)]).unwrap();

    let store = first.into_inner();
    let second = GuardedMap::builder(store)
        .key_predicate(|k: &String| k.chars().all(char::is_lowercase))
        .build_transforming()
        .unwrap();
    assert_eq!(second.len(), 2);
}

#[test]
fn wrapping_an_invalid_store_returns_it() {
    let mut seed = HashMap::new();
    seed.insert("ok".to_string(), Value::Text("fine".into()));
    seed.insert("bad".to_string(), Value::Int(0));
    seed.insert("worse".to_string(), Value::Int(-1));

    let err: WrapError<_, _> = GuardedMap::predicated(seed, always(), |v: &Value| {
        matches!(v, Value::Text(_))
    })
    .unwrap_err();

    match err.error() {
        GuardError::Rejected(rejections) => {
            assert_eq!(rejections.len(), 2);
            assert!(rejections.iter().all(|r| r.role() == Role::Value));
        }
        other => panic!("expected rejections, got {:?}", other),
    }
    assert_eq!(err.into_store().len(), 3);
}

#[test]
fn store_errors_pass_through_unchanged() {
    let mut set = GuardedCollection::predicated(Bounded::new(BTreeSet::new(), 1), always())
        .unwrap();
    set.add(1).unwrap();

    let err = set.add(2).unwrap_err();
    let capacity: &CapacityError = err.as_delegate().expect("store error");
    assert_eq!(capacity.capacity(), 1);
    assert_eq!(err.to_string(), "store is full (capacity 1)");
}

#[test]
fn guarded_composite_with_strategy() {
    let low: BTreeSet<u8> = (0..5).collect();
    let high: BTreeSet<u8> = (5..10).collect();
    let union = CompositeSet::with_delegates([low, high])
        .unwrap()
        .with_strategy(PreferIncoming);

    let mut digits = GuardedCollection::builder(union)
        .transformer(from_fn(|c: char| c.to_digit(10).map_or(u8::MAX, |d| d as u8)))
        .predicate(less_than(10))
        .build()
        .unwrap();

    assert_eq!(digits.add('7'), Ok(false));
    assert_rejected!(digits.add('x'));

    let mut extra = BTreeSet::new();
    extra.insert(4);
    extra.insert(42);
    let mut union = digits.into_inner();
    union.add_composited(extra).unwrap();

    assert!(!union.delegates()[0].contains(&4));
    assert!(union.delegates()[2].contains(&4));
    assert_eq!(union.len(), 11);
}

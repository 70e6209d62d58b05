//! Property-based tests for guarded maps and collections

#![cfg(feature = "proptest")]

use bulwark::prelude::*;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

fn even_values() -> GuardedMap<BTreeMap<i32, i32>> {
    GuardedMap::predicated(BTreeMap::new(), always(), |v: &i32| v % 2 == 0).unwrap()
}

proptest! {
    #[test]
    fn prop_rejected_put_leaves_map_unchanged(
        seed in prop::collection::btree_map(any::<i32>(), any::<i32>().prop_map(|v| v & !1), 0..20),
        key in any::<i32>(),
        odd in any::<i32>().prop_map(|v| v | 1),
    ) {
        let mut map = even_values();
        for (k, v) in &seed {
            map.put(*k, *v).unwrap();
        }
        let before = map.store().clone();

        let err = map.put(key, odd).unwrap_err();
        prop_assert!(err.is_validation());
        prop_assert_eq!(map.store(), &before);
    }

    #[test]
    fn prop_accepted_item_is_stored_transformed(items in prop::collection::vec("[a-zA-Z]{1,8}", 0..20)) {
        let mut set = GuardedCollection::builder(BTreeSet::new())
            .transformer(from_fn(|s: String| s.to_uppercase()))
            .build()
            .unwrap();

        for item in &items {
            set.add(item.clone()).unwrap();
            prop_assert!(set.contains(&item.to_uppercase()));
        }
    }

    #[test]
    fn prop_put_all_with_one_bad_entry_stores_nothing(
        good in prop::collection::vec((any::<i32>(), any::<i32>().prop_map(|v| v & !1)), 0..20),
        bad_at in any::<prop::sample::Index>(),
    ) {
        let mut entries = good;
        let position = bad_at.index(entries.len() + 1);
        entries.insert(position, (0, 1));

        let mut map = even_values();
        prop_assert!(map.put_all(entries).is_err());
        prop_assert!(map.is_empty());
    }

    #[test]
    fn prop_rewrap_of_valid_store_succeeds(
        items in prop::collection::btree_set(0u16..1000, 0..50),
        policy in any::<BulkPolicy>(),
    ) {
        let mut guarded = GuardedCollection::builder(BTreeSet::new())
            .predicate(less_than(1000u16))
            .bulk_policy(policy)
            .build()
            .unwrap();
        guarded.add_all(items.iter().copied()).unwrap();

        let rewrapped = GuardedCollection::predicated(guarded.into_inner(), less_than(1000u16)).unwrap();
        prop_assert_eq!(rewrapped.len(), items.len());
    }

    #[test]
    fn prop_bulk_rollback_restores_set(
        seed in prop::collection::btree_set(0u8..50, 0..5),
        batch in prop::collection::vec(0u8..100, 0..20),
    ) {
        let capacity = 8;
        let store = bulwark::store::Bounded::new(seed.clone(), capacity);
        let mut set = GuardedCollection::builder(store)
            .bulk_policy(BulkPolicy::Rollback)
            .build()
            .unwrap();

        match set.add_all(batch) {
            Ok(_) => prop_assert!(set.len() <= capacity),
            Err(_) => prop_assert_eq!(set.store().get_ref(), &seed),
        }
    }
}

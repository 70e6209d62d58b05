//! Testing utilities for guarded containers
//!
//! Assertion macros for the results of guarded operations and, with the
//! `proptest` feature, strategies for property tests.
//!
//! # Assertion Macros
//!
//! ```rust
//! use bulwark::{assert_accepted, assert_rejected, GuardedCollection, Role};
//! use std::collections::BTreeSet;
//!
//! let mut evens = GuardedCollection::predicated(BTreeSet::new(), |n: &i32| n % 2 == 0).unwrap();
//!
//! assert_accepted!(evens.add(2));
//! assert_rejected!(evens.add(3));
//! assert_rejected!(evens.add(5), Role::Member);
//! ```

/// Assert that a guarded operation succeeded.
///
/// Panics with the error if the result is an `Err`.
///
/// # Example
///
/// ```rust
/// use bulwark::{assert_accepted, GuardedMap};
/// use std::collections::HashMap;
///
/// let mut map = GuardedMap::predicated(HashMap::new(), |_: &&str| true, |v: &u8| *v < 10).unwrap();
/// assert_accepted!(map.put("a", 1));
/// ```
#[macro_export]
macro_rules! assert_accepted {
    ($result:expr) => {
        match $result {
            ::core::result::Result::Ok(_) => {}
            ::core::result::Result::Err(e) => {
                panic!("Expected element to be accepted, got error: {:?}", e);
            }
        }
    };
}

/// Assert that a guarded operation was refused by a predicate.
///
/// Passes only for [`GuardError::Validation`](crate::GuardError::Validation).
/// With a second argument the rejected element's
/// [`Role`](crate::Role) is checked too.
///
/// # Example
///
/// ```rust
/// use bulwark::{assert_rejected, GuardedMap, Role};
/// use std::collections::HashMap;
///
/// let mut map = GuardedMap::predicated(HashMap::new(), |k: &&str| !k.is_empty(), |_: &u8| true)
///     .unwrap();
/// assert_rejected!(map.put("", 1), Role::Key);
/// ```
#[macro_export]
macro_rules! assert_rejected {
    ($result:expr) => {
        match $result {
            ::core::result::Result::Err($crate::GuardError::Validation(_)) => {}
            ::core::result::Result::Err(e) => {
                panic!("Expected a validation error, got: {:?}", e);
            }
            ::core::result::Result::Ok(v) => {
                panic!("Expected element to be rejected, got Ok: {:?}", v);
            }
        }
    };
    ($result:expr, $role:expr) => {
        match $result {
            ::core::result::Result::Err($crate::GuardError::Validation(err)) => {
                assert_eq!(err.role(), $role, "rejected element had the wrong role");
            }
            ::core::result::Result::Err(e) => {
                panic!("Expected a validation error, got: {:?}", e);
            }
            ::core::result::Result::Ok(v) => {
                panic!("Expected element to be rejected, got Ok: {:?}", v);
            }
        }
    };
}

#[cfg(feature = "proptest")]
pub use strategies::{disjoint_split, Split};

#[cfg(feature = "proptest")]
mod strategies {
    use std::collections::BTreeSet;
    use std::fmt::Debug;
    use std::ops::Range;

    use proptest::prelude::*;

    use crate::guard::BulkPolicy;
    use crate::registry::Arity;

    /// A set of items and one way of splitting it into disjoint delegates.
    #[derive(Debug, Clone)]
    pub struct Split<T: Ord> {
        /// Every item.
        pub items: BTreeSet<T>,
        /// Pairwise disjoint subsets whose union is `items`. Some may be
        /// empty.
        pub delegates: Vec<BTreeSet<T>>,
    }

    /// Generate a set from `element` and split it across one to
    /// `max_parts` delegates.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bulwark::composite::CompositeSet;
    /// use bulwark::testing::disjoint_split;
    /// use proptest::prelude::*;
    ///
    /// proptest!(|(split in disjoint_split(any::<u8>(), 0..20, 4))| {
    ///     let union = CompositeSet::with_delegates(split.delegates).unwrap();
    ///     prop_assert_eq!(union.len(), split.items.len());
    /// });
    /// ```
    pub fn disjoint_split<S>(
        element: S,
        size: Range<usize>,
        max_parts: usize,
    ) -> impl Strategy<Value = Split<S::Value>>
    where
        S: Strategy,
        S::Value: Ord + Clone + Debug,
    {
        let max_parts = max_parts.max(1);
        proptest::collection::btree_set(element, size)
            .prop_flat_map(move |items| {
                let n = items.len();
                (
                    Just(items),
                    proptest::collection::vec(0..max_parts, n),
                    1..=max_parts,
                )
            })
            .prop_map(|(items, slots, parts)| {
                let mut delegates = vec![BTreeSet::new(); parts];
                for (item, slot) in items.iter().zip(slots) {
                    delegates[slot % parts].insert(item.clone());
                }
                Split { items, delegates }
            })
    }

    impl Arbitrary for BulkPolicy {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_args: ()) -> Self::Strategy {
            prop_oneof![Just(BulkPolicy::NoRollback), Just(BulkPolicy::Rollback)].boxed()
        }
    }

    impl Arbitrary for Arity {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_args: ()) -> Self::Strategy {
            prop_oneof![
                (0usize..8).prop_map(Arity::Exact),
                (0usize..8).prop_map(Arity::AtLeast),
            ]
            .boxed()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{GuardedCollection, GuardedMap, Role};
    use std::collections::{BTreeSet, HashMap};

    fn small_numbers() -> GuardedCollection<BTreeSet<u8>> {
        GuardedCollection::predicated(BTreeSet::new(), |n: &u8| *n < 10).unwrap()
    }

    #[test]
    fn assert_accepted_macro() {
        let mut set = small_numbers();
        assert_accepted!(set.add(1));
    }

    #[test]
    fn assert_rejected_macro() {
        let mut set = small_numbers();
        assert_rejected!(set.add(10));
        assert_rejected!(set.add(11), Role::Member);
    }

    #[test]
    #[should_panic(expected = "Expected element to be accepted")]
    fn assert_accepted_panics_on_rejection() {
        let mut set = small_numbers();
        assert_accepted!(set.add(10));
    }

    #[test]
    #[should_panic(expected = "Expected element to be rejected")]
    fn assert_rejected_panics_on_success() {
        let mut set = small_numbers();
        assert_rejected!(set.add(1));
    }

    #[test]
    #[should_panic(expected = "wrong role")]
    fn assert_rejected_checks_role() {
        let mut map =
            GuardedMap::predicated(HashMap::new(), |_: &u8| true, |v: &u8| *v > 0).unwrap();
        assert_rejected!(map.put(1, 0), Role::Key);
    }

    #[test]
    #[should_panic(expected = "Expected a validation error")]
    fn assert_rejected_needs_validation_error() {
        let mut map = GuardedMap::transformed(
            HashMap::<u8, u8>::new(),
            crate::transformer::parse::<u8>(),
            crate::transformer::identity(),
        );
        assert_rejected!(map.put("x", 1));
    }

    #[cfg(feature = "proptest")]
    mod proptest_tests {
        use super::super::*;
        use crate::guard::BulkPolicy;
        use crate::registry::Arity;
        use proptest::prelude::*;
        use std::collections::BTreeSet;

        proptest! {
            #[test]
            fn disjoint_split_partitions_items(split in disjoint_split(any::<i16>(), 0..30, 5)) {
                let mut seen = BTreeSet::new();
                for delegate in &split.delegates {
                    for item in delegate {
                        prop_assert!(seen.insert(*item));
                    }
                }
                prop_assert_eq!(seen, split.items);
            }

            #[test]
            fn arbitrary_arity_accepts_its_minimum(arity in any::<Arity>()) {
                let min = match arity {
                    Arity::Exact(n) | Arity::AtLeast(n) => n,
                };
                prop_assert!(arity.accepts(min));
            }

            #[test]
            fn arbitrary_bulk_policy_is_either_variant(policy in any::<BulkPolicy>()) {
                prop_assert!(matches!(policy, BulkPolicy::NoRollback | BulkPolicy::Rollback));
            }
        }
    }
}

//! Guarded collection (set, bag or list)

use std::fmt::{self, Debug};

use super::{admit, convert, delegate_failed, rejection, BulkPolicy, Refusal};
use crate::error::{GuardError, Rejections, Role, TransformError, WrapError};
use crate::predicate::{Always, BoxedPredicate, Predicate};
use crate::store::Store;
use crate::transformer::{BoxedTransformer, Identity, Transformer};

struct CollectionGuards<T, TIn> {
    transformer: BoxedTransformer<TIn, T>,
    predicate: BoxedPredicate<T>,
    bulk_policy: BulkPolicy,
}

impl<T: Debug, TIn> CollectionGuards<T, TIn> {
    fn admit_item(&self, item: TIn) -> Result<T, Refusal> {
        let item = convert(Role::Member, item, &self.transformer)?;
        admit(Role::Member, item, &self.predicate)
    }

    fn validate_existing<S, E>(&self, store: &S) -> Result<(), GuardError<E>>
    where
        S: Store<Item = T>,
    {
        let mut rejected = Vec::new();
        for item in store.iter() {
            if !self.predicate.try_check(item)? {
                rejected.push(rejection(Role::Member, item, &self.predicate));
            }
        }
        match Rejections::from_vec(rejected) {
            None => Ok(()),
            Some(rejections) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    rejected = rejections.len(),
                    "existing collection members failed validation"
                );
                Err(GuardError::Rejected(rejections))
            }
        }
    }
}

/// A collection facade that transforms and validates every item before
/// storing it.
///
/// Whether duplicates are kept depends on the store: a set answers
/// `Ok(false)` for an item it already holds, a bag or list always grows.
///
/// # Example
///
/// ```rust
/// use bulwark::transformer::from_fn;
/// use bulwark::GuardedCollection;
/// use std::collections::BTreeSet;
///
/// let mut tags = GuardedCollection::builder(BTreeSet::new())
///     .transformer(from_fn(|s: &str| s.trim().to_lowercase()))
///     .predicate(|s: &String| !s.is_empty())
///     .build()
///     .unwrap();
///
/// assert_eq!(tags.add(" Rust "), Ok(true));
/// assert_eq!(tags.add("RUST"), Ok(false));
/// assert!(tags.add("   ").is_err());
/// assert!(tags.contains(&"rust".to_string()));
/// ```
pub struct GuardedCollection<S: Store, TIn = <S as Store>::Item> {
    store: S,
    guards: CollectionGuards<S::Item, TIn>,
}

impl<S: Store> GuardedCollection<S>
where
    S::Item: Debug,
{
    /// Start configuring a guarded collection over `store`.
    pub fn builder(store: S) -> GuardedCollectionBuilder<S, S::Item> {
        GuardedCollectionBuilder {
            store,
            transformer: BoxedTransformer::new(Identity),
            predicate: None,
            bulk_policy: BulkPolicy::default(),
        }
    }

    /// Guard `store` with a predicate, validating what it already holds.
    pub fn predicated<P>(store: S, predicate: P) -> Result<Self, WrapError<S, S::Error>>
    where
        P: Predicate<S::Item> + 'static,
    {
        Self::builder(store).predicate(predicate).build()
    }

    /// Decorate `store` with a transformer. Existing items are left as they
    /// are.
    pub fn transformed<TIn, T>(store: S, transformer: T) -> GuardedCollection<S, TIn>
    where
        T: Transformer<TIn, Output = S::Item> + 'static,
    {
        GuardedCollection {
            store,
            guards: CollectionGuards {
                transformer: BoxedTransformer::new(transformer),
                predicate: BoxedPredicate::new(Always),
                bulk_policy: BulkPolicy::default(),
            },
        }
    }
}

impl<S: Store, TIn> GuardedCollection<S, TIn> {
    /// Whether an equal item is stored.
    pub fn contains(&self, item: &S::Item) -> bool {
        self.store.contains(item)
    }

    /// Remove one occurrence of `item`. Removal is never validated.
    pub fn remove(&mut self, item: &S::Item) -> bool {
        self.store.remove(item)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True when the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Iterate over the stored items.
    pub fn iter(&self) -> S::Iter<'_> {
        self.store.iter()
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.store.clear()
    }

    /// The bulk policy in effect.
    pub fn bulk_policy(&self) -> BulkPolicy {
        self.guards.bulk_policy
    }

    /// Read-only access to the decorated store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Release the decorated store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: Store, TIn> GuardedCollection<S, TIn>
where
    S::Item: Debug,
    S::Error: Debug,
{
    /// Transform and validate an item, then store it.
    ///
    /// Returns whether the store changed.
    pub fn add(&mut self, item: TIn) -> Result<bool, GuardError<S::Error>> {
        let item = self.guards.admit_item(item)?;
        self.store.insert(item).map_err(delegate_failed)
    }

    /// Store a batch of items, returning whether the store changed.
    ///
    /// The batch is transformed and validated in full before the first
    /// insert. A store failure part way through is handled per the
    /// configured [`BulkPolicy`].
    pub fn add_all<I>(&mut self, items: I) -> Result<bool, GuardError<S::Error>>
    where
        I: IntoIterator<Item = TIn>,
        S::Item: Clone,
    {
        let admitted = items
            .into_iter()
            .map(|item| self.guards.admit_item(item))
            .collect::<Result<Vec<_>, Refusal>>()?;

        let rollback = self.guards.bulk_policy == BulkPolicy::Rollback;
        let mut inserted = Vec::new();
        let mut changed = false;
        for item in admitted {
            let undo = if rollback { Some(item.clone()) } else { None };
            match self.store.insert(item) {
                Ok(true) => {
                    changed = true;
                    inserted.extend(undo);
                }
                Ok(false) => {}
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    if rollback {
                        tracing::debug!(undone = inserted.len(), "rolling back partial add_all");
                    }
                    for item in inserted.iter().rev() {
                        self.store.undo_insert(item);
                    }
                    return Err(delegate_failed(err));
                }
            }
        }
        Ok(changed)
    }

    /// Transform and validate an item without storing it.
    pub fn check(&self, item: TIn) -> Result<S::Item, GuardError<S::Error>> {
        Ok(self.guards.admit_item(item)?)
    }
}

impl<S: Store + Debug, TIn> Debug for GuardedCollection<S, TIn> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedCollection")
            .field("store", &self.store)
            .field("bulk_policy", &self.guards.bulk_policy)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "serde")]
impl<S, TIn> serde::Serialize for GuardedCollection<S, TIn>
where
    S: Store,
    S::Item: serde::Serialize,
{
    fn serialize<Ser: serde::Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_seq(self.store.iter())
    }
}

/// Builder for [`GuardedCollection`].
pub struct GuardedCollectionBuilder<S: Store, TIn> {
    store: S,
    transformer: BoxedTransformer<TIn, S::Item>,
    predicate: Option<BoxedPredicate<S::Item>>,
    bulk_policy: BulkPolicy,
}

impl<S: Store, TIn> GuardedCollectionBuilder<S, TIn>
where
    S::Item: Debug,
{
    /// Predicate every item must satisfy after transformation.
    pub fn predicate<P>(mut self, predicate: P) -> Self
    where
        P: Predicate<S::Item> + 'static,
    {
        self.predicate = Some(BoxedPredicate::new(predicate));
        self
    }

    /// Transformer applied to incoming items. Changes the accepted type.
    pub fn transformer<In, T>(self, transformer: T) -> GuardedCollectionBuilder<S, In>
    where
        T: Transformer<In, Output = S::Item> + 'static,
    {
        GuardedCollectionBuilder {
            store: self.store,
            transformer: BoxedTransformer::new(transformer),
            predicate: self.predicate,
            bulk_policy: self.bulk_policy,
        }
    }

    /// How `add_all` reacts to a store failure.
    pub fn bulk_policy(mut self, policy: BulkPolicy) -> Self {
        self.bulk_policy = policy;
        self
    }

    fn into_guards(self) -> (S, CollectionGuards<S::Item, TIn>) {
        let guards = CollectionGuards {
            transformer: self.transformer,
            predicate: self
                .predicate
                .unwrap_or_else(|| BoxedPredicate::new(Always)),
            bulk_policy: self.bulk_policy,
        };
        (self.store, guards)
    }

    /// Finish construction, validating the items already in the store.
    pub fn build(self) -> Result<GuardedCollection<S, TIn>, WrapError<S, S::Error>> {
        let (store, guards) = self.into_guards();
        match guards.validate_existing(&store) {
            Ok(()) => Ok(GuardedCollection { store, guards }),
            Err(err) => Err(WrapError::new(store, err)),
        }
    }
}

impl<S: Store> GuardedCollectionBuilder<S, S::Item>
where
    S::Item: Debug + Clone + PartialEq,
    S::Error: Debug,
{
    /// Finish construction, first running every existing item through the
    /// transformer.
    ///
    /// Only items whose transformed form differs are touched: the new form
    /// is inserted, then the old one removed. If a transform or an insert
    /// fails, the store is handed back unchanged. Otherwise the rewritten
    /// store is validated as in [`build`](Self::build).
    pub fn build_transforming(self) -> Result<GuardedCollection<S>, WrapError<S, S::Error>> {
        let (mut store, guards) = self.into_guards();

        let outputs = store
            .iter()
            .map(|item| convert(Role::Member, item.clone(), &guards.transformer))
            .collect::<Result<Vec<_>, TransformError>>();
        let outputs = match outputs {
            Ok(outputs) => outputs,
            Err(err) => return Err(WrapError::new(store, err.into())),
        };
        let changed: Vec<(S::Item, S::Item)> = store
            .iter()
            .cloned()
            .zip(outputs.iter().cloned())
            .filter(|(old, new)| old != new)
            .collect();

        let mut inserted = Vec::new();
        for (_, new) in &changed {
            match store.insert(new.clone()) {
                Ok(true) => inserted.push(new),
                Ok(false) => {}
                Err(err) => {
                    for item in inserted.into_iter().rev() {
                        store.undo_insert(item);
                    }
                    return Err(WrapError::new(store, delegate_failed(err)));
                }
            }
        }

        // A set keeps an old item that is also some item's new form.
        for (old, _) in &changed {
            if store.grows_with(old) || !outputs.contains(old) {
                store.remove(old);
            }
        }

        match guards.validate_existing(&store) {
            Ok(()) => Ok(GuardedCollection { store, guards }),
            Err(err) => Err(WrapError::new(store, err)),
        }
    }
}

impl<S: Store + Debug, TIn> Debug for GuardedCollectionBuilder<S, TIn> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedCollectionBuilder")
            .field("store", &self.store)
            .field("bulk_policy", &self.bulk_policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::CompositeSet;
    use crate::predicate::{fallible, greater_than, less_than, PredicateExt};
    use crate::store::{Bounded, HashBag};
    use crate::transformer::{from_fn, identity, parse};
    use std::collections::{BTreeSet, HashSet};

    #[test]
    fn test_set_semantics_come_from_store() {
        let mut set = GuardedCollection::predicated(HashSet::new(), greater_than(0)).unwrap();
        assert_eq!(set.add(1), Ok(true));
        assert_eq!(set.add(1), Ok(false));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_list_and_bag_keep_duplicates() {
        let mut list = GuardedCollection::predicated(Vec::new(), greater_than(0)).unwrap();
        list.add_all(vec![3, 3, 1]).unwrap();
        assert_eq!(list.store(), &vec![3, 3, 1]);

        let mut bag = GuardedCollection::predicated(HashBag::new(), |s: &&str| s.len() < 4).unwrap();
        bag.add("ab").unwrap();
        bag.add("ab").unwrap();
        assert_eq!(bag.store().count(&"ab"), 2);
        assert!(bag.add("long").is_err());
    }

    #[test]
    fn test_rejected_item_leaves_store_unchanged() {
        let mut set = GuardedCollection::predicated(BTreeSet::new(), less_than(10)).unwrap();
        set.add(1).unwrap();

        let err = set.add(11).unwrap_err();
        let validation = err.as_validation().unwrap();
        assert_eq!(validation.role(), Role::Member);
        assert_eq!(validation.element(), "11");
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_predicate_error_aborts_add() {
        let flaky = fallible(|n: &i32| if *n == 13 { Err("unlucky") } else { Ok(true) });
        let mut set = GuardedCollection::predicated(BTreeSet::new(), flaky).unwrap();
        let err = set.add(13).unwrap_err();
        assert!(matches!(err, GuardError::Predicate(_)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_transformer_output_is_validated_and_stored() {
        let mut set = GuardedCollection::builder(BTreeSet::new())
            .transformer(parse::<i64>())
            .predicate(greater_than(0).and(less_than(100)))
            .build()
            .unwrap();

        assert_eq!(set.add("42"), Ok(true));
        assert!(set.contains(&42));
        assert!(matches!(set.add("4x"), Err(GuardError::Transform(_))));
        assert!(set.add("420").unwrap_err().is_validation());
        assert_eq!(set.check("7"), Ok(7));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_add_all_rejection_is_atomic() {
        let mut list = GuardedCollection::predicated(Vec::new(), greater_than(0)).unwrap();
        assert!(list.add_all(vec![1, 2, -3]).is_err());
        assert!(list.is_empty());
    }

    #[test]
    fn test_add_all_store_failure_policies() {
        let mut keep = GuardedCollection::builder(Bounded::new(Vec::new(), 2))
            .build()
            .unwrap();
        assert!(keep.add_all(vec![1, 2, 3]).is_err());
        assert_eq!(keep.len(), 2);

        let mut undo = GuardedCollection::builder(Bounded::new(vec![9], 2))
            .bulk_policy(BulkPolicy::Rollback)
            .build()
            .unwrap();
        let err = undo.add_all(vec![1, 2]).unwrap_err();
        assert_eq!(err.as_delegate().map(|e| e.capacity()), Some(2));
        assert_eq!(undo.store().get_ref(), &vec![9]);
    }

    #[test]
    fn test_rollback_only_undoes_items_that_changed_the_set() {
        let seed: BTreeSet<i32> = [1].into_iter().collect();
        let mut set = GuardedCollection::builder(Bounded::new(seed, 2))
            .bulk_policy(BulkPolicy::Rollback)
            .build()
            .unwrap();
        assert!(set.add_all(vec![1, 2, 3]).is_err());
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_wrap_validates_existing_members() {
        let err = GuardedCollection::predicated(vec![1, -2, 3, -4], greater_than(0)).unwrap_err();
        match err.error() {
            GuardError::Rejected(rejections) => {
                let elements: Vec<&str> = rejections.iter().map(|r| r.element()).collect();
                assert_eq!(elements, vec!["-2", "-4"]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(err.into_store(), vec![1, -2, 3, -4]);
    }

    #[test]
    fn test_build_transforming_normalizes_existing_items() {
        let seed: BTreeSet<String> = ["A".to_string(), "a".to_string(), "b".to_string()]
            .into_iter()
            .collect();
        let set = GuardedCollection::builder(seed)
            .transformer(from_fn(|s: String| s.to_lowercase()))
            .build_transforming()
            .unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_transformed_leaves_existing_items() {
        let mut list = GuardedCollection::transformed(vec![1], from_fn(|n: i32| n * 10));
        list.add(2).unwrap();
        assert_eq!(list.into_inner(), vec![1, 20]);
    }

    fn split_composite() -> CompositeSet<BTreeSet<i32>> {
        let low: BTreeSet<i32> = [1, 2].into_iter().collect();
        let high: BTreeSet<i32> = [3].into_iter().collect();
        CompositeSet::with_delegates([low, high]).unwrap()
    }

    fn delegate_sizes(union: &CompositeSet<BTreeSet<i32>>) -> Vec<usize> {
        union.delegates().iter().map(|d| d.len()).collect()
    }

    #[test]
    fn test_build_transforming_identity_keeps_composite_split() {
        let guarded = GuardedCollection::builder(split_composite())
            .transformer(identity())
            .build_transforming()
            .unwrap();
        let union = guarded.into_inner();
        assert_eq!(union.len(), 3);
        assert_eq!(delegate_sizes(&union), vec![2, 1]);
    }

    #[test]
    fn test_build_transforming_failed_insert_returns_store_unchanged() {
        let err = GuardedCollection::builder(split_composite())
            .transformer(from_fn(|n: i32| n * 10))
            .build_transforming()
            .unwrap_err();
        assert!(matches!(
            err.error(),
            GuardError::Delegate(GuardError::Unsupported(_))
        ));
        let union = err.into_store();
        assert_eq!(union.len(), 3);
        assert_eq!(delegate_sizes(&union), vec![2, 1]);
        assert!([1, 2, 3].iter().all(|n| union.contains(n)));
    }

    #[test]
    fn test_build_transforming_undoes_partial_inserts() {
        let seed = Bounded::new(vec![1, 2], 3);
        let err = GuardedCollection::builder(seed)
            .transformer(from_fn(|n: i32| n * 10))
            .build_transforming()
            .unwrap_err();
        assert!(matches!(err.error(), GuardError::Delegate(_)));
        assert_eq!(err.into_store().into_inner(), vec![1, 2]);
    }

    #[test]
    fn test_build_transforming_shifts_chained_items() {
        let seed: BTreeSet<i32> = [1, 2].into_iter().collect();
        let set = GuardedCollection::builder(seed)
            .transformer(from_fn(|n: i32| n + 1))
            .build_transforming()
            .unwrap();
        assert_eq!(set.into_inner().into_iter().collect::<Vec<_>>(), vec![2, 3]);

        let list = GuardedCollection::builder(vec![1, 2])
            .transformer(from_fn(|n: i32| n + 1))
            .build_transforming()
            .unwrap();
        assert_eq!(list.into_inner(), vec![2, 3]);
    }
}

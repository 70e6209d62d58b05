//! Guarded key/value map

use std::fmt::{self, Debug};

use super::{admit, convert, delegate_failed, rejection, BulkPolicy, Refusal};
use crate::error::{GuardError, Rejections, Role, TransformError, WrapError};
use crate::predicate::{Always, BoxedPredicate, Predicate};
use crate::store::MapStore;
use crate::transformer::{BoxedTransformer, Identity, Transformer};

struct MapGuards<K, V, KIn, VIn> {
    key_transformer: BoxedTransformer<KIn, K>,
    value_transformer: BoxedTransformer<VIn, V>,
    key_predicate: BoxedPredicate<K>,
    value_predicate: BoxedPredicate<V>,
    bulk_policy: BulkPolicy,
}

impl<K: Debug, V: Debug, KIn, VIn> MapGuards<K, V, KIn, VIn> {
    fn admit_value(&self, value: VIn) -> Result<V, Refusal> {
        let value = convert(Role::Value, value, &self.value_transformer)?;
        admit(Role::Value, value, &self.value_predicate)
    }

    fn admit_entry(&self, key: KIn, value: VIn) -> Result<(K, V), Refusal> {
        let key = convert(Role::Key, key, &self.key_transformer)?;
        let value = convert(Role::Value, value, &self.value_transformer)?;
        let key = admit(Role::Key, key, &self.key_predicate)?;
        let value = admit(Role::Value, value, &self.value_predicate)?;
        Ok((key, value))
    }

    /// Check every stored entry, collecting all rejections.
    fn validate_existing<C, E>(&self, store: &C) -> Result<(), GuardError<E>>
    where
        C: MapStore<Key = K, Value = V>,
    {
        let mut rejected = Vec::new();
        for (key, value) in store.iter() {
            if !self.key_predicate.try_check(key)? {
                rejected.push(rejection(Role::Key, key, &self.key_predicate));
            }
            if !self.value_predicate.try_check(value)? {
                rejected.push(rejection(Role::Value, value, &self.value_predicate));
            }
        }
        match Rejections::from_vec(rejected) {
            None => Ok(()),
            Some(rejections) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    rejected = rejections.len(),
                    "existing map entries failed validation"
                );
                Err(GuardError::Rejected(rejections))
            }
        }
    }
}

/// A map facade that transforms and validates every key and value before
/// storing it.
///
/// `KIn` and `VIn` are the types callers hand in; the store holds
/// `C::Key` and `C::Value`. Without transformers they are the same.
///
/// # Example
///
/// ```rust
/// use bulwark::predicate::greater_than;
/// use bulwark::transformer::parse;
/// use bulwark::GuardedMap;
/// use std::collections::BTreeMap;
///
/// let mut ports = GuardedMap::builder(BTreeMap::new())
///     .value_transformer(parse::<u16>())
///     .value_predicate(greater_than(1023))
///     .build()
///     .unwrap();
///
/// ports.put("web", "8080").unwrap();
/// assert!(ports.put("ssh", "22").is_err());
/// assert!(ports.put("db", "five").is_err());
///
/// assert_eq!(ports.get(&"web"), Some(&8080));
/// assert_eq!(ports.len(), 1);
/// ```
pub struct GuardedMap<C: MapStore, KIn = <C as MapStore>::Key, VIn = <C as MapStore>::Value> {
    store: C,
    guards: MapGuards<C::Key, C::Value, KIn, VIn>,
}

impl<C: MapStore> GuardedMap<C>
where
    C::Key: Debug,
    C::Value: Debug,
{
    /// Start configuring a guarded map over `store`.
    pub fn builder(store: C) -> GuardedMapBuilder<C, C::Key, C::Value> {
        GuardedMapBuilder {
            store,
            key_transformer: BoxedTransformer::new(Identity),
            value_transformer: BoxedTransformer::new(Identity),
            key_predicate: None,
            value_predicate: None,
            bulk_policy: BulkPolicy::default(),
        }
    }

    /// Guard `store` with a key and a value predicate.
    ///
    /// Existing entries are validated; any rejection fails construction and
    /// hands the store back.
    pub fn predicated<KP, VP>(
        store: C,
        key_predicate: KP,
        value_predicate: VP,
    ) -> Result<Self, WrapError<C, C::Error>>
    where
        KP: Predicate<C::Key> + 'static,
        VP: Predicate<C::Value> + 'static,
    {
        Self::builder(store)
            .key_predicate(key_predicate)
            .value_predicate(value_predicate)
            .build()
    }

    /// Decorate `store` with a key and a value transformer.
    ///
    /// Existing entries are left as they are; use
    /// [`GuardedMapBuilder::build_transforming`] to convert them too.
    pub fn transformed<KIn, VIn, KT, VT>(
        store: C,
        key_transformer: KT,
        value_transformer: VT,
    ) -> GuardedMap<C, KIn, VIn>
    where
        KT: Transformer<KIn, Output = C::Key> + 'static,
        VT: Transformer<VIn, Output = C::Value> + 'static,
    {
        GuardedMap {
            store,
            guards: MapGuards {
                key_transformer: BoxedTransformer::new(key_transformer),
                value_transformer: BoxedTransformer::new(value_transformer),
                key_predicate: BoxedPredicate::new(Always),
                value_predicate: BoxedPredicate::new(Always),
                bulk_policy: BulkPolicy::default(),
            },
        }
    }
}

impl<C: MapStore, KIn, VIn> GuardedMap<C, KIn, VIn> {
    /// Look up a value.
    pub fn get(&self, key: &C::Key) -> Option<&C::Value> {
        self.store.get(key)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &C::Key) -> bool {
        self.store.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True when the map is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Iterate over the stored entries.
    pub fn iter(&self) -> C::Iter<'_> {
        self.store.iter()
    }

    /// Iterate over the stored keys.
    pub fn keys(&self) -> impl Iterator<Item = &C::Key> + '_ {
        self.store.iter().map(|(key, _)| key)
    }

    /// Iterate over the stored values.
    pub fn values(&self) -> impl Iterator<Item = &C::Value> + '_ {
        self.store.iter().map(|(_, value)| value)
    }

    /// Remove an entry. Removal is never validated.
    pub fn remove(&mut self, key: &C::Key) -> Option<C::Value> {
        self.store.remove(key)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.store.clear()
    }

    /// The bulk policy in effect.
    pub fn bulk_policy(&self) -> BulkPolicy {
        self.guards.bulk_policy
    }

    /// Read-only access to the decorated store.
    pub fn store(&self) -> &C {
        &self.store
    }

    /// Release the decorated store.
    pub fn into_inner(self) -> C {
        self.store
    }

    /// Mutable view of one entry whose writes go through the value guard.
    pub fn entry_mut<'a>(&'a mut self, key: &'a C::Key) -> Option<GuardedEntry<'a, C, VIn>> {
        let value = self.store.get_mut(key)?;
        Some(GuardedEntry {
            key,
            value,
            transformer: &self.guards.value_transformer,
            predicate: &self.guards.value_predicate,
        })
    }

    /// Iterate over entries with guarded write access to their values.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = GuardedEntry<'_, C, VIn>> + '_ {
        let transformer = &self.guards.value_transformer;
        let predicate = &self.guards.value_predicate;
        self.store.iter_mut().map(move |(key, value)| GuardedEntry {
            key,
            value,
            transformer,
            predicate,
        })
    }
}

impl<C: MapStore, KIn, VIn> GuardedMap<C, KIn, VIn>
where
    C::Key: Debug,
    C::Value: Debug,
    C::Error: Debug,
{
    /// Transform and validate an entry, then store it.
    ///
    /// Returns the value previously stored under the transformed key. On
    /// any error the store is left untouched, except for
    /// [`GuardError::Delegate`] which is whatever the store itself did.
    pub fn put(&mut self, key: KIn, value: VIn) -> Result<Option<C::Value>, GuardError<C::Error>> {
        let (key, value) = self.guards.admit_entry(key, value)?;
        self.store.insert(key, value).map_err(delegate_failed)
    }

    /// Store a batch of entries.
    ///
    /// Every entry is transformed and validated before the first insert, so
    /// a rejected entry fails the whole batch with nothing stored. A store
    /// failure during the inserts is handled per the configured
    /// [`BulkPolicy`].
    pub fn put_all<I>(&mut self, entries: I) -> Result<(), GuardError<C::Error>>
    where
        I: IntoIterator<Item = (KIn, VIn)>,
        C::Key: Clone,
    {
        let admitted = entries
            .into_iter()
            .map(|(key, value)| self.guards.admit_entry(key, value))
            .collect::<Result<Vec<_>, Refusal>>()?;

        let mut undo: Vec<(C::Key, Option<C::Value>)> = Vec::new();
        for (key, value) in admitted {
            match self.store.insert(key.clone(), value) {
                Ok(previous) => {
                    if self.guards.bulk_policy == BulkPolicy::Rollback {
                        undo.push((key, previous));
                    }
                }
                Err(err) => {
                    if self.guards.bulk_policy == BulkPolicy::Rollback {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(undone = undo.len(), "rolling back partial put_all");
                        restore(&mut self.store, undo);
                    }
                    return Err(delegate_failed(err));
                }
            }
        }
        Ok(())
    }

    /// Transform and validate a prospective value without storing it.
    pub fn check_set_value(&self, value: VIn) -> Result<C::Value, GuardError<C::Error>> {
        Ok(self.guards.admit_value(value)?)
    }
}

/// Put back the entries an interrupted batch overwrote or added.
fn restore<C: MapStore>(store: &mut C, undo: Vec<(C::Key, Option<C::Value>)>) {
    for (key, previous) in undo.into_iter().rev() {
        match previous {
            Some(value) => {
                if let Some(slot) = store.get_mut(&key) {
                    *slot = value;
                }
            }
            None => {
                store.remove(&key);
            }
        }
    }
}

impl<C: MapStore + Debug, KIn, VIn> Debug for GuardedMap<C, KIn, VIn> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedMap")
            .field("store", &self.store)
            .field("bulk_policy", &self.guards.bulk_policy)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "serde")]
impl<C, KIn, VIn> serde::Serialize for GuardedMap<C, KIn, VIn>
where
    C: MapStore,
    C::Key: serde::Serialize,
    C::Value: serde::Serialize,
{
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.store.iter())
    }
}

/// Mutable view of one map entry.
///
/// Writing through [`set_value`](GuardedEntry::set_value) runs the map's
/// value transformer and predicate, so entry views cannot be used to slip
/// an invalid value past the guard.
pub struct GuardedEntry<'a, C: MapStore, VIn> {
    key: &'a C::Key,
    value: &'a mut C::Value,
    transformer: &'a BoxedTransformer<VIn, C::Value>,
    predicate: &'a BoxedPredicate<C::Value>,
}

impl<'a, C: MapStore, VIn> GuardedEntry<'a, C, VIn> {
    /// The entry's key.
    pub fn key(&self) -> &C::Key {
        self.key
    }

    /// The entry's current value.
    pub fn value(&self) -> &C::Value {
        self.value
    }

    /// Replace the value, returning the old one.
    ///
    /// A rejected value leaves the entry unchanged.
    pub fn set_value(&mut self, value: VIn) -> Result<C::Value, GuardError<C::Error>>
    where
        C::Value: Debug,
    {
        let value = convert(Role::Value, value, self.transformer)?;
        let value = admit(Role::Value, value, self.predicate)?;
        Ok(std::mem::replace(self.value, value))
    }
}

impl<'a, C: MapStore, VIn> Debug for GuardedEntry<'a, C, VIn>
where
    C::Key: Debug,
    C::Value: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedEntry")
            .field("key", self.key)
            .field("value", &*self.value)
            .finish()
    }
}

/// Builder for [`GuardedMap`].
pub struct GuardedMapBuilder<C: MapStore, KIn, VIn> {
    store: C,
    key_transformer: BoxedTransformer<KIn, C::Key>,
    value_transformer: BoxedTransformer<VIn, C::Value>,
    key_predicate: Option<BoxedPredicate<C::Key>>,
    value_predicate: Option<BoxedPredicate<C::Value>>,
    bulk_policy: BulkPolicy,
}

impl<C: MapStore, KIn, VIn> GuardedMapBuilder<C, KIn, VIn>
where
    C::Key: Debug,
    C::Value: Debug,
{
    /// Predicate every key must satisfy after transformation.
    pub fn key_predicate<P>(mut self, predicate: P) -> Self
    where
        P: Predicate<C::Key> + 'static,
    {
        self.key_predicate = Some(BoxedPredicate::new(predicate));
        self
    }

    /// Predicate every value must satisfy after transformation.
    pub fn value_predicate<P>(mut self, predicate: P) -> Self
    where
        P: Predicate<C::Value> + 'static,
    {
        self.value_predicate = Some(BoxedPredicate::new(predicate));
        self
    }

    /// Transformer applied to incoming keys. Changes the accepted key type.
    pub fn key_transformer<In, T>(self, transformer: T) -> GuardedMapBuilder<C, In, VIn>
    where
        T: Transformer<In, Output = C::Key> + 'static,
    {
        GuardedMapBuilder {
            store: self.store,
            key_transformer: BoxedTransformer::new(transformer),
            value_transformer: self.value_transformer,
            key_predicate: self.key_predicate,
            value_predicate: self.value_predicate,
            bulk_policy: self.bulk_policy,
        }
    }

    /// Transformer applied to incoming values. Changes the accepted value
    /// type.
    pub fn value_transformer<In, T>(self, transformer: T) -> GuardedMapBuilder<C, KIn, In>
    where
        T: Transformer<In, Output = C::Value> + 'static,
    {
        GuardedMapBuilder {
            store: self.store,
            key_transformer: self.key_transformer,
            value_transformer: BoxedTransformer::new(transformer),
            key_predicate: self.key_predicate,
            value_predicate: self.value_predicate,
            bulk_policy: self.bulk_policy,
        }
    }

    /// How `put_all` reacts to a store failure.
    pub fn bulk_policy(mut self, policy: BulkPolicy) -> Self {
        self.bulk_policy = policy;
        self
    }

    fn into_guards(self) -> (C, MapGuards<C::Key, C::Value, KIn, VIn>) {
        let guards = MapGuards {
            key_transformer: self.key_transformer,
            value_transformer: self.value_transformer,
            key_predicate: self
                .key_predicate
                .unwrap_or_else(|| BoxedPredicate::new(Always)),
            value_predicate: self
                .value_predicate
                .unwrap_or_else(|| BoxedPredicate::new(Always)),
            bulk_policy: self.bulk_policy,
        };
        (self.store, guards)
    }

    /// Finish construction, validating the entries already in the store.
    ///
    /// Existing entries are not transformed. If any fails a predicate, all
    /// rejections are reported in [`GuardError::Rejected`] and the store is
    /// handed back inside the [`WrapError`].
    pub fn build(self) -> Result<GuardedMap<C, KIn, VIn>, WrapError<C, C::Error>> {
        let (store, guards) = self.into_guards();
        match guards.validate_existing(&store) {
            Ok(()) => Ok(GuardedMap { store, guards }),
            Err(err) => Err(WrapError::new(store, err)),
        }
    }
}

impl<C: MapStore> GuardedMapBuilder<C, C::Key, C::Value>
where
    C::Key: Debug + Clone + PartialEq,
    C::Value: Debug + Clone + PartialEq,
    C::Error: Debug,
{
    /// Finish construction, first running every existing entry through the
    /// transformers.
    ///
    /// Only available while the transformers map the stored types onto
    /// themselves. Entries whose transformed form differs are written under
    /// their new key, then a key that changed is removed. If a transform or
    /// an insert fails, the store is handed back unchanged. Otherwise it is
    /// validated as in [`build`](Self::build).
    pub fn build_transforming(self) -> Result<GuardedMap<C>, WrapError<C, C::Error>> {
        let (mut store, guards) = self.into_guards();

        let changed = store
            .iter()
            .map(|(key, value)| -> Result<_, TransformError> {
                let new_key = convert(Role::Key, key.clone(), &guards.key_transformer)?;
                let new_value = convert(Role::Value, value.clone(), &guards.value_transformer)?;
                let differs = new_key != *key || new_value != *value;
                Ok(differs.then(|| (key.clone(), new_key, new_value)))
            })
            .filter_map(Result::transpose)
            .collect::<Result<Vec<_>, TransformError>>();
        let changed = match changed {
            Ok(changed) => changed,
            Err(err) => return Err(WrapError::new(store, err.into())),
        };

        let mut undo = Vec::new();
        for (_, new_key, new_value) in &changed {
            match store.insert(new_key.clone(), new_value.clone()) {
                Ok(previous) => undo.push((new_key.clone(), previous)),
                Err(err) => {
                    restore(&mut store, undo);
                    return Err(WrapError::new(store, delegate_failed(err)));
                }
            }
        }

        let new_keys: Vec<&C::Key> = changed.iter().map(|(_, new_key, _)| new_key).collect();
        for (key, new_key, _) in &changed {
            if key != new_key && !new_keys.contains(&key) {
                store.remove(key);
            }
        }

        match guards.validate_existing(&store) {
            Ok(()) => Ok(GuardedMap { store, guards }),
            Err(err) => Err(WrapError::new(store, err)),
        }
    }
}

impl<C: MapStore + Debug, KIn, VIn> Debug for GuardedMapBuilder<C, KIn, VIn> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedMapBuilder")
            .field("store", &self.store)
            .field("bulk_policy", &self.bulk_policy)
            .finish_non_exhaustive()
    }
}

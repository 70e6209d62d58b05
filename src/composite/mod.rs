//! Union of several delegate sets
//!
//! A [`CompositeSet`] presents its delegates as one set. Delegates are kept
//! pairwise disjoint: composing a set that overlaps an existing delegate
//! needs a [`CollisionStrategy`], and so does adding a single item (the
//! strategy picks the delegate).
//!
//! # Example
//!
//! ```rust
//! use bulwark::composite::{CompositeSet, FirstDelegate};
//! use std::collections::BTreeSet;
//!
//! let low: BTreeSet<i32> = [1, 2].into_iter().collect();
//! let high: BTreeSet<i32> = [3, 4].into_iter().collect();
//!
//! let mut union = CompositeSet::with_delegates([low, high]).unwrap();
//! assert!(union.contains(&3));
//! assert_eq!(union.len(), 4);
//!
//! // No strategy: there is no way to pick a delegate for a new item.
//! assert!(union.add(5).is_err());
//!
//! let mut union = union.with_strategy(FirstDelegate);
//! assert_eq!(union.add(5), Ok(true));
//! assert_eq!(union.add(3), Ok(false));
//! assert!(union.delegates()[0].contains(&5));
//! ```

mod strategy;

pub use strategy::{CollisionStrategy, FirstDelegate, PreferIncoming};

use std::collections::hash_map::DefaultHasher;
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};

use crate::error::{GuardError, UnsupportedOperation};
use crate::guard::delegate_failed;
use crate::store::{SetStore, Store};
use strategy::render;

/// A set view over the union of pairwise disjoint delegate sets.
pub struct CompositeSet<S: SetStore> {
    delegates: Vec<S>,
    strategy: Option<Box<dyn CollisionStrategy<S>>>,
}

impl<S: SetStore> CompositeSet<S> {
    /// An empty composite with no delegates and no strategy.
    pub fn new() -> Self {
        CompositeSet {
            delegates: Vec::new(),
            strategy: None,
        }
    }

    /// Compose `delegates` in order.
    ///
    /// Fails with [`GuardError::Unsupported`] if two of them overlap, since
    /// there is no strategy yet to resolve the collision.
    pub fn with_delegates<I>(delegates: I) -> Result<Self, GuardError<S::Error>>
    where
        I: IntoIterator<Item = S>,
        S::Item: Clone + Debug,
    {
        let mut composite = CompositeSet::new();
        for delegate in delegates {
            composite.add_composited(delegate)?;
        }
        Ok(composite)
    }

    /// Install a collision strategy, replacing any previous one.
    pub fn with_strategy<T>(mut self, strategy: T) -> Self
    where
        T: CollisionStrategy<S> + 'static,
    {
        self.strategy = Some(Box::new(strategy));
        self
    }

    /// Install or remove the collision strategy in place.
    pub fn set_strategy(&mut self, strategy: Option<Box<dyn CollisionStrategy<S>>>) {
        self.strategy = strategy;
    }

    /// Whether a collision strategy is installed.
    pub fn has_strategy(&self) -> bool {
        self.strategy.is_some()
    }

    /// Add another delegate set.
    ///
    /// Each existing delegate is intersected with `incoming`. An overlap
    /// without a strategy fails with [`GuardError::Unsupported`] and leaves
    /// every delegate as it was. With a strategy, its
    /// [`resolve_collision`](CollisionStrategy::resolve_collision) runs; if
    /// items remain in both sets afterwards the call fails with
    /// [`GuardError::Unresolved`] and `incoming` is dropped. Changes the
    /// strategy already made to earlier delegates are kept, so items it
    /// removed from them leave the union.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn add_composited(&mut self, mut incoming: S) -> Result<(), GuardError<S::Error>>
    where
        S::Item: Clone + Debug,
    {
        for (index, existing) in self.delegates.iter_mut().enumerate() {
            let overlap = intersection(existing, &incoming);
            if overlap.is_empty() {
                continue;
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(
                delegate = index,
                overlap = overlap.len(),
                "composited set collides with delegate"
            );

            let strategy = match &self.strategy {
                Some(strategy) => strategy,
                None => {
                    return Err(GuardError::Unsupported(UnsupportedOperation::new(
                        "add_composited",
                        "sets overlap and no collision strategy is set",
                    )))
                }
            };
            strategy.resolve_collision(existing, &mut incoming, &overlap);

            let remaining = intersection(existing, &incoming);
            if !remaining.is_empty() {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    delegate = index,
                    remaining = remaining.len(),
                    "collision strategy left overlap in place"
                );
                return Err(GuardError::Unresolved {
                    overlap: render(&remaining),
                });
            }
        }
        self.delegates.push(incoming);
        Ok(())
    }

    /// Remove and return the delegate at `index`.
    pub fn remove_composited(&mut self, index: usize) -> Option<S> {
        if index < self.delegates.len() {
            Some(self.delegates.remove(index))
        } else {
            None
        }
    }

    /// The delegate sets, in composition order.
    pub fn delegates(&self) -> &[S] {
        &self.delegates
    }

    /// Consume the composite, returning its delegates.
    pub fn into_delegates(self) -> Vec<S> {
        self.delegates
    }

    /// Whether any delegate holds `item`.
    pub fn contains(&self, item: &S::Item) -> bool {
        self.delegates.iter().any(|delegate| delegate.contains(item))
    }

    /// Total number of items across all delegates.
    pub fn len(&self) -> usize {
        self.delegates.iter().map(Store::len).sum()
    }

    /// True when every delegate is empty.
    pub fn is_empty(&self) -> bool {
        self.delegates.iter().all(Store::is_empty)
    }

    /// Iterate over the union, delegate by delegate.
    pub fn iter(&self) -> CompositeIter<'_, S> {
        CompositeIter {
            delegates: self.delegates.iter(),
            current: None,
        }
    }

    /// Remove `item` from whichever delegate holds it.
    pub fn remove(&mut self, item: &S::Item) -> bool {
        let mut removed = false;
        for delegate in &mut self.delegates {
            removed |= delegate.remove(item);
        }
        removed
    }

    /// Empty every delegate. The delegates themselves stay composed.
    pub fn clear(&mut self) {
        for delegate in &mut self.delegates {
            delegate.clear();
        }
    }

    /// Collect the union into a new collection.
    ///
    /// ```rust
    /// use bulwark::composite::CompositeSet;
    /// use std::collections::{BTreeSet, HashSet};
    ///
    /// let a: HashSet<char> = "ab".chars().collect();
    /// let b: HashSet<char> = "cd".chars().collect();
    /// let union = CompositeSet::with_delegates([a, b]).unwrap();
    ///
    /// let flat: BTreeSet<char> = union.to_set();
    /// assert_eq!(flat.into_iter().collect::<String>(), "abcd");
    /// ```
    pub fn to_set<T>(&self) -> T
    where
        T: FromIterator<S::Item>,
        S::Item: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Whether `other` holds exactly the items of this union.
    pub fn same_items<O>(&self, other: &O) -> bool
    where
        O: Store<Item = S::Item>,
    {
        self.len() == other.len() && self.iter().all(|item| other.contains(item))
    }

    /// Order-independent hash of the union's items.
    ///
    /// Equal contents hash equal no matter how they are split across
    /// delegates or how deeply composites are nested.
    pub fn content_hash(&self) -> u64
    where
        S::Item: Hash,
    {
        self.iter().fold(0u64, |acc, item| {
            let mut hasher = DefaultHasher::new();
            item.hash(&mut hasher);
            acc.wrapping_add(hasher.finish())
        })
    }
}

impl<S: SetStore> CompositeSet<S>
where
    S::Error: Debug,
{
    /// Add an item to the union.
    ///
    /// Returns `Ok(false)` if some delegate already holds it. Otherwise the
    /// strategy picks the delegate; without a strategy the add fails with
    /// [`GuardError::Unsupported`].
    pub fn add(&mut self, item: S::Item) -> Result<bool, GuardError<S::Error>> {
        if self.contains(&item) {
            return Ok(false);
        }
        let strategy = self.strategy.as_ref().ok_or_else(|| {
            UnsupportedOperation::new("add", "no collision strategy to choose a delegate")
        })?;
        let index = strategy
            .select(&self.delegates, &item)
            .filter(|index| *index < self.delegates.len())
            .ok_or_else(|| UnsupportedOperation::new("add", "strategy selected no delegate"))?;
        self.delegates[index].insert(item).map_err(delegate_failed)
    }

    /// Add every item in turn, stopping at the first failure.
    ///
    /// Items added before the failure stay added.
    pub fn add_all<I>(&mut self, items: I) -> Result<bool, GuardError<S::Error>>
    where
        I: IntoIterator<Item = S::Item>,
    {
        let mut changed = false;
        for item in items {
            changed |= self.add(item)?;
        }
        Ok(changed)
    }
}

fn intersection<S: SetStore>(existing: &S, incoming: &S) -> Vec<S::Item>
where
    S::Item: Clone,
{
    let (small, large) = if existing.len() <= incoming.len() {
        (existing, incoming)
    } else {
        (incoming, existing)
    };
    small
        .iter()
        .filter(|item| large.contains(item))
        .cloned()
        .collect()
}

impl<S: SetStore> Default for CompositeSet<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SetStore + Debug> Debug for CompositeSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeSet")
            .field("delegates", &self.delegates)
            .field("has_strategy", &self.strategy.is_some())
            .finish()
    }
}

impl<S, S2> PartialEq<CompositeSet<S2>> for CompositeSet<S>
where
    S: SetStore,
    S2: SetStore<Item = S::Item>,
{
    fn eq(&self, other: &CompositeSet<S2>) -> bool {
        self.len() == other.len() && self.iter().all(|item| other.contains(item))
    }
}

impl<S: SetStore> Eq for CompositeSet<S> {}

impl<S: SetStore> Hash for CompositeSet<S>
where
    S::Item: Hash,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.content_hash());
    }
}

impl<S: SetStore> Store for CompositeSet<S>
where
    S::Error: Debug,
{
    type Item = S::Item;
    type Error = GuardError<S::Error>;
    type Iter<'a>
        = CompositeIter<'a, S>
    where
        Self: 'a;

    fn insert(&mut self, item: S::Item) -> Result<bool, Self::Error> {
        self.add(item)
    }

    fn contains(&self, item: &S::Item) -> bool {
        CompositeSet::contains(self, item)
    }

    fn remove(&mut self, item: &S::Item) -> bool {
        CompositeSet::remove(self, item)
    }

    fn len(&self) -> usize {
        CompositeSet::len(self)
    }

    fn iter(&self) -> Self::Iter<'_> {
        CompositeSet::iter(self)
    }

    fn clear(&mut self) {
        CompositeSet::clear(self)
    }

    fn drain_all(&mut self) -> Vec<S::Item> {
        self.delegates
            .iter_mut()
            .flat_map(|delegate| delegate.drain_all())
            .collect()
    }

    fn undo_insert(&mut self, item: &S::Item) {
        CompositeSet::remove(self, item);
    }

    fn grows_with(&self, item: &S::Item) -> bool {
        !CompositeSet::contains(self, item)
    }
}

impl<S: SetStore> SetStore for CompositeSet<S> where S::Error: Debug {}

#[cfg(feature = "serde")]
impl<S> serde::Serialize for CompositeSet<S>
where
    S: SetStore,
    S::Item: serde::Serialize,
{
    fn serialize<Ser: serde::Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Iterator over a [`CompositeSet`], delegate by delegate.
pub struct CompositeIter<'a, S: Store + 'a> {
    delegates: std::slice::Iter<'a, S>,
    current: Option<S::Iter<'a>>,
}

impl<'a, S: Store + 'a> Iterator for CompositeIter<'a, S> {
    type Item = &'a S::Item;

    fn next(&mut self) -> Option<&'a S::Item> {
        loop {
            if let Some(item) = self.current.as_mut().and_then(Iterator::next) {
                return Some(item);
            }
            self.current = Some(self.delegates.next()?.iter());
        }
    }
}

impl<'a, S: Store + 'a> Debug for CompositeIter<'a, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CompositeIter")
    }
}

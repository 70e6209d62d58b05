//! Capacity-limited stores

use std::convert::Infallible;
use std::error::Error as StdError;
use std::fmt;

use super::{MapStore, SetStore, Store};

/// Error raised when a [`Bounded`] store is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityError {
    capacity: usize,
}

impl CapacityError {
    /// The capacity that was exceeded.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store is full (capacity {})", self.capacity)
    }
}

impl StdError for CapacityError {}

/// Wraps a store and refuses to grow it past a fixed capacity.
///
/// Replacing an existing map entry or re-adding a present set item does not
/// count as growth.
///
/// # Example
///
/// ```rust
/// use bulwark::store::{Bounded, Store};
/// use std::collections::BTreeSet;
///
/// let mut set = Bounded::new(BTreeSet::new(), 2);
/// assert_eq!(set.insert(1), Ok(true));
/// assert_eq!(set.insert(2), Ok(true));
/// assert_eq!(set.insert(2), Ok(false));
/// assert_eq!(set.insert(3).unwrap_err().capacity(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bounded<S> {
    inner: S,
    capacity: usize,
}

impl<S> Bounded<S> {
    /// Limit `inner` to `capacity` elements.
    ///
    /// An `inner` already above capacity is accepted as is; it just cannot
    /// grow further.
    pub fn new(inner: S, capacity: usize) -> Self {
        Bounded { inner, capacity }
    }

    /// The configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Borrow the wrapped store.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Unwrap the store.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn full(&self) -> CapacityError {
        CapacityError {
            capacity: self.capacity,
        }
    }
}

impl<S> Store for Bounded<S>
where
    S: Store<Error = Infallible>,
{
    type Item = S::Item;
    type Error = CapacityError;
    type Iter<'a>
        = S::Iter<'a>
    where
        Self: 'a;

    fn insert(&mut self, item: S::Item) -> Result<bool, CapacityError> {
        if self.inner.grows_with(&item) && self.inner.len() >= self.capacity {
            return Err(self.full());
        }
        match self.inner.insert(item) {
            Ok(changed) => Ok(changed),
            Err(never) => match never {},
        }
    }

    fn contains(&self, item: &S::Item) -> bool {
        self.inner.contains(item)
    }

    fn remove(&mut self, item: &S::Item) -> bool {
        self.inner.remove(item)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.inner.iter()
    }

    fn clear(&mut self) {
        self.inner.clear()
    }

    fn drain_all(&mut self) -> Vec<S::Item> {
        self.inner.drain_all()
    }

    fn undo_insert(&mut self, item: &S::Item) {
        self.inner.undo_insert(item)
    }

    fn grows_with(&self, item: &S::Item) -> bool {
        self.inner.grows_with(item)
    }
}

impl<S> SetStore for Bounded<S> where S: SetStore<Error = Infallible> {}

impl<M> MapStore for Bounded<M>
where
    M: MapStore<Error = Infallible>,
{
    type Key = M::Key;
    type Value = M::Value;
    type Error = CapacityError;
    type Iter<'a>
        = M::Iter<'a>
    where
        Self: 'a;
    type IterMut<'a>
        = M::IterMut<'a>
    where
        Self: 'a;

    fn insert(
        &mut self,
        key: M::Key,
        value: M::Value,
    ) -> Result<Option<M::Value>, CapacityError> {
        if !self.inner.contains_key(&key) && self.inner.len() >= self.capacity {
            return Err(self.full());
        }
        match self.inner.insert(key, value) {
            Ok(previous) => Ok(previous),
            Err(never) => match never {},
        }
    }

    fn get(&self, key: &M::Key) -> Option<&M::Value> {
        self.inner.get(key)
    }

    fn get_mut(&mut self, key: &M::Key) -> Option<&mut M::Value> {
        self.inner.get_mut(key)
    }

    fn get_key_value(&self, key: &M::Key) -> Option<(&M::Key, &M::Value)> {
        self.inner.get_key_value(key)
    }

    fn remove(&mut self, key: &M::Key) -> Option<M::Value> {
        self.inner.remove(key)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.inner.iter()
    }

    fn iter_mut(&mut self) -> Self::IterMut<'_> {
        self.inner.iter_mut()
    }

    fn clear(&mut self) {
        self.inner.clear()
    }

    fn drain_all(&mut self) -> Vec<(M::Key, M::Value)> {
        self.inner.drain_all()
    }
}

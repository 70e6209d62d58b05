//! Storage capabilities for decorated containers
//!
//! Guarded containers never care which concrete collection they decorate.
//! They talk to it through these traits:
//!
//! - [`Store`]: a collection of items (set, bag or list semantics)
//! - [`SetStore`]: a `Store` that never holds duplicates
//! - [`MapStore`]: a key/value mapping
//!
//! Implementations are provided for the standard collections, for
//! [`HashBag`] and for [`Bounded`], which adds a capacity limit and so a
//! real failure mode.

mod bag;
mod bounded;
mod std_impls;

pub use bag::{BagIter, HashBag};
pub use bounded::{Bounded, CapacityError};

/// A collection of items.
pub trait Store {
    /// Stored item type.
    type Item;
    /// Error raised by `insert`. Use `Infallible` when inserting cannot fail.
    type Error;
    /// Borrowing iterator over the items.
    type Iter<'a>: Iterator<Item = &'a Self::Item>
    where
        Self: 'a;

    /// Insert an item. Returns whether the collection changed.
    fn insert(&mut self, item: Self::Item) -> Result<bool, Self::Error>;

    /// Whether an equal item is present.
    fn contains(&self, item: &Self::Item) -> bool;

    /// Remove one occurrence of an item. Returns whether it was present.
    fn remove(&mut self, item: &Self::Item) -> bool;

    /// Number of items, counting duplicates.
    fn len(&self) -> usize;

    /// True when there are no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the items.
    fn iter(&self) -> Self::Iter<'_>;

    /// Remove everything.
    fn clear(&mut self);

    /// Remove and return every item.
    fn drain_all(&mut self) -> Vec<Self::Item>;

    /// Undo a successful `insert` of `item`.
    ///
    /// Stores that keep insertion order drop the most recently inserted
    /// occurrence rather than the first.
    fn undo_insert(&mut self, item: &Self::Item);

    /// Whether inserting `item` would add an element.
    ///
    /// Bags and lists grow on every insert, which is the default. Set stores
    /// answer `false` for items they already hold.
    fn grows_with(&self, item: &Self::Item) -> bool {
        let _ = item;
        true
    }
}

/// A [`Store`] with set semantics: `insert` of a present item returns
/// `Ok(false)` and leaves the store unchanged.
pub trait SetStore: Store {}

/// A key/value mapping.
pub trait MapStore {
    /// Key type.
    type Key;
    /// Value type.
    type Value;
    /// Error raised by `insert`.
    type Error;
    /// Borrowing iterator over entries.
    type Iter<'a>: Iterator<Item = (&'a Self::Key, &'a Self::Value)>
    where
        Self: 'a;
    /// Iterator over entries with mutable values.
    type IterMut<'a>: Iterator<Item = (&'a Self::Key, &'a mut Self::Value)>
    where
        Self: 'a;

    /// Insert or replace. Returns the previous value.
    fn insert(
        &mut self,
        key: Self::Key,
        value: Self::Value,
    ) -> Result<Option<Self::Value>, Self::Error>;

    /// Look up a value.
    fn get(&self, key: &Self::Key) -> Option<&Self::Value>;

    /// Look up a value for mutation.
    fn get_mut(&mut self, key: &Self::Key) -> Option<&mut Self::Value>;

    /// Look up a key and its value.
    fn get_key_value(&self, key: &Self::Key) -> Option<(&Self::Key, &Self::Value)>;

    /// Remove an entry, returning its value.
    fn remove(&mut self, key: &Self::Key) -> Option<Self::Value>;

    /// Whether the key is present.
    fn contains_key(&self, key: &Self::Key) -> bool {
        self.get(key).is_some()
    }

    /// Number of entries.
    fn len(&self) -> usize;

    /// True when there are no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over entries.
    fn iter(&self) -> Self::Iter<'_>;

    /// Iterate over entries with mutable access to values.
    fn iter_mut(&mut self) -> Self::IterMut<'_>;

    /// Remove every entry.
    fn clear(&mut self);

    /// Remove and return every entry.
    fn drain_all(&mut self) -> Vec<(Self::Key, Self::Value)>;
}

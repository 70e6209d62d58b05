//! Store implementations for the standard collections
//!
//! None of these can fail on insert, so their error type is `Infallible`.

use std::collections::{btree_map, btree_set, hash_map, hash_set};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::convert::Infallible;
use std::hash::Hash;

use super::{MapStore, SetStore, Store};

impl<T: Hash + Eq> Store for HashSet<T> {
    type Item = T;
    type Error = Infallible;
    type Iter<'a>
        = hash_set::Iter<'a, T>
    where
        Self: 'a;

    fn insert(&mut self, item: T) -> Result<bool, Infallible> {
        Ok(HashSet::insert(self, item))
    }

    fn contains(&self, item: &T) -> bool {
        HashSet::contains(self, item)
    }

    fn remove(&mut self, item: &T) -> bool {
        HashSet::remove(self, item)
    }

    fn len(&self) -> usize {
        HashSet::len(self)
    }

    fn iter(&self) -> Self::Iter<'_> {
        HashSet::iter(self)
    }

    fn clear(&mut self) {
        HashSet::clear(self)
    }

    fn drain_all(&mut self) -> Vec<T> {
        self.drain().collect()
    }

    fn undo_insert(&mut self, item: &T) {
        HashSet::remove(self, item);
    }

    fn grows_with(&self, item: &T) -> bool {
        !HashSet::contains(self, item)
    }
}

impl<T: Hash + Eq> SetStore for HashSet<T> {}

impl<T: Ord> Store for BTreeSet<T> {
    type Item = T;
    type Error = Infallible;
    type Iter<'a>
        = btree_set::Iter<'a, T>
    where
        Self: 'a;

    fn insert(&mut self, item: T) -> Result<bool, Infallible> {
        Ok(BTreeSet::insert(self, item))
    }

    fn contains(&self, item: &T) -> bool {
        BTreeSet::contains(self, item)
    }

    fn remove(&mut self, item: &T) -> bool {
        BTreeSet::remove(self, item)
    }

    fn len(&self) -> usize {
        BTreeSet::len(self)
    }

    fn iter(&self) -> Self::Iter<'_> {
        BTreeSet::iter(self)
    }

    fn clear(&mut self) {
        BTreeSet::clear(self)
    }

    fn drain_all(&mut self) -> Vec<T> {
        std::mem::take(self).into_iter().collect()
    }

    fn undo_insert(&mut self, item: &T) {
        BTreeSet::remove(self, item);
    }

    fn grows_with(&self, item: &T) -> bool {
        !BTreeSet::contains(self, item)
    }
}

impl<T: Ord> SetStore for BTreeSet<T> {}

/// List semantics: duplicates allowed, insertion order kept.
impl<T: PartialEq> Store for Vec<T> {
    type Item = T;
    type Error = Infallible;
    type Iter<'a>
        = std::slice::Iter<'a, T>
    where
        Self: 'a;

    fn insert(&mut self, item: T) -> Result<bool, Infallible> {
        self.push(item);
        Ok(true)
    }

    fn contains(&self, item: &T) -> bool {
        self.as_slice().contains(item)
    }

    fn remove(&mut self, item: &T) -> bool {
        match self.iter().position(|x| x == item) {
            Some(idx) => {
                Vec::remove(self, idx);
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.as_slice().iter()
    }

    fn clear(&mut self) {
        Vec::clear(self)
    }

    fn drain_all(&mut self) -> Vec<T> {
        std::mem::take(self)
    }

    fn undo_insert(&mut self, item: &T) {
        if let Some(idx) = self.iter().rposition(|x| x == item) {
            Vec::remove(self, idx);
        }
    }
}

impl<K: Hash + Eq, V> MapStore for HashMap<K, V> {
    type Key = K;
    type Value = V;
    type Error = Infallible;
    type Iter<'a>
        = hash_map::Iter<'a, K, V>
    where
        Self: 'a;
    type IterMut<'a>
        = hash_map::IterMut<'a, K, V>
    where
        Self: 'a;

    fn insert(&mut self, key: K, value: V) -> Result<Option<V>, Infallible> {
        Ok(HashMap::insert(self, key, value))
    }

    fn get(&self, key: &K) -> Option<&V> {
        HashMap::get(self, key)
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        HashMap::get_mut(self, key)
    }

    fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        HashMap::get_key_value(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        HashMap::remove(self, key)
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn iter(&self) -> Self::Iter<'_> {
        HashMap::iter(self)
    }

    fn iter_mut(&mut self) -> Self::IterMut<'_> {
        HashMap::iter_mut(self)
    }

    fn clear(&mut self) {
        HashMap::clear(self)
    }

    fn drain_all(&mut self) -> Vec<(K, V)> {
        self.drain().collect()
    }
}

impl<K: Ord, V> MapStore for BTreeMap<K, V> {
    type Key = K;
    type Value = V;
    type Error = Infallible;
    type Iter<'a>
        = btree_map::Iter<'a, K, V>
    where
        Self: 'a;
    type IterMut<'a>
        = btree_map::IterMut<'a, K, V>
    where
        Self: 'a;

    fn insert(&mut self, key: K, value: V) -> Result<Option<V>, Infallible> {
        Ok(BTreeMap::insert(self, key, value))
    }

    fn get(&self, key: &K) -> Option<&V> {
        BTreeMap::get(self, key)
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        BTreeMap::get_mut(self, key)
    }

    fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        BTreeMap::get_key_value(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        BTreeMap::remove(self, key)
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn iter(&self) -> Self::Iter<'_> {
        BTreeMap::iter(self)
    }

    fn iter_mut(&mut self) -> Self::IterMut<'_> {
        BTreeMap::iter_mut(self)
    }

    fn clear(&mut self) {
        BTreeMap::clear(self)
    }

    fn drain_all(&mut self) -> Vec<(K, V)> {
        std::mem::take(self).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill<S: Store>(store: &mut S, items: Vec<S::Item>) -> Vec<bool>
    where
        S::Error: std::fmt::Debug,
    {
        items
            .into_iter()
            .map(|item| store.insert(item).unwrap())
            .collect()
    }

    #[test]
    fn test_set_stores_refuse_duplicates() {
        let mut hashed = HashSet::new();
        assert_eq!(fill(&mut hashed, vec![1, 2, 1]), vec![true, true, false]);
        let mut ordered = BTreeSet::new();
        assert_eq!(fill(&mut ordered, vec![1, 2, 1]), vec![true, true, false]);
        assert_eq!(Store::len(&ordered), 2);
    }

    #[test]
    fn test_vec_keeps_duplicates_and_undoes_latest() {
        let mut list = Vec::new();
        fill(&mut list, vec!["a", "b", "a", "c"]);
        Store::undo_insert(&mut list, &"a");
        assert_eq!(list, vec!["a", "b", "c"]);
        assert!(Store::remove(&mut list, &"a"));
        assert_eq!(list, vec!["b", "c"]);
        assert!(!Store::remove(&mut list, &"z"));
    }

    #[test]
    fn test_drain_all_empties_store() {
        let mut set: BTreeSet<i32> = (1..=3).collect();
        assert_eq!(Store::drain_all(&mut set), vec![1, 2, 3]);
        assert!(Store::is_empty(&set));
    }

    #[test]
    fn test_map_stores() {
        let mut map = BTreeMap::new();
        assert_eq!(MapStore::insert(&mut map, "a", 1), Ok(None));
        assert_eq!(MapStore::insert(&mut map, "a", 2), Ok(Some(1)));
        assert_eq!(MapStore::get(&map, &"a"), Some(&2));
        assert!(MapStore::contains_key(&map, &"a"));
        for (_, v) in MapStore::iter_mut(&mut map) {
            *v += 1;
        }
        assert_eq!(MapStore::remove(&mut map, &"a"), Some(3));
        assert!(MapStore::is_empty(&map));

        let mut hashed: HashMap<i32, &str> = HashMap::new();
        MapStore::insert(&mut hashed, 1, "x").unwrap();
        assert_eq!(MapStore::drain_all(&mut hashed), vec![(1, "x")]);
    }
}

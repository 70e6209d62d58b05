//! A counted multiset

use std::collections::{hash_map, HashMap};
use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;

use super::Store;

/// A hash-based bag: a set that counts how many times each item was added.
///
/// # Example
///
/// ```rust
/// use bulwark::store::{HashBag, Store};
///
/// let mut bag = HashBag::new();
/// bag.insert("apple").unwrap();
/// bag.insert("apple").unwrap();
/// bag.insert("pear").unwrap();
///
/// assert_eq!(bag.count(&"apple"), 2);
/// assert_eq!(bag.len(), 3);
/// assert_eq!(bag.unique_len(), 2);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct HashBag<T: Hash + Eq> {
    counts: HashMap<T, usize>,
    total: usize,
}

impl<T: Hash + Eq> HashBag<T> {
    /// Create an empty bag.
    pub fn new() -> Self {
        HashBag {
            counts: HashMap::new(),
            total: 0,
        }
    }

    /// How many copies of `item` the bag holds.
    pub fn count(&self, item: &T) -> usize {
        self.counts.get(item).copied().unwrap_or(0)
    }

    /// Number of distinct items.
    pub fn unique_len(&self) -> usize {
        self.counts.len()
    }

    /// Iterate over distinct items with their counts.
    pub fn counts(&self) -> impl Iterator<Item = (&T, usize)> {
        self.counts.iter().map(|(item, n)| (item, *n))
    }
}

impl<T: Hash + Eq> Default for HashBag<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash + Eq + fmt::Debug> fmt::Debug for HashBag<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.counts.iter()).finish()
    }
}

impl<T: Hash + Eq> FromIterator<T> for HashBag<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut bag = HashBag::new();
        for item in iter {
            *bag.counts.entry(item).or_insert(0) += 1;
            bag.total += 1;
        }
        bag
    }
}

/// Iterator over a bag, yielding each item once per copy.
pub struct BagIter<'a, T> {
    inner: hash_map::Iter<'a, T, usize>,
    current: Option<(&'a T, usize)>,
}

impl<'a, T> Iterator for BagIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            if let Some((item, remaining)) = self.current.as_mut() {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Some(*item);
                }
            }
            let (item, n) = self.inner.next()?;
            self.current = Some((item, *n));
        }
    }
}

impl<'a, T> fmt::Debug for BagIter<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BagIter")
    }
}

impl<T: Hash + Eq + Clone> Store for HashBag<T> {
    type Item = T;
    type Error = Infallible;
    type Iter<'a>
        = BagIter<'a, T>
    where
        Self: 'a;

    fn insert(&mut self, item: T) -> Result<bool, Infallible> {
        *self.counts.entry(item).or_insert(0) += 1;
        self.total += 1;
        Ok(true)
    }

    fn contains(&self, item: &T) -> bool {
        self.counts.contains_key(item)
    }

    fn remove(&mut self, item: &T) -> bool {
        match self.counts.get_mut(item) {
            Some(n) if *n > 1 => {
                *n -= 1;
            }
            Some(_) => {
                self.counts.remove(item);
            }
            None => return false,
        }
        self.total -= 1;
        true
    }

    fn len(&self) -> usize {
        self.total
    }

    fn iter(&self) -> Self::Iter<'_> {
        BagIter {
            inner: self.counts.iter(),
            current: None,
        }
    }

    fn clear(&mut self) {
        self.counts.clear();
        self.total = 0;
    }

    fn drain_all(&mut self) -> Vec<T> {
        let mut items = Vec::with_capacity(self.total);
        for (item, n) in self.counts.drain() {
            for _ in 1..n {
                items.push(item.clone());
            }
            items.push(item);
        }
        self.total = 0;
        items
    }

    fn undo_insert(&mut self, item: &T) {
        self.remove(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_copies() {
        let mut bag: HashBag<char> = "banana".chars().collect();
        assert_eq!(bag.count(&'a'), 3);
        assert_eq!(bag.count(&'n'), 2);
        assert_eq!(bag.len(), 6);
        assert_eq!(bag.unique_len(), 3);

        assert!(bag.remove(&'a'));
        assert_eq!(bag.count(&'a'), 2);
        assert!(bag.remove(&'b'));
        assert!(!bag.contains(&'b'));
        assert!(!bag.remove(&'z'));
        assert_eq!(bag.len(), 4);
    }

    #[test]
    fn test_iter_repeats_items() {
        let bag: HashBag<i32> = vec![1, 1, 2].into_iter().collect();
        let mut seen: Vec<i32> = bag.iter().copied().collect();
        seen.sort();
        assert_eq!(seen, vec![1, 1, 2]);
    }
}

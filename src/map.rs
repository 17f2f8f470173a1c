//! An ordered map implemented with an AVL tree.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

use crate::tree::{self, AvlTree, EmptyContainerAccess};

/// An ordered map implemented with an AVL tree.
///
/// The map owns a single tree engine fixed in unique mode. Key-value pairs
/// are stored behind an ordering adapter that compares keys only, so the
/// tree never sees the key/value split.
///
/// ```
/// use avl_collections::AvlTreeMap;
/// let mut map = AvlTreeMap::new();
/// map.insert(1, "one");
/// map.insert(2, "two");
/// assert_eq!(map.get(&1), Some(&"one"));
/// map.remove(&1);
/// assert!(map.get(&1).is_none());
/// ```
#[derive(Clone)]
pub struct AvlTreeMap<K: Ord, V> {
    tree: AvlTree<MapEntry<K, V>>,
}

/// A key-value pair whose ordering and equality consider the key alone.
#[derive(Clone)]
struct MapEntry<K, V> {
    key: K,
    value: V,
}

/// An iterator over the entries of a map, sorted by key.
pub struct Iter<'a, K, V> {
    tree_iter: tree::Iter<'a, MapEntry<K, V>>,
}

/// An owning iterator over the entries of a map, sorted by key.
pub struct IntoIter<K: Ord, V> {
    tree_into_iter: tree::IntoIter<MapEntry<K, V>>,
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Creates an empty map.
    /// No memory is allocated until the first entry is inserted.
    pub fn new() -> Self {
        let mut tree = AvlTree::new();
        tree.set_unique();
        Self { tree }
    }

    /// Returns true if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns a theoretical capacity bound derived from the node footprint.
    pub fn max_size(&self) -> usize {
        self.tree.max_size()
    }

    /// Clears the map, deallocating all memory.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree.get(key).map(|entry| &entry.value)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.tree.find_mut(key).map(|entry| &mut entry.value)
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.tree.get(key).map(|entry| (&entry.key, &entry.value))
    }

    /// Returns true if the map contains the key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// Inserts a key-value pair into the map.
    /// Returns whether the pair was actually added; an already present key
    /// keeps its old value.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.tree.insert(MapEntry { key, value }).1
    }

    /// Inserts a key-value pair, overwriting the value of an already present
    /// key. Returns whether the key was newly added.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> bool {
        if let Some(slot) = self.get_mut(&key) {
            *slot = value;
            return false;
        }
        self.insert(key, value)
    }

    /// Removes a key from the map.
    /// Returns whether the key was previously in the map.
    pub fn remove(&mut self, key: &K) -> bool {
        self.tree.remove(key)
    }

    /// Returns the entry with the smallest key, or an error for an empty map.
    pub fn first_key_value(&self) -> Result<(&K, &V), EmptyContainerAccess> {
        self.tree.min().map(|entry| (&entry.key, &entry.value))
    }

    /// Returns the entry with the largest key, or an error for an empty map.
    pub fn last_key_value(&self) -> Result<(&K, &V), EmptyContainerAccess> {
        self.tree.max().map(|entry| (&entry.key, &entry.value))
    }

    /// Moves all entries from `other` into `self`, leaving `other` empty.
    /// Incoming entries whose key is already in `self` are dropped.
    pub fn append(&mut self, other: &mut Self) {
        self.tree.append(&mut other.tree);
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            tree_iter: self.tree.iter(),
        }
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        self.tree.check_consistency()
    }
}

impl<K: Ord, V> Default for AvlTreeMap<K, V> {
    /// Creates an empty map.
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTreeMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTreeMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a AvlTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord, V> IntoIterator for AvlTreeMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            tree_into_iter: self.tree.into_iter(),
        }
    }
}

impl<K: Ord, V> PartialEq for MapEntry<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Ord, V> Eq for MapEntry<K, V> {}

impl<K: Ord, V> PartialOrd for MapEntry<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord, V> Ord for MapEntry<K, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

// Lets key lookups reuse the tree's generic search. Sound because an
// entry orders exactly like its key.
impl<K: Ord, V> Borrow<K> for MapEntry<K, V> {
    fn borrow(&self) -> &K {
        &self.key
    }
}

// Auto derived clone would ask for K: Clone and V: Clone
impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            tree_iter: self.tree_iter.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.tree_iter.next().map(|entry| (&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.tree_iter.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.tree_iter
            .next_back()
            .map(|entry| (&entry.key, &entry.value))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map()
            .entries(
                self.tree_into_iter
                    .iter_remaining()
                    .map(|entry| (&entry.key, &entry.value)),
            )
            .finish()
    }
}

impl<K: Ord, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.tree_into_iter.next().map(|entry| (entry.key, entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.tree_into_iter.size_hint()
    }
}

impl<K: Ord, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.tree_into_iter
            .next_back()
            .map(|entry| (entry.key, entry.value))
    }
}

impl<K: Ord, V> ExactSizeIterator for IntoIter<K, V> {}

//! An ordered multiset implemented with an AVL tree.

use std::borrow::Borrow;
use std::fmt;

use crate::tree::{self, AvlTree, EmptyContainerAccess};

/// An ordered collection that keeps every inserted value, duplicates
/// included, implemented with an AVL tree.
///
/// Equal values iterate in the order they were inserted.
///
/// ```
/// use avl_collections::AvlTreeMultiset;
/// let mut bag = AvlTreeMultiset::new();
/// bag.insert(5);
/// bag.insert(5);
/// bag.insert(3);
/// assert_eq!(bag.count(&5), 2);
/// bag.remove(&5);
/// assert_eq!(bag.count(&5), 1);
/// ```
#[derive(Clone)]
pub struct AvlTreeMultiset<T: Ord> {
    tree: AvlTree<T>,
}

/// An iterator over the values of a multiset.
pub struct Iter<'a, T> {
    tree_iter: tree::Iter<'a, T>,
}

/// An owning iterator over the values of a multiset.
pub struct IntoIter<T: Ord> {
    tree_into_iter: tree::IntoIter<T>,
}

impl<T: Ord> AvlTreeMultiset<T> {
    /// Creates an empty multiset.
    /// No memory is allocated until the first value is inserted.
    pub fn new() -> Self {
        Self {
            tree: AvlTree::new(),
        }
    }

    /// Returns true if the multiset contains no values.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of values in the multiset, duplicates counted.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns a theoretical capacity bound derived from the node footprint.
    pub fn max_size(&self) -> usize {
        self.tree.max_size()
    }

    /// Clears the multiset, deallocating all memory.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns a reference to the first stored value equal to the given one.
    ///
    /// The value may be any borrowed form of the multiset's value type, but
    /// the ordering on the borrowed form *must* match the ordering on the
    /// value type.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get(value)
    }

    /// Returns true if the multiset contains a value.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.contains(value)
    }

    /// Counts the occurrences of a value.
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.count(value)
    }

    /// Inserts a value. Duplicates are always kept.
    pub fn insert(&mut self, value: T) {
        self.tree.insert(value);
    }

    /// Removes one occurrence of a value, the oldest one when several are
    /// present. Returns whether an occurrence was removed.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.remove(value)
    }

    /// Removes every occurrence of a value and returns how many there were.
    pub fn remove_all<Q>(&mut self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut removed = 0;
        while self.tree.remove(value) {
            removed += 1;
        }
        removed
    }

    /// Returns the smallest value, or an error for an empty multiset.
    pub fn first(&self) -> Result<&T, EmptyContainerAccess> {
        self.tree.min()
    }

    /// Returns the largest value, or an error for an empty multiset.
    pub fn last(&self) -> Result<&T, EmptyContainerAccess> {
        self.tree.max()
    }

    /// Moves all values from `other` into `self`, leaving `other` empty.
    pub fn append(&mut self, other: &mut Self) {
        self.tree.append(&mut other.tree);
    }

    /// Gets an iterator over the values of the multiset in sorted order.
    pub fn iter(&self) -> Iter<'_, T> {
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

impl<T: Ord> Default for AvlTreeMultiset<T> {
    /// Creates an empty multiset.
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug + Ord> fmt::Debug for AvlTreeMultiset<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Ord> FromIterator<T> for AvlTreeMultiset<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut multiset = Self::new();
        for value in iter {
            multiset.insert(value);
        }
        multiset
    }
}

impl<T: Ord> Extend<T> for AvlTreeMultiset<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T: Ord + Copy + 'a> Extend<&'a T> for AvlTreeMultiset<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<'a, T: Ord> IntoIterator for &'a AvlTreeMultiset<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Ord> IntoIterator for AvlTreeMultiset<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            tree_into_iter: self.tree.into_iter(),
        }
    }
}

// Auto derived clone would ask for T: Clone
impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Self {
            tree_iter: self.tree_iter.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.tree_iter.fmt(f)
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.tree_iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.tree_iter.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.tree_iter.next_back()
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<T: Ord + fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.tree_into_iter.fmt(f)
    }
}

impl<T: Ord> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.tree_into_iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.tree_into_iter.size_hint()
    }
}

impl<T: Ord> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.tree_into_iter.next_back()
    }
}

impl<T: Ord> ExactSizeIterator for IntoIter<T> {}

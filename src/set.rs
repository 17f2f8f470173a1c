//! An ordered set implemented with an AVL tree.

use std::borrow::Borrow;
use std::fmt;

use crate::tree::{self, AvlTree, EmptyContainerAccess};

/// An ordered set implemented with an AVL tree.
///
/// The set owns a single tree engine fixed in unique mode, so inserting a
/// value that is already present has no effect.
///
/// ```
/// use avl_collections::AvlTreeSet;
/// let mut set = AvlTreeSet::new();
/// set.insert(0);
/// set.insert(1);
/// set.insert(2);
/// assert_eq!(set.get(&1), Some(&1));
/// set.remove(&1);
/// assert!(set.get(&1).is_none());
/// ```
#[derive(Clone)]
pub struct AvlTreeSet<T: Ord> {
    tree: AvlTree<T>,
}

/// An iterator over the values of a set.
pub struct Iter<'a, T> {
    tree_iter: tree::Iter<'a, T>,
}

/// An owning iterator over the values of a set.
pub struct IntoIter<T: Ord> {
    tree_into_iter: tree::IntoIter<T>,
}

impl<T: Ord> AvlTreeSet<T> {
    /// Creates an empty set.
    /// No memory is allocated until the first value is inserted.
    pub fn new() -> Self {
        let mut tree = AvlTree::new();
        tree.set_unique();
        Self { tree }
    }

    /// Returns true if the set contains no values.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of values in the set.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns a theoretical capacity bound derived from the node footprint.
    pub fn max_size(&self) -> usize {
        self.tree.max_size()
    }

    /// Clears the set, deallocating all memory.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns a reference to the value in the set that is equal to the
    /// given value.
    ///
    /// The value may be any borrowed form of the set's value type, but the
    /// ordering on the borrowed form *must* match the ordering on the value
    /// type.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get(value)
    }

    /// Returns true if the set contains a value.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.contains(value)
    }

    /// Inserts a value into the set.
    /// Returns whether the value was actually added.
    pub fn insert(&mut self, value: T) -> bool {
        self.tree.insert(value).1
    }

    /// Removes a value from the set.
    /// Returns whether the value was previously in the set.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.remove(value)
    }

    /// Returns the smallest value, or an error for an empty set.
    pub fn first(&self) -> Result<&T, EmptyContainerAccess> {
        self.tree.min()
    }

    /// Returns the largest value, or an error for an empty set.
    pub fn last(&self) -> Result<&T, EmptyContainerAccess> {
        self.tree.max()
    }

    /// Moves all values from `other` into `self`, leaving `other` empty.
    /// Incoming values equal to one already in `self` are dropped.
    pub fn append(&mut self, other: &mut Self) {
        self.tree.append(&mut other.tree);
    }

    /// Gets an iterator over the values of the set in sorted order.
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

impl<T: Ord> Default for AvlTreeSet<T> {
    /// Creates an empty set.
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug + Ord> fmt::Debug for AvlTreeSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Ord> FromIterator<T> for AvlTreeSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<T: Ord> Extend<T> for AvlTreeSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T: Ord + Copy + 'a> Extend<&'a T> for AvlTreeSet<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<'a, T: Ord> IntoIterator for &'a AvlTreeSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Ord> IntoIterator for AvlTreeSet<T> {
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

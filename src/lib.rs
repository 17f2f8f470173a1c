//! Ordered containers backed by a self-balancing AVL tree.
//!
//! The crate provides [`AvlTreeSet`], [`AvlTreeMultiset`] and [`AvlTreeMap`],
//! all thin façades over one [`AvlTree`] engine instance each. The engine
//! keeps a parent back-pointer per node, so in-order traversal and cursor
//! movement are non-recursive and run in both directions.
//!
//! ```
//! use avl_collections::AvlTreeSet;
//!
//! let mut set = AvlTreeSet::new();
//! set.insert(2);
//! set.insert(1);
//! set.insert(3);
//! assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
//! ```

pub mod map;
pub mod multiset;
pub mod set;
pub mod tree;

pub use map::AvlTreeMap;
pub use multiset::AvlTreeMultiset;
pub use set::AvlTreeSet;
pub use tree::{AvlTree, Cursor, EmptyContainerAccess};

#[cfg(test)]
mod tests;

//! The AVL tree engine shared by the ordered-container façades.
//!
//! The tree stores opaque values ordered by their `Ord` relation. Each node
//! carries an owning left/right edge and a non-owning parent back-pointer,
//! so in-order traversal and cursor movement never recurse and never need
//! auxiliary state beyond the node links themselves.

use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::error;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

/// An ordered collection of values backed by a self-balancing binary tree.
///
/// The tree runs in one of two insertion modes. In the default mode equal
/// values are all kept and an equal-value run preserves insertion order.
/// After [`set_unique`](AvlTree::set_unique) an insert of an already present
/// value is rejected instead.
pub struct AvlTree<T: Ord> {
    root: Link<T>,
    num_nodes: usize,
    unique: bool,
}

struct Node<T> {
    value: T,
    left: Link<T>,
    right: Link<T>,
    parent: Link<T>,
    height: usize,
}

type NodePtr<T> = NonNull<Node<T>>;
type Link<T> = Option<NodePtr<T>>;
type LinkPtr<T> = NonNull<Link<T>>;

enum Visit {
    Descending,
    LeftDone,
    RightDone,
}

/// Error returned when reading the minimum or maximum element of an empty
/// container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyContainerAccess;

impl fmt::Display for EmptyContainerAccess {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("attempt to access an element of an empty container")
    }
}

impl error::Error for EmptyContainerAccess {}

/// A bidirectional position within a tree.
///
/// A cursor either points at a node or sits past the last element. The
/// past-the-end position remembers the node it stepped off, so
/// [`move_prev`](Cursor::move_prev) can recover the maximum element.
pub struct Cursor<'a, T> {
    node: Link<T>,
    last: Link<T>,
    marker: PhantomData<&'a Node<T>>,
}

/// A double-ended iterator over the values of a tree in sorted order.
pub struct Iter<'a, T> {
    front: Link<T>,
    back: Link<T>,
    remaining: usize,
    marker: PhantomData<&'a Node<T>>,
}

/// An owning iterator over the values of a tree in sorted order.
pub struct IntoIter<T: Ord> {
    tree: AvlTree<T>,
}

impl<T: Ord> AvlTree<T> {
    /// Creates an empty tree in duplicate-permitting mode.
    /// No memory is allocated until the first value is inserted.
    pub fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
            unique: false,
        }
    }

    /// Returns true if the tree contains no values.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of values in the tree.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the height of the tree. An empty tree has height zero,
    /// a single node height one.
    pub fn height(&self) -> usize {
        Self::height_of(self.root)
    }

    /// Returns the number of values the tree could theoretically hold,
    /// derived from the node footprint. Nothing enforces this bound.
    pub fn max_size(&self) -> usize {
        usize::MAX / mem::size_of::<Node<T>>()
    }

    /// Switches the tree to unique mode. Only future inserts are affected;
    /// duplicates already present stay in place.
    pub fn set_unique(&mut self) {
        self.unique = true;
    }

    /// Returns true if the tree rejects duplicate values on insert.
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Clears the tree, deallocating all nodes.
    pub fn clear(&mut self) {
        self.postorder(|node_ptr| unsafe { Node::destroy(node_ptr) });
        self.root = None;
        self.num_nodes = 0;
    }

    /// Inserts a value and returns a cursor to its node.
    ///
    /// In unique mode inserting an already present value changes nothing and
    /// returns a cursor to the existing node together with `false`. Otherwise
    /// the second half of the pair is `true` and a new duplicate ends up
    /// after its equals in iteration order.
    pub fn insert(&mut self, value: T) -> (Cursor<'_, T>, bool) {
        match self.find_insert_pos(&value) {
            Ok((parent, mut link_ptr)) => {
                let node_ptr = Node::create(parent, value);
                unsafe {
                    *link_ptr.as_mut() = Some(node_ptr);
                }
                self.num_nodes += 1;
                self.rebalance_once(parent);
                (Cursor::at(node_ptr), true)
            }
            Err(node_ptr) => (Cursor::at(node_ptr), false),
        }
    }

    /// Removes one occurrence of a value.
    /// Returns whether a node was removed; removing an absent value is a
    /// no-op. With duplicates present the first one in iteration order goes.
    ///
    /// The value may be any borrowed form of the tree's value type, but the
    /// ordering on the borrowed form *must* match the ordering on the value
    /// type.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if let Some(node_ptr) = self.find_node(value) {
            debug_assert!(self.num_nodes >= 1);
            self.unlink_node(node_ptr);
            unsafe { Node::destroy(node_ptr) };
            self.num_nodes -= 1;
            return true;
        }
        false
    }

    /// Returns a reference to the first value equal to the given one.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(value)
            .map(|node_ptr| &unsafe { &*node_ptr.as_ptr() }.value)
    }

    /// Returns a cursor to the first value equal to the given one,
    /// or the past-the-end cursor if there is none.
    pub fn find<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.find_node(value) {
            Some(node_ptr) => Cursor::at(node_ptr),
            None => self.cursor_end(),
        }
    }

    /// Returns true if the tree contains a value equal to the given one.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(value).is_some()
    }

    /// Counts the values equal to the given one by walking the equal run.
    /// The count is zero or one for a unique-mode tree and is computed on
    /// demand, never cached.
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut count = 0;
        let mut current = self.find_node(value);
        while let Some(node_ptr) = current {
            if unsafe { node_ptr.as_ref() }.value.borrow().cmp(value) != Ordering::Equal {
                break;
            }
            count += 1;
            current = unsafe { successor(node_ptr) };
        }
        count
    }

    /// Returns the minimum value, or an error for an empty tree.
    pub fn min(&self) -> Result<&T, EmptyContainerAccess> {
        match self.root {
            None => Err(EmptyContainerAccess),
            Some(root_ptr) => Ok(&unsafe { &*leftmost(root_ptr).as_ptr() }.value),
        }
    }

    /// Returns the maximum value, or an error for an empty tree.
    pub fn max(&self) -> Result<&T, EmptyContainerAccess> {
        match self.root {
            None => Err(EmptyContainerAccess),
            Some(root_ptr) => Ok(&unsafe { &*rightmost(root_ptr).as_ptr() }.value),
        }
    }

    /// Returns a cursor at the minimum value,
    /// or the past-the-end cursor for an empty tree.
    pub fn cursor_front(&self) -> Cursor<'_, T> {
        match self.root {
            None => Cursor::end(None),
            Some(root_ptr) => Cursor::at(leftmost(root_ptr)),
        }
    }

    /// Returns the past-the-end cursor.
    /// Moving it backwards yields the maximum value.
    pub fn cursor_end(&self) -> Cursor<'_, T> {
        Cursor::end(self.root.map(rightmost))
    }

    /// Gets an iterator over the values of the tree in sorted order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            front: self.root.map(leftmost),
            back: self.root.map(rightmost),
            remaining: self.num_nodes,
            marker: PhantomData,
        }
    }

    /// Moves all values from `other` into `self`, leaving `other` empty.
    /// The insertion mode of both trees is unchanged.
    pub fn append(&mut self, other: &mut Self) {
        let unique = other.unique;
        for value in mem::take(other) {
            self.insert(value);
        }
        other.unique = unique;
    }

    /// Returns a mutable reference to the first value equal to the given one.
    /// The caller must not change how the value orders relative to the rest
    /// of the tree.
    pub(crate) fn find_mut<Q>(&mut self, value: &Q) -> Option<&mut T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(value)
            .map(|node_ptr| unsafe { &mut (*node_ptr.as_ptr()).value })
    }

    /// Asserts that the node graph satisfies every structural invariant:
    /// search order, height bookkeeping, balance and parent back-references.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        unsafe {
            // Check root link
            if let Some(root_ptr) = self.root {
                assert!(root_ptr.as_ref().parent.is_none());
            }

            // Check tree nodes
            let mut num_nodes = 0;
            self.preorder(|node_ptr| {
                let left_height = Self::height_of(node_ptr.as_ref().left);
                let right_height = Self::height_of(node_ptr.as_ref().right);

                // Check child links; equal neighbors are fine, the tree may
                // hold duplicates
                if let Some(left_ptr) = node_ptr.as_ref().left {
                    assert!(left_ptr.as_ref().parent == Some(node_ptr));
                    assert!(left_ptr.as_ref().value <= node_ptr.as_ref().value);
                }
                if let Some(right_ptr) = node_ptr.as_ref().right {
                    assert!(right_ptr.as_ref().parent == Some(node_ptr));
                    assert!(right_ptr.as_ref().value >= node_ptr.as_ref().value);
                }

                // Check height bookkeeping and the AVL condition
                assert_eq!(
                    node_ptr.as_ref().height,
                    1 + cmp::max(left_height, right_height)
                );
                assert!(left_height <= right_height + 1);
                assert!(right_height <= left_height + 1);

                num_nodes += 1;
            });

            // Check number of nodes
            assert_eq!(num_nodes, self.num_nodes);
        }
    }

    /// Finds the first node in iteration order whose value equals the given
    /// one. On an equal hit the search keeps descending left, so the oldest
    /// duplicate is returned.
    fn find_node<Q>(&self, value: &Q) -> Link<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        let mut found: Link<T> = None;
        while let Some(node_ptr) = current {
            unsafe {
                match value.cmp(node_ptr.as_ref().value.borrow()) {
                    Ordering::Less => current = node_ptr.as_ref().left,
                    Ordering::Greater => current = node_ptr.as_ref().right,
                    Ordering::Equal => {
                        found = current;
                        current = node_ptr.as_ref().left;
                    }
                }
            }
        }
        found
    }

    /// Descends to the link where a new value belongs and returns it along
    /// with the parent node. In unique mode an equal node short-circuits the
    /// descent and comes back as the error value. Duplicates descend right on
    /// equal, which keeps an equal-value run in arrival order.
    fn find_insert_pos(&mut self, value: &T) -> Result<(Link<T>, LinkPtr<T>), NodePtr<T>> {
        let mut parent: Link<T> = None;
        let mut link_ptr: LinkPtr<T> = unsafe { LinkPtr::new_unchecked(&mut self.root) };
        unsafe {
            while let Some(mut node_ptr) = *link_ptr.as_ref() {
                match value.cmp(&node_ptr.as_ref().value) {
                    Ordering::Equal if self.unique => return Err(node_ptr),
                    Ordering::Less => {
                        parent = Some(node_ptr);
                        link_ptr = LinkPtr::new_unchecked(&mut node_ptr.as_mut().left);
                    }
                    Ordering::Equal | Ordering::Greater => {
                        parent = Some(node_ptr);
                        link_ptr = LinkPtr::new_unchecked(&mut node_ptr.as_mut().right);
                    }
                }
            }
        }
        Ok((parent, link_ptr))
    }

    /// Takes a node out of the graph without freeing it.
    fn unlink_node(&mut self, node_ptr: NodePtr<T>) {
        unsafe {
            if let Some(mut min_child_ptr) = node_ptr.as_ref().right {
                // Find the in-order successor, the smallest node of the
                // right subtree
                let mut min_child_parent_ptr = node_ptr;
                while let Some(left_ptr) = min_child_ptr.as_ref().left {
                    min_child_parent_ptr = min_child_ptr;
                    min_child_ptr = left_ptr;
                }

                // The successor has no left child, so it comes out by
                // splicing its right subtree into its place
                debug_assert!(min_child_ptr.as_ref().left.is_none());
                if min_child_parent_ptr.as_ref().left == Some(min_child_ptr) {
                    min_child_parent_ptr.as_mut().left = min_child_ptr.as_ref().right;
                } else {
                    min_child_parent_ptr.as_mut().right = min_child_ptr.as_ref().right;
                }
                if let Some(mut right_ptr) = min_child_ptr.as_ref().right {
                    right_ptr.as_mut().parent = min_child_ptr.as_ref().parent;
                }

                // Put the successor where the node to unlink was
                // (up to six links)
                min_child_ptr.as_mut().left = node_ptr.as_ref().left;
                if let Some(mut left_ptr) = node_ptr.as_ref().left {
                    left_ptr.as_mut().parent = Some(min_child_ptr);
                }
                min_child_ptr.as_mut().right = node_ptr.as_ref().right;
                if let Some(mut right_ptr) = node_ptr.as_ref().right {
                    right_ptr.as_mut().parent = Some(min_child_ptr);
                }
                min_child_ptr.as_mut().parent = node_ptr.as_ref().parent;
                self.replace_child(node_ptr.as_ref().parent, node_ptr, Some(min_child_ptr));

                // The successor's old parent may be out of balance now. When
                // that parent was the unlinked node itself, the successor has
                // taken its place and the walk starts there instead.
                let rebalance_from = if min_child_parent_ptr == node_ptr {
                    min_child_ptr
                } else {
                    min_child_parent_ptr
                };
                self.rebalance(Some(rebalance_from));
            } else {
                // Stem or leaf, splice the left child (if any) into place
                debug_assert!(node_ptr.as_ref().right.is_none());
                if let Some(mut left_ptr) = node_ptr.as_ref().left {
                    left_ptr.as_mut().parent = node_ptr.as_ref().parent;
                }
                let parent = node_ptr.as_ref().parent;
                self.replace_child(parent, node_ptr, node_ptr.as_ref().left);
                self.rebalance(parent);
            }
        }
    }

    /// Redirects the edge from `parent` to `old_child` onto `new_child`.
    /// A missing parent means `old_child` was the root.
    unsafe fn replace_child(&mut self, parent: Link<T>, old_child: NodePtr<T>, new_child: Link<T>) {
        match parent {
            None => self.root = new_child,
            Some(mut parent_ptr) => {
                if parent_ptr.as_ref().left == Some(old_child) {
                    parent_ptr.as_mut().left = new_child;
                } else {
                    debug_assert!(parent_ptr.as_ref().right == Some(old_child));
                    parent_ptr.as_mut().right = new_child;
                }
            }
        }
    }

    /// Unlinks the minimum node and returns its value.
    fn pop_min(&mut self) -> Option<T> {
        let node_ptr = leftmost(self.root?);
        self.unlink_node(node_ptr);
        self.num_nodes -= 1;
        Some(unsafe { Node::take(node_ptr) })
    }

    /// Unlinks the maximum node and returns its value.
    fn pop_max(&mut self) -> Option<T> {
        let node_ptr = rightmost(self.root?);
        self.unlink_node(node_ptr);
        self.num_nodes -= 1;
        Some(unsafe { Node::take(node_ptr) })
    }

    fn height_of(link: Link<T>) -> usize {
        match link {
            None => 0,
            Some(node_ptr) => unsafe { node_ptr.as_ref().height },
        }
    }

    /// Right subtree height minus left subtree height.
    fn balance_factor(node_ptr: NodePtr<T>) -> isize {
        let left_height = Self::height_of(unsafe { node_ptr.as_ref().left });
        let right_height = Self::height_of(unsafe { node_ptr.as_ref().right });
        right_height as isize - left_height as isize
    }

    /// Recomputes a node's height from its children after an edge change.
    fn fix_height(mut node_ptr: NodePtr<T>) {
        unsafe {
            node_ptr.as_mut().height = 1 + cmp::max(
                Self::height_of(node_ptr.as_ref().left),
                Self::height_of(node_ptr.as_ref().right),
            );
        }
    }

    fn rotate_left(&mut self, mut node_ptr: NodePtr<T>) {
        unsafe {
            if let Some(mut pivot_ptr) = node_ptr.as_ref().right {
                node_ptr.as_mut().right = pivot_ptr.as_ref().left;
                if let Some(mut inner_ptr) = pivot_ptr.as_ref().left {
                    inner_ptr.as_mut().parent = Some(node_ptr);
                }

                pivot_ptr.as_mut().parent = node_ptr.as_ref().parent;
                self.replace_child(node_ptr.as_ref().parent, node_ptr, Some(pivot_ptr));

                pivot_ptr.as_mut().left = Some(node_ptr);
                node_ptr.as_mut().parent = Some(pivot_ptr);

                Self::fix_height(node_ptr);
                Self::fix_height(pivot_ptr);
            }
        }
    }

    fn rotate_right(&mut self, mut node_ptr: NodePtr<T>) {
        unsafe {
            if let Some(mut pivot_ptr) = node_ptr.as_ref().left {
                node_ptr.as_mut().left = pivot_ptr.as_ref().right;
                if let Some(mut inner_ptr) = pivot_ptr.as_ref().right {
                    inner_ptr.as_mut().parent = Some(node_ptr);
                }

                pivot_ptr.as_mut().parent = node_ptr.as_ref().parent;
                self.replace_child(node_ptr.as_ref().parent, node_ptr, Some(pivot_ptr));

                pivot_ptr.as_mut().right = Some(node_ptr);
                node_ptr.as_mut().parent = Some(pivot_ptr);

                Self::fix_height(node_ptr);
                Self::fix_height(pivot_ptr);
            }
        }
    }

    /// Rebalances nodes starting from the given position up to the root.
    fn rebalance(&mut self, start_from: Link<T>) {
        let mut current = start_from;
        while let Some(node_ptr) = current {
            let parent = unsafe { node_ptr.as_ref().parent };
            self.rebalance_node(node_ptr);
            current = parent;
        }
    }

    /// Rebalances nodes starting from the given position up to the root,
    /// stopping after the first rotation. That is enough to restore balance
    /// after a single insert.
    fn rebalance_once(&mut self, start_from: Link<T>) {
        let mut current = start_from;
        while let Some(node_ptr) = current {
            let parent = unsafe { node_ptr.as_ref().parent };
            let did_rebalance = self.rebalance_node(node_ptr);
            if did_rebalance {
                break;
            }
            current = parent;
        }
    }

    /// Restores the AVL condition at the given node if necessary and adjusts
    /// its height. The balance factor must not exceed two in magnitude, which
    /// always holds after a single structural update below. Returns whether a
    /// rotation was performed.
    fn rebalance_node(&mut self, node_ptr: NodePtr<T>) -> bool {
        let balance = Self::balance_factor(node_ptr);
        debug_assert!((-2..=2).contains(&balance));
        if balance < -1 {
            // Left subtree too tall
            let left_ptr = unsafe { node_ptr.as_ref().left }.unwrap();
            if Self::balance_factor(left_ptr) > 0 {
                self.rotate_left(left_ptr);
            }
            self.rotate_right(node_ptr);
            true
        } else if balance > 1 {
            // Right subtree too tall
            let right_ptr = unsafe { node_ptr.as_ref().right }.unwrap();
            if Self::balance_factor(right_ptr) < 0 {
                self.rotate_right(right_ptr);
            }
            self.rotate_left(node_ptr);
            true
        } else {
            Self::fix_height(node_ptr);
            false
        }
    }

    #[cfg(any(test, feature = "consistency_check"))]
    fn preorder<F: FnMut(NodePtr<T>)>(&self, f: F) {
        self.traverse(f, |_| {});
    }

    fn postorder<F: FnMut(NodePtr<T>)>(&self, f: F) {
        self.traverse(|_| {}, f);
    }

    /// Walks the whole tree without recursion, driven by the direction the
    /// walk arrived from at each node.
    fn traverse<Pre, Post>(&self, mut preorder: Pre, mut postorder: Post)
    where
        Pre: FnMut(NodePtr<T>),
        Post: FnMut(NodePtr<T>),
    {
        if let Some(mut node_ptr) = self.root {
            let mut visit = Visit::Descending;
            loop {
                match visit {
                    Visit::Descending => {
                        preorder(node_ptr);
                        if let Some(left_ptr) = unsafe { node_ptr.as_ref().left } {
                            node_ptr = left_ptr;
                        } else {
                            visit = Visit::LeftDone;
                        }
                    }
                    Visit::LeftDone => {
                        if let Some(right_ptr) = unsafe { node_ptr.as_ref().right } {
                            node_ptr = right_ptr;
                            visit = Visit::Descending;
                        } else {
                            visit = Visit::RightDone;
                        }
                    }
                    Visit::RightDone => {
                        // Teardown runs through the postorder hook, so the
                        // node pointer must not be touched after the call
                        if let Some(parent_ptr) = unsafe { node_ptr.as_ref().parent } {
                            visit = if Some(node_ptr) == unsafe { parent_ptr.as_ref().left } {
                                Visit::LeftDone
                            } else {
                                Visit::RightDone
                            };
                            postorder(node_ptr);
                            node_ptr = parent_ptr;
                        } else {
                            postorder(node_ptr);
                            break;
                        }
                    }
                }
            }
        }
    }
}

impl<T: Ord> Drop for AvlTree<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: Ord> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + Clone> Clone for AvlTree<T> {
    /// Deep-clones every reachable node into an independent graph, keeping
    /// structure, heights and the insertion mode. An explicit work stack
    /// bounds the clone by heap instead of call stack.
    fn clone(&self) -> Self {
        let mut cloned = Self {
            root: None,
            num_nodes: self.num_nodes,
            unique: self.unique,
        };
        if let Some(src_root_ptr) = self.root {
            let dst_root_ptr = unsafe { Node::clone_of(src_root_ptr, None) };
            cloned.root = Some(dst_root_ptr);
            let mut work = vec![(src_root_ptr, dst_root_ptr)];
            while let Some((src_ptr, mut dst_ptr)) = work.pop() {
                unsafe {
                    if let Some(src_left_ptr) = src_ptr.as_ref().left {
                        let dst_left_ptr = Node::clone_of(src_left_ptr, Some(dst_ptr));
                        dst_ptr.as_mut().left = Some(dst_left_ptr);
                        work.push((src_left_ptr, dst_left_ptr));
                    }
                    if let Some(src_right_ptr) = src_ptr.as_ref().right {
                        let dst_right_ptr = Node::clone_of(src_right_ptr, Some(dst_ptr));
                        dst_ptr.as_mut().right = Some(dst_right_ptr);
                        work.push((src_right_ptr, dst_right_ptr));
                    }
                }
            }
        }
        cloned
    }
}

impl<T: Ord + fmt::Debug> fmt::Debug for AvlTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

unsafe impl<T: Ord + Send> Send for AvlTree<T> {}
unsafe impl<T: Ord + Sync> Sync for AvlTree<T> {}

impl<'a, T: Ord> IntoIterator for &'a AvlTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Ord> IntoIterator for AvlTree<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter { tree: self }
    }
}

impl<T> Node<T> {
    fn create(parent: Link<T>, value: T) -> NodePtr<T> {
        let boxed = Box::new(Node {
            value,
            parent,
            left: None,
            right: None,
            height: 1,
        });
        unsafe { NodePtr::new_unchecked(Box::into_raw(boxed)) }
    }

    unsafe fn destroy(node_ptr: NodePtr<T>) {
        drop(Box::from_raw(node_ptr.as_ptr()));
    }

    unsafe fn take(node_ptr: NodePtr<T>) -> T {
        Box::from_raw(node_ptr.as_ptr()).value
    }
}

impl<T: Clone> Node<T> {
    unsafe fn clone_of(src_ptr: NodePtr<T>, parent: Link<T>) -> NodePtr<T> {
        let src = src_ptr.as_ref();
        let boxed = Box::new(Node {
            value: src.value.clone(),
            parent,
            left: None,
            right: None,
            height: src.height,
        });
        NodePtr::new_unchecked(Box::into_raw(boxed))
    }
}

impl<'a, T> Cursor<'a, T> {
    fn at(node_ptr: NodePtr<T>) -> Self {
        Self {
            node: Some(node_ptr),
            last: None,
            marker: PhantomData,
        }
    }

    fn end(last: Link<T>) -> Self {
        Self {
            node: None,
            last,
            marker: PhantomData,
        }
    }

    /// Returns the value the cursor points at,
    /// or `None` for the past-the-end position.
    pub fn value(&self) -> Option<&'a T> {
        self.node
            .map(|node_ptr| unsafe { &(*node_ptr.as_ptr()).value })
    }

    /// Moves to the in-order successor. At the last element the cursor
    /// becomes the past-the-end position; there it stays put.
    pub fn move_next(&mut self) {
        if let Some(node_ptr) = self.node {
            self.node = unsafe { successor(node_ptr) };
            if self.node.is_none() {
                self.last = Some(node_ptr);
            }
        }
    }

    /// Moves to the in-order predecessor. From the past-the-end position
    /// this recovers the maximum element; at the first element the cursor
    /// stays put.
    pub fn move_prev(&mut self) {
        match self.node {
            Some(node_ptr) => {
                if let Some(prev_ptr) = unsafe { predecessor(node_ptr) } {
                    self.node = Some(prev_ptr);
                }
            }
            None => self.node = self.last,
        }
    }
}

impl<'a, T> PartialEq for Cursor<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<'a, T> Eq for Cursor<'a, T> {}

impl<'a, T> Clone for Cursor<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Cursor<'a, T> {}

unsafe impl<'a, T: Sync> Send for Cursor<'a, T> {}
unsafe impl<'a, T: Sync> Sync for Cursor<'a, T> {}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node_ptr = self.front?;
        self.remaining -= 1;
        self.front = unsafe { successor(node_ptr) };
        Some(unsafe { &(*node_ptr.as_ptr()).value })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node_ptr = self.back?;
        self.remaining -= 1;
        self.back = unsafe { predecessor(node_ptr) };
        Some(unsafe { &(*node_ptr.as_ptr()).value })
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}
impl<'a, T> FusedIterator for Iter<'a, T> {}

// Auto derived clone would ask for T: Clone
impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Self {
            front: self.front,
            back: self.back,
            remaining: self.remaining,
            marker: PhantomData,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

unsafe impl<'a, T: Sync> Send for Iter<'a, T> {}
unsafe impl<'a, T: Sync> Sync for Iter<'a, T> {}

impl<T: Ord> IntoIter<T> {
    /// Iterates over the values not yet consumed.
    pub(crate) fn iter_remaining(&self) -> Iter<'_, T> {
        self.tree.iter()
    }
}

impl<T: Ord> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.tree.pop_min()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len(), Some(self.tree.len()))
    }
}

impl<T: Ord> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.tree.pop_max()
    }
}

impl<T: Ord> ExactSizeIterator for IntoIter<T> {}
impl<T: Ord> FusedIterator for IntoIter<T> {}

impl<T: Ord + fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.tree.iter()).finish()
    }
}

fn leftmost<T>(mut node_ptr: NodePtr<T>) -> NodePtr<T> {
    unsafe {
        while let Some(left_ptr) = node_ptr.as_ref().left {
            node_ptr = left_ptr;
        }
    }
    node_ptr
}

fn rightmost<T>(mut node_ptr: NodePtr<T>) -> NodePtr<T> {
    unsafe {
        while let Some(right_ptr) = node_ptr.as_ref().right {
            node_ptr = right_ptr;
        }
    }
    node_ptr
}

/// In-order successor computed from the node links alone: leftmost node of
/// the right subtree, or else the first ancestor reached from a left child.
unsafe fn successor<T>(node_ptr: NodePtr<T>) -> Link<T> {
    if let Some(right_ptr) = node_ptr.as_ref().right {
        return Some(leftmost(right_ptr));
    }
    let mut child = node_ptr;
    let mut current = node_ptr.as_ref().parent;
    while let Some(parent_ptr) = current {
        if parent_ptr.as_ref().left == Some(child) {
            return Some(parent_ptr);
        }
        child = parent_ptr;
        current = parent_ptr.as_ref().parent;
    }
    None
}

/// In-order predecessor, the mirror image of [`successor`].
unsafe fn predecessor<T>(node_ptr: NodePtr<T>) -> Link<T> {
    if let Some(left_ptr) = node_ptr.as_ref().left {
        return Some(rightmost(left_ptr));
    }
    let mut child = node_ptr;
    let mut current = node_ptr.as_ref().parent;
    while let Some(parent_ptr) = current {
        if parent_ptr.as_ref().right == Some(child) {
            return Some(parent_ptr);
        }
        child = parent_ptr;
        current = parent_ptr.as_ref().parent;
    }
    None
}

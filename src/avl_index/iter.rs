use core::fmt;
use core::iter::FusedIterator;

use smallvec::SmallVec;

use super::bounds::RangeQuery;
use crate::compare::KeyComparator;
use crate::raw::{Handle, RawAvlTree};

type Stack = SmallVec<[Handle; 64]>;

/// An in-order iterator over the keys of an `AvlIndex` and the values stored
/// under each.
///
/// This `struct` is created by the [`iter`] method on [`AvlIndex`]. See its
/// documentation for more.
///
/// [`iter`]: crate::AvlIndex::iter
/// [`AvlIndex`]: crate::AvlIndex
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    tree: &'a RawAvlTree<K, V>,
    stack: Stack,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(tree: &'a RawAvlTree<K, V>) -> Self {
        let mut iter = Self {
            tree,
            stack: Stack::new(),
            remaining: tree.len(),
        };
        iter.push_left_spine(tree.root());
        iter
    }

    fn push_left_spine(&mut self, mut current: Option<Handle>) {
        while let Some(handle) = current {
            self.stack.push(handle);
            current = self.tree.node(handle).left();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a [V]);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.stack.pop()?;
        let tree = self.tree;
        let node = tree.node(handle);
        self.push_left_spine(node.right());
        self.remaining -= 1;
        Some((node.key(), node.values()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// A lazy iterator over the values whose keys fall inside a [`RangeQuery`],
/// in ascending key order.
///
/// Subtrees that cannot hold a matching key are never visited: a key below
/// the lower bound rules out its left subtree, and the first key above the
/// upper bound ends the walk.
///
/// This `struct` is created by the [`between_bounds`] method on [`AvlIndex`].
///
/// [`between_bounds`]: crate::AvlIndex::between_bounds
/// [`AvlIndex`]: crate::AvlIndex
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct BetweenBounds<'a, 'q, K, V, C: ?Sized> {
    tree: &'a RawAvlTree<K, V>,
    query: &'q RangeQuery<K>,
    cmp: &'a C,
    stack: Stack,
    values: core::slice::Iter<'a, V>,
}

impl<'a, 'q, K, V, C> BetweenBounds<'a, 'q, K, V, C>
where
    C: KeyComparator<K> + ?Sized,
{
    pub(crate) fn new(tree: &'a RawAvlTree<K, V>, query: &'q RangeQuery<K>, cmp: &'a C) -> Self {
        let mut iter = Self {
            tree,
            query,
            cmp,
            stack: Stack::new(),
            values: core::slice::Iter::default(),
        };
        iter.descend(tree.root());
        iter
    }

    /// Walks down the left spine of `current`, stacking every node that
    /// clears the lower bound. A node below it has nothing to offer on its
    /// left, so the walk continues into its right subtree instead.
    fn descend(&mut self, mut current: Option<Handle>) {
        while let Some(handle) = current {
            let node = self.tree.node(handle);
            if self.query.admits_lower(node.key(), self.cmp) {
                self.stack.push(handle);
                current = node.left();
            } else {
                current = node.right();
            }
        }
    }
}

impl<'a, K, V, C> Iterator for BetweenBounds<'a, '_, K, V, C>
where
    C: KeyComparator<K> + ?Sized,
{
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.values.next() {
                return Some(value);
            }

            let handle = self.stack.pop()?;
            let tree = self.tree;
            let node = tree.node(handle);
            if !self.query.admits_upper(node.key(), self.cmp) {
                // Everything still stacked, and every right subtree, is larger.
                self.stack.clear();
                return None;
            }

            self.values = node.values().iter();
            self.descend(node.right());
        }
    }
}

impl<K, V, C> FusedIterator for BetweenBounds<'_, '_, K, V, C> where C: KeyComparator<K> + ?Sized {}

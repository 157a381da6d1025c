use core::cmp::Ordering;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{AvlNode, Side, Values};
use crate::compare::{KeyComparator, ValueEquality};
use crate::error::{IndexError, InvariantViolation};

/// Ancestors visited on the way down, root first.
///
/// 64 levels covers any AVL tree addressable by a 32-bit handle without spilling.
pub(crate) type Path = SmallVec<[Handle; 64]>;

/// The core AVL tree backing `AvlIndex`.
///
/// The comparator and value-equality callback are passed into each operation
/// instead of being stored, so the raw tree stays free of generic policy.
#[derive(Clone)]
pub(crate) struct RawAvlTree<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<AvlNode<K, V>>,
    /// The node with no parent, if the tree is non-empty.
    root: Option<Handle>,
    /// Total number of values across all keys.
    value_count: usize,
}

impl<K, V> RawAvlTree<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            value_count: 0,
        }
    }

    /// Creates a new tree with room for `capacity` keys.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            value_count: 0,
        }
    }

    /// Number of distinct keys.
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) const fn value_count(&self) -> usize {
        self.value_count
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.nodes.reserve(additional);
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.value_count = 0;
    }

    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &AvlNode<K, V> {
        self.nodes.get(handle)
    }

    /// Height of the whole tree; 0 when empty.
    pub(crate) fn height(&self) -> u8 {
        self.height_of(self.root)
    }

    #[inline]
    fn height_of(&self, handle: Option<Handle>) -> u8 {
        handle.map_or(0, |h| self.nodes.get(h).height())
    }

    fn update_height(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let height = 1 + self.height_of(node.left()).max(self.height_of(node.right()));
        self.nodes.get_mut(handle).set_height(height);
    }

    /// `height(left) - height(right)`.
    fn balance_factor(&self, handle: Handle) -> i16 {
        let node = self.nodes.get(handle);
        i16::from(self.height_of(node.left())) - i16::from(self.height_of(node.right()))
    }

    /// Leftmost node of the tree.
    pub(crate) fn first(&self) -> Option<Handle> {
        let mut current = self.root?;
        while let Some(left) = self.nodes.get(current).left() {
            current = left;
        }
        Some(current)
    }

    /// Rightmost node of the tree.
    pub(crate) fn last(&self) -> Option<Handle> {
        let mut current = self.root?;
        while let Some(right) = self.nodes.get(current).right() {
            current = right;
        }
        Some(current)
    }

    /// Points whatever held `old` (its parent's slot, or the root) at `new`, and
    /// sets `new`'s parent link accordingly. `old` itself is left untouched.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            Some(p) => {
                let side = self
                    .nodes
                    .get(p)
                    .side_of(old)
                    .expect("`RawAvlTree::replace_child()` - `old` is not a child of `parent`!");
                self.nodes.get_mut(p).set_child(side, new);
            }
            None => {
                tracing::debug!(old = old.to_index(), new = ?new.map(Handle::to_index), "root replaced");
                self.root = new;
            }
        }

        if let Some(n) = new {
            self.nodes.get_mut(n).set_parent(parent);
        }
    }

    /// Rotates `top` down towards `side`, lifting its child on the opposite side
    /// into its place. Returns the new subtree root.
    ///
    /// For `Side::Right` this is the right rotation of `q` with left child `p`:
    /// `p.right` becomes `q.left` and `q` becomes `p.right`.
    fn rotate(&mut self, top: Handle, side: Side) -> Handle {
        let lifted_side = side.opposite();
        let lifted = self
            .nodes
            .get(top)
            .child(lifted_side)
            .expect("`RawAvlTree::rotate()` - rotation needs a child to lift!");
        let inner = self.nodes.get(lifted).child(side);
        let parent = self.nodes.get(top).parent();

        self.replace_child(parent, top, Some(lifted));

        self.nodes.get_mut(lifted).set_child(side, Some(top));
        let top_node = self.nodes.get_mut(top);
        top_node.set_parent(Some(lifted));
        top_node.set_child(lifted_side, inner);
        if let Some(inner) = inner {
            self.nodes.get_mut(inner).set_parent(Some(top));
        }

        // `top` is now below `lifted`, so its height has to be settled first.
        self.update_height(top);
        self.update_height(lifted);

        tracing::trace!(top = top.to_index(), lifted = lifted.to_index(), ?side, "rotated");
        lifted
    }

    pub(crate) fn rotate_right(&mut self, q: Handle) -> Handle {
        self.rotate(q, Side::Right)
    }

    pub(crate) fn rotate_left(&mut self, p: Handle) -> Handle {
        self.rotate(p, Side::Left)
    }

    /// Restores heights and balance from the deepest recorded ancestor up to the root.
    ///
    /// The walk always runs the whole path: after a deletion, fixing one ancestor
    /// can shorten its subtree and unbalance the next one up.
    fn rebalance_along_path(&mut self, path: &[Handle]) {
        for &handle in path.iter().rev() {
            self.update_height(handle);

            let balance = self.balance_factor(handle);
            if balance > 1 {
                let left = self.nodes.get(handle).left().expect("left-heavy node has a left child");
                if self.balance_factor(left) < 0 {
                    self.rotate_left(left);
                }
                self.rotate_right(handle);
            } else if balance < -1 {
                let right = self.nodes.get(handle).right().expect("right-heavy node has a right child");
                if self.balance_factor(right) > 0 {
                    self.rotate_right(right);
                }
                self.rotate_left(handle);
            }
        }
    }

    /// Unlinks `target` from the tree and returns its key and values.
    ///
    /// `path` holds the ancestors of `target`, root first, excluding `target`.
    fn splice_out(&mut self, target: Handle, mut path: Path) -> (K, Values<V>) {
        let node = self.nodes.get(target);
        let parent = node.parent();

        match (node.left(), node.right()) {
            (None, None) => {
                self.replace_child(parent, target, None);
                tracing::trace!(node = target.to_index(), "spliced leaf");
                self.rebalance_along_path(&path);
                self.nodes.take(target).into_entry()
            }
            (Some(child), None) | (None, Some(child)) => {
                // When `target` is the root the path is empty and the child is
                // promoted as-is; an AVL node with one child has a leaf child.
                self.replace_child(parent, target, Some(child));
                tracing::trace!(node = target.to_index(), child = child.to_index(), "spliced single-child node");
                self.rebalance_along_path(&path);
                self.nodes.take(target).into_entry()
            }
            (Some(left), Some(_)) => {
                path.push(target);

                let mut predecessor = left;
                while let Some(right) = self.nodes.get(predecessor).right() {
                    path.push(predecessor);
                    predecessor = right;
                }

                // The predecessor has no right child; its left child (if any)
                // takes its place, whether that is under `target` or deeper.
                let predecessor_node = self.nodes.get(predecessor);
                let predecessor_parent = predecessor_node.parent();
                let predecessor_left = predecessor_node.left();
                self.replace_child(predecessor_parent, predecessor, predecessor_left);

                let (key, values) = self.nodes.take(predecessor).into_entry();
                let removed = self.nodes.get_mut(target).replace_entry(key, values);
                tracing::trace!(
                    node = target.to_index(),
                    predecessor = predecessor.to_index(),
                    "spliced two-child node via predecessor"
                );

                self.rebalance_along_path(&path);
                removed
            }
        }
    }
}

impl<K, V> RawAvlTree<K, V> {
    /// Descends to `key`, returning its node and the ancestors visited on the way.
    fn find_with_path<C>(&self, key: &K, cmp: &C) -> Option<(Handle, Path)>
    where
        C: KeyComparator<K> + ?Sized,
    {
        let mut path = Path::new();
        let mut current = self.root?;

        loop {
            let node = self.nodes.get(current);
            let next = match cmp.compare(key, node.key()) {
                Ordering::Equal => return Some((current, path)),
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
            };
            path.push(current);
            current = next?;
        }
    }

    /// Returns the node holding `key`.
    pub(crate) fn search<C>(&self, key: &K, cmp: &C) -> Option<Handle>
    where
        C: KeyComparator<K> + ?Sized,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            current = match cmp.compare(key, node.key()) {
                Ordering::Equal => return Some(handle),
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
            };
        }
        None
    }

    /// Inserts `value` under `key`.
    ///
    /// An existing key gets the value appended to its list with no structural
    /// change. On a unique tree that case fails instead, before anything is touched.
    pub(crate) fn insert<C>(&mut self, key: K, value: V, unique: bool, cmp: &C) -> Result<(), IndexError<K>>
    where
        C: KeyComparator<K> + ?Sized,
    {
        let Some(mut current) = self.root else {
            let leaf = self.nodes.alloc(AvlNode::leaf(key, value, None));
            self.root = Some(leaf);
            self.value_count = 1;
            return Ok(());
        };

        let mut path = Path::new();
        loop {
            path.push(current);
            let node = self.nodes.get(current);
            let side = match cmp.compare(&key, node.key()) {
                Ordering::Equal => {
                    if unique {
                        tracing::debug!(node = current.to_index(), "unique constraint violated");
                        return Err(IndexError::UniqueViolated { key });
                    }
                    self.nodes.get_mut(current).values_mut().push(value);
                    self.value_count += 1;
                    return Ok(());
                }
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };

            match node.child(side) {
                Some(child) => current = child,
                None => {
                    let leaf = self.nodes.alloc(AvlNode::leaf(key, value, Some(current)));
                    self.nodes.get_mut(current).set_child(side, Some(leaf));
                    self.value_count += 1;
                    path.push(leaf);
                    self.rebalance_along_path(&path);
                    return Ok(());
                }
            }
        }
    }

    /// Deletes `value` (every stored value equal to it) from `key`, or the whole
    /// key when `value` is `None`. A key left with no values is spliced out.
    ///
    /// Returns the number of values removed; absent keys and values remove nothing.
    pub(crate) fn delete<C, E>(&mut self, key: &K, value: Option<&V>, cmp: &C, eq: &E) -> usize
    where
        C: KeyComparator<K> + ?Sized,
        E: ValueEquality<V> + ?Sized,
    {
        let Some((target, path)) = self.find_with_path(key, cmp) else {
            return 0;
        };

        let removed = match value {
            Some(value) => {
                let values = self.nodes.get_mut(target).values_mut();
                let before = values.len();
                values.retain(|stored| !eq.same(stored, value));
                let removed = before - values.len();
                if removed == 0 || !values.is_empty() {
                    self.value_count -= removed;
                    return removed;
                }
                removed
            }
            None => self.nodes.get(target).values().len(),
        };

        self.splice_out(target, path);
        self.value_count -= removed;
        removed
    }

    /// Removes the most recently appended value of `key`, splicing the node out
    /// if it was the last one.
    pub(crate) fn pop_value<C>(&mut self, key: &K, cmp: &C) -> Option<V>
    where
        C: KeyComparator<K> + ?Sized,
    {
        let (target, path) = self.find_with_path(key, cmp)?;
        let values = self.nodes.get_mut(target).values_mut();
        let value = if values.len() > 1 {
            values.pop()
        } else {
            let (_, mut values) = self.splice_out(target, path);
            values.pop()
        };
        self.value_count -= 1;
        value
    }
}

impl<K: Clone, V> RawAvlTree<K, V> {
    /// Verifies ordering, parent links, cached heights and balance factors, in
    /// that order, stopping at the first problem found.
    pub(crate) fn check_invariants<C>(&self, cmp: &C) -> Result<(), InvariantViolation<K>>
    where
        C: KeyComparator<K> + ?Sized,
    {
        let Some(root) = self.root else {
            return if self.nodes.is_empty() {
                Ok(())
            } else {
                Err(InvariantViolation::KeyCountMismatch {
                    reported: self.nodes.len(),
                    actual: 0,
                })
            };
        };

        if self.nodes.get(root).parent().is_some() {
            return Err(InvariantViolation::ParentMismatch {
                key: self.nodes.get(root).key().clone(),
            });
        }

        self.check_node_ordering(root, None, None, cmp)?;
        let reachable = self.check_links(root)?;
        self.check_height_correct(root)?;
        self.check_balance_factors(root)?;

        if reachable != self.nodes.len() {
            return Err(InvariantViolation::KeyCountMismatch {
                reported: self.nodes.len(),
                actual: reachable,
            });
        }
        Ok(())
    }

    /// Every key must sit strictly between the bounds its ancestors impose.
    fn check_node_ordering<C>(
        &self,
        handle: Handle,
        lower: Option<&K>,
        upper: Option<&K>,
        cmp: &C,
    ) -> Result<(), InvariantViolation<K>>
    where
        C: KeyComparator<K> + ?Sized,
    {
        let node = self.nodes.get(handle);
        let key = node.key();
        let above_lower = lower.is_none_or(|lower| cmp.compare(key, lower) == Ordering::Greater);
        let below_upper = upper.is_none_or(|upper| cmp.compare(key, upper) == Ordering::Less);
        if !above_lower || !below_upper {
            return Err(InvariantViolation::OrderViolated { key: key.clone() });
        }

        if let Some(left) = node.left() {
            self.check_node_ordering(left, lower, Some(key), cmp)?;
        }
        if let Some(right) = node.right() {
            self.check_node_ordering(right, Some(key), upper, cmp)?;
        }
        Ok(())
    }

    /// Checks parent back-links and non-empty value lists; returns the number of
    /// nodes in the subtree.
    fn check_links(&self, handle: Handle) -> Result<usize, InvariantViolation<K>> {
        let node = self.nodes.get(handle);
        if node.values().is_empty() {
            return Err(InvariantViolation::EmptyValues { key: node.key().clone() });
        }

        let mut count = 1;
        for child in [node.left(), node.right()].into_iter().flatten() {
            let child_node = self.nodes.get(child);
            if child_node.parent() != Some(handle) {
                return Err(InvariantViolation::ParentMismatch {
                    key: child_node.key().clone(),
                });
            }
            count += self.check_links(child)?;
        }
        Ok(count)
    }

    /// Returns the recomputed height of the subtree.
    fn check_height_correct(&self, handle: Handle) -> Result<u8, InvariantViolation<K>> {
        let node = self.nodes.get(handle);
        let left = node.left().map(|l| self.check_height_correct(l)).transpose()?.unwrap_or(0);
        let right = node.right().map(|r| self.check_height_correct(r)).transpose()?.unwrap_or(0);
        let actual = 1 + left.max(right);
        if node.height() != actual {
            return Err(InvariantViolation::HeightMismatch {
                key: node.key().clone(),
                cached: node.height(),
                actual,
            });
        }
        Ok(actual)
    }

    fn check_balance_factors(&self, handle: Handle) -> Result<(), InvariantViolation<K>> {
        let balance = self.balance_factor(handle);
        let node = self.nodes.get(handle);
        if !(-1..=1).contains(&balance) {
            return Err(InvariantViolation::Unbalanced {
                key: node.key().clone(),
                balance,
            });
        }
        for child in [node.left(), node.right()].into_iter().flatten() {
            self.check_balance_factors(child)?;
        }
        Ok(())
    }
}

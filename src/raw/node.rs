use smallvec::SmallVec;

use super::handle::Handle;

/// Values that share one key. Most index keys carry a single document, so the
/// first value lives inline.
pub(crate) type Values<V> = SmallVec<[V; 1]>;

/// Which child slot of its parent a node occupies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A single AVL node.
///
/// `left` and `right` are owning links in the sense that a node is reachable
/// only through them; `parent` is a back-link used to re-wire the grandparent
/// during a rotation or splice and is never followed to free anything.
#[derive(Clone)]
pub(crate) struct AvlNode<K, V> {
    key: K,
    values: Values<V>,
    left: Option<Handle>,
    right: Option<Handle>,
    parent: Option<Handle>,
    // 1 + max(height(left), height(right)); an absent child counts as 0.
    height: u8,
}

impl<K, V> AvlNode<K, V> {
    /// Creates a detached leaf holding one value.
    pub(crate) fn leaf(key: K, value: V, parent: Option<Handle>) -> Self {
        let mut values = Values::new();
        values.push(value);
        Self {
            key,
            values,
            left: None,
            right: None,
            parent,
            height: 1,
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) fn values(&self) -> &[V] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut Values<V> {
        &mut self.values
    }

    /// Replaces the key and values with those of another node, returning the old pair.
    pub(crate) fn replace_entry(&mut self, key: K, values: Values<V>) -> (K, Values<V>) {
        let old_key = core::mem::replace(&mut self.key, key);
        let old_values = core::mem::replace(&mut self.values, values);
        (old_key, old_values)
    }

    pub(crate) fn into_entry(self) -> (K, Values<V>) {
        (self.key, self.values)
    }

    #[inline]
    pub(crate) fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) fn right(&self) -> Option<Handle> {
        self.right
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    /// Returns the slot `child` occupies under this node, if it is a child at all.
    pub(crate) fn side_of(&self, child: Handle) -> Option<Side> {
        if self.left == Some(child) {
            Some(Side::Left)
        } else if self.right == Some(child) {
            Some(Side::Right)
        } else {
            None
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    #[inline]
    pub(crate) fn height(&self) -> u8 {
        self.height
    }

    pub(crate) fn set_height(&mut self, height: u8) {
        self.height = height;
    }
}

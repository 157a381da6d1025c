//! Errors reported by [`AvlIndex`](crate::AvlIndex).

use thiserror::Error;

/// Machine-readable classification of an [`IndexError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorType {
    /// A second value was inserted under a key of a unique index.
    UniqueViolated,
}

impl ErrorType {
    /// The identifier document stores report for this error, e.g. `"uniqueViolated"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UniqueViolated => "uniqueViolated",
        }
    }
}

impl core::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by mutating index operations.
///
/// The index is left unchanged whenever one of these is returned.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum IndexError<K> {
    /// The index is unique and already holds a value for `key`.
    #[error("can't insert key {key:?}, it violates the unique constraint")]
    UniqueViolated {
        /// The key that was already present.
        key: K,
    },
}

impl<K> IndexError<K> {
    /// Returns the error classification.
    #[must_use]
    pub const fn error_type(&self) -> ErrorType {
        match self {
            Self::UniqueViolated { .. } => ErrorType::UniqueViolated,
        }
    }

    /// Returns the key the error is about.
    #[must_use]
    pub const fn key(&self) -> &K {
        match self {
            Self::UniqueViolated { key } => key,
        }
    }

    /// Consumes the error, returning the key.
    #[must_use]
    pub fn into_key(self) -> K {
        match self {
            Self::UniqueViolated { key } => key,
        }
    }
}

/// First structural problem found by
/// [`AvlIndex::check_is_avl_tree`](crate::AvlIndex::check_is_avl_tree).
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum InvariantViolation<K> {
    /// A key sits on the wrong side of one of its ancestors.
    #[error("tree is not a binary search tree: key {key:?} is out of order")]
    OrderViolated {
        /// The misplaced key.
        key: K,
    },
    /// A cached height disagrees with the height recomputed from the children.
    #[error("node {key:?} caches height {cached} but its subtree has height {actual}")]
    HeightMismatch {
        /// Key of the node with the stale height.
        key: K,
        /// The stored height.
        cached: u8,
        /// The recomputed height.
        actual: u8,
    },
    /// A node's subtrees differ in height by more than one.
    #[error("node {key:?} has balance factor {balance}")]
    Unbalanced {
        /// Key of the unbalanced node.
        key: K,
        /// `height(left) - height(right)`.
        balance: i16,
    },
    /// A child's parent link does not point back at the node that owns it.
    #[error("node {key:?} has a parent link that does not match its position")]
    ParentMismatch {
        /// Key of the child with the broken back-link.
        key: K,
    },
    /// A node is linked into the tree but holds no values.
    #[error("node {key:?} holds no values")]
    EmptyValues {
        /// Key of the empty node.
        key: K,
    },
    /// The tree's key count disagrees with the number of reachable nodes.
    #[error("tree reports {reported} keys but {actual} nodes are reachable")]
    KeyCountMismatch {
        /// The cached key count.
        reported: usize,
        /// Nodes reachable from the root.
        actual: usize,
    },
}

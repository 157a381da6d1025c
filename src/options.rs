/// Configuration for an [`AvlIndex`](crate::AvlIndex).
///
/// # Examples
///
/// ```
/// use avl_index::{AvlIndex, IndexOptions};
///
/// let options = IndexOptions::default().unique(true).with_capacity(1024);
/// let index: AvlIndex<u64, u64> = AvlIndex::with_options(options);
/// assert!(index.is_unique());
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct IndexOptions {
    unique: bool,
    capacity: usize,
}

impl IndexOptions {
    /// Non-unique, no preallocation.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            unique: false,
            capacity: 0,
        }
    }

    /// When set, each key may hold at most one value and inserting a second
    /// value under an existing key fails.
    #[must_use]
    pub const fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Preallocates room for `capacity` distinct keys.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    #[must_use]
    pub const fn is_unique(&self) -> bool {
        self.unique
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_new() {
        assert_eq!(IndexOptions::default(), IndexOptions::new());
        assert!(!IndexOptions::new().is_unique());
        assert_eq!(IndexOptions::new().capacity(), 0);
    }

    #[test]
    fn builder_sets_fields() {
        let options = IndexOptions::new().unique(true).with_capacity(16);
        assert!(options.is_unique());
        assert_eq!(options.capacity(), 16);
        assert!(!options.unique(false).is_unique());
    }
}

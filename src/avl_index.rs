use crate::compare::{KeyComparator, NaturalOrder, PartialEqValues, ValueEquality};
use crate::error::{IndexError, InvariantViolation};
use crate::options::IndexOptions;
use crate::raw::RawAvlTree;

mod bounds;
mod debug;
mod iter;

pub use bounds::{LowerBound, RangeQuery, UpperBound};
pub use iter::{BetweenBounds, Iter};

/// An ordered index from keys to lists of values, kept height-balanced as an
/// [AVL tree].
///
/// Several values may share a key unless the index is unique, in which case a
/// second insert under an existing key fails and leaves the index unchanged.
/// Lookups, inserts and deletes take O(log n) comparisons; range queries visit
/// only the part of the tree that can hold matching keys.
///
/// Keys are ordered by a [`KeyComparator`] (the key's [`Ord`] by default), and
/// values are matched for removal by a [`ValueEquality`] ([`PartialEq`] by
/// default). Both must be consistent for the lifetime of the index; a
/// comparator that is not a strict total order is a logic error whose effects
/// are confined to wrong results from this index.
///
/// The index is a plain single-threaded structure. Mutation takes `&mut self`,
/// so sharing it between writers needs external synchronization.
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
///
/// # Examples
///
/// ```
/// use avl_index::{AvlIndex, IndexOptions, RangeQuery};
///
/// // Index documents by age.
/// let mut by_age = AvlIndex::new();
/// by_age.insert(31, "doc-1").unwrap();
/// by_age.insert(25, "doc-2").unwrap();
/// by_age.insert(31, "doc-3").unwrap();
///
/// assert_eq!(by_age.search(&31), ["doc-1", "doc-3"]);
/// assert_eq!(by_age.number_of_keys(), 2);
///
/// let adults: Vec<_> = by_age.between_bounds(&RangeQuery::new().gte(30)).collect();
/// assert_eq!(adults, [&"doc-1", &"doc-3"]);
///
/// // Remove one document from a shared key.
/// by_age.delete(&31, Some(&"doc-1"));
/// assert_eq!(by_age.search(&31), ["doc-3"]);
///
/// // A unique index rejects a second value under the same key.
/// let mut by_email = AvlIndex::with_options(IndexOptions::new().unique(true));
/// by_email.insert("a@example.com", 1).unwrap();
/// let err = by_email.insert("a@example.com", 2).unwrap_err();
/// assert_eq!(err.error_type().as_str(), "uniqueViolated");
/// ```
#[derive(Clone)]
pub struct AvlIndex<K, V, C = NaturalOrder, E = PartialEqValues> {
    raw: RawAvlTree<K, V>,
    options: IndexOptions,
    cmp: C,
    eq: E,
}

impl<K, V> AvlIndex<K, V> {
    /// Creates an empty, non-unique index ordered by `K: Ord`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlIndex;
    ///
    /// let mut index: AvlIndex<&str, u32> = AvlIndex::new();
    /// assert!(index.is_empty());
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: RawAvlTree::new(),
            options: IndexOptions::new(),
            cmp: NaturalOrder,
            eq: PartialEqValues,
        }
    }

    /// Creates an empty index ordered by `K: Ord` with the given options.
    #[must_use]
    pub fn with_options(options: IndexOptions) -> Self {
        Self::with_comparator(options, NaturalOrder, PartialEqValues)
    }
}

impl<K, V> Default for AvlIndex<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C, E> AvlIndex<K, V, C, E> {
    /// Creates an empty index with a custom key comparator and value-equality
    /// callback.
    #[must_use]
    pub fn with_comparator(options: IndexOptions, cmp: C, eq: E) -> Self {
        let raw = if options.capacity() > 0 {
            RawAvlTree::with_capacity(options.capacity())
        } else {
            RawAvlTree::new()
        };
        Self { raw, options, cmp, eq }
    }

    /// The options this index was created with.
    #[must_use]
    pub const fn options(&self) -> &IndexOptions {
        &self.options
    }

    /// Returns `true` if each key may hold at most one value.
    #[must_use]
    pub const fn is_unique(&self) -> bool {
        self.options.is_unique()
    }

    /// Number of distinct keys.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Number of distinct keys; an alias of [`len`](Self::len).
    #[must_use]
    pub fn number_of_keys(&self) -> usize {
        self.raw.len()
    }

    /// Number of values across all keys.
    #[must_use]
    pub const fn number_of_values(&self) -> usize {
        self.raw.value_count()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Height of the tree: 0 when empty, 1 for a single key.
    #[must_use]
    pub fn height(&self) -> usize {
        usize::from(self.raw.height())
    }

    /// Number of keys the index can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Reserves room for at least `additional` more keys.
    pub fn reserve(&mut self, additional: usize) {
        self.raw.reserve(additional);
    }

    /// Removes every key and value.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Smallest key in the index.
    #[must_use]
    pub fn min_key(&self) -> Option<&K> {
        self.raw.first().map(|h| self.raw.node(h).key())
    }

    /// Largest key in the index.
    #[must_use]
    pub fn max_key(&self) -> Option<&K> {
        self.raw.last().map(|h| self.raw.node(h).key())
    }

    /// Iterates over every key with its values, in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlIndex;
    ///
    /// let mut index = AvlIndex::new();
    /// index.insert(2, 'b').unwrap();
    /// index.insert(1, 'a').unwrap();
    /// index.insert(2, 'c').unwrap();
    ///
    /// let entries: Vec<_> = index.iter().collect();
    /// assert_eq!(entries, [(&1, &['a'][..]), (&2, &['b', 'c'][..])]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.raw)
    }

    /// Calls `visitor` on every key and its values, in ascending key order.
    pub fn for_each_node<F>(&self, mut visitor: F)
    where
        F: FnMut(&K, &[V]),
    {
        for (key, values) in self.iter() {
            visitor(key, values);
        }
    }
}

impl<K, V, C, E> AvlIndex<K, V, C, E>
where
    C: KeyComparator<K>,
    E: ValueEquality<V>,
{
    /// Inserts `value` under `key`.
    ///
    /// If the key is already present its value list grows by one and the tree
    /// shape is untouched. Otherwise a new node is linked in and the tree is
    /// rebalanced.
    ///
    /// # Errors
    ///
    /// On a unique index, returns [`IndexError::UniqueViolated`] carrying `key`
    /// if the key is already present. The index is not modified.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K, value: V) -> Result<(), IndexError<K>> {
        self.raw.insert(key, value, self.options.is_unique(), &self.cmp)
    }

    /// Inserts every pair in order, all or nothing.
    ///
    /// If one pair violates the unique constraint, every pair this call already
    /// inserted is removed again before the error is returned, leaving the
    /// index as it was.
    ///
    /// # Errors
    ///
    /// Returns the first [`IndexError`] encountered.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::{AvlIndex, IndexOptions};
    ///
    /// let mut index = AvlIndex::with_options(IndexOptions::new().unique(true));
    /// index.insert(3, "c").unwrap();
    ///
    /// assert!(index.insert_many([(1, "a"), (2, "b"), (3, "x")]).is_err());
    /// assert_eq!(index.len(), 1);
    /// assert!(index.search(&1).is_empty());
    /// ```
    pub fn insert_many<I>(&mut self, entries: I) -> Result<(), IndexError<K>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Clone,
    {
        let mut inserted: alloc::vec::Vec<K> = alloc::vec::Vec::new();
        for (key, value) in entries {
            let rollback_key = key.clone();
            if let Err(err) = self.insert(key, value) {
                tracing::debug!(rolled_back = inserted.len(), "insert_many failed, rolling back");
                // Newest first, so each pop removes exactly the value this call appended.
                for key in inserted.iter().rev() {
                    self.raw.pop_value(key, &self.cmp);
                }
                return Err(err);
            }
            inserted.push(rollback_key);
        }
        Ok(())
    }

    /// Deletes from `key` either the values equal to `value` or, when `value`
    /// is `None`, the key and all its values.
    ///
    /// A key whose last value is removed disappears from the index. Deleting an
    /// absent key or value does nothing. Returns the number of values removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlIndex;
    ///
    /// let mut index = AvlIndex::new();
    /// index.insert(10, "a").unwrap();
    /// index.insert(10, "b").unwrap();
    ///
    /// assert_eq!(index.delete(&10, Some(&"a")), 1);
    /// assert_eq!(index.search(&10), ["b"]);
    /// assert_eq!(index.delete(&10, Some(&"b")), 1);
    /// assert!(index.is_empty());
    /// assert_eq!(index.delete(&10, None), 0);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn delete(&mut self, key: &K, value: Option<&V>) -> usize {
        self.raw.delete(key, value, &self.cmp, &self.eq)
    }

    /// Returns the values stored under `key`, oldest first; empty if absent.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn search(&self, key: &K) -> &[V] {
        self.get(key).unwrap_or(&[])
    }

    /// Returns the values stored under `key`, or `None` if it is absent.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&[V]> {
        self.raw.search(key, &self.cmp).map(|h| self.raw.node(h).values())
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.raw.search(key, &self.cmp).is_some()
    }

    /// Iterates, in ascending key order, over the values of every key inside
    /// `query`'s bounds.
    ///
    /// # Complexity
    ///
    /// O(log n + m) for m matching keys.
    pub fn between_bounds<'a, 'q>(&'a self, query: &'q RangeQuery<K>) -> BetweenBounds<'a, 'q, K, V, C> {
        BetweenBounds::new(&self.raw, query, &self.cmp)
    }
}

impl<K: Clone, V, C: KeyComparator<K>, E> AvlIndex<K, V, C, E> {
    /// Verifies the tree structure: key ordering, parent links, cached heights
    /// and balance factors.
    ///
    /// This walks the whole tree and is meant for tests and diagnostics.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found, naming the offending key.
    pub fn check_is_avl_tree(&self) -> Result<(), InvariantViolation<K>> {
        self.raw.check_invariants(&self.cmp)
    }
}

impl<'a, K, V, C, E> IntoIterator for &'a AvlIndex<K, V, C, E> {
    type Item = (&'a K, &'a [V]);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

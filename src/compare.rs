use core::cmp::Ordering;

/// Total order over index keys.
///
/// Implementations must define a strict total order. A comparator that does
/// not (for example one that is not transitive) is a logic error: the index
/// will not crash, but lookups and range queries may return wrong results.
///
/// Any `Fn(&K, &K) -> Ordering` closure is a comparator.
///
/// # Examples
///
/// ```
/// use avl_index::{AvlIndex, IndexOptions};
///
/// // Index strings case-insensitively.
/// let mut index = AvlIndex::with_comparator(
///     IndexOptions::default(),
///     |a: &String, b: &String| a.to_lowercase().cmp(&b.to_lowercase()),
///     |a: &u32, b: &u32| a == b,
/// );
/// index.insert("Alice".to_string(), 1).unwrap();
/// assert_eq!(index.search(&"ALICE".to_string()), [1]);
/// ```
pub trait KeyComparator<K: ?Sized> {
    /// Compares two keys.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

impl<K: ?Sized, F> KeyComparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

/// Compares keys with their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> KeyComparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Decides whether two stored values are the same, for removing one value
/// from a key that holds several.
///
/// Any `Fn(&V, &V) -> bool` closure is a value-equality callback.
pub trait ValueEquality<V: ?Sized> {
    /// Returns `true` if `a` and `b` denote the same value.
    fn same(&self, a: &V, b: &V) -> bool;
}

impl<V: ?Sized, F> ValueEquality<V> for F
where
    F: Fn(&V, &V) -> bool,
{
    #[inline]
    fn same(&self, a: &V, b: &V) -> bool {
        self(a, b)
    }
}

/// Compares values with their [`PartialEq`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PartialEqValues;

impl<V: PartialEq + ?Sized> ValueEquality<V> for PartialEqValues {
    #[inline]
    fn same(&self, a: &V, b: &V) -> bool {
        a == b
    }
}

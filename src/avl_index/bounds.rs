use core::cmp::Ordering;
use core::ops::Bound;

use crate::compare::KeyComparator;

/// Lower end of a [`RangeQuery`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LowerBound<K> {
    /// `$gt`: keys strictly greater than the bound.
    Gt(K),
    /// `$gte`: keys greater than or equal to the bound.
    Gte(K),
}

/// Upper end of a [`RangeQuery`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum UpperBound<K> {
    /// `$lt`: keys strictly less than the bound.
    Lt(K),
    /// `$lte`: keys less than or equal to the bound.
    Lte(K),
}

/// Bounds for [`AvlIndex::between_bounds`](crate::AvlIndex::between_bounds).
///
/// Holds at most one lower bound and at most one upper bound; setting a bound
/// on a side that already has one replaces it. A missing side is unbounded.
///
/// # Examples
///
/// ```
/// use avl_index::{AvlIndex, RangeQuery};
///
/// let mut index = AvlIndex::new();
/// for k in 0..10 {
///     index.insert(k, k * 10).unwrap();
/// }
///
/// let query = RangeQuery::new().gte(3).lt(6);
/// let hits: Vec<_> = index.between_bounds(&query).copied().collect();
/// assert_eq!(hits, [30, 40, 50]);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct RangeQuery<K> {
    lower: Option<LowerBound<K>>,
    upper: Option<UpperBound<K>>,
}

impl<K> Default for RangeQuery<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> RangeQuery<K> {
    /// An unbounded query, matching every key.
    #[must_use]
    pub const fn new() -> Self {
        Self { lower: None, upper: None }
    }

    /// Keys strictly greater than `key`.
    #[must_use]
    pub fn gt(mut self, key: K) -> Self {
        self.lower = Some(LowerBound::Gt(key));
        self
    }

    /// Keys greater than or equal to `key`.
    #[must_use]
    pub fn gte(mut self, key: K) -> Self {
        self.lower = Some(LowerBound::Gte(key));
        self
    }

    /// Keys strictly less than `key`.
    #[must_use]
    pub fn lt(mut self, key: K) -> Self {
        self.upper = Some(UpperBound::Lt(key));
        self
    }

    /// Keys less than or equal to `key`.
    #[must_use]
    pub fn lte(mut self, key: K) -> Self {
        self.upper = Some(UpperBound::Lte(key));
        self
    }

    /// Builds a query from standard range bounds.
    ///
    /// ```
    /// use core::ops::Bound;
    /// use avl_index::RangeQuery;
    ///
    /// let query = RangeQuery::from_bounds(Bound::Excluded(1), Bound::Unbounded);
    /// assert_eq!(query, RangeQuery::new().gt(1));
    /// ```
    #[must_use]
    pub fn from_bounds(start: Bound<K>, end: Bound<K>) -> Self {
        let lower = match start {
            Bound::Included(k) => Some(LowerBound::Gte(k)),
            Bound::Excluded(k) => Some(LowerBound::Gt(k)),
            Bound::Unbounded => None,
        };
        let upper = match end {
            Bound::Included(k) => Some(UpperBound::Lte(k)),
            Bound::Excluded(k) => Some(UpperBound::Lt(k)),
            Bound::Unbounded => None,
        };
        Self { lower, upper }
    }

    #[must_use]
    pub const fn lower(&self) -> Option<&LowerBound<K>> {
        self.lower.as_ref()
    }

    #[must_use]
    pub const fn upper(&self) -> Option<&UpperBound<K>> {
        self.upper.as_ref()
    }

    /// Returns `true` if `key` satisfies the lower bound.
    pub(crate) fn admits_lower<C>(&self, key: &K, cmp: &C) -> bool
    where
        C: KeyComparator<K> + ?Sized,
    {
        match &self.lower {
            None => true,
            Some(LowerBound::Gt(bound)) => cmp.compare(key, bound) == Ordering::Greater,
            Some(LowerBound::Gte(bound)) => cmp.compare(key, bound) != Ordering::Less,
        }
    }

    /// Returns `true` if `key` satisfies the upper bound.
    pub(crate) fn admits_upper<C>(&self, key: &K, cmp: &C) -> bool
    where
        C: KeyComparator<K> + ?Sized,
    {
        match &self.upper {
            None => true,
            Some(UpperBound::Lt(bound)) => cmp.compare(key, bound) == Ordering::Less,
            Some(UpperBound::Lte(bound)) => cmp.compare(key, bound) != Ordering::Greater,
        }
    }

    /// Returns `true` if `key` satisfies both bounds.
    pub fn contains<C>(&self, key: &K, cmp: &C) -> bool
    where
        C: KeyComparator<K> + ?Sized,
    {
        self.admits_lower(key, cmp) && self.admits_upper(key, cmp)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::compare::NaturalOrder;

    #[test]
    fn later_bound_replaces_earlier_on_same_side() {
        let query = RangeQuery::new().gt(1).gte(2).lte(9).lt(8);
        assert_eq!(query.lower(), Some(&LowerBound::Gte(2)));
        assert_eq!(query.upper(), Some(&UpperBound::Lt(8)));
    }

    #[test]
    fn inclusive_and_exclusive_edges() {
        let gt = RangeQuery::new().gt(5);
        assert!(!gt.contains(&5, &NaturalOrder));
        assert!(gt.contains(&6, &NaturalOrder));

        let gte = RangeQuery::new().gte(5);
        assert!(gte.contains(&5, &NaturalOrder));
        assert!(!gte.contains(&4, &NaturalOrder));

        let lt = RangeQuery::new().lt(5);
        assert!(!lt.contains(&5, &NaturalOrder));
        assert!(lt.contains(&4, &NaturalOrder));

        let lte = RangeQuery::new().lte(5);
        assert!(lte.contains(&5, &NaturalOrder));
        assert!(!lte.contains(&6, &NaturalOrder));
    }

    #[test]
    fn unbounded_query_admits_everything() {
        let query: RangeQuery<i32> = RangeQuery::default();
        assert!(query.contains(&i32::MIN, &NaturalOrder));
        assert!(query.contains(&i32::MAX, &NaturalOrder));
    }

    #[test]
    fn from_bounds_maps_each_kind() {
        assert_eq!(
            RangeQuery::from_bounds(Bound::Included(1), Bound::Excluded(4)),
            RangeQuery::new().gte(1).lt(4)
        );
        assert_eq!(
            RangeQuery::from_bounds(Bound::Unbounded, Bound::Included(4)),
            RangeQuery::new().lte(4)
        );
    }
}

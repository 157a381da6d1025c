use std::collections::BTreeMap;

use avl_index::avl_index::{LowerBound, UpperBound};
use avl_index::{AvlIndex, ErrorType, IndexError, IndexOptions, RangeQuery};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Model of the index: every key with its values in insertion order.
type Model = BTreeMap<i64, Vec<u8>>;

fn key_strategy() -> impl Strategy<Value = i64> {
    // Small enough relative to TEST_SIZE that keys collide often.
    -500i64..500i64
}

fn value_strategy() -> impl Strategy<Value = u8> {
    // Few distinct values so value-specific deletes actually hit.
    0u8..4
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum IndexOp {
    Insert(i64, u8),
    DeleteKey(i64),
    DeleteValue(i64, u8),
    Search(i64),
    MinMax,
}

fn index_op_strategy() -> impl Strategy<Value = IndexOp> {
    prop_oneof![
        6 => (key_strategy(), value_strategy()).prop_map(|(k, v)| IndexOp::Insert(k, v)),
        2 => key_strategy().prop_map(IndexOp::DeleteKey),
        2 => (key_strategy(), value_strategy()).prop_map(|(k, v)| IndexOp::DeleteValue(k, v)),
        2 => key_strategy().prop_map(IndexOp::Search),
        1 => Just(IndexOp::MinMax),
    ]
}

fn lower_strategy() -> impl Strategy<Value = Option<LowerBound<i64>>> {
    prop_oneof![
        Just(None),
        key_strategy().prop_map(|k| Some(LowerBound::Gt(k))),
        key_strategy().prop_map(|k| Some(LowerBound::Gte(k))),
    ]
}

fn upper_strategy() -> impl Strategy<Value = Option<UpperBound<i64>>> {
    prop_oneof![
        Just(None),
        key_strategy().prop_map(|k| Some(UpperBound::Lt(k))),
        key_strategy().prop_map(|k| Some(UpperBound::Lte(k))),
    ]
}

fn query_of(lower: Option<LowerBound<i64>>, upper: Option<UpperBound<i64>>) -> RangeQuery<i64> {
    let query = match lower {
        None => RangeQuery::new(),
        Some(LowerBound::Gt(k)) => RangeQuery::new().gt(k),
        Some(LowerBound::Gte(k)) => RangeQuery::new().gte(k),
    };
    match upper {
        None => query,
        Some(UpperBound::Lt(k)) => query.lt(k),
        Some(UpperBound::Lte(k)) => query.lte(k),
    }
}

fn in_bounds(key: i64, lower: Option<&LowerBound<i64>>, upper: Option<&UpperBound<i64>>) -> bool {
    let above = match lower {
        None => true,
        Some(LowerBound::Gt(b)) => key > *b,
        Some(LowerBound::Gte(b)) => key >= *b,
    };
    let below = match upper {
        None => true,
        Some(UpperBound::Lt(b)) => key < *b,
        Some(UpperBound::Lte(b)) => key <= *b,
    };
    above && below
}

fn build(entries: &[(i64, u8)]) -> (AvlIndex<i64, u8>, Model) {
    let mut index = AvlIndex::new();
    let mut model = Model::new();
    for &(k, v) in entries {
        index.insert(k, v).unwrap();
        model.entry(k).or_default().push(v);
    }
    (index, model)
}

// ─── Randomized comparison against a BTreeMap model ──────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays random inserts and deletes on both the index and the model,
    /// auditing the tree after every step.
    #[test]
    fn index_ops_match_model(ops in proptest::collection::vec(index_op_strategy(), TEST_SIZE)) {
        let mut index: AvlIndex<i64, u8> = AvlIndex::new();
        let mut model = Model::new();

        for op in &ops {
            match *op {
                IndexOp::Insert(k, v) => {
                    prop_assert_eq!(index.insert(k, v), Ok(()));
                    model.entry(k).or_default().push(v);
                }
                IndexOp::DeleteKey(k) => {
                    let expected = model.remove(&k).map_or(0, |vs| vs.len());
                    prop_assert_eq!(index.delete(&k, None), expected, "delete({})", k);
                }
                IndexOp::DeleteValue(k, v) => {
                    let mut expected = 0;
                    if let Some(vs) = model.get_mut(&k) {
                        let before = vs.len();
                        vs.retain(|x| *x != v);
                        expected = before - vs.len();
                        if vs.is_empty() {
                            model.remove(&k);
                        }
                    }
                    prop_assert_eq!(index.delete(&k, Some(&v)), expected, "delete({}, {})", k, v);
                }
                IndexOp::Search(k) => {
                    let expected = model.get(&k).map_or(&[][..], Vec::as_slice);
                    prop_assert_eq!(index.search(&k), expected, "search({})", k);
                }
                IndexOp::MinMax => {
                    prop_assert_eq!(index.min_key(), model.keys().next());
                    prop_assert_eq!(index.max_key(), model.keys().next_back());
                }
            }
            prop_assert_eq!(index.check_is_avl_tree(), Ok(()), "after {:?}", op);
            prop_assert_eq!(index.number_of_keys(), model.len(), "key count after {:?}", op);
        }

        let total: usize = model.values().map(Vec::len).sum();
        prop_assert_eq!(index.number_of_values(), total);
    }

    /// In-order traversal yields keys ascending with their values in insertion order.
    #[test]
    fn iter_matches_model(entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE)) {
        let (index, model) = build(&entries);

        let from_index: Vec<(i64, Vec<u8>)> = index.iter().map(|(k, vs)| (*k, vs.to_vec())).collect();
        let from_model: Vec<(i64, Vec<u8>)> = model.into_iter().collect();
        prop_assert_eq!(index.iter().len(), from_model.len());
        prop_assert_eq!(from_index, from_model);
    }

    /// `between_bounds` equals filtering a full traversal by the same bounds,
    /// for every combination of present and absent bound operators.
    #[test]
    fn between_bounds_matches_filtered_traversal(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE),
        lower in lower_strategy(),
        upper in upper_strategy(),
    ) {
        let (index, _) = build(&entries);
        let query = query_of(lower, upper);

        let expected: Vec<u8> = index
            .iter()
            .filter(|(k, _)| in_bounds(**k, query.lower(), query.upper()))
            .flat_map(|(_, vs)| vs.iter().copied())
            .collect();
        let actual: Vec<u8> = index.between_bounds(&query).copied().collect();
        prop_assert_eq!(actual, expected);
    }

    /// An AVL tree of n keys is never taller than 1.44 * log2(n + 2).
    #[test]
    fn height_stays_logarithmic(keys in proptest::collection::hash_set(any::<i64>(), 1..TEST_SIZE)) {
        let mut index = AvlIndex::new();
        for &k in &keys {
            index.insert(k, ()).unwrap();
        }
        let n = keys.len() as f64;
        let bound = 1.44 * (n + 2.0).log2();
        prop_assert!((index.height() as f64) <= bound, "height {} > {} for {} keys", index.height(), bound, keys.len());
    }

    /// Deleting every inserted key, in any order, leaves an empty tree.
    #[test]
    fn deleting_all_keys_empties_index(
        (keys, order) in proptest::collection::vec(key_strategy(), 0..TEST_SIZE)
            .prop_flat_map(|keys| (Just(keys.clone()), Just(keys).prop_shuffle())),
        misses in proptest::collection::vec(key_strategy(), 0..64),
    ) {
        let mut index = AvlIndex::new();
        for &k in &keys {
            index.insert(k, k).unwrap();
        }
        // Repeated keys and misses find nothing left to delete.
        for k in order.into_iter().chain(misses) {
            index.delete(&k, None);
            prop_assert_eq!(index.check_is_avl_tree(), Ok(()));
        }
        prop_assert!(index.is_empty());
        prop_assert_eq!(index.height(), 0);
        prop_assert_eq!(index.min_key(), None);
    }

    /// A failed unique insert leaves the index exactly as it was.
    #[test]
    fn unique_violation_is_side_effect_free(keys in proptest::collection::btree_set(key_strategy(), 1..200), pick in any::<prop::sample::Index>()) {
        let mut index = AvlIndex::with_options(IndexOptions::new().unique(true));
        for &k in &keys {
            index.insert(k, k * 10).unwrap();
        }
        let before = index.pretty_print(true);
        let keys: Vec<i64> = keys.into_iter().collect();
        let dup = keys[pick.index(keys.len())];

        let err = index.insert(dup, -1).unwrap_err();
        prop_assert_eq!(err.error_type(), ErrorType::UniqueViolated);
        prop_assert_eq!(err, IndexError::UniqueViolated { key: dup });
        prop_assert_eq!(index.search(&dup), &[dup * 10][..]);
        prop_assert_eq!(index.pretty_print(true), before);
    }
}

// ─── Worked examples ─────────────────────────────────────────────────────────

#[test]
fn two_child_delete_uses_in_order_predecessor() {
    let mut index = AvlIndex::with_options(IndexOptions::new().unique(true));
    for k in [5, 3, 8, 1, 4, 7, 9, 2, 6] {
        index.insert(k, k).unwrap();
    }
    let keys: Vec<i32> = index.iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, [1, 2, 3, 4, 5, 6, 7, 8, 9]);
    assert!(index.pretty_print(false).starts_with("* 5\n"));

    index.delete(&5, None);
    assert!(index.pretty_print(false).starts_with("* 4\n"));
    assert_eq!(index.check_is_avl_tree(), Ok(()));
}

#[test]
fn duplicate_key_values_are_removed_one_by_one() {
    let mut index = AvlIndex::new();
    index.insert(10, "a").unwrap();
    index.insert(10, "b").unwrap();
    assert_eq!(index.search(&10), ["a", "b"]);
    assert_eq!(index.height(), 1);

    index.delete(&10, Some(&"a"));
    assert_eq!(index.search(&10), ["b"]);
    assert_eq!(index.number_of_keys(), 1);

    index.delete(&10, Some(&"b"));
    assert!(index.search(&10).is_empty());
    assert!(index.is_empty());
}

#[test]
fn deleting_absent_things_is_a_no_op() {
    let mut index = AvlIndex::new();
    assert_eq!(index.delete(&1, None), 0);
    index.insert(1, 'x').unwrap();
    assert_eq!(index.delete(&2, None), 0);
    assert_eq!(index.delete(&1, Some(&'y')), 0);
    assert_eq!(index.search(&1), ['x']);
}

#[test]
fn sequential_inserts_stay_balanced() {
    let mut index = AvlIndex::new();
    for k in 0..1024 {
        index.insert(k, ()).unwrap();
    }
    // 1024 ascending inserts produce a perfectly balanced tree plus one level.
    assert_eq!(index.height(), 11);
    assert_eq!(index.check_is_avl_tree(), Ok(()));

    for k in (0..1024).step_by(2) {
        index.delete(&k, None);
    }
    assert_eq!(index.len(), 512);
    assert_eq!(index.check_is_avl_tree(), Ok(()));
}

#[test]
fn range_query_walks_documents_in_key_order() {
    let mut index = AvlIndex::new();
    for (age, name) in [(30, "c"), (20, "a"), (25, "b"), (30, "d"), (35, "e")] {
        index.insert(age, name).unwrap();
    }

    let hits: Vec<&str> = index.between_bounds(&RangeQuery::new().gt(20).lte(30)).copied().collect();
    assert_eq!(hits, ["b", "c", "d"]);

    let all: Vec<&str> = index.between_bounds(&RangeQuery::new()).copied().collect();
    assert_eq!(all, ["a", "b", "c", "d", "e"]);

    let none: Vec<&str> = index.between_bounds(&RangeQuery::new().gte(36)).copied().collect();
    assert!(none.is_empty());
}

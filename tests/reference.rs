//! Cross-checks `IntervalTree` against a linear scan over the same history.

use std::rc::Rc;

use centred_interval_tree::{IntervalRef, IntervalTree};
use proptest::prelude::*;

/// Naive model: every live interval with the bounds it should currently have.
#[derive(Default)]
struct Reference {
    entries: Vec<(IntervalRef<i32, u32>, i32, i32)>,
}

impl Reference {
    fn containing(&self, point: i32) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .entries
            .iter()
            .filter(|(_, start, end)| *start <= point && point < *end)
            .map(|(interval, _, _)| id(interval))
            .collect();
        ids.sort_unstable();
        ids
    }

    fn shift(&mut self, transform: impl Fn(i32) -> i32) {
        for (_, start, end) in &mut self.entries {
            *start = transform(*start);
            *end = transform(*end);
        }
    }
}

fn id(interval: &IntervalRef<i32, u32>) -> u32 {
    *interval.payload().unwrap()
}

#[derive(Clone, Debug)]
enum Op {
    Add(i32, i32),
    Remove(usize),
    Query(i32, bool),
    Widen(i32, i32),
    Shrink(i32, i32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (-50..50i32, 0..20i32).prop_map(|(start, len)| Op::Add(start, start + len)),
        2 => any::<usize>().prop_map(Op::Remove),
        4 => (-60..80i32, any::<bool>()).prop_map(|(point, sorted)| Op::Query(point, sorted)),
        1 => (-50..70i32, 0..5i32).prop_map(|(point, amount)| Op::Widen(point, amount)),
        1 => (-50..70i32, 0..5i32).prop_map(|(point, amount)| Op::Shrink(point, amount)),
    ]
}

fn check_query(tree: &IntervalTree<i32, u32>, reference: &Reference, point: i32, sorted: bool) {
    let hits: Vec<&IntervalRef<i32, u32>> = tree.query_point(point, sorted).collect();

    for hit in &hits {
        assert!(hit.contains(point), "{hit} does not contain {point}");
    }
    if sorted {
        for pair in hits.windows(2) {
            assert!(
                pair[0].bounds() <= pair[1].bounds(),
                "{} yielded before {} at {}",
                pair[0],
                pair[1],
                point
            );
        }
    }

    let mut ids: Vec<u32> = hits.iter().map(|hit| id(hit)).collect();
    ids.sort_unstable();
    assert_eq!(ids, reference.containing(point), "query at {point}");
}

proptest! {
    #[test]
    fn prop_matches_linear_scan(ops in proptest::collection::vec(op(), 0..200)) {
        let mut tree = IntervalTree::<i32, u32>::new();
        let mut reference = Reference::default();
        let mut next_id = 0;

        for op in ops {
            match op {
                Op::Add(start, end) => {
                    let interval = tree.add_interval_with_payload(start, end, next_id).unwrap();
                    next_id += 1;
                    reference.entries.push((interval, start, end));
                }
                Op::Remove(idx) => {
                    if reference.entries.is_empty() {
                        continue;
                    }
                    let idx = idx % reference.entries.len();
                    let (interval, _, _) = reference.entries.swap_remove(idx);
                    prop_assert!(tree.remove_interval_ref(&interval));
                    prop_assert!(!tree.remove_interval_ref(&interval));
                    prop_assert!(!tree.contains(&interval));
                }
                Op::Query(point, sorted) => check_query(&tree, &reference, point, sorted),
                Op::Widen(point, amount) => {
                    tree.widen(point, amount).unwrap();
                    reference.shift(|bound| if bound >= point { bound + amount } else { bound });
                }
                Op::Shrink(point, amount) => {
                    tree.shrink(point, amount).unwrap();
                    reference.shift(|bound| {
                        if bound >= point { (bound - amount).max(point) } else { bound }
                    });
                }
            }

            prop_assert_eq!(tree.len(), reference.entries.len());
            prop_assert_eq!(tree.iter().count(), reference.entries.len());
            for (interval, start, end) in &reference.entries {
                prop_assert_eq!(interval.bounds(), (*start, *end));
                prop_assert!(tree.contains(interval));
            }
        }

        for point in -60..100 {
            check_query(&tree, &reference, point, true);
        }
    }

    #[test]
    fn prop_sorted_is_permutation_of_unsorted(
        raw in proptest::collection::vec((-100..100i32, 0..40i32), 0..150),
        point in -100..140i32,
    ) {
        let mut tree = IntervalTree::<i32>::new();
        for (start, len) in raw {
            tree.add_interval(start, start + len).unwrap();
        }

        let sorted: Vec<_> = tree.query_point(point, true).collect();
        let mut unsorted: Vec<_> = tree.query_point(point, false).collect();
        prop_assert_eq!(sorted.len(), unsorted.len());

        unsorted.sort_by(|a, b| a.bounds().cmp(&b.bounds()));
        for (a, b) in sorted.iter().zip(&unsorted) {
            prop_assert_eq!(a.bounds(), b.bounds());
        }
    }

    #[test]
    fn prop_fractional_bounds(
        raw in proptest::collection::vec((-400..400i32, 0..80i32), 1..100),
        point in -500..500i32,
    ) {
        let mut tree = IntervalTree::<f64>::new();
        let mut intervals = Vec::new();
        for (start, len) in raw {
            let (start, end) = (f64::from(start) / 4.0, f64::from(start + len) / 4.0);
            tree.add_interval(start, end).unwrap();
            intervals.push((start, end));
        }

        let point = f64::from(point) / 4.0;
        let hits: Vec<_> = tree.query_point(point, true).map(|i| i.bounds()).collect();
        let mut expected: Vec<_> = intervals
            .into_iter()
            .filter(|(start, end)| *start <= point && point < *end)
            .collect();
        expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
        prop_assert_eq!(hits, expected);
    }
}

#[test]
fn duplicate_intervals_removed_one_by_one() {
    let mut tree = IntervalTree::<i32, u32>::new();
    let handles: Vec<_> = (0..6)
        .map(|n| tree.add_interval_with_payload(3, 9, n).unwrap())
        .collect();

    for removed in [3, 0, 5] {
        assert!(tree.remove_interval_ref(&handles[removed]));
    }

    let mut left: Vec<u32> = tree.query_point(4, false).map(id).collect();
    left.sort_unstable();
    assert_eq!(left, vec![1, 2, 4]);
    assert!(tree.query_point(4, true).all(|hit| !Rc::ptr_eq(hit, &handles[3])));
}

#[test]
fn skewed_insertion_order_still_answers() {
    let mut tree = IntervalTree::<i32>::new();
    for start in 0..200 {
        tree.add_interval(start, start + 1).unwrap();
    }
    assert!(tree.height() > 1);

    for point in 0..200 {
        let hits: Vec<_> = tree.query_point(point, true).map(|i| i.bounds()).collect();
        assert_eq!(hits, vec![(point, point + 1)]);
    }
}

#[test]
fn deep_chain_is_walked_without_recursion() {
    const DEPTH: i32 = 20_000;
    let mut tree = IntervalTree::<i32>::new();
    let handles: Vec<_> = (0..DEPTH)
        .map(|start| tree.add_interval(start, start + 1).unwrap())
        .collect();
    assert_eq!(tree.height(), handles.len());

    let last = handles.last().unwrap();
    let hits: Vec<_> = tree.query_point(DEPTH - 1, true).map(|i| i.bounds()).collect();
    assert_eq!(hits, vec![(DEPTH - 1, DEPTH)]);
    assert!(tree.contains(last));
    assert!(tree.remove_interval_ref(last));
    assert!(!tree.contains(last));
    assert_eq!(tree.iter().count(), handles.len() - 1);

    // drains the chain and rebuilds it balanced
    tree.widen(DEPTH, 1).unwrap();
    assert!(tree.height() < 64);
    assert_eq!(tree.len(), handles.len() - 1);
    let hits: Vec<_> = tree.query_point(DEPTH / 2, false).map(|i| i.bounds()).collect();
    assert_eq!(hits, vec![(DEPTH / 2, DEPTH / 2 + 1)]);

    let mut chain = IntervalTree::<i32>::new();
    for start in (0..DEPTH).rev() {
        chain.add_interval(start, start + 1).unwrap();
    }
    assert_eq!(chain.height(), handles.len());
    chain.clear();
    assert!(chain.is_empty());
}

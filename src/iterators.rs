use std::{iter::Peekable, slice};
use core::{fmt, iter::FusedIterator};

use crate::{
    coordinate::Coordinate,
    interval::IntervalRef,
    node::{Node, Step},
};

/// Lazy scan over one node's local list for a single query point.
pub(crate) enum LocalScan<'a, T, V> {
    /// By-start list from the front: stops at the first start past the point.
    Ascending {
        entries: slice::Iter<'a, IntervalRef<T, V>>,
        point: T,
    },
    /// By-end list from the back: stops at the first end at or before the point.
    Descending {
        entries: slice::Iter<'a, IntervalRef<T, V>>,
        point: T,
    },
    Sorted(std::vec::IntoIter<&'a IntervalRef<T, V>>),
    Done,
}

impl<'a, T: Coordinate, V> LocalScan<'a, T, V> {
    pub fn ascending(by_start: &'a [IntervalRef<T, V>], point: T) -> LocalScan<'a, T, V> {
        LocalScan::Ascending {
            entries: by_start.iter(),
            point,
        }
    }

    pub fn descending(by_end: &'a [IntervalRef<T, V>], point: T) -> LocalScan<'a, T, V> {
        LocalScan::Descending {
            entries: by_end.iter(),
            point,
        }
    }

    /// Every entry of `by_end` ending after `point`, re-sorted by `(start, end)`.
    pub fn sorted_suffix(by_end: &'a [IntervalRef<T, V>], point: T) -> LocalScan<'a, T, V> {
        let cut = by_end.partition_point(|interval| interval.end() <= point);
        let mut hits: Vec<&'a IntervalRef<T, V>> = by_end[cut..].iter().collect();
        hits.sort_by(|a, b| a.cmp_bounds(b));
        LocalScan::Sorted(hits.into_iter())
    }
}

impl<'a, T: Coordinate, V> Iterator for LocalScan<'a, T, V> {
    type Item = &'a IntervalRef<T, V>;

    fn next(&mut self) -> Option<&'a IntervalRef<T, V>> {
        let hit = match self {
            LocalScan::Ascending { entries, point } => loop {
                match entries.next() {
                    Some(interval) if interval.start() > *point => break None,
                    // empty interval sitting on the centre
                    Some(interval) if interval.end() <= *point => continue,
                    other => break other,
                }
            },
            LocalScan::Descending { entries, point } => {
                entries.next_back().filter(|interval| interval.end() > *point)
            }
            LocalScan::Sorted(hits) => hits.next(),
            LocalScan::Done => None,
        };
        if hit.is_none() {
            *self = LocalScan::Done;
        }
        hit
    }
}

impl<T: Coordinate, V> FusedIterator for LocalScan<'_, T, V> {}

/// A `query_point` on the interval tree returns a `PointQuery`, which lazily
/// yields every stored interval containing the point.
///
/// Creating the query walks the one root-to-leaf path the point selects.
/// Each node on that path contributes one local scan, and intervals are
/// produced from those scans one at a time. With `sorted` set, the scans are
/// merged so the output ascends by `(start, end)`.
pub struct PointQuery<'a, T: Coordinate, V> {
    point: T,
    sorted: bool,
    // Unsorted: emitted back to front. Sorted: merged by smallest head.
    scans: Vec<Peekable<LocalScan<'a, T, V>>>,
}

impl<'a, T: Coordinate, V> PointQuery<'a, T, V> {
    pub(crate) fn new(
        root: Option<&'a Node<T, V>>,
        point: T,
        sorted: bool,
    ) -> PointQuery<'a, T, V> {
        // Scans emitted before anything deeper in the path, and those emitted after it.
        let mut leading = Vec::new();
        let mut trailing = Vec::new();

        let mut current = root;
        while let Some(node) = current {
            let Some((scan, step)) = node.query_step(point, sorted) else {
                break;
            };
            current = match step {
                Step::Before(child) => {
                    trailing.push(scan.peekable());
                    Some(child)
                }
                Step::After(child) => {
                    leading.push(scan.peekable());
                    Some(child)
                }
                Step::Stop => {
                    leading.push(scan.peekable());
                    None
                }
            };
        }

        // Stored back to front so the next scan to emit is last.
        leading.reverse();
        trailing.extend(leading);

        PointQuery {
            point,
            sorted,
            scans: trailing,
        }
    }

    #[must_use]
    pub fn point(&self) -> T {
        self.point
    }

    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    fn next_sorted(&mut self) -> Option<&'a IntervalRef<T, V>> {
        let idx = self
            .scans
            .iter_mut()
            .enumerate()
            .filter_map(|(idx, scan)| scan.peek().map(|&head| (idx, head)))
            .min_by(|(_, a), (_, b)| a.cmp_bounds(b))
            .map(|(idx, _)| idx)?;
        self.scans[idx].next()
    }

    fn next_unsorted(&mut self) -> Option<&'a IntervalRef<T, V>> {
        while let Some(scan) = self.scans.last_mut() {
            if let Some(hit) = scan.next() {
                return Some(hit);
            }
            self.scans.pop();
        }
        None
    }
}

impl<'a, T: Coordinate, V> Iterator for PointQuery<'a, T, V> {
    type Item = &'a IntervalRef<T, V>;

    fn next(&mut self) -> Option<&'a IntervalRef<T, V>> {
        if self.sorted {
            self.next_sorted()
        } else {
            self.next_unsorted()
        }
    }
}

impl<T: Coordinate, V> FusedIterator for PointQuery<'_, T, V> {}

impl<T: Coordinate, V> fmt::Debug for PointQuery<'_, T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointQuery")
            .field("point", &self.point)
            .field("sorted", &self.sorted)
            .field("scans", &self.scans.len())
            .finish()
    }
}

/// An `Iter` iterates over every interval in the tree in-order: a node's
/// left subtree, then its local intervals by start, then its right subtree.
///
/// Locally stored intervals of a node may start before those of its left
/// subtree, so the sequence is not globally sorted.
pub struct Iter<'a, T, V> {
    pub(crate) nodes: Vec<(&'a Node<T, V>, bool)>, // (node, visited)
    pub(crate) local: Option<slice::Iter<'a, IntervalRef<T, V>>>,
}

impl<'a, T, V> Iter<'a, T, V> {
    pub(crate) fn new(root: Option<&'a Node<T, V>>) -> Iter<'a, T, V> {
        Iter {
            nodes: root.map(|node| (node, false)).into_iter().collect(),
            local: None,
        }
    }
}

impl<'a, T: Coordinate, V> Iterator for Iter<'a, T, V> {
    type Item = &'a IntervalRef<T, V>;

    fn next(&mut self) -> Option<&'a IntervalRef<T, V>> {
        loop {
            if let Some(interval) = self.local.as_mut().and_then(Iterator::next) {
                return Some(interval);
            }
            let (node, visited) = self.nodes.pop()?;
            if visited {
                if let Some(right) = node.right_child.as_deref() {
                    self.nodes.push((right, false));
                }
                self.local = Some(node.by_start.as_slice().iter());
            } else {
                self.nodes.push((node, true));
                if let Some(left) = node.left_child.as_deref() {
                    self.nodes.push((left, false));
                }
            }
        }
    }
}

impl<T: Coordinate, V> FusedIterator for Iter<'_, T, V> {}

impl<T, V> fmt::Debug for Iter<'_, T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("pending_nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

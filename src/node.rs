use core::cmp::{max, Ordering};
use log::trace;

use crate::{
    coordinate::Coordinate,
    interval::IntervalRef,
    iterators::LocalScan,
    local::{LocalIntervalList, Order},
};

/// Where an interval lives relative to a node's centre.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Route {
    Left,
    Local,
    Right,
}

/// One partition of the number line around `centre`.
///
/// Intervals ending at or before `centre` live in `left_child`, intervals
/// starting after it live in `right_child`, everything else (including an
/// empty interval sitting exactly on `centre`) is kept in the two local lists.
pub(crate) struct Node<T, V> {
    pub centre: T,
    pub left_child: Option<Box<Node<T, V>>>,
    pub right_child: Option<Box<Node<T, V>>>,
    pub by_start: LocalIntervalList<T, V>,
    pub by_end: LocalIntervalList<T, V>,
}

impl<T: Coordinate, V> Node<T, V> {
    pub fn init(centre: T) -> Node<T, V> {
        trace!("new node centred at {:?}", centre);
        Node {
            centre,
            left_child: None,
            right_child: None,
            by_start: LocalIntervalList::new(Order::ByStart),
            by_end: LocalIntervalList::new(Order::ByEnd),
        }
    }

    fn route(&self, interval: &IntervalRef<T, V>) -> Route {
        let (start, end) = interval.bounds();
        if start > self.centre {
            Route::Right
        } else if end < self.centre || (end == self.centre && start < end) {
            Route::Left
        } else {
            Route::Local
        }
    }

    pub fn add_interval(&mut self, interval: IntervalRef<T, V>) {
        let mut node = self;
        loop {
            let child = match node.route(&interval) {
                Route::Right => &mut node.right_child,
                Route::Left => &mut node.left_child,
                Route::Local => {
                    node.by_start.insert(IntervalRef::clone(&interval));
                    node.by_end.insert(interval);
                    return;
                }
            };
            node = child
                .get_or_insert_with(|| Box::new(Node::init(interval.centre())))
                .as_mut();
        }
    }

    /// Removes `interval` by identity. Both local lists hold the same entries,
    /// so the by-end result stands for both.
    pub fn remove_interval_ref(&mut self, interval: &IntervalRef<T, V>) -> bool {
        let mut node = self;
        loop {
            let child = match node.route(interval) {
                Route::Right => &mut node.right_child,
                Route::Left => &mut node.left_child,
                Route::Local => {
                    node.by_start.remove(interval);
                    return node.by_end.remove(interval);
                }
            };
            match child.as_deref_mut() {
                Some(next) => node = next,
                None => return false,
            }
        }
    }

    pub fn contains(&self, interval: &IntervalRef<T, V>) -> bool {
        let mut node = self;
        loop {
            let child = match node.route(interval) {
                Route::Right => &node.right_child,
                Route::Left => &node.left_child,
                Route::Local => return node.by_end.contains(interval),
            };
            match child.as_deref() {
                Some(next) => node = next,
                None => return false,
            }
        }
    }

    /// The local scan this node contributes to a query at `point`, and the
    /// child the query continues into. A child listed first (`Before`) must be
    /// emitted before the local scan, `After` after it.
    pub fn query_step(
        &self,
        point: T,
        sorted: bool,
    ) -> Option<(LocalScan<'_, T, V>, Step<'_, T, V>)> {
        match point.partial_cmp(&self.centre)? {
            Ordering::Less => Some((
                LocalScan::ascending(self.by_start.as_slice(), point),
                self.left_child.as_deref().map_or(Step::Stop, Step::Before),
            )),
            Ordering::Equal => Some((
                LocalScan::ascending(self.by_start.as_slice(), point),
                Step::Stop,
            )),
            Ordering::Greater => {
                let scan = if sorted {
                    LocalScan::sorted_suffix(self.by_end.as_slice(), point)
                } else {
                    LocalScan::descending(self.by_end.as_slice(), point)
                };
                Some((
                    scan,
                    self.right_child.as_deref().map_or(Step::Stop, Step::After),
                ))
            }
        }
    }

    /// Moves every stored interval out of this subtree into `out`, in no
    /// particular order.
    pub fn drain_into(self: Box<Self>, out: &mut Vec<IntervalRef<T, V>>) {
        let mut pending = vec![self];
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left_child.take());
            pending.extend(node.right_child.take());
            out.extend(node.by_start.drain());
        }
    }

    pub fn height(node: &Option<Box<Node<T, V>>>) -> usize {
        let mut deepest = 0;
        let mut pending: Vec<(&Node<T, V>, usize)> =
            node.as_deref().map(|root| (root, 1)).into_iter().collect();
        while let Some((node, depth)) = pending.pop() {
            deepest = max(deepest, depth);
            pending.extend(node.left_child.as_deref().map(|child| (child, depth + 1)));
            pending.extend(node.right_child.as_deref().map(|child| (child, depth + 1)));
        }
        deepest
    }
}

// Unlinks children one at a time so a long chain is not dropped recursively.
impl<T, V> Drop for Node<T, V> {
    fn drop(&mut self) {
        let mut pending: Vec<Box<Node<T, V>>> = Vec::new();
        pending.extend(self.left_child.take());
        pending.extend(self.right_child.take());
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left_child.take());
            pending.extend(node.right_child.take());
        }
    }
}

/// Where a point query goes after visiting a node.
pub(crate) enum Step<'a, T, V> {
    Before(&'a Node<T, V>),
    After(&'a Node<T, V>),
    Stop,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Interval;
    use std::rc::Rc;

    fn iv(start: i32, end: i32) -> IntervalRef<i32, ()> {
        Rc::new(Interval::new(start, end, None))
    }

    #[test]
    fn node_routes_by_centre() {
        let mut node = Node::init(5);
        node.add_interval(iv(6, 9));
        node.add_interval(iv(1, 5));
        node.add_interval(iv(5, 6));
        node.add_interval(iv(0, 10));

        assert_eq!(node.by_start.len(), 2);
        assert_eq!(node.by_end.len(), 2);
        assert_eq!(node.right_child.as_ref().unwrap().centre, 7);
        assert_eq!(node.left_child.as_ref().unwrap().centre, 3);
        assert_eq!(Node::height(&Some(Box::new(node))), 2);
    }

    #[test]
    fn node_keeps_empty_interval_on_centre() {
        let mut node = Node::init(4);
        let empty = iv(4, 4);
        node.add_interval(Rc::clone(&empty));
        assert!(node.left_child.is_none());
        assert!(node.contains(&empty));

        let elsewhere = iv(2, 2);
        node.add_interval(Rc::clone(&elsewhere));
        let left = node.left_child.as_ref().unwrap();
        assert_eq!(left.centre, 2);
        assert_eq!(left.by_start.len(), 1);

        assert!(node.remove_interval_ref(&empty));
        assert!(node.remove_interval_ref(&elsewhere));
        assert!(!node.remove_interval_ref(&elsewhere));
    }

    #[test]
    fn node_removes_interval_ending_on_centre() {
        let mut node = Node::init(5);
        let touching = iv(2, 5);
        node.add_interval(Rc::clone(&touching));
        assert!(node.left_child.is_some());
        assert!(node.remove_interval_ref(&touching));
        assert!(!node.contains(&touching));
    }

    #[test]
    fn node_remove_without_child() {
        let mut node = Node::init(5);
        assert!(!node.remove_interval_ref(&iv(7, 8)));
        assert!(!node.remove_interval_ref(&iv(1, 2)));
        assert!(!node.remove_interval_ref(&iv(4, 6)));
    }

    #[test]
    fn node_chain_walks_and_drops_iteratively() {
        let mut chain: Option<Box<Node<i32, ()>>> = None;
        for centre in 0..100_000 {
            let mut node = Node::init(centre);
            node.left_child = chain.take();
            chain = Some(Box::new(node));
        }
        assert_eq!(Node::height(&chain), 100_000);

        let top = chain.as_mut().unwrap();
        let deepest = iv(-1, -1);
        top.add_interval(Rc::clone(&deepest));
        assert!(top.contains(&deepest));
        assert!(top.remove_interval_ref(&deepest));
        assert!(!top.contains(&deepest));

        drop(chain);
    }
}

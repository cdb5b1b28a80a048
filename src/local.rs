use std::rc::Rc;
use core::cmp::Ordering;
use log::trace;

use crate::{coordinate::Coordinate, interval::IntervalRef};

/// Which bound a [`LocalIntervalList`] is sorted by. The other bound breaks ties.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Order {
    ByStart,
    ByEnd,
}

impl Order {
    fn key<T: Coordinate, V>(self, interval: &IntervalRef<T, V>) -> (T, T) {
        let (start, end) = interval.bounds();
        match self {
            Order::ByStart => (start, end),
            Order::ByEnd => (end, start),
        }
    }

    fn primary<T: Coordinate, V>(self, interval: &IntervalRef<T, V>) -> T {
        match self {
            Order::ByStart => interval.start(),
            Order::ByEnd => interval.end(),
        }
    }
}

/// Intervals held by a single node, kept sorted by one of their bounds.
///
/// Insertion and removal binary-search for their position and shift the tail,
/// which is fine for the number of intervals overlapping any one centre.
pub(crate) struct LocalIntervalList<T, V> {
    order: Order,
    entries: Vec<IntervalRef<T, V>>,
}

impl<T: Coordinate, V> LocalIntervalList<T, V> {
    pub fn new(order: Order) -> LocalIntervalList<T, V> {
        LocalIntervalList {
            order,
            entries: Vec::new(),
        }
    }

    pub fn as_slice(&self) -> &[IntervalRef<T, V>] {
        &self.entries
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts `interval` after every entry whose key is not greater than its own.
    pub fn insert(&mut self, interval: IntervalRef<T, V>) {
        let order = self.order;
        let key = order.key(&interval);
        let idx = self
            .entries
            .partition_point(|entry| order.key(entry).partial_cmp(&key) != Some(Ordering::Greater));
        trace!("{:?} insert at {} of {}", order, idx, self.entries.len());
        self.entries.insert(idx, interval);
    }

    /// Removes exactly `interval` (by identity). Returns false if it is not in the list.
    pub fn remove(&mut self, interval: &IntervalRef<T, V>) -> bool {
        match self.position(interval) {
            Some(idx) => {
                self.entries.remove(idx);
                trace!("{:?} removed at {}", self.order, idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, interval: &IntervalRef<T, V>) -> bool {
        self.position(interval).is_some()
    }

    // First entry sharing the primary bound, then scan forward for the same allocation.
    fn position(&self, interval: &IntervalRef<T, V>) -> Option<usize> {
        let order = self.order;
        let target = order.primary(interval);
        let first = self
            .entries
            .partition_point(|entry| order.primary(entry) < target);

        self.entries[first..]
            .iter()
            .take_while(|entry| order.primary(entry) == target)
            .position(|entry| Rc::ptr_eq(entry, interval))
            .map(|offset| first + offset)
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, IntervalRef<T, V>> {
        self.entries.drain(..)
    }
}

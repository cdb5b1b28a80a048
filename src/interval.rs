use std::{cell::Cell, rc::Rc};
use core::{cmp::Ordering, fmt};
use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};

use crate::coordinate::Coordinate;

/// Shared handle to an interval stored in an [`IntervalTree`](crate::IntervalTree).
///
/// Two handles refer to the same stored interval only if they are
/// [`Rc::ptr_eq`]; equal bounds and payload do not make them the same entry.
pub type IntervalRef<T, V> = Rc<Interval<T, V>>;

/// A half-open interval `[start, end)` with an optional payload.
///
/// Bounds are only ever rewritten by `widen`/`shrink` on the owning tree.
pub struct Interval<T, V> {
    start: Cell<T>,
    end: Cell<T>,
    payload: Option<V>,
}

impl<T: Coordinate, V> Interval<T, V> {
    pub(crate) fn new(start: T, end: T, payload: Option<V>) -> Interval<T, V> {
        Interval {
            start: Cell::new(start),
            end: Cell::new(end),
            payload,
        }
    }

    /// Inclusive lower bound
    #[must_use]
    pub fn start(&self) -> T {
        self.start.get()
    }

    /// Exclusive upper bound
    #[must_use]
    pub fn end(&self) -> T {
        self.end.get()
    }

    #[must_use]
    pub fn bounds(&self) -> (T, T) {
        (self.start(), self.end())
    }

    #[must_use]
    pub fn payload(&self) -> Option<&V> {
        self.payload.as_ref()
    }

    /// Returns true if `point` lies in `[start, end)`
    ///
    /// # Examples
    /// ```
    /// use centred_interval_tree::IntervalTree;
    ///
    /// let mut tree = IntervalTree::<i32>::new();
    /// let interval = tree.add_interval(1, 2).unwrap();
    ///
    /// assert!(interval.contains(1));
    /// assert!(!interval.contains(2));
    /// ```
    #[must_use]
    pub fn contains(&self, point: T) -> bool {
        self.start() <= point && point < self.end()
    }

    /// Returns true if the interval contains no point at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start() >= self.end()
    }

    /// Centre for a node created to hold this interval. Always satisfies
    /// `start <= centre`, and `centre < end` unless the interval is empty.
    /// Falls back to `start` when the midpoint is not ordered (`[-inf, inf)`).
    pub(crate) fn centre(&self) -> T {
        let (start, end) = self.bounds();
        let centre = T::centre_of(start, end);
        if start <= centre && (centre < end || start >= end) {
            centre
        } else {
            start
        }
    }

    /// Lexicographic `(start, end)` order used by sorted queries.
    pub(crate) fn cmp_bounds(&self, other: &Interval<T, V>) -> Ordering {
        self.bounds()
            .partial_cmp(&other.bounds())
            .unwrap_or(Ordering::Equal)
    }

    pub(crate) fn set_bounds(&self, start: T, end: T) {
        self.start.set(start);
        self.end.set(end);
    }
}

impl<T: Coordinate, V: PartialEq> PartialEq for Interval<T, V> {
    fn eq(&self, other: &Self) -> bool {
        self.bounds() == other.bounds() && self.payload == other.payload
    }
}

impl<T: Coordinate, V: fmt::Debug> fmt::Debug for Interval<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interval")
            .field("start", &self.start())
            .field("end", &self.end())
            .field("payload", &self.payload)
            .finish()
    }
}

impl<T: Coordinate + fmt::Display, V> fmt::Display for Interval<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.start(), self.end())
    }
}

impl<T: Coordinate + Serialize, V: Serialize> Serialize for Interval<T, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Interval", 3)?;
        state.serialize_field("start", &self.start())?;
        state.serialize_field("end", &self.end())?;
        state.serialize_field("payload", &self.payload)?;
        state.end()
    }
}

/// Owned, detached copy of an interval, used to snapshot and rebuild a tree.
///
/// Serializes to the same shape as a stored [`Interval`].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize)]
#[archive_attr(derive(bytecheck::CheckBytes))]
pub struct IntervalRecord<T, V> {
    pub start: T,
    pub end: T,
    pub payload: Option<V>,
}

impl<T, V> IntervalRecord<T, V> {
    #[must_use]
    pub fn new(start: T, end: T, payload: Option<V>) -> IntervalRecord<T, V> {
        IntervalRecord { start, end, payload }
    }
}

impl<T: Coordinate, V: Clone> From<&Interval<T, V>> for IntervalRecord<T, V> {
    fn from(interval: &Interval<T, V>) -> Self {
        IntervalRecord::new(interval.start(), interval.end(), interval.payload.clone())
    }
}

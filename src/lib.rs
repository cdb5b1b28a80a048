#![warn(clippy::cargo)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(clippy::all)]
#![warn(
    missing_debug_implementations,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_must_use
)]
#![warn(clippy::pedantic)]
#![allow(clippy::comparison_chain)]
#![allow(clippy::missing_panics_doc)]

use core::{cmp::Ordering, fmt};
use log::debug;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

mod coordinate;
pub use coordinate::Coordinate;

mod error;
pub use error::Error;

mod interval;
pub use interval::{Interval, IntervalRecord, IntervalRef};

mod local;

mod node;
use node::Node;

mod iterators;
pub use iterators::{Iter, PointQuery};

/// An interval tree holding half-open intervals `[start, end)`, each with an
/// optional payload, and answering "which intervals contain point p" queries.
///
/// Every node partitions the number line around a centre: intervals entirely
/// left of it go to the left subtree, intervals entirely right of it to the
/// right subtree, and intervals spanning it stay on the node in two lists,
/// one sorted by start and one by end. The tree is never rebalanced.
///
/// Stored intervals are handed out as [`IntervalRef`] handles. Removal is by
/// handle identity, so two intervals with identical bounds and payload are
/// still separate entries.
///
/// # Examples
/// ```
/// use centred_interval_tree::IntervalTree;
///
/// let mut tree = IntervalTree::<i32, &str>::new();
///
/// let bold = tree.add_interval_with_payload(0, 10, "bold").unwrap();
/// let italic = tree.add_interval_with_payload(4, 6, "italic").unwrap();
/// let again = tree.add_interval_with_payload(4, 6, "italic").unwrap();
///
/// // [0,10) [4,6) [4,6) all contain 5
/// assert_eq!(tree.query_point(5, false).count(), 3);
///
/// // removal only takes out the exact handle
/// assert!(tree.remove_interval_ref(&italic));
/// assert!(!tree.remove_interval_ref(&italic));
///
/// let hits: Vec<_> = tree.query_point(5, true).collect();
/// assert_eq!(hits.len(), 2);
/// assert!(std::rc::Rc::ptr_eq(hits[0], &bold));
/// assert!(std::rc::Rc::ptr_eq(hits[1], &again));
///
/// // the end bound is excluded
/// assert_eq!(tree.query_point(10, false).count(), 0);
/// ```
pub struct IntervalTree<T, V = ()> {
    root: Option<Box<Node<T, V>>>,
    len: usize,
}

impl<T: Coordinate, V> IntervalTree<T, V> {
    /// Initialize an empty interval tree
    ///
    /// # Examples
    /// ```
    /// use centred_interval_tree::IntervalTree;
    ///
    /// let tree = IntervalTree::<usize>::new();
    /// assert!(tree.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> IntervalTree<T, V> {
        IntervalTree { root: None, len: 0 }
    }

    /// Returns true if there are no intervals in the tree, false otherwise
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns total number of intervals in the tree
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of node levels. Nodes emptied by removals still count.
    #[must_use]
    pub fn height(&self) -> usize {
        Node::height(&self.root)
    }

    /// Removes every interval. Outstanding handles stay valid but are no
    /// longer part of the tree.
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Inserts the interval `[start, end)` without payload and returns its handle
    ///
    /// # Errors
    /// * [`Error::InvertedBounds`] if `end < start`
    /// * [`Error::UnorderedBounds`] if the bounds cannot be compared (NaN)
    ///
    /// # Examples
    /// ```
    /// use centred_interval_tree::{Error, IntervalTree};
    ///
    /// let mut tree = IntervalTree::<i64>::new();
    /// let interval = tree.add_interval(-3, 8).unwrap();
    /// assert_eq!(interval.bounds(), (-3, 8));
    ///
    /// assert_eq!(
    ///     tree.add_interval(8, -3).unwrap_err(),
    ///     Error::InvertedBounds { start: 8, end: -3 }
    /// );
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn add_interval(&mut self, start: T, end: T) -> Result<IntervalRef<T, V>, Error<T>> {
        self.insert_new(start, end, None)
    }

    /// Inserts the interval `[start, end)` carrying `payload` and returns its handle
    ///
    /// # Errors
    /// Same as [`IntervalTree::add_interval`].
    pub fn add_interval_with_payload(
        &mut self,
        start: T,
        end: T,
        payload: V,
    ) -> Result<IntervalRef<T, V>, Error<T>> {
        self.insert_new(start, end, Some(payload))
    }

    fn insert_new(
        &mut self,
        start: T,
        end: T,
        payload: Option<V>,
    ) -> Result<IntervalRef<T, V>, Error<T>> {
        check_bounds(start, end)?;
        let interval = IntervalRef::new(Interval::new(start, end, payload));
        self.insert(IntervalRef::clone(&interval));
        Ok(interval)
    }

    fn insert(&mut self, interval: IntervalRef<T, V>) {
        self.root
            .get_or_insert_with(|| Box::new(Node::init(interval.centre())))
            .add_interval(interval);
        self.len += 1;
    }

    /// Removes the interval behind `interval` if it is stored in this tree.
    /// Returns false if it is not, including when it was already removed.
    ///
    /// # Examples
    /// ```
    /// use centred_interval_tree::IntervalTree;
    ///
    /// let mut tree = IntervalTree::<u32>::new();
    /// let a = tree.add_interval(2, 5).unwrap();
    /// let b = tree.add_interval(2, 5).unwrap();
    ///
    /// assert!(tree.remove_interval_ref(&a));
    /// assert!(!tree.remove_interval_ref(&a));
    /// assert!(tree.contains(&b));
    /// ```
    pub fn remove_interval_ref(&mut self, interval: &IntervalRef<T, V>) -> bool {
        let removed = self
            .root
            .as_mut()
            .is_some_and(|root| root.remove_interval_ref(interval));
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Returns true if this exact handle is stored in the tree
    #[must_use]
    pub fn contains(&self, interval: &IntervalRef<T, V>) -> bool {
        self.root.as_ref().is_some_and(|root| root.contains(interval))
    }

    /// Lazily yields every interval containing `point`.
    ///
    /// With `sorted` set the intervals ascend by `(start, end)`, otherwise
    /// they come in whatever order the traversal meets them. The query
    /// borrows the tree, so it must be dropped before the tree is mutated.
    ///
    /// # Examples
    /// ```
    /// use centred_interval_tree::IntervalTree;
    ///
    /// let mut tree = IntervalTree::<f64>::new();
    /// tree.add_interval(1.0, 2.0).unwrap();
    /// tree.add_interval(-10.0, 10.0).unwrap();
    ///
    /// let hits: Vec<_> = tree.query_point(1.5, true).map(|i| i.bounds()).collect();
    /// assert_eq!(hits, vec![(-10.0, 10.0), (1.0, 2.0)]);
    ///
    /// let hits: Vec<_> = tree.query_point(2.0, true).map(|i| i.bounds()).collect();
    /// assert_eq!(hits, vec![(-10.0, 10.0)]);
    /// ```
    #[must_use]
    pub fn query_point(&self, point: T, sorted: bool) -> PointQuery<'_, T, V> {
        PointQuery::new(self.root.as_deref(), point, sorted)
    }

    /// Iterates over every stored interval (not globally sorted)
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T, V> {
        Iter::new(self.root.as_deref())
    }

    /// Moves every bound at or after `point` up by `amount`, as when `amount`
    /// units are inserted at `point` in an annotated document. Handles keep
    /// their identity; the tree is rebuilt around the shifted bounds.
    ///
    /// # Errors
    /// * [`Error::NegativeAmount`] if `amount` is negative or NaN
    /// * [`Error::ShiftOverflow`] if a shifted bound would not fit in `T`
    ///
    /// The tree is left untouched on error.
    ///
    /// # Examples
    /// ```
    /// use centred_interval_tree::IntervalTree;
    ///
    /// let mut tree = IntervalTree::<i32>::new();
    /// let word = tree.add_interval(4, 9).unwrap();
    ///
    /// tree.widen(6, 2).unwrap();
    /// assert_eq!(word.bounds(), (4, 11));
    /// assert!(tree.query_point(10, false).any(|i| std::rc::Rc::ptr_eq(i, &word)));
    /// ```
    pub fn widen(&mut self, point: T, amount: T) -> Result<(), Error<T>> {
        check_amount(amount)?;
        for interval in self.iter() {
            for bound in [interval.start(), interval.end()] {
                if bound >= point && bound.shifted_up(amount).is_none() {
                    return Err(Error::ShiftOverflow { bound, amount });
                }
            }
        }
        self.shift(|bound| match bound.shifted_up(amount) {
            Some(shifted) if bound >= point => shifted,
            _ => bound,
        });
        Ok(())
    }

    /// Moves every bound at or after `point` down by `amount`, clamping at
    /// `point`, as when `amount` units are deleted at `point`. Intervals lying
    /// wholly in the deleted span become empty and stay stored.
    ///
    /// # Errors
    /// [`Error::NegativeAmount`] if `amount` is negative or NaN. The tree is left untouched.
    ///
    /// # Examples
    /// ```
    /// use centred_interval_tree::IntervalTree;
    ///
    /// let mut tree = IntervalTree::<i32>::new();
    /// let word = tree.add_interval(4, 9).unwrap();
    /// let inside = tree.add_interval(6, 8).unwrap();
    ///
    /// tree.shrink(5, 4).unwrap();
    /// assert_eq!(word.bounds(), (4, 5));
    /// assert_eq!(inside.bounds(), (5, 5));
    /// assert_eq!(tree.len(), 2);
    /// ```
    pub fn shrink(&mut self, point: T, amount: T) -> Result<(), Error<T>> {
        check_amount(amount)?;
        self.shift(|bound| {
            if bound < point {
                return bound;
            }
            // anything landing at or below `point`, including underflow, clamps to it
            match bound.shifted_down(amount) {
                Some(shifted) if shifted > point => shifted,
                _ => point,
            }
        });
        Ok(())
    }

    fn shift(&mut self, transform: impl Fn(T) -> T) {
        let Some(root) = self.root.take() else {
            return;
        };
        let mut intervals = Vec::with_capacity(self.len);
        root.drain_into(&mut intervals);

        for interval in &intervals {
            let (start, end) = interval.bounds();
            interval.set_bounds(transform(start), transform(end));
        }
        debug!("rebuilding tree of {} shifted intervals", intervals.len());
        self.rebuild(intervals);
    }

    // Inserts medians first so the new centres split the intervals evenly.
    fn rebuild(&mut self, mut intervals: Vec<IntervalRef<T, V>>) {
        self.clear();
        intervals.sort_by(|a, b| a.cmp_bounds(b));
        self.insert_balanced(&intervals);
    }

    fn insert_balanced(&mut self, intervals: &[IntervalRef<T, V>]) {
        if intervals.is_empty() {
            return;
        }
        let mid = intervals.len() / 2;
        self.insert(IntervalRef::clone(&intervals[mid]));
        self.insert_balanced(&intervals[..mid]);
        self.insert_balanced(&intervals[mid + 1..]);
    }

    /// Builds a tree from detached records, validating every record first.
    ///
    /// # Errors
    /// The first record failing the checks of [`IntervalTree::add_interval`].
    pub fn from_records<I>(records: I) -> Result<IntervalTree<T, V>, Error<T>>
    where
        I: IntoIterator<Item = IntervalRecord<T, V>>,
    {
        let intervals = records
            .into_iter()
            .map(|record| -> Result<IntervalRef<T, V>, Error<T>> {
                check_bounds(record.start, record.end)?;
                Ok(IntervalRef::new(Interval::new(
                    record.start,
                    record.end,
                    record.payload,
                )))
            })
            .collect::<Result<Vec<_>, Error<T>>>()?;

        let mut tree = IntervalTree::new();
        tree.rebuild(intervals);
        Ok(tree)
    }

    fn sorted_refs(&self) -> Vec<&IntervalRef<T, V>> {
        let mut intervals: Vec<_> = self.iter().collect();
        intervals.sort_by(|a, b| a.cmp_bounds(b));
        intervals
    }
}

impl<T: Coordinate, V: Clone> IntervalTree<T, V> {
    /// Detached copies of every stored interval, sorted by `(start, end)`
    ///
    /// # Examples
    /// ```
    /// use centred_interval_tree::{IntervalRecord, IntervalTree};
    ///
    /// let mut tree = IntervalTree::<i32, char>::new();
    /// tree.add_interval_with_payload(5, 7, 'b').unwrap();
    /// tree.add_interval(1, 3).unwrap();
    ///
    /// assert_eq!(
    ///     tree.to_records(),
    ///     vec![IntervalRecord::new(1, 3, None), IntervalRecord::new(5, 7, Some('b'))]
    /// );
    /// ```
    #[must_use]
    pub fn to_records(&self) -> Vec<IntervalRecord<T, V>> {
        self.sorted_refs()
            .into_iter()
            .map(|interval| IntervalRecord::from(&**interval))
            .collect()
    }
}

fn check_bounds<T: Coordinate>(start: T, end: T) -> Result<(), Error<T>> {
    match start.partial_cmp(&end) {
        Some(Ordering::Less | Ordering::Equal) => Ok(()),
        Some(Ordering::Greater) => Err(Error::InvertedBounds { start, end }),
        None => Err(Error::UnorderedBounds { start, end }),
    }
}

fn check_amount<T: Coordinate>(amount: T) -> Result<(), Error<T>> {
    match amount.partial_cmp(&T::zero()) {
        Some(Ordering::Greater | Ordering::Equal) => Ok(()),
        Some(Ordering::Less) | None => Err(Error::NegativeAmount(amount)),
    }
}

impl<T: Coordinate, V> Default for IntervalTree<T, V> {
    fn default() -> Self {
        IntervalTree::new()
    }
}

impl<'a, T: Coordinate, V> IntoIterator for &'a IntervalTree<T, V> {
    type Item = &'a IntervalRef<T, V>;
    type IntoIter = Iter<'a, T, V>;

    fn into_iter(self) -> Iter<'a, T, V> {
        self.iter()
    }
}

impl<T: Coordinate, V: fmt::Debug> fmt::Debug for IntervalTree<T, V> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_set()
            .entries(self.sorted_refs().into_iter().map(|interval| &**interval))
            .finish()
    }
}

impl<T: Coordinate + Serialize, V: Serialize> Serialize for IntervalTree<T, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.sorted_refs().into_iter().map(|interval| &**interval))
    }
}

impl<'de, T, V> Deserialize<'de> for IntervalTree<T, V>
where
    T: Coordinate + Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = Vec::<IntervalRecord<T, V>>::deserialize(deserializer)?;
        IntervalTree::from_records(records).map_err(de::Error::custom)
    }
}

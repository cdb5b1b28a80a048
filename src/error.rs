use core::fmt::Debug;
use thiserror::Error;

/// Precondition failures reported by [`IntervalTree`](crate::IntervalTree).
///
/// Every operation returning this error leaves the tree untouched.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Error<T: Debug> {
    #[error("interval end {end:?} is before its start {start:?}")]
    InvertedBounds { start: T, end: T },

    #[error("interval bounds {start:?} and {end:?} cannot be ordered")]
    UnorderedBounds { start: T, end: T },

    #[error("shift amount {0:?} is negative")]
    NegativeAmount(T),

    #[error("shifting bound {bound:?} by {amount:?} overflows")]
    ShiftOverflow { bound: T, amount: T },
}

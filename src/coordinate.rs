use core::fmt::Debug;
use num::{CheckedAdd, CheckedSub, Float, Integer, Num};

/// A numeric type usable as an interval bound.
///
/// Implemented for every primitive integer and float type.
pub trait Coordinate: Copy + PartialOrd + Debug + Num {
    /// Midpoint of `start` and `end`, floored whenever both bounds are whole numbers.
    fn centre_of(start: Self, end: Self) -> Self;

    /// `self + amount`, or `None` if the result does not fit.
    fn shifted_up(self, amount: Self) -> Option<Self>;

    /// `self - amount`, or `None` if the result does not fit.
    fn shifted_down(self, amount: Self) -> Option<Self>;
}

fn two<T: Num>() -> T {
    T::one() + T::one()
}

fn integer_centre<T: Integer + Copy>(start: T, end: T) -> T {
    // floor((a + b) / 2) without overflowing on a + b
    let two = two::<T>();
    start.div_floor(&two)
        + end.div_floor(&two)
        + (start.mod_floor(&two) + end.mod_floor(&two)).div_floor(&two)
}

fn float_centre<T: Float>(start: T, end: T) -> T {
    let mid = (start + end) / two::<T>();
    if start.fract().is_zero() && end.fract().is_zero() {
        mid.floor()
    } else {
        mid
    }
}

macro_rules! impl_integer_coordinate {
    ($($t:ty),*) => {
        $(
            impl Coordinate for $t {
                #[inline]
                fn centre_of(start: Self, end: Self) -> Self {
                    integer_centre(start, end)
                }

                #[inline]
                fn shifted_up(self, amount: Self) -> Option<Self> {
                    CheckedAdd::checked_add(&self, &amount)
                }

                #[inline]
                fn shifted_down(self, amount: Self) -> Option<Self> {
                    CheckedSub::checked_sub(&self, &amount)
                }
            }
        )*
    };
}

macro_rules! impl_float_coordinate {
    ($($t:ty),*) => {
        $(
            impl Coordinate for $t {
                #[inline]
                fn centre_of(start: Self, end: Self) -> Self {
                    float_centre(start, end)
                }

                // saturates to infinity, which is still an ordered bound
                #[inline]
                fn shifted_up(self, amount: Self) -> Option<Self> {
                    Some(self + amount)
                }

                #[inline]
                fn shifted_down(self, amount: Self) -> Option<Self> {
                    Some(self - amount)
                }
            }
        )*
    };
}

impl_integer_coordinate!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_float_coordinate!(f32, f64);

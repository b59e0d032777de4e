//! Value widths for sparse storage
//!
//! A [`Weight`] is the stored representation of a cell value. The public
//! matrix and vector contracts are expressed in `f64`; a weight narrows on
//! the way in and widens on the way out. Integer weights round and saturate,
//! boolean weights map every non-zero value to `true`.
//!
//! Each weight names the store that holds its values. Numeric weights use a
//! plain `Vec`; booleans use [`Presence`], which holds nothing at all because
//! an active cell of an unweighted structure is always `true`.

use scirs2_core::numeric::{NumCast, ToPrimitive, Zero};
use std::fmt;

/// Backing storage for the values of one sparse vector
pub trait ValueStore<W>: Clone + fmt::Debug + Default + Send + Sync {
    /// Whether an explicit zero can occupy a cell. Stores that cannot hold a
    /// zero drop the cell instead.
    const KEEPS_ZEROS: bool;

    fn value(&self, pos: usize) -> W;
    fn replace(&mut self, pos: usize, value: W);
    fn insert(&mut self, pos: usize, value: W);
    fn remove(&mut self, pos: usize);
    fn reserve_exact(&mut self, additional: usize);
    fn clear(&mut self);
}

impl<W> ValueStore<W> for Vec<W>
where
    W: Copy + fmt::Debug + Send + Sync,
{
    const KEEPS_ZEROS: bool = true;

    #[inline]
    fn value(&self, pos: usize) -> W {
        self[pos]
    }

    #[inline]
    fn replace(&mut self, pos: usize, value: W) {
        self[pos] = value;
    }

    fn insert(&mut self, pos: usize, value: W) {
        Vec::insert(self, pos, value);
    }

    fn remove(&mut self, pos: usize) {
        Vec::remove(self, pos);
    }

    fn reserve_exact(&mut self, additional: usize) {
        Vec::reserve_exact(self, additional);
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }
}

/// Value store of unweighted structures: presence of the index is the value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Presence;

impl ValueStore<bool> for Presence {
    const KEEPS_ZEROS: bool = false;

    #[inline]
    fn value(&self, _pos: usize) -> bool {
        true
    }

    #[inline]
    fn replace(&mut self, _pos: usize, _value: bool) {}

    #[inline]
    fn insert(&mut self, _pos: usize, _value: bool) {}

    #[inline]
    fn remove(&mut self, _pos: usize) {}

    #[inline]
    fn reserve_exact(&mut self, _additional: usize) {}

    #[inline]
    fn clear(&mut self) {}
}

/// A scalar type usable as a stored cell value
pub trait Weight: Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Descriptor reported through `weight_type()`
    const NAME: &'static str;

    /// Storage for a vector of this weight
    type Store: ValueStore<Self>;

    /// Narrow an `f64` to this representation
    fn from_f64(value: f64) -> Self;

    /// Widen to `f64`
    fn to_f64(self) -> f64;

    /// `self + other` in this representation
    fn accumulate(self, other: Self) -> Self;

    fn is_zero(self) -> bool;
}

impl Weight for bool {
    const NAME: &'static str = "boolean";
    type Store = Presence;

    #[inline]
    fn from_f64(value: f64) -> Self {
        value != 0.0
    }

    #[inline]
    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }

    #[inline]
    fn accumulate(self, other: Self) -> Self {
        self || other
    }

    #[inline]
    fn is_zero(self) -> bool {
        !self
    }
}

/// Narrow `value` to `T`, saturating at `min`/`max` and mapping NaN to zero
fn narrow<T: NumCast + Zero>(value: f64, min: T, max: T) -> T {
    if value.is_nan() {
        return T::zero();
    }
    <T as NumCast>::from(value).unwrap_or(if value > 0.0 { max } else { min })
}

macro_rules! impl_numeric_weight {
    (@round integer, $value:expr) => {
        $value.round()
    };
    (@round float, $value:expr) => {
        $value
    };
    (@add integer, $a:expr, $b:expr) => {
        $a.saturating_add($b)
    };
    (@add float, $a:expr, $b:expr) => {
        $a + $b
    };
    ($($ty:ty => $name:literal, $kind:ident);* $(;)?) => {
        $(
            impl Weight for $ty {
                const NAME: &'static str = $name;
                type Store = Vec<$ty>;

                #[inline]
                fn from_f64(value: f64) -> Self {
                    narrow(impl_numeric_weight!(@round $kind, value), <$ty>::MIN, <$ty>::MAX)
                }

                #[inline]
                fn to_f64(self) -> f64 {
                    ToPrimitive::to_f64(&self).unwrap_or(0.0)
                }

                #[inline]
                fn accumulate(self, other: Self) -> Self {
                    impl_numeric_weight!(@add $kind, self, other)
                }

                #[inline]
                fn is_zero(self) -> bool {
                    Zero::is_zero(&self)
                }
            }
        )*
    };
}

impl_numeric_weight!(
    i8 => "byte", integer;
    i16 => "short", integer;
    u16 => "char", integer;
    i32 => "int", integer;
    i64 => "long", integer;
    f32 => "float", float;
    f64 => "double", float;
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_narrowing_saturates() {
        assert_eq!(i8::from_f64(300.0), i8::MAX);
        assert_eq!(i8::from_f64(-300.0), i8::MIN);
        assert_eq!(i16::from_f64(2.6), 3);
        assert_eq!(i32::from_f64(f64::NAN), 0);
        assert_eq!(i8::MAX.accumulate(1), i8::MAX);
        assert_eq!(u16::from_f64(-4.0), 0);
    }

    #[test]
    fn test_float_narrowing() {
        assert_eq!(f32::from_f64(0.25), 0.25f32);
        assert_eq!(f64::from_f64(-3.5).accumulate(1.0), -2.5);
        assert!(Weight::is_zero(0.0f32));
        assert_eq!(f64::NAME, "double");
    }

    #[test]
    fn test_boolean_weight() {
        assert!(bool::from_f64(-0.5));
        assert!(!bool::from_f64(0.0));
        assert_eq!(true.to_f64(), 1.0);
        assert!(false.is_zero());
        assert_eq!(bool::NAME, "boolean");
    }

    #[test]
    fn test_presence_store_holds_nothing() {
        assert_eq!(std::mem::size_of::<Presence>(), 0);
        let mut store = Presence;
        store.insert(0, true);
        assert!(store.value(17));
        assert!(!<Presence as ValueStore<bool>>::KEEPS_ZEROS);
    }
}

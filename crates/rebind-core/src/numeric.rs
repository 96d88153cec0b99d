//! Numeric value kinds and the widening table.
//!
//! The four kinds are ordered by width: `Int < Long < Float < Double`. A
//! binary operation on two kinds produces the wider one; see [`Promote`].

use std::fmt;

/// Width class of a numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumericKind {
    Int,
    Long,
    Float,
    Double,
}

impl NumericKind {
    /// The wider of two kinds.
    #[must_use]
    pub fn widen(self, other: Self) -> Self {
        self.max(other)
    }
}

/// One numeric value of any kind.
///
/// The `as_*` accessors are narrowing views with cast semantics:
/// float→integer truncates toward zero and saturates, a NaN becomes 0,
/// long→int keeps the low bits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Number {
    #[must_use]
    pub fn kind(self) -> NumericKind {
        match self {
            Self::Int(_) => NumericKind::Int,
            Self::Long(_) => NumericKind::Long,
            Self::Float(_) => NumericKind::Float,
            Self::Double(_) => NumericKind::Double,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Int(v) => v,
            Self::Long(v) => v as i32,
            Self::Float(v) => v as i32,
            Self::Double(v) => v as i32,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Int(v) => i64::from(v),
            Self::Long(v) => v,
            Self::Float(v) => v as i64,
            Self::Double(v) => v as i64,
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    #[must_use]
    pub fn as_f32(self) -> f32 {
        match self {
            Self::Int(v) => v as f32,
            Self::Long(v) => v as f32,
            Self::Float(v) => v,
            Self::Double(v) => v as f32,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => f64::from(v),
            Self::Long(v) => v as f64,
            Self::Float(v) => f64::from(v),
            Self::Double(v) => v,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => fmt::Display::fmt(v, f),
            Self::Long(v) => fmt::Display::fmt(v, f),
            Self::Float(v) => fmt::Display::fmt(v, f),
            Self::Double(v) => fmt::Display::fmt(v, f),
        }
    }
}

/// A primitive numeric kind.
///
/// Integer arithmetic wraps on overflow. Integer division by zero yields
/// `None`; float division follows IEEE 754. `minimum`/`maximum` propagate
/// NaN.
pub trait Numeric:
    Copy + PartialOrd + Default + fmt::Debug + fmt::Display + 'static
{
    const KIND: NumericKind;

    fn to_number(self) -> Number;

    fn from_number(number: Number) -> Self;

    fn plus(self, rhs: Self) -> Self;

    fn minus(self, rhs: Self) -> Self;

    fn times(self, rhs: Self) -> Self;

    fn divided_by(self, rhs: Self) -> Option<Self>;

    fn negated(self) -> Self;

    fn minimum(self, rhs: Self) -> Self;

    fn maximum(self, rhs: Self) -> Self;

    /// `|self - rhs|` as a double, computed without overflow.
    fn abs_diff(self, rhs: Self) -> f64;

    /// Convert to another kind with cast semantics.
    fn cast<N: Numeric>(self) -> N {
        N::from_number(self.to_number())
    }
}

macro_rules! impl_integral {
    ($ty:ty, $kind:ident, $as:ident) => {
        impl Numeric for $ty {
            const KIND: NumericKind = NumericKind::$kind;

            fn to_number(self) -> Number {
                Number::$kind(self)
            }

            fn from_number(number: Number) -> Self {
                number.$as()
            }

            fn plus(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            fn minus(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }

            fn times(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }

            fn divided_by(self, rhs: Self) -> Option<Self> {
                if rhs == 0 {
                    None
                } else {
                    Some(self.wrapping_div(rhs))
                }
            }

            fn negated(self) -> Self {
                self.wrapping_neg()
            }

            fn minimum(self, rhs: Self) -> Self {
                Ord::min(self, rhs)
            }

            fn maximum(self, rhs: Self) -> Self {
                Ord::max(self, rhs)
            }

            #[allow(clippy::cast_precision_loss)]
            fn abs_diff(self, rhs: Self) -> f64 {
                (i128::from(self) - i128::from(rhs)).unsigned_abs() as f64
            }
        }
    };
}

macro_rules! impl_floating {
    ($ty:ty, $kind:ident, $as:ident) => {
        impl Numeric for $ty {
            const KIND: NumericKind = NumericKind::$kind;

            fn to_number(self) -> Number {
                Number::$kind(self)
            }

            fn from_number(number: Number) -> Self {
                number.$as()
            }

            fn plus(self, rhs: Self) -> Self {
                self + rhs
            }

            fn minus(self, rhs: Self) -> Self {
                self - rhs
            }

            fn times(self, rhs: Self) -> Self {
                self * rhs
            }

            fn divided_by(self, rhs: Self) -> Option<Self> {
                Some(self / rhs)
            }

            fn negated(self) -> Self {
                -self
            }

            fn minimum(self, rhs: Self) -> Self {
                if self.is_nan() || rhs.is_nan() {
                    <$ty>::NAN
                } else {
                    self.min(rhs)
                }
            }

            fn maximum(self, rhs: Self) -> Self {
                if self.is_nan() || rhs.is_nan() {
                    <$ty>::NAN
                } else {
                    self.max(rhs)
                }
            }

            fn abs_diff(self, rhs: Self) -> f64 {
                f64::from((self - rhs).abs())
            }
        }
    };
}

impl_integral!(i32, Int, as_i32);
impl_integral!(i64, Long, as_i64);
impl_floating!(f32, Float, as_f32);
impl_floating!(f64, Double, as_f64);

/// Result kind of a binary operation between `Self` and `Rhs`.
pub trait Promote<Rhs: Numeric>: Numeric {
    type Output: Numeric;
}

/// The wider of `A` and `B`.
pub type Widened<A, B> = <A as Promote<B>>::Output;

macro_rules! promote {
    ($($lhs:ty, $rhs:ty => $out:ty;)*) => {
        $(impl Promote<$rhs> for $lhs {
            type Output = $out;
        })*
    };
}

promote! {
    i32, i32 => i32;
    i32, i64 => i64;
    i32, f32 => f32;
    i32, f64 => f64;
    i64, i32 => i64;
    i64, i64 => i64;
    i64, f32 => f32;
    i64, f64 => f64;
    f32, i32 => f32;
    f32, i64 => f32;
    f32, f32 => f32;
    f32, f64 => f64;
    f64, i32 => f64;
    f64, i64 => f64;
    f64, f32 => f64;
    f64, f64 => f64;
}

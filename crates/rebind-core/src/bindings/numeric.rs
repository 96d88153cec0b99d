//! Arithmetic and comparison over the numeric kinds.
//!
//! Binary operations evaluate in the wider of the two operand kinds
//! ([`Widened`]). Integer arithmetic wraps; integer division by zero fails
//! evaluation with [`BindingError::DivisionByZero`].

use super::{binary, unary};
use crate::binding::Binding;
use crate::error::BindingError;
use crate::numeric::{Numeric, Promote, Widened};
use crate::operand::Operand;

pub fn negate<N: Numeric>(a: impl Into<Operand<N>>) -> Binding<N> {
    unary(a.into(), |a: N| Ok(a.negated()))
}

pub fn add<A, B>(a: impl Into<Operand<A>>, b: impl Into<Operand<B>>) -> Binding<Widened<A, B>>
where
    A: Promote<B>,
    B: Numeric,
{
    binary(a.into(), b.into(), |a: A, b: B| {
        Ok(a.cast::<Widened<A, B>>().plus(b.cast()))
    })
}

pub fn subtract<A, B>(
    a: impl Into<Operand<A>>,
    b: impl Into<Operand<B>>,
) -> Binding<Widened<A, B>>
where
    A: Promote<B>,
    B: Numeric,
{
    binary(a.into(), b.into(), |a: A, b: B| {
        Ok(a.cast::<Widened<A, B>>().minus(b.cast()))
    })
}

pub fn multiply<A, B>(
    a: impl Into<Operand<A>>,
    b: impl Into<Operand<B>>,
) -> Binding<Widened<A, B>>
where
    A: Promote<B>,
    B: Numeric,
{
    binary(a.into(), b.into(), |a: A, b: B| {
        Ok(a.cast::<Widened<A, B>>().times(b.cast()))
    })
}

/// Quotient in the wider kind. Integer quotients truncate toward zero.
pub fn divide<A, B>(a: impl Into<Operand<A>>, b: impl Into<Operand<B>>) -> Binding<Widened<A, B>>
where
    A: Promote<B>,
    B: Numeric,
{
    binary(a.into(), b.into(), |a: A, b: B| {
        a.cast::<Widened<A, B>>()
            .divided_by(b.cast())
            .ok_or(BindingError::DivisionByZero)
    })
}

/// `a == b`, compared in the wider kind.
pub fn equal<A, B>(a: impl Into<Operand<A>>, b: impl Into<Operand<B>>) -> Binding<bool>
where
    A: Promote<B>,
    B: Numeric,
{
    equal_within(a, b, 0.0)
}

/// `|a - b| <= epsilon`, with the difference taken in the wider kind.
pub fn equal_within<A, B>(
    a: impl Into<Operand<A>>,
    b: impl Into<Operand<B>>,
    epsilon: f64,
) -> Binding<bool>
where
    A: Promote<B>,
    B: Numeric,
{
    binary(a.into(), b.into(), move |a: A, b: B| {
        Ok(within::<Widened<A, B>>(a.cast(), b.cast(), epsilon))
    })
}

pub fn not_equal<A, B>(a: impl Into<Operand<A>>, b: impl Into<Operand<B>>) -> Binding<bool>
where
    A: Promote<B>,
    B: Numeric,
{
    not_equal_within(a, b, 0.0)
}

pub fn not_equal_within<A, B>(
    a: impl Into<Operand<A>>,
    b: impl Into<Operand<B>>,
    epsilon: f64,
) -> Binding<bool>
where
    A: Promote<B>,
    B: Numeric,
{
    binary(a.into(), b.into(), move |a: A, b: B| {
        Ok(!within::<Widened<A, B>>(a.cast(), b.cast(), epsilon))
    })
}

fn within<W: Numeric>(a: W, b: W, epsilon: f64) -> bool {
    a.abs_diff(b) <= epsilon
}

macro_rules! comparison {
    ($(#[$doc:meta])* $name:ident, $op:tt) => {
        $(#[$doc])*
        pub fn $name<A, B>(a: impl Into<Operand<A>>, b: impl Into<Operand<B>>) -> Binding<bool>
        where
            A: Promote<B>,
            B: Numeric,
        {
            binary(a.into(), b.into(), |a: A, b: B| {
                Ok(a.cast::<Widened<A, B>>() $op b.cast::<Widened<A, B>>())
            })
        }
    };
}

comparison!(
    /// `a > b`. Any comparison involving NaN is false.
    greater_than, >
);
comparison!(less_than, <);
comparison!(greater_than_or_equal, >=);
comparison!(less_than_or_equal, <=);

/// Smaller operand in the wider kind; NaN if either is NaN.
pub fn min<A, B>(a: impl Into<Operand<A>>, b: impl Into<Operand<B>>) -> Binding<Widened<A, B>>
where
    A: Promote<B>,
    B: Numeric,
{
    binary(a.into(), b.into(), |a: A, b: B| {
        Ok(a.cast::<Widened<A, B>>().minimum(b.cast()))
    })
}

/// Larger operand in the wider kind; NaN if either is NaN.
pub fn max<A, B>(a: impl Into<Operand<A>>, b: impl Into<Operand<B>>) -> Binding<Widened<A, B>>
where
    A: Promote<B>,
    B: Numeric,
{
    binary(a.into(), b.into(), |a: A, b: B| {
        Ok(a.cast::<Widened<A, B>>().maximum(b.cast()))
    })
}

/// The value rendered with `Display`. Never absent.
pub fn convert<N: Numeric>(a: impl Into<Operand<N>>) -> Binding<Option<String>> {
    unary(a.into(), |a: N| Ok(Some(a.to_string())))
}

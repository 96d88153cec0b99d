//! Fluent expression traits.
//!
//! Each trait is implemented for every observable of the matching value
//! kind and delegates to the [`bindings`](crate::bindings) algebra, so
//! `a.add(&b)` and `numeric::add(&a, &b)` build the same binding.
//!
//! ```
//! use rebind_core::{IntegerProperty, NumberExpression};
//!
//! let a = IntegerProperty::new(1);
//! let b = IntegerProperty::new(2);
//! let c = a.add(&b);
//! assert_eq!(c.get().ok(), Some(3));
//! a.set(5);
//! assert_eq!(c.get().ok(), Some(7));
//! ```

pub mod collection;

pub use collection::{
    AsCollectionBinding, CollectionBinding, ListBinding, MapBinding, SetBinding,
    list_expression, map_expression, set_expression,
};

use std::fmt::Display;

use crate::binding::Binding;
use crate::bindings::{boolean, numeric, object, text};
use crate::error::Result;
use crate::format::{DisplayValue, TextPart};
use crate::numeric::{Numeric, Promote, Widened};
use crate::observable::{ObservableValue, dependency};
use crate::operand::Operand;
use crate::property::Property;

type Text = Option<String>;

/// Operators on numeric observables.
pub trait NumberExpression<N: Numeric>: ObservableValue<N> + Clone + 'static {
    fn int_value(&self) -> Result<i32> {
        Ok(self.value()?.cast())
    }

    fn long_value(&self) -> Result<i64> {
        Ok(self.value()?.cast())
    }

    fn float_value(&self) -> Result<f32> {
        Ok(self.value()?.cast())
    }

    fn double_value(&self) -> Result<f64> {
        Ok(self.value()?.cast())
    }

    fn negate(&self) -> Binding<N> {
        numeric::negate(Operand::observable(self))
    }

    fn add<B: Numeric>(&self, other: impl Into<Operand<B>>) -> Binding<Widened<N, B>>
    where
        N: Promote<B>,
    {
        numeric::add(Operand::observable(self), other)
    }

    fn subtract<B: Numeric>(&self, other: impl Into<Operand<B>>) -> Binding<Widened<N, B>>
    where
        N: Promote<B>,
    {
        numeric::subtract(Operand::observable(self), other)
    }

    fn multiply<B: Numeric>(&self, other: impl Into<Operand<B>>) -> Binding<Widened<N, B>>
    where
        N: Promote<B>,
    {
        numeric::multiply(Operand::observable(self), other)
    }

    fn divide<B: Numeric>(&self, other: impl Into<Operand<B>>) -> Binding<Widened<N, B>>
    where
        N: Promote<B>,
    {
        numeric::divide(Operand::observable(self), other)
    }

    fn is_equal_to<B: Numeric>(&self, other: impl Into<Operand<B>>) -> Binding<bool>
    where
        N: Promote<B>,
    {
        numeric::equal(Operand::observable(self), other)
    }

    fn is_equal_to_within<B: Numeric>(
        &self,
        other: impl Into<Operand<B>>,
        epsilon: f64,
    ) -> Binding<bool>
    where
        N: Promote<B>,
    {
        numeric::equal_within(Operand::observable(self), other, epsilon)
    }

    fn is_not_equal_to<B: Numeric>(&self, other: impl Into<Operand<B>>) -> Binding<bool>
    where
        N: Promote<B>,
    {
        numeric::not_equal(Operand::observable(self), other)
    }

    fn is_not_equal_to_within<B: Numeric>(
        &self,
        other: impl Into<Operand<B>>,
        epsilon: f64,
    ) -> Binding<bool>
    where
        N: Promote<B>,
    {
        numeric::not_equal_within(Operand::observable(self), other, epsilon)
    }

    fn greater_than<B: Numeric>(&self, other: impl Into<Operand<B>>) -> Binding<bool>
    where
        N: Promote<B>,
    {
        numeric::greater_than(Operand::observable(self), other)
    }

    fn less_than<B: Numeric>(&self, other: impl Into<Operand<B>>) -> Binding<bool>
    where
        N: Promote<B>,
    {
        numeric::less_than(Operand::observable(self), other)
    }

    fn greater_than_or_equal_to<B: Numeric>(&self, other: impl Into<Operand<B>>) -> Binding<bool>
    where
        N: Promote<B>,
    {
        numeric::greater_than_or_equal(Operand::observable(self), other)
    }

    fn less_than_or_equal_to<B: Numeric>(&self, other: impl Into<Operand<B>>) -> Binding<bool>
    where
        N: Promote<B>,
    {
        numeric::less_than_or_equal(Operand::observable(self), other)
    }

    fn min<B: Numeric>(&self, other: impl Into<Operand<B>>) -> Binding<Widened<N, B>>
    where
        N: Promote<B>,
    {
        numeric::min(Operand::observable(self), other)
    }

    fn max<B: Numeric>(&self, other: impl Into<Operand<B>>) -> Binding<Widened<N, B>>
    where
        N: Promote<B>,
    {
        numeric::max(Operand::observable(self), other)
    }

    fn as_string(&self) -> Binding<Text> {
        numeric::convert(Operand::observable(self))
    }

    /// The value rendered through a one-placeholder template such as
    /// `"{:.2} kg"`.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` for a malformed template or one without exactly one
    /// placeholder.
    fn as_string_with(&self, template: &str) -> Result<Binding<Text>>
    where
        N: DisplayValue,
    {
        text::format(template, [TextPart::of::<N, Self>(self)])
    }
}

impl<N, O> NumberExpression<N> for O
where
    N: Numeric,
    O: ObservableValue<N> + Clone + 'static,
{
}

/// Operators on boolean observables.
pub trait BooleanExpression: ObservableValue<bool> + Clone + 'static {
    /// Short-circuits when `other` is observable too.
    fn and(&self, other: impl Into<Operand<bool>>) -> Binding<bool> {
        boolean::and(Operand::observable(self), other)
    }

    fn or(&self, other: impl Into<Operand<bool>>) -> Binding<bool> {
        boolean::or(Operand::observable(self), other)
    }

    fn not(&self) -> Binding<bool> {
        boolean::not(Operand::observable(self))
    }

    fn is_equal_to(&self, other: impl Into<Operand<bool>>) -> Binding<bool> {
        boolean::equal(Operand::observable(self), other)
    }

    fn is_not_equal_to(&self, other: impl Into<Operand<bool>>) -> Binding<bool> {
        boolean::not_equal(Operand::observable(self), other)
    }

    fn as_string(&self) -> Binding<Text> {
        boolean::convert(Operand::observable(self))
    }
}

impl<O: ObservableValue<bool> + Clone + 'static> BooleanExpression for O {}

/// Operators on string observables. Absent compares as `""`.
pub trait StringExpression: ObservableValue<Text> + Clone + 'static {
    /// The current value with absent read as `""`.
    fn value_safe(&self) -> Result<String> {
        Ok(self.value()?.unwrap_or_default())
    }

    fn concat(&self, other: impl Into<TextPart>) -> Binding<Text> {
        text::concat([TextPart::of::<Text, Self>(self), other.into()])
    }

    fn is_equal_to(&self, other: impl Into<Operand<Text>>) -> Binding<bool> {
        text::equal(Operand::observable(self), other)
    }

    fn is_not_equal_to(&self, other: impl Into<Operand<Text>>) -> Binding<bool> {
        text::not_equal(Operand::observable(self), other)
    }

    fn is_equal_to_ignore_case(&self, other: impl Into<Operand<Text>>) -> Binding<bool> {
        text::equal_ignore_case(Operand::observable(self), other)
    }

    fn is_not_equal_to_ignore_case(&self, other: impl Into<Operand<Text>>) -> Binding<bool> {
        text::not_equal_ignore_case(Operand::observable(self), other)
    }

    fn greater_than(&self, other: impl Into<Operand<Text>>) -> Binding<bool> {
        text::greater_than(Operand::observable(self), other)
    }

    fn less_than(&self, other: impl Into<Operand<Text>>) -> Binding<bool> {
        text::less_than(Operand::observable(self), other)
    }

    fn greater_than_or_equal_to(&self, other: impl Into<Operand<Text>>) -> Binding<bool> {
        text::greater_than_or_equal(Operand::observable(self), other)
    }

    fn less_than_or_equal_to(&self, other: impl Into<Operand<Text>>) -> Binding<bool> {
        text::less_than_or_equal(Operand::observable(self), other)
    }

    fn length(&self) -> Binding<i32> {
        text::length(Operand::observable(self))
    }

    fn is_empty(&self) -> Binding<bool> {
        text::is_empty(Operand::observable(self))
    }

    fn is_not_empty(&self) -> Binding<bool> {
        text::is_not_empty(Operand::observable(self))
    }
}

impl<O: ObservableValue<Text> + Clone + 'static> StringExpression for O {}

/// Operators on optional object observables.
pub trait ObjectExpression<T: Clone + PartialEq + 'static>:
    ObservableValue<Option<T>> + Clone + 'static
{
    fn is_null(&self) -> Binding<bool> {
        object::is_null(Operand::observable(self))
    }

    fn is_not_null(&self) -> Binding<bool> {
        object::is_not_null(Operand::observable(self))
    }

    fn equals_value(&self, other: impl Into<Operand<Option<T>>>) -> Binding<bool> {
        object::equal(Operand::observable(self), other)
    }

    fn not_equals_value(&self, other: impl Into<Operand<Option<T>>>) -> Binding<bool> {
        object::not_equal(Operand::observable(self), other)
    }

    fn as_string(&self) -> Binding<Text>
    where
        T: Display,
    {
        object::convert(Operand::observable(self))
    }
}

impl<T, O> ObjectExpression<T> for O
where
    T: Clone + PartialEq + 'static,
    O: ObservableValue<Option<T>> + Clone + 'static,
{
}

/// Conversion of an observable into a binding of the same kind.
pub trait AsExpression<T> {
    fn as_expression(&self) -> Binding<T>;
}

impl<T: Clone + PartialEq + 'static> AsExpression<T> for Binding<T> {
    /// The binding itself.
    fn as_expression(&self) -> Binding<T> {
        self.clone()
    }
}

impl<T: Clone + PartialEq + 'static> AsExpression<T> for Property<T> {
    /// A mirror that follows the property.
    fn as_expression(&self) -> Binding<T> {
        Binding::mirror(self)
    }
}

/// A numeric binding over an optional source, reading absent as zero.
pub fn number_expression<N, O>(source: &O) -> Binding<N>
where
    N: Numeric,
    O: ObservableValue<Option<N>> + Clone + 'static,
{
    let dep = dependency(source);
    let source = source.clone();
    Binding::derived(move || Ok(source.value()?.unwrap_or_default()), [dep])
}

/// A boolean binding over an optional source, reading absent as `false`.
pub fn boolean_expression<O>(source: &O) -> Binding<bool>
where
    O: ObservableValue<Option<bool>> + Clone + 'static,
{
    let dep = dependency(source);
    let source = source.clone();
    Binding::derived(move || Ok(source.value()?.unwrap_or(false)), [dep])
}

/// A string binding over any displayable source. Absent stays absent.
pub fn string_expression<V, O>(source: &O) -> Binding<Text>
where
    V: DisplayValue + 'static,
    O: ObservableValue<V> + Clone + 'static,
{
    text::convert(source)
}

/// An object binding mirroring `source` unchanged.
pub fn object_expression<T, O>(source: &O) -> Binding<T>
where
    T: Clone + PartialEq + 'static,
    O: ObservableValue<T> + Clone + 'static,
{
    Binding::mirror(source)
}

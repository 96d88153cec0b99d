//! Size and element access over observable collections.
//!
//! Generic accessors ([`value_at`], [`value_at_key`]) yield `None` for a
//! missing element. Typed accessors (`integer_value_at`, ...) fail
//! evaluation instead: out of range with
//! [`BindingError::IndexOutOfBounds`], a missing key with
//! [`BindingError::MissingKey`], an absent element with
//! [`BindingError::AbsentElement`]. An absent collection reads as empty.

use std::fmt::Debug;
use std::hash::Hash;

use crate::binding::Binding;
use crate::collections::{ObservableCollection, ObservableList, ObservableMap, ObservableSet};
use crate::error::{BindingError, Result};
use crate::expression::CollectionBinding;
use crate::numeric::Number;
use crate::observable::{Dependency, ObservableValue, dependency};

/// Something that yields an optional collection and can be depended on.
pub trait CollectionSource: Clone + 'static {
    type Collection: ObservableCollection;

    /// # Errors
    ///
    /// Propagates an evaluation failure of a binding source.
    fn current(&self) -> Result<Option<Self::Collection>>;

    fn source_dependency(&self) -> Dependency;
}

impl<E: Clone + 'static> CollectionSource for ObservableList<E> {
    type Collection = Self;

    fn current(&self) -> Result<Option<Self>> {
        Ok(Some(self.clone()))
    }

    fn source_dependency(&self) -> Dependency {
        dependency(self)
    }
}

impl<E: Hash + Eq + Clone + 'static> CollectionSource for ObservableSet<E> {
    type Collection = Self;

    fn current(&self) -> Result<Option<Self>> {
        Ok(Some(self.clone()))
    }

    fn source_dependency(&self) -> Dependency {
        dependency(self)
    }
}

impl<K, V> CollectionSource for ObservableMap<K, V>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
{
    type Collection = Self;

    fn current(&self) -> Result<Option<Self>> {
        Ok(Some(self.clone()))
    }

    fn source_dependency(&self) -> Dependency {
        dependency(self)
    }
}

impl<C: ObservableCollection> CollectionSource for CollectionBinding<C> {
    type Collection = C;

    fn current(&self) -> Result<Option<C>> {
        self.get()
    }

    fn source_dependency(&self) -> Dependency {
        dependency(self)
    }
}

fn over<S, R>(source: &S, f: impl Fn(Option<S::Collection>) -> Result<R> + 'static) -> Binding<R>
where
    S: CollectionSource,
    R: Clone + PartialEq + 'static,
{
    let dep = source.source_dependency();
    let source = source.clone();
    Binding::derived(move || f(source.current()?), [dep])
}

fn count(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

/// Number of elements; 0 for an absent collection.
pub fn size<S: CollectionSource>(source: &S) -> Binding<i32> {
    over(source, |c| Ok(c.map_or(0, |c| count(c.len()))))
}

pub fn is_empty<S: CollectionSource>(source: &S) -> Binding<bool> {
    over(source, |c| Ok(c.is_none_or(|c| c.is_empty())))
}

pub fn is_not_empty<S: CollectionSource>(source: &S) -> Binding<bool> {
    over(source, |c| Ok(c.is_some_and(|c| !c.is_empty())))
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

/// Element at `index`, `None` when out of range.
pub fn value_at<S, E>(list: &S, index: usize) -> Binding<Option<E>>
where
    S: CollectionSource<Collection = ObservableList<E>>,
    E: Clone + PartialEq + 'static,
{
    over(list, move |l| Ok(l.and_then(|l| l.get(index))))
}

/// Element at the index held by `index`. Negative or out-of-range indices
/// yield `None`.
pub fn value_at_observable<S, E, O>(list: &S, index: &O) -> Binding<Option<E>>
where
    S: CollectionSource<Collection = ObservableList<E>>,
    E: Clone + PartialEq + 'static,
    O: ObservableValue<i32> + Clone + 'static,
{
    let deps = [list.source_dependency(), dependency(index)];
    let list = list.clone();
    let index = index.clone();
    Binding::derived(
        move || {
            let Ok(at) = usize::try_from(index.value()?) else {
                return Ok(None);
            };
            Ok(list.current()?.and_then(|l| l.get(at)))
        },
        deps,
    )
}

fn element_at<E: Clone + 'static>(list: Option<ObservableList<E>>, index: usize) -> Result<E> {
    let list = list.unwrap_or_else(ObservableList::read_only_empty);
    list.get(index).ok_or(BindingError::IndexOutOfBounds {
        index,
        len: list.len(),
    })
}

fn absent_at(index: usize) -> BindingError {
    BindingError::AbsentElement {
        position: format!("at index {index}"),
    }
}

/// A list element readable as a boolean.
pub trait BooleanElement: Clone + PartialEq + 'static {
    fn boolean(&self) -> Option<bool>;
}

impl BooleanElement for bool {
    fn boolean(&self) -> Option<bool> {
        Some(*self)
    }
}

impl BooleanElement for Option<bool> {
    fn boolean(&self) -> Option<bool> {
        *self
    }
}

/// A list element readable as a number.
pub trait NumberElement: Clone + PartialEq + 'static {
    fn number(&self) -> Option<Number>;
}

macro_rules! number_element {
    ($($ty:ty),*) => {
        $(
            impl NumberElement for $ty {
                fn number(&self) -> Option<Number> {
                    Some(crate::numeric::Numeric::to_number(*self))
                }
            }

            impl NumberElement for Option<$ty> {
                fn number(&self) -> Option<Number> {
                    self.map(crate::numeric::Numeric::to_number)
                }
            }
        )*
    };
}

number_element!(i32, i64, f32, f64);

/// A list element readable as text.
pub trait TextElement: Clone + PartialEq + 'static {
    fn text(&self) -> Option<String>;
}

impl TextElement for String {
    fn text(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl TextElement for Option<String> {
    fn text(&self) -> Option<String> {
        self.clone()
    }
}

impl TextElement for &'static str {
    fn text(&self) -> Option<String> {
        Some((*self).to_owned())
    }
}

pub fn boolean_value_at<S, E>(list: &S, index: usize) -> Binding<bool>
where
    S: CollectionSource<Collection = ObservableList<E>>,
    E: BooleanElement,
{
    over(list, move |l| {
        element_at(l, index)?.boolean().ok_or_else(|| absent_at(index))
    })
}

fn number_at<S, E, R>(list: &S, index: usize, view: fn(Number) -> R) -> Binding<R>
where
    S: CollectionSource<Collection = ObservableList<E>>,
    E: NumberElement,
    R: Clone + PartialEq + 'static,
{
    over(list, move |l| {
        element_at(l, index)?
            .number()
            .map(view)
            .ok_or_else(|| absent_at(index))
    })
}

pub fn integer_value_at<S, E>(list: &S, index: usize) -> Binding<i32>
where
    S: CollectionSource<Collection = ObservableList<E>>,
    E: NumberElement,
{
    number_at(list, index, Number::as_i32)
}

pub fn long_value_at<S, E>(list: &S, index: usize) -> Binding<i64>
where
    S: CollectionSource<Collection = ObservableList<E>>,
    E: NumberElement,
{
    number_at(list, index, Number::as_i64)
}

pub fn float_value_at<S, E>(list: &S, index: usize) -> Binding<f32>
where
    S: CollectionSource<Collection = ObservableList<E>>,
    E: NumberElement,
{
    number_at(list, index, Number::as_f32)
}

pub fn double_value_at<S, E>(list: &S, index: usize) -> Binding<f64>
where
    S: CollectionSource<Collection = ObservableList<E>>,
    E: NumberElement,
{
    number_at(list, index, Number::as_f64)
}

/// Text element at `index`. An absent element stays absent; out of range
/// fails evaluation.
pub fn string_value_at<S, E>(list: &S, index: usize) -> Binding<Option<String>>
where
    S: CollectionSource<Collection = ObservableList<E>>,
    E: TextElement,
{
    over(list, move |l| Ok(element_at(l, index)?.text()))
}

// ---------------------------------------------------------------------------
// Maps
// ---------------------------------------------------------------------------

/// Value for `key`, `None` when missing.
pub fn value_at_key<S, K, V>(map: &S, key: K) -> Binding<Option<V>>
where
    S: CollectionSource<Collection = ObservableMap<K, V>>,
    K: Hash + Eq + Clone + 'static,
    V: Clone + PartialEq + 'static,
{
    over(map, move |m| Ok(m.and_then(|m| m.get(&key))))
}

/// Value for the key held by `key`.
pub fn value_at_key_observable<S, K, V, O>(map: &S, key: &O) -> Binding<Option<V>>
where
    S: CollectionSource<Collection = ObservableMap<K, V>>,
    K: Hash + Eq + Clone + 'static,
    V: Clone + PartialEq + 'static,
    O: ObservableValue<K> + Clone + 'static,
{
    let deps = [map.source_dependency(), dependency(key)];
    let map = map.clone();
    let key = key.clone();
    Binding::derived(
        move || {
            let key = key.value()?;
            Ok(map.current()?.and_then(|m| m.get(&key)))
        },
        deps,
    )
}

fn entry_for<K, V>(map: Option<ObservableMap<K, V>>, key: &K) -> Result<V>
where
    K: Hash + Eq + Clone + Debug + 'static,
    V: Clone + 'static,
{
    map.and_then(|m| m.get(key))
        .ok_or_else(|| BindingError::MissingKey {
            key: format!("{key:?}"),
        })
}

fn absent_for<K: Debug>(key: &K) -> BindingError {
    BindingError::AbsentElement {
        position: format!("for key {key:?}"),
    }
}

pub fn boolean_value_at_key<S, K, V>(map: &S, key: K) -> Binding<bool>
where
    S: CollectionSource<Collection = ObservableMap<K, V>>,
    K: Hash + Eq + Clone + Debug + 'static,
    V: BooleanElement,
{
    over(map, move |m| {
        entry_for(m, &key)?.boolean().ok_or_else(|| absent_for(&key))
    })
}

fn number_at_key<S, K, V, R>(map: &S, key: K, view: fn(Number) -> R) -> Binding<R>
where
    S: CollectionSource<Collection = ObservableMap<K, V>>,
    K: Hash + Eq + Clone + Debug + 'static,
    V: NumberElement,
    R: Clone + PartialEq + 'static,
{
    over(map, move |m| {
        entry_for(m, &key)?
            .number()
            .map(view)
            .ok_or_else(|| absent_for(&key))
    })
}

pub fn integer_value_at_key<S, K, V>(map: &S, key: K) -> Binding<i32>
where
    S: CollectionSource<Collection = ObservableMap<K, V>>,
    K: Hash + Eq + Clone + Debug + 'static,
    V: NumberElement,
{
    number_at_key(map, key, Number::as_i32)
}

pub fn long_value_at_key<S, K, V>(map: &S, key: K) -> Binding<i64>
where
    S: CollectionSource<Collection = ObservableMap<K, V>>,
    K: Hash + Eq + Clone + Debug + 'static,
    V: NumberElement,
{
    number_at_key(map, key, Number::as_i64)
}

pub fn float_value_at_key<S, K, V>(map: &S, key: K) -> Binding<f32>
where
    S: CollectionSource<Collection = ObservableMap<K, V>>,
    K: Hash + Eq + Clone + Debug + 'static,
    V: NumberElement,
{
    number_at_key(map, key, Number::as_f32)
}

pub fn double_value_at_key<S, K, V>(map: &S, key: K) -> Binding<f64>
where
    S: CollectionSource<Collection = ObservableMap<K, V>>,
    K: Hash + Eq + Clone + Debug + 'static,
    V: NumberElement,
{
    number_at_key(map, key, Number::as_f64)
}

pub fn string_value_at_key<S, K, V>(map: &S, key: K) -> Binding<Option<String>>
where
    S: CollectionSource<Collection = ObservableMap<K, V>>,
    K: Hash + Eq + Clone + Debug + 'static,
    V: TextElement,
{
    over(map, move |m| Ok(entry_for(m, &key)?.text()))
}

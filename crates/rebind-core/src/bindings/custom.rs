//! Bindings from user closures.
//!
//! The closure may fail with any error convertible into
//! `Box<dyn Error>`. Failures surface from `get()` as evaluation errors
//! attributed to the created binding. A `BindingError` returned from the
//! closure (for example by `?` on another binding's `get()`) keeps its
//! innermost attribution.

use std::error::Error as StdError;
use std::hash::Hash;

use crate::binding::Binding;
use crate::collections::{ObservableList, ObservableMap, ObservableSet};
use crate::error::{BindingError, Result};
use crate::expression::{ListBinding, MapBinding, SetBinding};
use crate::observable::Dependency;

fn into_binding_error(err: impl Into<Box<dyn StdError + 'static>>) -> BindingError {
    match err.into().downcast::<BindingError>() {
        Ok(err) => *err,
        Err(other) => BindingError::evaluation(other),
    }
}

fn lift<T, E>(compute: impl Fn() -> std::result::Result<T, E> + 'static) -> impl Fn() -> Result<T>
where
    T: 'static,
    E: Into<Box<dyn StdError + 'static>> + 'static,
{
    move || compute().map_err(into_binding_error)
}

/// A binding computed by `compute`, invalidated by `dependencies`.
pub fn create_binding<T, E>(
    compute: impl Fn() -> std::result::Result<T, E> + 'static,
    dependencies: impl IntoIterator<Item = Dependency>,
) -> Binding<T>
where
    T: Clone + PartialEq + 'static,
    E: Into<Box<dyn StdError + 'static>> + 'static,
{
    Binding::derived(lift(compute), dependencies)
}

macro_rules! typed_factory {
    ($(#[$doc:meta])* $name:ident => $ty:ty) => {
        $(#[$doc])*
        pub fn $name<E>(
            compute: impl Fn() -> std::result::Result<$ty, E> + 'static,
            dependencies: impl IntoIterator<Item = Dependency>,
        ) -> Binding<$ty>
        where
            E: Into<Box<dyn StdError + 'static>> + 'static,
        {
            create_binding(compute, dependencies)
        }
    };
}

typed_factory!(create_boolean_binding => bool);
typed_factory!(create_integer_binding => i32);
typed_factory!(create_long_binding => i64);
typed_factory!(create_float_binding => f32);
typed_factory!(create_double_binding => f64);
typed_factory!(
    /// The closure may return `None` for an absent string.
    create_string_binding => Option<String>
);

pub fn create_object_binding<T, E>(
    compute: impl Fn() -> std::result::Result<Option<T>, E> + 'static,
    dependencies: impl IntoIterator<Item = Dependency>,
) -> Binding<Option<T>>
where
    T: Clone + PartialEq + 'static,
    E: Into<Box<dyn StdError + 'static>> + 'static,
{
    create_binding(compute, dependencies)
}

/// A list binding that also follows the content of the list it returns.
pub fn create_list_binding<T, E>(
    compute: impl Fn() -> std::result::Result<Option<ObservableList<T>>, E> + 'static,
    dependencies: impl IntoIterator<Item = Dependency>,
) -> ListBinding<T>
where
    T: Clone + 'static,
    E: Into<Box<dyn StdError + 'static>> + 'static,
{
    ListBinding::new(lift(compute), dependencies)
}

pub fn create_set_binding<T, E>(
    compute: impl Fn() -> std::result::Result<Option<ObservableSet<T>>, E> + 'static,
    dependencies: impl IntoIterator<Item = Dependency>,
) -> SetBinding<T>
where
    T: Hash + Eq + Clone + 'static,
    E: Into<Box<dyn StdError + 'static>> + 'static,
{
    SetBinding::new(lift(compute), dependencies)
}

pub fn create_map_binding<K, V, E>(
    compute: impl Fn() -> std::result::Result<Option<ObservableMap<K, V>>, E> + 'static,
    dependencies: impl IntoIterator<Item = Dependency>,
) -> MapBinding<K, V>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
    E: Into<Box<dyn StdError + 'static>> + 'static,
{
    MapBinding::new(lift(compute), dependencies)
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;
    use crate::deps;
    use crate::observable::Observable;
    use crate::property::{IntegerProperty, Property};

    #[derive(Debug)]
    struct Overheated(i32);

    impl fmt::Display for Overheated {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "temperature {} too high", self.0)
        }
    }

    impl StdError for Overheated {}

    #[test]
    fn user_failure_becomes_attributed_evaluation_error() {
        let t = IntegerProperty::new(120);
        let source = t.clone();
        let ok = create_integer_binding(
            move || {
                let v = source.get();
                if v > 100 { Err(Overheated(v)) } else { Ok(v) }
            },
            deps![t],
        );
        let err = ok.get().err();
        let eval = err.as_ref().and_then(BindingError::as_evaluation);
        assert_eq!(eval.and_then(|e| e.binding()), Some(ok.id()));
        assert!(eval.and_then(|e| e.cause_as::<Overheated>()).is_some());
        t.set(20);
        assert_eq!(ok.get().ok(), Some(20));
    }

    #[test]
    fn nested_failure_keeps_inner_attribution() {
        let inner = create_binding(|| Err::<i32, _>("inner broke"), []);
        let reader = inner.clone();
        let outer = create_binding(move || reader.get().map(|v| v + 1), deps![inner]);
        let err = outer.get().err();
        let blamed = err
            .as_ref()
            .and_then(BindingError::as_evaluation)
            .and_then(|e| e.binding());
        assert_eq!(blamed, Some(inner.id()));
    }

    #[test]
    fn string_binding_may_be_absent() {
        let name: Property<Option<String>> = Property::null();
        let source = name.clone();
        let upper = create_string_binding(
            move || Ok::<_, BindingError>(source.get().map(|s| s.to_uppercase())),
            deps![name],
        );
        assert_eq!(upper.get().ok(), Some(None));
        name.set(Some("ab".into()));
        assert_eq!(upper.get().ok().flatten().as_deref(), Some("AB"));
    }

    #[test]
    fn list_binding_factory_tracks_content() {
        let list = ObservableList::from_vec(vec![1]);
        let held = list.clone();
        let lb = create_list_binding(move || Ok::<_, BindingError>(Some(held.clone())), []);
        let size = lb.size_binding();
        assert_eq!(size.get().ok(), Some(1));
        list.push(2).ok();
        assert_eq!(size.get().ok(), Some(2));
    }
}

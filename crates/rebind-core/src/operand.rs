//! Operands of the bindings algebra: constants or observables.
//!
//! Only observable operands are registered as dependencies.

use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::observable::{Dependency, ObservableValue, dependency};

/// A type-erased observable value together with its dependency handle.
pub struct ObservableRef<T> {
    value: Rc<dyn ObservableValue<T>>,
    dependency: Dependency,
}

impl<T> Clone for ObservableRef<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
            dependency: Rc::clone(&self.dependency),
        }
    }
}

impl<T: 'static> ObservableRef<T> {
    pub fn new<O>(observable: &O) -> Self
    where
        O: ObservableValue<T> + Clone + 'static,
    {
        Self {
            value: Rc::new(observable.clone()),
            dependency: dependency(observable),
        }
    }

    pub fn get(&self) -> Result<T> {
        self.value.value()
    }

    #[must_use]
    pub fn dependency(&self) -> Dependency {
        Rc::clone(&self.dependency)
    }
}

impl<T> fmt::Debug for ObservableRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObservableRef")
            .field(&self.dependency.id())
            .finish()
    }
}

/// A constant or an observable of `T`.
pub enum Operand<T> {
    Constant(T),
    Observable(ObservableRef<T>),
}

impl<T: Clone> Clone for Operand<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Constant(value) => Self::Constant(value.clone()),
            Self::Observable(obs) => Self::Observable(obs.clone()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Operand<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Observable(obs) => fmt::Debug::fmt(obs, f),
        }
    }
}

impl<T: Clone + 'static> Operand<T> {
    pub fn constant(value: T) -> Self {
        Self::Constant(value)
    }

    pub fn observable<O>(observable: &O) -> Self
    where
        O: ObservableValue<T> + Clone + 'static,
    {
        Self::Observable(ObservableRef::new(observable))
    }

    /// Current value of the operand.
    pub fn get(&self) -> Result<T> {
        match self {
            Self::Constant(value) => Ok(value.clone()),
            Self::Observable(obs) => obs.get(),
        }
    }

    /// Dependency handle, `None` for constants.
    #[must_use]
    pub fn dependency(&self) -> Option<Dependency> {
        match self {
            Self::Constant(_) => None,
            Self::Observable(obs) => Some(obs.dependency()),
        }
    }

    #[must_use]
    pub fn as_observable(&self) -> Option<&ObservableRef<T>> {
        match self {
            Self::Constant(_) => None,
            Self::Observable(obs) => Some(obs),
        }
    }

    #[must_use]
    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }
}

impl Operand<Option<String>> {
    /// A present string constant.
    #[must_use]
    pub fn text(value: &str) -> Self {
        Self::Constant(Some(value.to_owned()))
    }
}

impl<T, O> From<&O> for Operand<T>
where
    T: Clone + 'static,
    O: ObservableValue<T> + Clone + 'static,
{
    fn from(observable: &O) -> Self {
        Self::observable(observable)
    }
}

macro_rules! constant_operand {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Operand<$ty> {
            fn from(value: $ty) -> Self {
                Self::Constant(value)
            }
        })*
    };
}

constant_operand!(bool, i32, i64, f32, f64);

impl<T> From<Option<T>> for Operand<Option<T>> {
    fn from(value: Option<T>) -> Self {
        Self::Constant(value)
    }
}

impl From<String> for Operand<Option<String>> {
    fn from(value: String) -> Self {
        Self::Constant(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Property;

    #[test]
    fn constants_have_no_dependency() {
        let op: Operand<i32> = 3.into();
        assert!(op.dependency().is_none());
        assert_eq!(op.get().ok(), Some(3));
    }

    #[test]
    fn observables_read_through() {
        let p = Property::new(1.5_f64);
        let op: Operand<f64> = (&p).into();
        p.set(2.5);
        assert_eq!(op.get().ok(), Some(2.5));
        assert_eq!(op.dependency().map(|d| d.id()), Some(crate::Observable::id(&p)));
    }

    #[test]
    fn strings_become_present_constants() {
        let op: Operand<Option<String>> = String::from("x").into();
        assert_eq!(op.get().ok(), Some(Some("x".to_string())));
    }
}

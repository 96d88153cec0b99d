#![forbid(unsafe_code)]

//! Core: observable contracts, lazy bindings, and the bindings algebra.
//!
//! # Architecture
//!
//! Every observable in this crate is a cheap, cloneable handle around
//! `Rc`-shared state, meant to be used from a single owner thread.
//!
//! - [`Property`] is a mutable leaf value.
//! - [`Binding`] is a derived value: it caches the result of a compute
//!   closure and marks itself invalid when any dependency invalidates.
//!   Invalidation is pushed eagerly; recomputation is pulled lazily by
//!   [`Binding::get`].
//! - [`bindings`] is the stateless factory algebra (arithmetic, comparison,
//!   logic, strings, collections, select paths).
//! - [`expression`] provides fluent extension traits that delegate to the
//!   algebra.
//!
//! # Invariants
//!
//! 1. A binding's cache is never stale while the binding reports valid.
//! 2. Invalidation listeners fire at most once per valid→invalid edge.
//! 3. Change listeners always receive the true old and new value.
//! 4. `dispose()` removes every listener a binding registered.

pub mod binding;
pub mod bindings;
pub mod collections;
pub mod config;
pub mod error;
pub mod expression;
pub mod format;
pub(crate) mod listeners;
pub mod logging;
pub mod numeric;
pub mod observable;
pub mod operand;
pub mod property;
pub mod scope;

pub use binding::{Binding, Disposable, WeakBinding};
pub use collections::{
    CollectionListener, ListChange, MapChange, ObservableCollection, ObservableList,
    ObservableMap, ObservableSet, SetChange,
};
pub use config::{LinkReport, SelectConfig};
pub use error::{BindingError, EvaluationError, Result};
pub use expression::{
    AsExpression, BooleanExpression, CollectionBinding, ListBinding, MapBinding,
    NumberExpression, ObjectExpression, SetBinding, StringExpression,
};
pub use format::{DisplayValue, Template, TextPart};
pub use numeric::{Number, NumericKind, Numeric, Promote, Widened};
pub use observable::{
    ChangeListener, Dependencies, Dependency, InvalidationCallback, InvalidationListener,
    Observable, ObservableId, ObservableValue, Subscription, dependency, subscribe_change,
    subscribe_invalidation,
};
pub use operand::{ObservableRef, Operand};
pub use property::{
    BooleanProperty, DoubleProperty, FloatProperty, IntegerProperty, LongProperty,
    ObjectProperty, Property, StringProperty, WeakProperty,
};
pub use scope::BindingScope;

/// Build a dependency list from observable handles.
///
/// # Examples
///
/// ```
/// use rebind_core::{Property, deps};
///
/// let a = Property::new(1);
/// let b = Property::new(2);
/// let list = deps![a, b];
/// assert_eq!(list.len(), 2);
/// ```
#[macro_export]
macro_rules! deps {
    ($($obs:expr),* $(,)?) => {
        ::std::vec![$($crate::observable::dependency(&$obs)),*]
    };
}

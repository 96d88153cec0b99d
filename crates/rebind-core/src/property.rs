#![forbid(unsafe_code)]

//! Mutable leaf observables.
//!
//! A [`Property`] is valid after every read. Setting a different value marks
//! it invalid and notifies listeners, but only on the valid→invalid edge:
//! repeated writes without an intervening read notify once.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::Result;
use crate::listeners::ListenerList;
use crate::observable::{
    ChangeListener, InvalidationListener, Observable, ObservableId, ObservableValue,
};

struct PropertyInner<T> {
    value: RefCell<T>,
    valid: Cell<bool>,
    version: Cell<u64>,
    listeners: ListenerList<T>,
}

/// A shared, mutable value.
///
/// Cloning a `Property` creates a new handle to the **same** value.
pub struct Property<T> {
    inner: Rc<PropertyInner<T>>,
}

pub type BooleanProperty = Property<bool>;
pub type IntegerProperty = Property<i32>;
pub type LongProperty = Property<i64>;
pub type FloatProperty = Property<f32>;
pub type DoubleProperty = Property<f64>;
/// A string that may be absent. Absent compares as empty in the algebra.
pub type StringProperty = Property<Option<String>>;
pub type ObjectProperty<T> = Property<Option<T>>;

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Property<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(PropertyInner {
                value: RefCell::new(value),
                valid: Cell::new(true),
                version: Cell::new(0),
                listeners: ListenerList::default(),
            }),
        }
    }

    /// Read the value (clone). Marks the property valid.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.valid.set(true);
        self.inner.value.borrow().clone()
    }

    /// Borrow the value without cloning. Marks the property valid.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.valid.set(true);
        f(&self.inner.value.borrow())
    }

    /// Store `value`. Equal values are ignored.
    pub fn set(&self, value: T) {
        if *self.inner.value.borrow() == value {
            return;
        }
        *self.inner.value.borrow_mut() = value;
        self.inner.version.set(self.inner.version.get() + 1);
        if self.inner.valid.replace(false) {
            self.inner.listeners.fire(self);
        }
    }

    /// Modify in place; notifies like [`set`](Self::set).
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut next = self.inner.value.borrow().clone();
        f(&mut next);
        self.set(next);
    }

    /// Number of effective writes since creation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.inner.valid.get()
    }

    #[must_use]
    pub fn invalidation_listener_count(&self) -> usize {
        self.inner.listeners.invalidation_count()
    }

    #[must_use]
    pub fn change_listener_count(&self) -> usize {
        self.inner.listeners.change_count()
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakProperty<T> {
        WeakProperty {
            inner: Rc::downgrade(&self.inner),
        }
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + PartialEq + 'static> Property<Option<T>> {
    /// A property holding no value.
    #[must_use]
    pub fn null() -> Self {
        Self::new(None)
    }
}

impl Property<Option<String>> {
    #[must_use]
    pub fn of(text: &str) -> Self {
        Self::new(Some(text.to_owned()))
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &*self.inner.value.borrow())
            .field("valid", &self.inner.valid.get())
            .field("version", &self.inner.version.get())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable for Property<T> {
    fn add_listener(&self, listener: InvalidationListener) {
        self.inner.listeners.add_invalidation(listener);
    }

    fn remove_listener(&self, listener: &InvalidationListener) {
        self.inner.listeners.remove_invalidation(listener);
    }

    fn id(&self) -> ObservableId {
        ObservableId::of(&self.inner)
    }
}

impl<T: Clone + PartialEq + 'static> ObservableValue<T> for Property<T> {
    fn value(&self) -> Result<T> {
        Ok(self.get())
    }

    fn add_change_listener(&self, listener: ChangeListener<T>) {
        self.inner.listeners.add_change(listener, || Ok(self.get()));
    }

    fn remove_change_listener(&self, listener: &ChangeListener<T>) {
        self.inner.listeners.remove_change(listener);
    }
}

/// Non-owning handle to a [`Property`].
pub struct WeakProperty<T> {
    inner: Weak<PropertyInner<T>>,
}

impl<T> Clone for WeakProperty<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> WeakProperty<T> {
    #[must_use]
    pub fn upgrade(&self) -> Option<Property<T>> {
        self.inner.upgrade().map(|inner| Property { inner })
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl<T> fmt::Debug for WeakProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakProperty")
            .field("alive", &self.is_alive())
            .finish()
    }
}

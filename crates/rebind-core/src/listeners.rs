//! Listener bookkeeping shared by properties and bindings.

use std::cell::RefCell;

use crate::observable::{ChangeListener, InvalidationListener, ObservableValue};

#[cfg(feature = "tracing")]
use crate::logging::warn;
#[cfg(not(feature = "tracing"))]
use crate::warn;

/// Invalidation and change listeners of one observable.
///
/// `current` holds the last value change listeners observed. It is only
/// populated while at least one change listener is registered.
pub(crate) struct ListenerList<T> {
    invalidation: RefCell<Vec<InvalidationListener>>,
    change: RefCell<Vec<ChangeListener<T>>>,
    current: RefCell<Option<T>>,
}

impl<T> Default for ListenerList<T> {
    fn default() -> Self {
        Self {
            invalidation: RefCell::new(Vec::new()),
            change: RefCell::new(Vec::new()),
            current: RefCell::new(None),
        }
    }
}

impl<T: Clone + PartialEq> ListenerList<T> {
    pub(crate) fn add_invalidation(&self, listener: InvalidationListener) {
        self.invalidation.borrow_mut().push(listener);
    }

    pub(crate) fn remove_invalidation(&self, listener: &InvalidationListener) {
        let mut list = self.invalidation.borrow_mut();
        if let Some(pos) = list.iter().position(|l| l.ptr_eq(listener)) {
            list.remove(pos);
        }
    }

    /// Register `listener`, capturing the current value if it is the first
    /// change listener.
    ///
    /// `read` runs before any internal borrow is taken, so it may validate
    /// the owning observable.
    pub(crate) fn add_change(
        &self,
        listener: ChangeListener<T>,
        read: impl FnOnce() -> crate::Result<T>,
    ) {
        if self.change.borrow().is_empty() {
            let value = read().ok();
            *self.current.borrow_mut() = value;
        }
        self.change.borrow_mut().push(listener);
    }

    pub(crate) fn remove_change(&self, listener: &ChangeListener<T>) {
        let mut list = self.change.borrow_mut();
        if let Some(pos) = list.iter().position(|l| l.ptr_eq(listener)) {
            list.remove(pos);
        }
        if list.is_empty() {
            self.current.borrow_mut().take();
        }
    }

    pub(crate) fn invalidation_count(&self) -> usize {
        self.invalidation.borrow().len()
    }

    pub(crate) fn change_count(&self) -> usize {
        self.change.borrow().len()
    }

    /// Notify invalidation listeners only.
    pub(crate) fn fire_invalidation<S: ObservableValue<T>>(&self, source: &S) {
        let snapshot = self.invalidation.borrow().clone();
        let mut saw_dead = false;
        for listener in &snapshot {
            if listener.is_alive() {
                listener.invalidated(source);
            } else {
                saw_dead = true;
            }
        }
        if saw_dead {
            self.invalidation.borrow_mut().retain(InvalidationListener::is_alive);
        }
    }

    /// Notify invalidation listeners, then change listeners if the value
    /// actually moved.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub(crate) fn fire<S: ObservableValue<T>>(&self, source: &S) {
        self.fire_invalidation(source);

        let changes = self.change.borrow().clone();
        if changes.is_empty() {
            return;
        }
        match source.value() {
            Ok(new) => {
                let old = self.current.replace(Some(new.clone()));
                if let Some(old) = old
                    && old != new
                {
                    for listener in &changes {
                        listener.changed(source, &old, &new);
                    }
                }
            }
            Err(error) => {
                warn!(
                    message = "listeners.change_read_failed",
                    observable = %source.id(),
                    error = %error
                );
            }
        }
    }
}

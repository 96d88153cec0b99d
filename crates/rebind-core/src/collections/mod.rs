//! Minimal observable collections.
//!
//! A collection is an [`Observable`] whose invalidation listeners fire on
//! every content mutation, plus element-level change events delivered to
//! [`CollectionListener`]s. Collection handles compare by identity.
//!
//! Each kind has a read-only empty placeholder
//! ([`ObservableCollection::read_only_empty`]) that rejects every mutation
//! with [`BindingError::UnsupportedOperation`](crate::BindingError).

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::Result;
use crate::observable::{InvalidationListener, Observable};

mod list;
mod map;
mod set;

pub use list::{ListChange, ObservableList};
pub use map::{MapChange, ObservableMap};
pub use set::{ObservableSet, SetChange};

/// The contract collection bindings consume.
pub trait ObservableCollection: Observable + Clone + PartialEq + 'static {
    type Change: Clone + 'static;

    fn add_collection_listener(&self, listener: CollectionListener<Self::Change>);

    fn remove_collection_listener(&self, listener: &CollectionListener<Self::Change>);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A fresh empty collection that rejects mutation.
    fn read_only_empty() -> Self;

    fn is_read_only(&self) -> bool;

    /// # Errors
    ///
    /// `UnsupportedOperation` on a read-only collection.
    fn clear(&self) -> Result<()>;
}

/// Shared handle to an element-level change callback.
///
/// A listener built with [`owned_by`](Self::owned_by) holds its owner
/// weakly and is pruned once the owner is dropped.
pub struct CollectionListener<C> {
    callback: Rc<dyn Fn(&C)>,
    owner: Option<Weak<dyn Any>>,
}

impl<C> Clone for CollectionListener<C> {
    fn clone(&self) -> Self {
        Self {
            callback: Rc::clone(&self.callback),
            owner: self.owner.clone(),
        }
    }
}

impl<C> CollectionListener<C> {
    pub fn new(f: impl Fn(&C) + 'static) -> Self {
        Self {
            callback: Rc::new(f),
            owner: None,
        }
    }

    /// A listener that calls `f` with its owner while the owner is alive.
    pub fn owned_by<T: 'static>(owner: Weak<T>, f: impl Fn(&T, &C) + 'static) -> Self
    where
        C: 'static,
    {
        let target = Weak::clone(&owner);
        let owner: Weak<dyn Any> = owner;
        Self {
            callback: Rc::new(move |change: &C| {
                if let Some(target) = target.upgrade() {
                    f(&target, change);
                }
            }),
            owner: Some(owner),
        }
    }

    pub fn changed(&self, change: &C) {
        (self.callback)(change);
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.owner.as_ref().is_none_or(|owner| owner.strong_count() > 0)
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.callback), Rc::as_ptr(&other.callback))
    }
}

impl<C> fmt::Debug for CollectionListener<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionListener").finish_non_exhaustive()
    }
}

/// Listener storage shared by the collection kinds.
pub(crate) struct ContentListeners<C> {
    invalidation: RefCell<Vec<InvalidationListener>>,
    collection: RefCell<Vec<CollectionListener<C>>>,
}

impl<C> Default for ContentListeners<C> {
    fn default() -> Self {
        Self {
            invalidation: RefCell::new(Vec::new()),
            collection: RefCell::new(Vec::new()),
        }
    }
}

impl<C> ContentListeners<C> {
    pub(crate) fn add_invalidation(&self, listener: InvalidationListener) {
        self.invalidation.borrow_mut().push(listener);
    }

    pub(crate) fn remove_invalidation(&self, listener: &InvalidationListener) {
        let mut list = self.invalidation.borrow_mut();
        if let Some(pos) = list.iter().position(|l| l.ptr_eq(listener)) {
            list.remove(pos);
        }
    }

    pub(crate) fn add_collection(&self, listener: CollectionListener<C>) {
        self.collection.borrow_mut().push(listener);
    }

    pub(crate) fn remove_collection(&self, listener: &CollectionListener<C>) {
        let mut list = self.collection.borrow_mut();
        if let Some(pos) = list.iter().position(|l| l.ptr_eq(listener)) {
            list.remove(pos);
        }
    }

    pub(crate) fn invalidation_count(&self) -> usize {
        self.invalidation.borrow().len()
    }

    pub(crate) fn collection_count(&self) -> usize {
        self.collection.borrow().len()
    }

    /// Invalidation listeners first, then collection listeners.
    pub(crate) fn fire(&self, source: &dyn Observable, change: &C) {
        self.fire_all(source, std::slice::from_ref(change));
    }

    /// One invalidation for a batch, then every change in order.
    pub(crate) fn fire_all(&self, source: &dyn Observable, changes: &[C]) {
        if changes.is_empty() {
            return;
        }
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
        let listeners = self.collection.borrow().clone();
        let mut saw_dead = false;
        for listener in &listeners {
            if !listener.is_alive() {
                saw_dead = true;
                continue;
            }
            for change in changes {
                listener.changed(change);
            }
        }
        if saw_dead {
            self.collection.borrow_mut().retain(CollectionListener::is_alive);
        }
    }
}

pub(crate) fn read_only(operation: &'static str) -> crate::BindingError {
    crate::BindingError::UnsupportedOperation { operation }
}

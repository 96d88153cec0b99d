use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use indexmap::IndexSet;

use super::{CollectionListener, ContentListeners, ObservableCollection, read_only};
use crate::error::Result;
use crate::observable::{InvalidationListener, Observable, ObservableId};

/// Element-level change of an [`ObservableSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum SetChange<E> {
    Added(E),
    Removed(E),
}

struct SetInner<E> {
    items: RefCell<IndexSet<E>>,
    read_only: bool,
    listeners: ContentListeners<SetChange<E>>,
}

/// An insertion-ordered observable set.
pub struct ObservableSet<E> {
    inner: Rc<SetInner<E>>,
}

impl<E> Clone for ObservableSet<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> PartialEq for ObservableSet<E> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<E: fmt::Debug> fmt::Debug for ObservableSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.inner.items.borrow().iter()).finish()
    }
}

impl<E: Hash + Eq + Clone + 'static> Default for ObservableSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Hash + Eq + Clone + 'static> ObservableSet<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::build(IndexSet::new(), false)
    }

    fn build(items: IndexSet<E>, read_only: bool) -> Self {
        Self {
            inner: Rc::new(SetInner {
                items: RefCell::new(items),
                read_only,
                listeners: ContentListeners::default(),
            }),
        }
    }

    #[must_use]
    pub fn contains(&self, item: &E) -> bool {
        self.inner.items.borrow().contains(item)
    }

    /// Elements in insertion order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<E> {
        self.inner.items.borrow().iter().cloned().collect()
    }

    /// Returns whether the element was newly added.
    ///
    /// # Errors
    ///
    /// `UnsupportedOperation` on a read-only set.
    pub fn insert(&self, item: E) -> Result<bool> {
        self.writable("insert")?;
        let added = self.inner.items.borrow_mut().insert(item.clone());
        if added {
            self.inner.listeners.fire(self, &SetChange::Added(item));
        }
        Ok(added)
    }

    /// Returns whether the element was present.
    ///
    /// # Errors
    ///
    /// `UnsupportedOperation` on a read-only set.
    pub fn remove(&self, item: &E) -> Result<bool> {
        self.writable("remove")?;
        let removed = self.inner.items.borrow_mut().shift_take(item);
        match removed {
            Some(item) => {
                self.inner.listeners.fire(self, &SetChange::Removed(item));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    #[must_use]
    pub fn invalidation_listener_count(&self) -> usize {
        self.inner.listeners.invalidation_count()
    }

    #[must_use]
    pub fn collection_listener_count(&self) -> usize {
        self.inner.listeners.collection_count()
    }

    fn writable(&self, operation: &'static str) -> Result<()> {
        if self.inner.read_only {
            Err(read_only(operation))
        } else {
            Ok(())
        }
    }
}

impl<E: Hash + Eq + Clone + 'static> FromIterator<E> for ObservableSet<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self::build(iter.into_iter().collect(), false)
    }
}

impl<E: Hash + Eq + Clone + 'static> Observable for ObservableSet<E> {
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

impl<E: Hash + Eq + Clone + 'static> ObservableCollection for ObservableSet<E> {
    type Change = SetChange<E>;

    fn add_collection_listener(&self, listener: CollectionListener<Self::Change>) {
        self.inner.listeners.add_collection(listener);
    }

    fn remove_collection_listener(&self, listener: &CollectionListener<Self::Change>) {
        self.inner.listeners.remove_collection(listener);
    }

    fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    fn read_only_empty() -> Self {
        Self::build(IndexSet::new(), true)
    }

    fn is_read_only(&self) -> bool {
        self.inner.read_only
    }

    fn clear(&self) -> Result<()> {
        self.writable("clear")?;
        let removed: Vec<SetChange<E>> = std::mem::take(&mut *self.inner.items.borrow_mut())
            .into_iter()
            .map(SetChange::Removed)
            .collect();
        self.inner.listeners.fire_all(self, &removed);
        Ok(())
    }
}

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::{CollectionListener, ContentListeners, ObservableCollection, read_only};
use crate::error::{BindingError, Result};
use crate::observable::{InvalidationListener, Observable, ObservableId};

/// Element-level change of an [`ObservableList`].
#[derive(Debug, Clone, PartialEq)]
pub enum ListChange<E> {
    Added { index: usize, items: Vec<E> },
    Removed { index: usize, items: Vec<E> },
    Replaced { index: usize, old: E, new: E },
}

struct ListInner<E> {
    items: RefCell<Vec<E>>,
    read_only: bool,
    listeners: ContentListeners<ListChange<E>>,
}

/// A `Vec`-backed observable list.
pub struct ObservableList<E> {
    inner: Rc<ListInner<E>>,
}

impl<E> Clone for ObservableList<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> PartialEq for ObservableList<E> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<E: fmt::Debug> fmt::Debug for ObservableList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.items.borrow().iter()).finish()
    }
}

impl<E: Clone + 'static> Default for ObservableList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone + 'static> ObservableList<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    #[must_use]
    pub fn from_vec(items: Vec<E>) -> Self {
        Self::build(items, false)
    }

    fn build(items: Vec<E>, read_only: bool) -> Self {
        Self {
            inner: Rc::new(ListInner {
                items: RefCell::new(items),
                read_only,
                listeners: ContentListeners::default(),
            }),
        }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<E> {
        self.inner.items.borrow().get(index).cloned()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<E> {
        self.inner.items.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&[E]) -> R) -> R {
        f(&self.inner.items.borrow())
    }

    /// # Errors
    ///
    /// `UnsupportedOperation` on a read-only list.
    pub fn push(&self, item: E) -> Result<()> {
        let index = self.len();
        self.insert(index, item)
    }

    /// # Errors
    ///
    /// `IndexOutOfBounds` if `index > len`, `UnsupportedOperation` on a
    /// read-only list.
    pub fn insert(&self, index: usize, item: E) -> Result<()> {
        self.writable("insert")?;
        {
            let mut items = self.inner.items.borrow_mut();
            if index > items.len() {
                return Err(BindingError::IndexOutOfBounds {
                    index,
                    len: items.len(),
                });
            }
            items.insert(index, item.clone());
        }
        self.emit(&ListChange::Added {
            index,
            items: vec![item],
        });
        Ok(())
    }

    /// # Errors
    ///
    /// `UnsupportedOperation` on a read-only list.
    pub fn extend(&self, items: impl IntoIterator<Item = E>) -> Result<()> {
        self.writable("extend")?;
        let added: Vec<E> = items.into_iter().collect();
        if added.is_empty() {
            return Ok(());
        }
        let index = {
            let mut items = self.inner.items.borrow_mut();
            let index = items.len();
            items.extend(added.iter().cloned());
            index
        };
        self.emit(&ListChange::Added {
            index,
            items: added,
        });
        Ok(())
    }

    /// # Errors
    ///
    /// `IndexOutOfBounds` if `index >= len`, `UnsupportedOperation` on a
    /// read-only list.
    pub fn remove(&self, index: usize) -> Result<E> {
        self.writable("remove")?;
        let removed = {
            let mut items = self.inner.items.borrow_mut();
            if index >= items.len() {
                return Err(BindingError::IndexOutOfBounds {
                    index,
                    len: items.len(),
                });
            }
            items.remove(index)
        };
        self.emit(&ListChange::Removed {
            index,
            items: vec![removed.clone()],
        });
        Ok(removed)
    }

    /// Replace the element at `index`, returning the previous one.
    ///
    /// # Errors
    ///
    /// `IndexOutOfBounds` if `index >= len`, `UnsupportedOperation` on a
    /// read-only list.
    pub fn set(&self, index: usize, item: E) -> Result<E> {
        self.writable("set")?;
        let old = {
            let mut items = self.inner.items.borrow_mut();
            let len = items.len();
            let slot = items
                .get_mut(index)
                .ok_or(BindingError::IndexOutOfBounds { index, len })?;
            std::mem::replace(slot, item.clone())
        };
        self.emit(&ListChange::Replaced {
            index,
            old: old.clone(),
            new: item,
        });
        Ok(old)
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

    fn emit(&self, change: &ListChange<E>) {
        self.inner.listeners.fire(self, change);
    }
}

impl<E: Clone + PartialEq + 'static> ObservableList<E> {
    #[must_use]
    pub fn contains(&self, item: &E) -> bool {
        self.inner.items.borrow().contains(item)
    }

    #[must_use]
    pub fn index_of(&self, item: &E) -> Option<usize> {
        self.inner.items.borrow().iter().position(|e| e == item)
    }
}

impl<E: Clone + 'static> Observable for ObservableList<E> {
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

impl<E: Clone + 'static> ObservableCollection for ObservableList<E> {
    type Change = ListChange<E>;

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
        Self::build(Vec::new(), true)
    }

    fn is_read_only(&self) -> bool {
        self.inner.read_only
    }

    fn clear(&self) -> Result<()> {
        self.writable("clear")?;
        let removed = std::mem::take(&mut *self.inner.items.borrow_mut());
        if !removed.is_empty() {
            self.emit(&ListChange::Removed {
                index: 0,
                items: removed,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn mutations_emit_element_changes() {
        let list = ObservableList::from_vec(vec![1, 2]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        list.add_collection_listener(CollectionListener::new(move |c: &ListChange<i32>| {
            sink.borrow_mut().push(c.clone());
        }));
        list.push(3).ok();
        list.set(0, 9).ok();
        list.remove(1).ok();
        assert_eq!(
            *seen.borrow(),
            vec![
                ListChange::Added { index: 2, items: vec![3] },
                ListChange::Replaced { index: 0, old: 1, new: 9 },
                ListChange::Removed { index: 1, items: vec![2] },
            ]
        );
        assert_eq!(list.to_vec(), vec![9, 3]);
    }

    #[test]
    fn every_mutation_fires_invalidation() {
        let list = ObservableList::new();
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        list.add_listener(InvalidationListener::new(move |_| sink.set(sink.get() + 1)));
        list.push("a").ok();
        list.push("b").ok();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn out_of_range_is_reported() {
        let list = ObservableList::from_vec(vec![1]);
        assert!(matches!(
            list.remove(3),
            Err(BindingError::IndexOutOfBounds { index: 3, len: 1 })
        ));
        assert!(list.insert(1, 2).is_ok());
        assert!(list.set(5, 0).is_err());
    }

    #[test]
    fn placeholder_rejects_writes() {
        let empty = ObservableList::<i32>::read_only_empty();
        assert!(empty.is_read_only());
        assert!(matches!(
            empty.push(1),
            Err(BindingError::UnsupportedOperation { operation: "insert" })
        ));
        assert!(empty.clear().is_err());
        assert!(empty.is_empty());
    }

    #[test]
    fn equality_is_identity() {
        let a = ObservableList::from_vec(vec![1]);
        let b = ObservableList::from_vec(vec![1]);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}

use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use indexmap::IndexMap;

use super::{CollectionListener, ContentListeners, ObservableCollection, read_only};
use crate::error::Result;
use crate::observable::{InvalidationListener, Observable, ObservableId};

/// Entry-level change of an [`ObservableMap`].
#[derive(Debug, Clone, PartialEq)]
pub enum MapChange<K, V> {
    Added { key: K, value: V },
    Removed { key: K, value: V },
    Replaced { key: K, old: V, new: V },
}

struct MapInner<K, V> {
    entries: RefCell<IndexMap<K, V>>,
    read_only: bool,
    listeners: ContentListeners<MapChange<K, V>>,
}

/// An insertion-ordered observable map.
pub struct ObservableMap<K, V> {
    inner: Rc<MapInner<K, V>>,
}

impl<K, V> Clone for ObservableMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K, V> PartialEq for ObservableMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ObservableMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.inner.entries.borrow().iter()).finish()
    }
}

impl<K, V> Default for ObservableMap<K, V>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ObservableMap<K, V>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self::build(IndexMap::new(), false)
    }

    fn build(entries: IndexMap<K, V>, read_only: bool) -> Self {
        Self {
            inner: Rc::new(MapInner {
                entries: RefCell::new(entries),
                read_only,
                listeners: ContentListeners::default(),
            }),
        }
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.entries.borrow().get(key).cloned()
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.entries.borrow().contains_key(key)
    }

    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.inner.entries.borrow().keys().cloned().collect()
    }

    #[must_use]
    pub fn values(&self) -> Vec<V> {
        self.inner.entries.borrow().values().cloned().collect()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<(K, V)> {
        self.inner
            .entries
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Returns the previous value for `key`.
    ///
    /// # Errors
    ///
    /// `UnsupportedOperation` on a read-only map.
    pub fn insert(&self, key: K, value: V) -> Result<Option<V>> {
        self.writable("insert")?;
        let old = self
            .inner
            .entries
            .borrow_mut()
            .insert(key.clone(), value.clone());
        let change = match old.clone() {
            Some(old) => MapChange::Replaced {
                key,
                old,
                new: value,
            },
            None => MapChange::Added { key, value },
        };
        self.inner.listeners.fire(self, &change);
        Ok(old)
    }

    /// # Errors
    ///
    /// `UnsupportedOperation` on a read-only map.
    pub fn remove(&self, key: &K) -> Result<Option<V>> {
        self.writable("remove")?;
        let removed = self.inner.entries.borrow_mut().shift_remove_entry(key);
        Ok(removed.map(|(key, value)| {
            let change = MapChange::Removed {
                key,
                value: value.clone(),
            };
            self.inner.listeners.fire(self, &change);
            value
        }))
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

impl<K, V> FromIterator<(K, V)> for ObservableMap<K, V>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::build(iter.into_iter().collect(), false)
    }
}

impl<K, V> Observable for ObservableMap<K, V>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
{
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

impl<K, V> ObservableCollection for ObservableMap<K, V>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
{
    type Change = MapChange<K, V>;

    fn add_collection_listener(&self, listener: CollectionListener<Self::Change>) {
        self.inner.listeners.add_collection(listener);
    }

    fn remove_collection_listener(&self, listener: &CollectionListener<Self::Change>) {
        self.inner.listeners.remove_collection(listener);
    }

    fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    fn read_only_empty() -> Self {
        Self::build(IndexMap::new(), true)
    }

    fn is_read_only(&self) -> bool {
        self.inner.read_only
    }

    fn clear(&self) -> Result<()> {
        self.writable("clear")?;
        let removed: Vec<MapChange<K, V>> = std::mem::take(&mut *self.inner.entries.borrow_mut())
            .into_iter()
            .map(|(key, value)| MapChange::Removed { key, value })
            .collect();
        self.inner.listeners.fire_all(self, &removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_reports_added_then_replaced() {
        let map = ObservableMap::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        map.add_collection_listener(CollectionListener::new(
            move |c: &MapChange<&str, i32>| sink.borrow_mut().push(c.clone()),
        ));
        assert_eq!(map.insert("k", 1).ok(), Some(None));
        assert_eq!(map.insert("k", 2).ok(), Some(Some(1)));
        assert_eq!(map.remove(&"k").ok(), Some(Some(2)));
        assert_eq!(
            *seen.borrow(),
            vec![
                MapChange::Added { key: "k", value: 1 },
                MapChange::Replaced { key: "k", old: 1, new: 2 },
                MapChange::Removed { key: "k", value: 2 },
            ]
        );
    }

    #[test]
    fn placeholder_rejects_writes() {
        let empty = ObservableMap::<String, i32>::read_only_empty();
        assert!(empty.insert("a".into(), 1).is_err());
        assert!(empty.remove(&"a".to_string()).is_err());
        assert_eq!(empty.get(&"a".to_string()), None);
    }

    #[test]
    fn clear_invalidates_once() {
        let map = ObservableMap::new();
        map.insert("a", 1).ok();
        map.insert("b", 2).ok();
        let hits = Rc::new(std::cell::Cell::new(0));
        let counter = Rc::clone(&hits);
        map.add_listener(InvalidationListener::new(move |_| counter.set(counter.get() + 1)));
        let removed = Rc::new(std::cell::Cell::new(0));
        let sink = Rc::clone(&removed);
        map.add_collection_listener(CollectionListener::new(
            move |c: &MapChange<&str, i32>| {
                if matches!(c, MapChange::Removed { .. }) {
                    sink.set(sink.get() + 1);
                }
            },
        ));

        map.clear().ok();
        assert_eq!(hits.get(), 1);
        assert_eq!(removed.get(), 2);
        assert!(map.is_empty());
    }
}

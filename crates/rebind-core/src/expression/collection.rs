//! Bindings whose value is a collection.
//!
//! A [`CollectionBinding`] caches a collection reference like any binding,
//! and additionally follows the *content* of the collection it currently
//! holds: element-level events are forwarded to its own collection
//! listeners, and its invalidation listeners fire on every content change.
//! The cache stays valid across content changes because the reference did
//! not change.
//!
//! When the reference is absent, reads and writes go to a read-only empty
//! placeholder, so writes fail with `UnsupportedOperation`.

use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use crate::binding::{Binding, Disposable, WeakBinding};
use crate::bindings::collection as ops;
use crate::collections::{
    CollectionListener, ObservableCollection, ObservableList, ObservableMap, ObservableSet,
};
use crate::error::Result;
use crate::observable::{
    ChangeListener, Dependencies, Dependency, InvalidationCallback, InvalidationListener,
    Observable, ObservableId, ObservableValue, dependency,
};
use crate::property::Property;

pub type ListBinding<E> = CollectionBinding<ObservableList<E>>;
pub type SetBinding<E> = CollectionBinding<ObservableSet<E>>;
pub type MapBinding<K, V> = CollectionBinding<ObservableMap<K, V>>;

/// Follows the content of the collection currently held by a binding.
struct ContentTracker<C: ObservableCollection> {
    binding: RefCell<Option<WeakBinding<Option<C>>>>,
    tracked: RefCell<Option<C>>,
    on_content: InvalidationListener,
    on_change: CollectionListener<C::Change>,
    listeners: RefCell<Vec<CollectionListener<C::Change>>>,
}

/// Content observer registered on the tracked collection. Dead once the
/// tracker is dropped.
struct ContentObserver<C: ObservableCollection> {
    tracker: Weak<ContentTracker<C>>,
}

impl<C: ObservableCollection> InvalidationCallback for ContentObserver<C> {
    fn invalidated(&self, _observable: &dyn Observable) {
        if let Some(tracker) = self.tracker.upgrade() {
            tracker.content_invalidated();
        }
    }

    fn is_alive(&self) -> bool {
        self.tracker.strong_count() > 0
    }
}

impl<C: ObservableCollection> ContentTracker<C> {
    fn new() -> Rc<Self> {
        Rc::new_cyclic(|me: &Weak<Self>| Self {
            binding: RefCell::new(None),
            tracked: RefCell::new(None),
            on_content: InvalidationListener::from_callback(Rc::new(ContentObserver {
                tracker: Weak::clone(me),
            })),
            on_change: CollectionListener::owned_by(Weak::clone(me), |tracker, event| {
                tracker.forward(event);
            }),
            listeners: RefCell::new(Vec::new()),
        })
    }

    fn track(&self, collection: Option<&C>) {
        let same = self.tracked.borrow().as_ref() == collection;
        if same {
            return;
        }
        self.untrack();
        if let Some(collection) = collection {
            collection.add_listener(self.on_content.clone());
            collection.add_collection_listener(self.on_change.clone());
            *self.tracked.borrow_mut() = Some(collection.clone());
        }
    }

    fn untrack(&self) {
        let previous = self.tracked.borrow_mut().take();
        if let Some(collection) = previous {
            collection.remove_listener(&self.on_content);
            collection.remove_collection_listener(&self.on_change);
        }
    }

    fn content_invalidated(&self) {
        let binding = self.binding.borrow().as_ref().and_then(WeakBinding::upgrade);
        if let Some(binding) = binding {
            binding.notify_content_changed();
        }
    }

    fn forward(&self, event: &C::Change) {
        let snapshot = self.listeners.borrow().clone();
        for listener in &snapshot {
            listener.changed(event);
        }
    }
}

/// A binding holding an optional collection. See the module docs.
pub struct CollectionBinding<C: ObservableCollection> {
    binding: Binding<Option<C>>,
    tracker: Rc<ContentTracker<C>>,
}

impl<C: ObservableCollection> Clone for CollectionBinding<C> {
    fn clone(&self) -> Self {
        Self {
            binding: self.binding.clone(),
            tracker: Rc::clone(&self.tracker),
        }
    }
}

impl<C: ObservableCollection + fmt::Debug> fmt::Debug for CollectionBinding<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionBinding")
            .field("binding", &self.binding)
            .field("tracked", &*self.tracker.tracked.borrow())
            .finish()
    }
}

impl<C: ObservableCollection> CollectionBinding<C> {
    pub fn new(
        compute: impl Fn() -> Result<Option<C>> + 'static,
        dependencies: impl IntoIterator<Item = Dependency>,
    ) -> Self {
        let tracker = ContentTracker::<C>::new();
        let weak = Rc::downgrade(&tracker);
        let binding = Binding::new(move || {
            let value = compute()?;
            if let Some(tracker) = weak.upgrade() {
                tracker.track(value.as_ref());
            }
            Ok(value)
        });
        *tracker.binding.borrow_mut() = Some(binding.downgrade());
        {
            let tracker = Rc::downgrade(&tracker);
            binding.on_invalidating(move || {
                if let Some(tracker) = tracker.upgrade() {
                    tracker.untrack();
                }
            });
        }
        {
            let tracker = Rc::downgrade(&tracker);
            binding.on_dispose(move || {
                if let Some(tracker) = tracker.upgrade() {
                    tracker.untrack();
                }
            });
        }
        binding.bind(dependencies);
        Self { binding, tracker }
    }

    /// Follow any observable optional collection.
    pub fn wrap<O>(source: &O) -> Self
    where
        O: ObservableValue<Option<C>> + Clone + 'static,
    {
        let dep = dependency(source);
        let source = source.clone();
        Self::new(move || source.value(), [dep])
    }

    /// A binding that always holds `collection`. It has no dependencies;
    /// content changes reach it through content tracking.
    pub fn of(collection: &C) -> Self {
        let collection = collection.clone();
        Self::new(move || Ok(Some(collection.clone())), [])
    }

    pub fn get(&self) -> Result<Option<C>> {
        self.binding.get()
    }

    /// The held collection, or the read-only empty placeholder.
    pub fn current_or_empty(&self) -> Result<C> {
        Ok(self.get()?.unwrap_or_else(C::read_only_empty))
    }

    #[must_use]
    pub fn binding(&self) -> &Binding<Option<C>> {
        &self.binding
    }

    pub fn invalidate(&self) {
        self.binding.invalidate();
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.binding.is_valid()
    }

    #[must_use]
    pub fn dependencies(&self) -> Dependencies {
        self.binding.dependencies()
    }

    pub fn dispose(&self) {
        self.binding.dispose();
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.binding.is_disposed()
    }

    pub fn add_collection_listener(&self, listener: CollectionListener<C::Change>) {
        self.tracker.listeners.borrow_mut().push(listener);
    }

    pub fn remove_collection_listener(&self, listener: &CollectionListener<C::Change>) {
        let mut list = self.tracker.listeners.borrow_mut();
        if let Some(pos) = list.iter().position(|l| l.ptr_eq(listener)) {
            list.remove(pos);
        }
    }

    #[must_use]
    pub fn collection_listener_count(&self) -> usize {
        self.tracker.listeners.borrow().len()
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.current_or_empty()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.current_or_empty()?.is_empty())
    }

    /// # Errors
    ///
    /// `UnsupportedOperation` when the reference is absent.
    pub fn clear(&self) -> Result<()> {
        self.current_or_empty()?.clear()
    }

    #[must_use]
    pub fn size_binding(&self) -> Binding<i32> {
        ops::size(self)
    }

    #[must_use]
    pub fn empty_binding(&self) -> Binding<bool> {
        ops::is_empty(self)
    }

    #[must_use]
    pub fn not_empty_binding(&self) -> Binding<bool> {
        ops::is_not_empty(self)
    }
}

impl<E: Clone + 'static> CollectionBinding<ObservableList<E>> {
    pub fn item(&self, index: usize) -> Result<Option<E>> {
        Ok(self.current_or_empty()?.get(index))
    }

    pub fn to_vec(&self) -> Result<Vec<E>> {
        Ok(self.current_or_empty()?.to_vec())
    }

    pub fn push(&self, item: E) -> Result<()> {
        self.current_or_empty()?.push(item)
    }

    pub fn insert(&self, index: usize, item: E) -> Result<()> {
        self.current_or_empty()?.insert(index, item)
    }

    pub fn remove_at(&self, index: usize) -> Result<E> {
        self.current_or_empty()?.remove(index)
    }

    pub fn set_item(&self, index: usize, item: E) -> Result<E> {
        self.current_or_empty()?.set(index, item)
    }
}

impl<E: Clone + PartialEq + 'static> CollectionBinding<ObservableList<E>> {
    pub fn contains(&self, item: &E) -> Result<bool> {
        Ok(self.current_or_empty()?.contains(item))
    }
}

impl<E: Hash + Eq + Clone + 'static> CollectionBinding<ObservableSet<E>> {
    pub fn contains(&self, item: &E) -> Result<bool> {
        Ok(self.current_or_empty()?.contains(item))
    }

    pub fn insert(&self, item: E) -> Result<bool> {
        self.current_or_empty()?.insert(item)
    }

    pub fn remove(&self, item: &E) -> Result<bool> {
        self.current_or_empty()?.remove(item)
    }

    pub fn to_vec(&self) -> Result<Vec<E>> {
        Ok(self.current_or_empty()?.to_vec())
    }
}

impl<K, V> CollectionBinding<ObservableMap<K, V>>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
{
    pub fn get_value(&self, key: &K) -> Result<Option<V>> {
        Ok(self.current_or_empty()?.get(key))
    }

    pub fn contains_key(&self, key: &K) -> Result<bool> {
        Ok(self.current_or_empty()?.contains_key(key))
    }

    pub fn insert(&self, key: K, value: V) -> Result<Option<V>> {
        self.current_or_empty()?.insert(key, value)
    }

    pub fn remove(&self, key: &K) -> Result<Option<V>> {
        self.current_or_empty()?.remove(key)
    }

    pub fn keys(&self) -> Result<Vec<K>> {
        Ok(self.current_or_empty()?.keys())
    }

    pub fn values(&self) -> Result<Vec<V>> {
        Ok(self.current_or_empty()?.values())
    }
}

impl<C: ObservableCollection> Observable for CollectionBinding<C> {
    fn add_listener(&self, listener: InvalidationListener) {
        self.binding.add_listener(listener);
    }

    fn remove_listener(&self, listener: &InvalidationListener) {
        self.binding.remove_listener(listener);
    }

    fn id(&self) -> ObservableId {
        self.binding.id()
    }
}

impl<C: ObservableCollection> ObservableValue<Option<C>> for CollectionBinding<C> {
    fn value(&self) -> Result<Option<C>> {
        self.binding.get()
    }

    fn add_change_listener(&self, listener: ChangeListener<Option<C>>) {
        self.binding.add_change_listener(listener);
    }

    fn remove_change_listener(&self, listener: &ChangeListener<Option<C>>) {
        self.binding.remove_change_listener(listener);
    }
}

impl<C: ObservableCollection> Disposable for CollectionBinding<C> {
    fn dispose(&self) {
        self.binding.dispose();
    }

    fn is_disposed(&self) -> bool {
        self.binding.is_disposed()
    }
}

/// Conversion into a collection binding.
///
/// Identity for an existing [`CollectionBinding`]; any other optional
/// collection observable is wrapped.
pub trait AsCollectionBinding<C: ObservableCollection> {
    fn as_collection_binding(&self) -> CollectionBinding<C>;
}

impl<C: ObservableCollection> AsCollectionBinding<C> for CollectionBinding<C> {
    fn as_collection_binding(&self) -> CollectionBinding<C> {
        self.clone()
    }
}

impl<C: ObservableCollection> AsCollectionBinding<C> for Binding<Option<C>> {
    fn as_collection_binding(&self) -> CollectionBinding<C> {
        CollectionBinding::wrap(self)
    }
}

impl<C: ObservableCollection> AsCollectionBinding<C> for Property<Option<C>> {
    fn as_collection_binding(&self) -> CollectionBinding<C> {
        CollectionBinding::wrap(self)
    }
}

pub fn list_expression<E, S>(source: &S) -> ListBinding<E>
where
    E: Clone + 'static,
    S: AsCollectionBinding<ObservableList<E>>,
{
    source.as_collection_binding()
}

pub fn set_expression<E, S>(source: &S) -> SetBinding<E>
where
    E: Hash + Eq + Clone + 'static,
    S: AsCollectionBinding<ObservableSet<E>>,
{
    source.as_collection_binding()
}

pub fn map_expression<K, V, S>(source: &S) -> MapBinding<K, V>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
    S: AsCollectionBinding<ObservableMap<K, V>>,
{
    source.as_collection_binding()
}

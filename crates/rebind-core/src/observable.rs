#![forbid(unsafe_code)]

//! Observable contracts and listener handles.
//!
//! An [`Observable`] notifies [`InvalidationListener`]s when its state goes
//! stale. An [`ObservableValue`] additionally exposes a current value and
//! notifies [`ChangeListener`]s with the old and new value.
//!
//! Listener handles compare by identity (pointer equality), so removing a
//! listener requires the handle (or a clone of it) that was added.
//!
//! # Weak listeners
//!
//! A listener may report itself dead through
//! [`InvalidationCallback::is_alive`]. Observables skip dead listeners and
//! prune them lazily during the next notification, so a binding that was
//! dropped without `dispose()` does not stay reachable forever.

use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::Result;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Identity of an observable, derived from the address of its shared state.
///
/// Two handles to the same observable have the same id. Ids may be reused
/// after the observable is dropped.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObservableId(usize);

impl ObservableId {
    /// Id of the value behind `rc`.
    #[must_use]
    pub fn of<T: ?Sized>(rc: &Rc<T>) -> Self {
        Self(Rc::as_ptr(rc).cast::<()>() as usize)
    }

    #[must_use]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Debug for ObservableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObservableId(#{:x})", self.0)
    }
}

impl fmt::Display for ObservableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// Something that can tell listeners its state became stale.
pub trait Observable {
    fn add_listener(&self, listener: InvalidationListener);

    /// Remove the first registration of `listener`. Unknown listeners are
    /// ignored.
    fn remove_listener(&self, listener: &InvalidationListener);

    fn id(&self) -> ObservableId;
}

/// An [`Observable`] with a current value of type `T`.
pub trait ObservableValue<T>: Observable {
    /// Current value. Derived values may fail to evaluate.
    fn value(&self) -> Result<T>;

    fn add_change_listener(&self, listener: ChangeListener<T>);

    fn remove_change_listener(&self, listener: &ChangeListener<T>);
}

// ---------------------------------------------------------------------------
// Invalidation listeners
// ---------------------------------------------------------------------------

/// Receiver side of an invalidation listener.
pub trait InvalidationCallback {
    fn invalidated(&self, observable: &dyn Observable);

    /// Dead callbacks are skipped and pruned by the observable.
    fn is_alive(&self) -> bool {
        true
    }
}

struct FnCallback<F>(F);

impl<F: Fn(&dyn Observable)> InvalidationCallback for FnCallback<F> {
    fn invalidated(&self, observable: &dyn Observable) {
        (self.0)(observable);
    }
}

/// Non-owning wrapper: alive only while the target is.
struct WeakCallback<C>(Weak<C>);

impl<C: InvalidationCallback> InvalidationCallback for WeakCallback<C> {
    fn invalidated(&self, observable: &dyn Observable) {
        if let Some(target) = self.0.upgrade() {
            target.invalidated(observable);
        }
    }

    fn is_alive(&self) -> bool {
        self.0.upgrade().is_some_and(|target| target.is_alive())
    }
}

/// Shared handle to an invalidation callback.
#[derive(Clone)]
pub struct InvalidationListener {
    callback: Rc<dyn InvalidationCallback>,
}

impl InvalidationListener {
    pub fn new(f: impl Fn(&dyn Observable) + 'static) -> Self {
        Self {
            callback: Rc::new(FnCallback(f)),
        }
    }

    pub fn from_callback<C: InvalidationCallback + 'static>(callback: Rc<C>) -> Self {
        Self { callback }
    }

    /// A listener that does not keep `callback` alive.
    ///
    /// Once the last strong reference to `callback` is gone the listener
    /// reports dead and is pruned by the observable holding it.
    pub fn weak<C: InvalidationCallback + 'static>(callback: &Rc<C>) -> Self {
        Self {
            callback: Rc::new(WeakCallback(Rc::downgrade(callback))),
        }
    }

    pub fn invalidated(&self, observable: &dyn Observable) {
        self.callback.invalidated(observable);
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.callback.is_alive()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.callback), Rc::as_ptr(&other.callback))
    }
}

impl PartialEq for InvalidationListener {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for InvalidationListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvalidationListener")
            .field("alive", &self.is_alive())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Change listeners
// ---------------------------------------------------------------------------

type ChangeFn<T> = dyn Fn(&dyn ObservableValue<T>, &T, &T);

/// Shared handle to a `(observable, old, new)` callback.
pub struct ChangeListener<T> {
    callback: Rc<ChangeFn<T>>,
}

impl<T> Clone for ChangeListener<T> {
    fn clone(&self) -> Self {
        Self {
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<T> ChangeListener<T> {
    pub fn new(f: impl Fn(&dyn ObservableValue<T>, &T, &T) + 'static) -> Self {
        Self {
            callback: Rc::new(f),
        }
    }

    pub fn changed(&self, observable: &dyn ObservableValue<T>, old: &T, new: &T) {
        (self.callback)(observable, old, new);
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.callback), Rc::as_ptr(&other.callback))
    }
}

impl<T> PartialEq for ChangeListener<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> fmt::Debug for ChangeListener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeListener").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Dependencies
// ---------------------------------------------------------------------------

/// Type-erased handle to an observable a binding depends on.
pub type Dependency = Rc<dyn Observable>;

/// Erase an observable handle into a [`Dependency`].
pub fn dependency<O: Observable + Clone + 'static>(observable: &O) -> Dependency {
    Rc::new(observable.clone())
}

/// Immutable, ordered view of a binding's dependencies.
///
/// Duplicates are kept; order is registration order.
#[derive(Clone, Default)]
pub enum Dependencies {
    #[default]
    None,
    One(Dependency),
    Many(Rc<[Dependency]>),
}

impl Dependencies {
    #[must_use]
    pub fn from_vec(mut deps: Vec<Dependency>) -> Self {
        match deps.len() {
            0 => Self::None,
            1 => Self::One(deps.remove(0)),
            _ => Self::Many(deps.into()),
        }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Dependency] {
        match self {
            Self::None => &[],
            Self::One(dep) => std::slice::from_ref(dep),
            Self::Many(deps) => deps,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dependency> {
        self.as_slice().iter()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<ObservableId> {
        self.iter().map(|dep| dep.id()).collect()
    }

    #[must_use]
    pub fn contains(&self, id: ObservableId) -> bool {
        self.iter().any(|dep| dep.id() == id)
    }

    pub(crate) fn to_vec(&self) -> Vec<Dependency> {
        self.as_slice().to_vec()
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

impl<'a> IntoIterator for &'a Dependencies {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// RAII guard that removes a listener when dropped.
///
/// The guard holds the observable handle it was created from, keeping that
/// observable alive for as long as the subscription exists.
#[must_use = "dropping a Subscription removes its listener immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Keep the listener registered for the observable's whole lifetime.
    pub fn detach(mut self) {
        self.release = None;
    }

    /// Whether the listener is still registered through this guard.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Register an invalidation callback, removed when the guard drops.
pub fn subscribe_invalidation<O>(source: &O, f: impl Fn(&dyn Observable) + 'static) -> Subscription
where
    O: Observable + Clone + 'static,
{
    let listener = InvalidationListener::new(f);
    source.add_listener(listener.clone());
    let source = source.clone();
    Subscription::new(move || source.remove_listener(&listener))
}

/// Register an `(old, new)` callback, removed when the guard drops.
pub fn subscribe_change<T, O>(source: &O, f: impl Fn(&T, &T) + 'static) -> Subscription
where
    T: 'static,
    O: ObservableValue<T> + Clone + 'static,
{
    let listener = ChangeListener::new(move |_: &dyn ObservableValue<T>, old: &T, new: &T| {
        f(old, new);
    });
    source.add_change_listener(listener.clone());
    let source = source.clone();
    Subscription::new(move || source.remove_change_listener(&listener))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counter(Cell<u32>);

    impl InvalidationCallback for Counter {
        fn invalidated(&self, _observable: &dyn Observable) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn listener_identity_is_by_pointer() {
        let a = InvalidationListener::new(|_| {});
        let b = InvalidationListener::new(|_| {});
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn weak_listener_dies_with_target() {
        let target = Rc::new(Counter(Cell::new(0)));
        let listener = InvalidationListener::weak(&target);
        assert!(listener.is_alive());
        drop(target);
        assert!(!listener.is_alive());
    }

    #[test]
    fn dependencies_representation_follows_length() {
        let p = crate::property::Property::new(1);
        assert!(matches!(Dependencies::from_vec(vec![]), Dependencies::None));
        assert!(matches!(
            Dependencies::from_vec(vec![dependency(&p)]),
            Dependencies::One(_)
        ));
        let many = Dependencies::from_vec(vec![dependency(&p), dependency(&p)]);
        assert!(matches!(many, Dependencies::Many(_)));
        assert_eq!(many.ids(), vec![p.id(), p.id()]);
    }

    #[test]
    fn subscription_drop_removes_listener() {
        let p = crate::property::Property::new(0);
        let sub = subscribe_invalidation(&p, |_| {});
        assert_eq!(p.invalidation_listener_count(), 1);
        drop(sub);
        assert_eq!(p.invalidation_listener_count(), 0);
    }

    #[test]
    fn detached_subscription_keeps_listener() {
        let p = crate::property::Property::new(0);
        subscribe_invalidation(&p, |_| {}).detach();
        assert_eq!(p.invalidation_listener_count(), 1);
    }

    #[test]
    fn id_display_is_hex() {
        assert_eq!(ObservableId::from_raw(255).to_string(), "#ff");
    }
}

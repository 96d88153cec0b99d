#![forbid(unsafe_code)]

//! Lazy, caching derived values.
//!
//! # Design
//!
//! [`Binding<T>`] wraps a compute closure and its cached result in shared,
//! reference-counted storage. A single [`DependencyObserver`] per binding is
//! registered on every dependency; when any of them invalidates, the binding
//! drops its cache and notifies its own listeners. The next
//! [`get()`](Binding::get) recomputes.
//!
//! # Invariants
//!
//! 1. While `is_valid()` is true the cache equals what the compute closure
//!    would return now.
//! 2. Invalidating an invalid binding is a no-op, so listeners fire at most
//!    once per valid→invalid edge.
//! 3. The binding is registered on exactly the dependencies of its last
//!    `bind`; `dispose` removes all of them.
//! 4. `version()` increments by exactly 1 per successful recomputation.
//!
//! # Failure Modes
//!
//! - **Compute fails**: the error is attributed to this binding and
//!   returned from `get()`. The binding stays invalid, so the next `get()`
//!   runs the closure again.
//! - **All handles dropped without `dispose`**: the observer registered on
//!   each dependency holds only a `Weak` reference. It reports dead and is
//!   pruned on the dependency's next notification.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::Result;
use crate::listeners::ListenerList;
use crate::observable::{
    ChangeListener, Dependencies, Dependency, InvalidationCallback, InvalidationListener,
    Observable, ObservableId, ObservableValue, dependency,
};

#[cfg(feature = "tracing")]
use crate::logging::{debug, trace};
#[cfg(not(feature = "tracing"))]
use crate::{debug, trace};

/// Something that holds listener registrations and can release them.
pub trait Disposable {
    /// Release every registration. Idempotent.
    fn dispose(&self);

    fn is_disposed(&self) -> bool;
}

pub(crate) struct BindingInner<T> {
    compute: Box<dyn Fn() -> Result<T>>,
    valid: Cell<bool>,
    cached: RefCell<Option<T>>,
    version: Cell<u64>,
    listeners: ListenerList<T>,
    dependencies: RefCell<Dependencies>,
    /// Created on first `bind`; shared by every dependency.
    observer: RefCell<Option<InvalidationListener>>,
    invalidating: RefCell<Vec<Rc<dyn Fn()>>>,
    disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
    disposed: Cell<bool>,
}

/// A lazily evaluated, memoized value derived from its dependencies.
///
/// Cloning a `Binding` creates a new handle to the **same** state.
pub struct Binding<T> {
    inner: Rc<BindingInner<T>>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("id", &ObservableId::of(&self.inner))
            .field("valid", &self.inner.valid.get())
            .field("cached", &*self.inner.cached.borrow())
            .field("version", &self.inner.version.get())
            .field("dependencies", &*self.inner.dependencies.borrow())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Binding<T> {
    /// A binding with no dependencies. Call [`bind`](Self::bind) to attach
    /// some, or [`invalidate`](Self::invalidate) to force recomputation.
    pub fn new(compute: impl Fn() -> Result<T> + 'static) -> Self {
        Self {
            inner: Rc::new(BindingInner {
                compute: Box::new(compute),
                valid: Cell::new(false),
                cached: RefCell::new(None),
                version: Cell::new(0),
                listeners: ListenerList::default(),
                dependencies: RefCell::new(Dependencies::None),
                observer: RefCell::new(None),
                invalidating: RefCell::new(Vec::new()),
                disposers: RefCell::new(Vec::new()),
                disposed: Cell::new(false),
            }),
        }
    }

    /// The single construction path for derived values: a compute closure
    /// plus the observables it reads.
    pub fn derived(
        compute: impl Fn() -> Result<T> + 'static,
        dependencies: impl IntoIterator<Item = Dependency>,
    ) -> Self {
        let binding = Self::new(compute);
        binding.bind(dependencies);
        binding
    }

    /// A one-dependency binding that reads through to `source`.
    pub fn mirror<O>(source: &O) -> Self
    where
        O: ObservableValue<T> + Clone + 'static,
    {
        let dep = dependency(source);
        let source = source.clone();
        Self::derived(move || source.value(), [dep])
    }

    /// Register on `dependencies`, replacing any earlier registration.
    pub fn bind(&self, dependencies: impl IntoIterator<Item = Dependency>) {
        let next: Vec<Dependency> = dependencies.into_iter().collect();
        let previous = self.inner.dependencies.replace(Dependencies::None);
        let observer = self.observer();
        for dep in &previous {
            dep.remove_listener(&observer);
        }
        for dep in &next {
            dep.add_listener(observer.clone());
        }
        *self.inner.dependencies.borrow_mut() = Dependencies::from_vec(next);
        self.invalidate();
    }

    /// Remove the registration on each of `dependencies`.
    ///
    /// Each entry removes one matching dependency, so a duplicate bound
    /// twice needs to be passed twice. Unknown entries are ignored.
    pub fn unbind(&self, dependencies: &[Dependency]) {
        let Some(observer) = self.inner.observer.borrow().clone() else {
            return;
        };
        let mut remaining = self.inner.dependencies.borrow().to_vec();
        for dep in dependencies {
            if let Some(pos) = remaining.iter().position(|d| d.id() == dep.id()) {
                remaining.remove(pos).remove_listener(&observer);
            }
        }
        *self.inner.dependencies.borrow_mut() = Dependencies::from_vec(remaining);
    }

    /// Mark the cache stale and notify listeners. No-op while invalid.
    pub fn invalidate(&self) {
        if !self.inner.valid.replace(false) {
            return;
        }
        let hooks = self.inner.invalidating.borrow().clone();
        for hook in &hooks {
            hook();
        }
        self.inner.cached.borrow_mut().take();
        trace!(message = "binding.invalidate", binding = %self.id());
        self.inner.listeners.fire(self);
    }

    /// Current value, recomputing if invalid.
    ///
    /// # Errors
    ///
    /// Returns an evaluation error attributed to this binding (or to the
    /// innermost failing binding) if the compute closure fails.
    pub fn get(&self) -> Result<T> {
        if self.inner.valid.get()
            && let Some(value) = self.inner.cached.borrow().as_ref()
        {
            return Ok(value.clone());
        }
        let value = (self.inner.compute)().map_err(|err| err.attributed_to(self.id()))?;
        *self.inner.cached.borrow_mut() = Some(value.clone());
        self.inner.valid.set(true);
        let version = self.inner.version.get() + 1;
        self.inner.version.set(version);
        trace!(message = "binding.recompute", binding = %self.id(), version);
        Ok(value)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.inner.valid.get()
    }

    /// Number of successful recomputations.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Snapshot of the current dependency list.
    #[must_use]
    pub fn dependencies(&self) -> Dependencies {
        self.inner.dependencies.borrow().clone()
    }

    /// Unbind from every dependency and run dispose hooks. Idempotent.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        let deps = self.inner.dependencies.replace(Dependencies::None);
        if let Some(observer) = self.inner.observer.borrow().clone() {
            for dep in &deps {
                dep.remove_listener(&observer);
            }
        }
        let hooks = std::mem::take(&mut *self.inner.disposers.borrow_mut());
        for hook in hooks {
            hook();
        }
        debug!(
            message = "binding.dispose",
            binding = %self.id(),
            dependencies = deps.len()
        );
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Run `hook` on `dispose`. Runs immediately if already disposed.
    pub fn on_dispose(&self, hook: impl FnOnce() + 'static) {
        if self.is_disposed() {
            hook();
        } else {
            self.inner.disposers.borrow_mut().push(Box::new(hook));
        }
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
    pub fn downgrade(&self) -> WeakBinding<T> {
        WeakBinding {
            inner: Rc::downgrade(&self.inner),
        }
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Store `dependencies` for reporting without registering the shared
    /// observer. Used by bindings that wire their own per-operand observers.
    pub(crate) fn record_dependencies(&self, dependencies: Vec<Dependency>) {
        *self.inner.dependencies.borrow_mut() = Dependencies::from_vec(dependencies);
    }

    /// Run `hook` on every valid→invalid edge, before listeners fire.
    pub(crate) fn on_invalidating(&self, hook: impl Fn() + 'static) {
        self.inner.invalidating.borrow_mut().push(Rc::new(hook));
    }

    /// Notify invalidation listeners without touching the cache.
    pub(crate) fn notify_content_changed(&self) {
        self.inner.listeners.fire_invalidation(self);
    }

    fn observer(&self) -> InvalidationListener {
        self.inner
            .observer
            .borrow_mut()
            .get_or_insert_with(|| {
                InvalidationListener::from_callback(Rc::new(DependencyObserver {
                    binding: Rc::downgrade(&self.inner),
                }))
            })
            .clone()
    }
}

impl<T: Clone + PartialEq + 'static> Observable for Binding<T> {
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

impl<T: Clone + PartialEq + 'static> ObservableValue<T> for Binding<T> {
    fn value(&self) -> Result<T> {
        self.get()
    }

    fn add_change_listener(&self, listener: ChangeListener<T>) {
        self.inner.listeners.add_change(listener, || self.get());
    }

    fn remove_change_listener(&self, listener: &ChangeListener<T>) {
        self.inner.listeners.remove_change(listener);
    }
}

impl<T: Clone + PartialEq + 'static> Disposable for Binding<T> {
    fn dispose(&self) {
        Binding::dispose(self);
    }

    fn is_disposed(&self) -> bool {
        Binding::is_disposed(self)
    }
}

/// Forwards dependency invalidation to the owning binding.
struct DependencyObserver<T> {
    binding: Weak<BindingInner<T>>,
}

impl<T: Clone + PartialEq + 'static> InvalidationCallback for DependencyObserver<T> {
    fn invalidated(&self, _observable: &dyn Observable) {
        if let Some(inner) = self.binding.upgrade() {
            Binding { inner }.invalidate();
        }
    }

    fn is_alive(&self) -> bool {
        self.binding.strong_count() > 0
    }
}

/// Non-owning handle to a [`Binding`].
pub struct WeakBinding<T> {
    inner: Weak<BindingInner<T>>,
}

impl<T> Clone for WeakBinding<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> WeakBinding<T> {
    #[must_use]
    pub fn upgrade(&self) -> Option<Binding<T>> {
        self.inner.upgrade().map(|inner| Binding { inner })
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl<T> fmt::Debug for WeakBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakBinding")
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindingError;
    use crate::property::Property;

    fn counting(p: &Property<i32>) -> (Binding<i32>, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let source = p.clone();
        let binding = Binding::derived(
            move || {
                counter.set(counter.get() + 1);
                Ok(source.get() * 2)
            },
            [dependency(p)],
        );
        (binding, calls)
    }

    fn hits(o: &impl Observable) -> Rc<Cell<u32>> {
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        o.add_listener(InvalidationListener::new(move |_| sink.set(sink.get() + 1)));
        hits
    }

    #[test]
    fn starts_invalid_and_computes_lazily() {
        let p = Property::new(1);
        let (b, calls) = counting(&p);
        assert!(!b.is_valid());
        assert_eq!(calls.get(), 0);
        assert_eq!(b.get().ok(), Some(2));
        assert_eq!(b.get().ok(), Some(2));
        assert_eq!(calls.get(), 1);
        assert_eq!(b.version(), 1);
    }

    #[test]
    fn dependency_change_invalidates_once() {
        let p = Property::new(1);
        let (b, calls) = counting(&p);
        let fired = hits(&b);
        b.get().ok();
        p.set(2);
        p.set(3);
        b.invalidate();
        assert_eq!(fired.get(), 1);
        assert!(!b.is_valid());
        assert_eq!(b.get().ok(), Some(6));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn invalidation_propagates_down_a_chain_in_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let p = Property::new(1);
        let record = |name: &'static str| {
            let order = Rc::clone(&order);
            InvalidationListener::new(move |_| order.borrow_mut().push(name))
        };
        let a = Binding::mirror(&p);
        a.add_listener(record("a"));
        let b = Binding::mirror(&a);
        b.add_listener(record("b"));
        b.get().ok();
        p.set(5);
        assert_eq!(*order.borrow(), vec!["a", "b"]);
        assert_eq!(b.get().ok(), Some(5));
    }

    #[test]
    fn failure_is_attributed_and_not_cached() {
        let fail = Rc::new(Cell::new(true));
        let flag = Rc::clone(&fail);
        let b = Binding::new(move || {
            if flag.get() {
                Err(BindingError::evaluation("not yet"))
            } else {
                Ok(1)
            }
        });
        let err = b.get().err().and_then(|e| e.as_evaluation().and_then(|e| e.binding()));
        assert_eq!(err, Some(b.id()));
        assert!(!b.is_valid());
        fail.set(false);
        assert_eq!(b.get().ok(), Some(1));
    }

    #[test]
    fn bind_replaces_previous_registration() {
        let p = Property::new(1);
        let q = Property::new(2);
        let b = Binding::derived(|| Ok(0), [dependency(&p)]);
        b.bind([dependency(&q)]);
        assert_eq!(p.invalidation_listener_count(), 0);
        assert_eq!(q.invalidation_listener_count(), 1);
        assert_eq!(b.dependencies().ids(), vec![q.id()]);
    }

    #[test]
    fn unbind_removes_one_duplicate_per_entry() {
        let p = Property::new(1);
        let b = Binding::derived(|| Ok(0), [dependency(&p), dependency(&p)]);
        assert_eq!(p.invalidation_listener_count(), 2);
        b.unbind(&[dependency(&p)]);
        assert_eq!(p.invalidation_listener_count(), 1);
        assert_eq!(b.dependencies().len(), 1);
    }

    #[test]
    fn dispose_removes_every_registration_and_is_idempotent() {
        let p = Property::new(1);
        let q = Property::new(2);
        let b = Binding::derived(|| Ok(0), [dependency(&p), dependency(&q)]);
        let hooks = Rc::new(Cell::new(0));
        let h = Rc::clone(&hooks);
        b.on_dispose(move || h.set(h.get() + 1));
        b.dispose();
        b.dispose();
        assert!(b.is_disposed());
        assert_eq!(p.invalidation_listener_count(), 0);
        assert_eq!(q.invalidation_listener_count(), 0);
        assert!(b.dependencies().is_empty());
        assert_eq!(hooks.get(), 1);
    }

    #[test]
    fn dropped_binding_is_pruned_from_dependency() {
        let p = Property::new(1);
        let (b, _) = counting(&p);
        let weak = b.downgrade();
        drop(b);
        assert!(!weak.is_alive());
        assert_eq!(p.invalidation_listener_count(), 1);
        p.set(2);
        assert_eq!(p.invalidation_listener_count(), 0);
    }

    #[test]
    fn change_listener_reads_new_value_at_invalidation() {
        let p = Property::new(1);
        let (b, calls) = counting(&p);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        b.add_change_listener(ChangeListener::new(
            move |_: &dyn ObservableValue<i32>, old: &i32, new: &i32| {
                sink.borrow_mut().push((*old, *new));
            },
        ));
        p.set(4);
        assert_eq!(*seen.borrow(), vec![(2, 8)]);
        assert_eq!(calls.get(), 2);
        assert!(b.is_valid());
    }

    #[cfg(feature = "tracing")]
    mod tracing_events {
        use super::*;
        use std::sync::{Arc, Mutex};
        use tracing::Subscriber;
        use tracing_subscriber::Layer;
        use tracing_subscriber::layer::{Context, SubscriberExt};

        struct MessageCapture {
            messages: Arc<Mutex<Vec<String>>>,
        }

        impl<S> Layer<S> for MessageCapture
        where
            S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
        {
            fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                struct Msg(Option<String>);
                impl tracing::field::Visit for Msg {
                    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                        if field.name() == "message" {
                            self.0 = Some(value.to_string());
                        }
                    }

                    fn record_debug(
                        &mut self,
                        field: &tracing::field::Field,
                        value: &dyn std::fmt::Debug,
                    ) {
                        if field.name() == "message" {
                            self.0 = Some(format!("{value:?}").trim_matches('"').to_string());
                        }
                    }
                }
                let mut msg = Msg(None);
                event.record(&mut msg);
                if let Some(message) = msg.0 {
                    self.messages.lock().expect("capture lock").push(message);
                }
            }
        }

        #[test]
        fn lifecycle_events_are_emitted() {
            let messages = Arc::new(Mutex::new(Vec::new()));
            let subscriber = tracing_subscriber::registry().with(MessageCapture {
                messages: Arc::clone(&messages),
            });
            let _guard = tracing::subscriber::set_default(subscriber);

            let p = Property::new(1);
            let (b, _) = counting(&p);
            b.get().ok();
            p.set(2);
            b.dispose();

            let seen = messages.lock().expect("capture lock");
            for expected in ["binding.recompute", "binding.invalidate", "binding.dispose"] {
                assert!(
                    seen.iter().any(|m| m == expected),
                    "expected {expected} in {seen:?}"
                );
            }
        }
    }
}

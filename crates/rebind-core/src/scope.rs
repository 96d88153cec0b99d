//! Lifecycle management for groups of bindings.

use std::fmt;

use crate::binding::Disposable;
use crate::observable::Subscription;

enum Held {
    Disposable(Box<dyn Disposable>),
    Subscription(Subscription),
}

/// Collects bindings and subscriptions for one logical owner.
///
/// When the scope is cleared or dropped, everything it holds is released in
/// reverse registration order.
///
/// # Invariants
///
/// 1. After `clear()` (or drop) no binding adopted by this scope is
///    registered on any dependency.
/// 2. `clear()` leaves the scope empty and reusable.
#[derive(Default)]
pub struct BindingScope {
    held: Vec<Held>,
}

impl BindingScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a disposable and return a handle to it.
    ///
    /// Bindings are cheap clones, so the returned value shares state with the
    /// one held by the scope.
    pub fn adopt<D: Disposable + Clone + 'static>(&mut self, disposable: D) -> D {
        self.held.push(Held::Disposable(Box::new(disposable.clone())));
        disposable
    }

    /// Take sole ownership of a disposable that has no shared handle.
    pub fn own(&mut self, disposable: impl Disposable + 'static) {
        self.held.push(Held::Disposable(Box::new(disposable)));
    }

    /// Keep `subscription` alive until the scope is cleared.
    pub fn hold(&mut self, subscription: Subscription) {
        self.held.push(Held::Subscription(subscription));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.held.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    /// Dispose and release everything, newest first.
    pub fn clear(&mut self) {
        while let Some(item) = self.held.pop() {
            match item {
                Held::Disposable(d) => d.dispose(),
                Held::Subscription(sub) => drop(sub),
            }
        }
    }
}

impl Drop for BindingScope {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingScope")
            .field("held", &self.held.len())
            .finish()
    }
}

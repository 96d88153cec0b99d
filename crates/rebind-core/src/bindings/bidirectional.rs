//! Two properties kept in sync.
//!
//! Binding `a` and `b` first copies `a` into `b`. After that a change on
//! either side is written to the other. A shared guard stops the write-back
//! from ping-ponging.
//!
//! # Invariants
//!
//! 1. While bound, `a.get() == b.get()` after every `set` on either side.
//! 2. After `unbind()` (or drop) neither property carries a listener from
//!    this binding.
//! 3. The listeners hold the opposite property weakly, so the pair does not
//!    keep itself alive through the binding.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

#[cfg(feature = "tracing")]
use crate::logging::debug;
#[cfg(not(feature = "tracing"))]
use crate::debug;

use crate::binding::Disposable;
use crate::error::{BindingError, Result};
use crate::observable::{Observable, ObservableId, Subscription, subscribe_change};
use crate::property::{Property, WeakProperty};

/// Handle of a live bidirectional link. Dropping it unbinds.
#[must_use = "dropping a BidirectionalBinding unbinds it immediately"]
pub struct BidirectionalBinding<T> {
    ends: (ObservableId, ObservableId),
    subscriptions: RefCell<Vec<Subscription>>,
    _marker: std::marker::PhantomData<T>,
}

/// Keep `a` and `b` equal until the returned handle is unbound or dropped.
///
/// # Errors
///
/// [`BindingError::SelfBinding`] if `a` and `b` are the same property.
pub fn bind_bidirectional<T>(a: &Property<T>, b: &Property<T>) -> Result<BidirectionalBinding<T>>
where
    T: Clone + PartialEq + 'static,
{
    if a.ptr_eq(b) {
        return Err(BindingError::SelfBinding { property: a.id() });
    }
    b.set(a.get());

    let syncing = Rc::new(Cell::new(false));
    let a_to_b = mirror_into(a, b.downgrade(), Rc::clone(&syncing));
    let b_to_a = mirror_into(b, a.downgrade(), syncing);

    debug!(
        message = "bidirectional.bind",
        a = %a.id(),
        b = %b.id()
    );
    Ok(BidirectionalBinding {
        ends: (a.id(), b.id()),
        subscriptions: RefCell::new(vec![a_to_b, b_to_a]),
        _marker: std::marker::PhantomData,
    })
}

fn mirror_into<T>(
    source: &Property<T>,
    target: WeakProperty<T>,
    syncing: Rc<Cell<bool>>,
) -> Subscription
where
    T: Clone + PartialEq + 'static,
{
    subscribe_change(source, move |_: &T, new: &T| {
        if syncing.replace(true) {
            return;
        }
        if let Some(target) = target.upgrade() {
            target.set(new.clone());
        }
        syncing.set(false);
    })
}

impl<T> BidirectionalBinding<T> {
    /// Ids of the two bound properties, in binding order.
    #[must_use]
    pub fn ends(&self) -> (ObservableId, ObservableId) {
        self.ends
    }

    /// Remove both sync listeners. Idempotent.
    pub fn unbind(&self) {
        let released = std::mem::take(&mut *self.subscriptions.borrow_mut());
        if !released.is_empty() {
            debug!(
                message = "bidirectional.unbind",
                a = %self.ends.0,
                b = %self.ends.1
            );
        }
        drop(released);
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        !self.subscriptions.borrow().is_empty()
    }
}

impl<T> Disposable for BidirectionalBinding<T> {
    fn dispose(&self) {
        self.unbind();
    }

    fn is_disposed(&self) -> bool {
        !self.is_bound()
    }
}

impl<T> Drop for BidirectionalBinding<T> {
    fn drop(&mut self) {
        self.unbind();
    }
}

impl<T> fmt::Debug for BidirectionalBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BidirectionalBinding")
            .field("a", &self.ends.0)
            .field("b", &self.ends.1)
            .field("bound", &self.is_bound())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{IntegerProperty, StringProperty};
    use crate::scope::BindingScope;

    #[test]
    fn initial_sync_copies_a_into_b() {
        let a = IntegerProperty::new(42);
        let b = IntegerProperty::new(0);
        let _link = bind_bidirectional(&a, &b);
        assert_eq!(b.get(), 42);
    }

    #[test]
    fn changes_flow_both_ways() {
        let a = StringProperty::of("left");
        let b = StringProperty::null();
        let link = bind_bidirectional(&a, &b).ok();
        assert!(link.as_ref().is_some_and(BidirectionalBinding::is_bound));
        a.set(Some("one".into()));
        assert_eq!(b.get().as_deref(), Some("one"));
        b.set(Some("two".into()));
        assert_eq!(a.get().as_deref(), Some("two"));
        a.set(Some("three".into()));
        assert_eq!(b.get().as_deref(), Some("three"));
    }

    #[test]
    fn self_binding_is_rejected() {
        let a = IntegerProperty::new(1);
        let err = bind_bidirectional(&a, &a.clone()).err();
        assert!(matches!(
            err,
            Some(BindingError::SelfBinding { property }) if property == a.id()
        ));
        assert_eq!(a.change_listener_count(), 0);
    }

    #[test]
    fn unbind_removes_both_listeners() {
        let a = IntegerProperty::new(1);
        let b = IntegerProperty::new(2);
        let link = bind_bidirectional(&a, &b).ok();
        assert_eq!(a.change_listener_count(), 1);
        assert_eq!(b.change_listener_count(), 1);
        if let Some(link) = &link {
            link.unbind();
            link.unbind();
            assert!(link.is_disposed());
        }
        assert_eq!(a.change_listener_count(), 0);
        assert_eq!(b.change_listener_count(), 0);
        a.set(10);
        assert_eq!(b.get(), 1);
    }

    #[test]
    fn drop_unbinds() {
        let a = IntegerProperty::new(1);
        let b = IntegerProperty::new(2);
        drop(bind_bidirectional(&a, &b));
        assert_eq!(a.change_listener_count(), 0);
        a.set(5);
        assert_eq!(b.get(), 1);
    }

    #[test]
    fn scope_owns_the_link() {
        let a = IntegerProperty::new(1);
        let b = IntegerProperty::new(2);
        {
            let mut scope = BindingScope::new();
            if let Ok(link) = bind_bidirectional(&a, &b) {
                scope.own(link);
            }
            a.set(3);
            assert_eq!(b.get(), 3);
        }
        assert_eq!(b.change_listener_count(), 0);
    }
}

//! Listener watchers.
//!
//! Watchers subscribe on construction and unsubscribe on drop. Each one can
//! optionally append to an [`EvidenceLog`], so several watchers on the same
//! graph produce a single ordered trace.

use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::rc::Rc;

use rebind_core::{
    Binding, Dependency, Observable, ObservableValue, Result, Subscription, subscribe_change,
    subscribe_invalidation,
};

use crate::evidence::{Evidence, EvidenceLog};

/// Counts invalidation notifications from one observable.
#[derive(Debug)]
pub struct InvalidationCounter {
    count: Rc<Cell<usize>>,
    _subscription: Subscription,
}

impl InvalidationCounter {
    pub fn attach<O: Observable + Clone + 'static>(source: &O) -> Self {
        Self::attach_logged(source, "", None)
    }

    /// Like [`attach`](Self::attach), also logging each notification.
    pub fn attach_logged<O: Observable + Clone + 'static>(
        source: &O,
        label: &str,
        log: Option<&EvidenceLog>,
    ) -> Self {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let log = log.cloned();
        let label = label.to_owned();
        let subscription = subscribe_invalidation(source, move |_| {
            seen.set(seen.get() + 1);
            if let Some(log) = &log {
                log.push(Evidence::Invalidated {
                    label: label.clone(),
                });
            }
        });
        Self {
            count,
            _subscription: subscription,
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count.get()
    }

    /// Current count, then reset to zero.
    pub fn take(&self) -> usize {
        self.count.replace(0)
    }
}

/// Records every `(old, new)` pair reported by one observable.
pub struct ChangeRecorder<T> {
    changes: Rc<RefCell<Vec<(T, T)>>>,
    _subscription: Subscription,
}

impl<T: Clone + Debug + 'static> ChangeRecorder<T> {
    pub fn attach<O: ObservableValue<T> + Clone + 'static>(source: &O) -> Self {
        Self::attach_logged(source, "", None)
    }

    pub fn attach_logged<O: ObservableValue<T> + Clone + 'static>(
        source: &O,
        label: &str,
        log: Option<&EvidenceLog>,
    ) -> Self {
        let changes: Rc<RefCell<Vec<(T, T)>>> = Rc::default();
        let sink = Rc::clone(&changes);
        let log = log.cloned();
        let label = label.to_owned();
        let subscription = subscribe_change(source, move |old: &T, new: &T| {
            sink.borrow_mut().push((old.clone(), new.clone()));
            if let Some(log) = &log {
                log.push(Evidence::Changed {
                    label: label.clone(),
                    old: format!("{old:?}"),
                    new: format!("{new:?}"),
                });
            }
        });
        Self {
            changes,
            _subscription: subscription,
        }
    }

    #[must_use]
    pub fn changes(&self) -> Vec<(T, T)> {
        self.changes.borrow().clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<(T, T)> {
        self.changes.borrow().last().cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.changes.borrow_mut().clear();
    }
}

impl<T> Debug for ChangeRecorder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeRecorder")
            .field("changes", &self.changes.borrow().len())
            .finish()
    }
}

/// Number of times a compute closure ran.
#[derive(Debug, Clone, Default)]
pub struct RecomputeCounter {
    runs: Rc<Cell<u64>>,
}

impl RecomputeCounter {
    #[must_use]
    pub fn runs(&self) -> u64 {
        self.runs.get()
    }

    fn tick(&self) -> u64 {
        let run = self.runs.get() + 1;
        self.runs.set(run);
        run
    }
}

/// A derived binding whose recomputations are counted.
pub fn counting_binding<T>(
    compute: impl Fn() -> Result<T> + 'static,
    dependencies: impl IntoIterator<Item = Dependency>,
) -> (Binding<T>, RecomputeCounter)
where
    T: Clone + PartialEq + 'static,
{
    counting_binding_logged(compute, dependencies, "", None)
}

/// [`counting_binding`] that also logs each recomputation.
pub fn counting_binding_logged<T>(
    compute: impl Fn() -> Result<T> + 'static,
    dependencies: impl IntoIterator<Item = Dependency>,
    label: &str,
    log: Option<&EvidenceLog>,
) -> (Binding<T>, RecomputeCounter)
where
    T: Clone + PartialEq + 'static,
{
    let counter = RecomputeCounter::default();
    let ticks = counter.clone();
    let log = log.cloned();
    let label = label.to_owned();
    let binding = Binding::derived(
        move || {
            let run = ticks.tick();
            if let Some(log) = &log {
                log.push(Evidence::Recomputed {
                    label: label.clone(),
                    run,
                });
            }
            compute()
        },
        dependencies,
    );
    (binding, counter)
}

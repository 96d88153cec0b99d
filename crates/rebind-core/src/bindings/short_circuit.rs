//! Short-circuit AND/OR over two observable booleans.
//!
//! Each operand gets its own observer. The first operand always
//! invalidates the binding. The second only does when its value can still
//! decide the result: the binding is valid and the first operand is not the
//! combinator's decisive value (`false` for AND, `true` for OR).
//!
//! Observers hold `Weak` references to the binding; the binding holds both
//! operands and removes its observers on `dispose`.

use std::rc::Rc;

use crate::binding::{Binding, WeakBinding};
use crate::observable::{InvalidationCallback, InvalidationListener, Observable};
use crate::operand::ObservableRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    And,
    Or,
}

impl Combinator {
    /// The first-operand value that fixes the result without reading the
    /// second.
    fn decisive(self) -> bool {
        match self {
            Self::And => false,
            Self::Or => true,
        }
    }
}

struct FirstOperandObserver {
    binding: WeakBinding<bool>,
}

impl InvalidationCallback for FirstOperandObserver {
    fn invalidated(&self, _observable: &dyn Observable) {
        if let Some(binding) = self.binding.upgrade() {
            binding.invalidate();
        }
    }

    fn is_alive(&self) -> bool {
        self.binding.is_alive()
    }
}

struct SecondOperandObserver {
    binding: WeakBinding<bool>,
    first: ObservableRef<bool>,
    combinator: Combinator,
}

impl InvalidationCallback for SecondOperandObserver {
    fn invalidated(&self, _observable: &dyn Observable) {
        let Some(binding) = self.binding.upgrade() else {
            return;
        };
        if !binding.is_valid() {
            return;
        }
        // A failing first operand cannot decide the result.
        let decided = self
            .first
            .get()
            .is_ok_and(|first| first == self.combinator.decisive());
        if !decided {
            binding.invalidate();
        }
    }

    fn is_alive(&self) -> bool {
        self.binding.is_alive()
    }
}

pub(crate) fn and_binding(first: ObservableRef<bool>, second: ObservableRef<bool>) -> Binding<bool> {
    combine(Combinator::And, first, second)
}

pub(crate) fn or_binding(first: ObservableRef<bool>, second: ObservableRef<bool>) -> Binding<bool> {
    combine(Combinator::Or, first, second)
}

fn combine(
    combinator: Combinator,
    first: ObservableRef<bool>,
    second: ObservableRef<bool>,
) -> Binding<bool> {
    let decisive = combinator.decisive();
    let binding = {
        let first = first.clone();
        let second = second.clone();
        Binding::new(move || {
            if first.get()? == decisive {
                return Ok(decisive);
            }
            second.get()
        })
    };

    let on_first = InvalidationListener::from_callback(Rc::new(FirstOperandObserver {
        binding: binding.downgrade(),
    }));
    let on_second = InvalidationListener::from_callback(Rc::new(SecondOperandObserver {
        binding: binding.downgrade(),
        first: first.clone(),
        combinator,
    }));
    first.dependency().add_listener(on_first.clone());
    second.dependency().add_listener(on_second.clone());
    binding.record_dependencies(vec![first.dependency(), second.dependency()]);

    binding.on_dispose(move || {
        first.dependency().remove_listener(&on_first);
        second.dependency().remove_listener(&on_second);
    });
    binding
}

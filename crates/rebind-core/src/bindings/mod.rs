//! The bindings algebra: stateless factories that compose observables into
//! new bindings.
//!
//! Functions are grouped by value kind. Every factory registers the result
//! only on its observable operands; constants never become dependencies.
//!
//! ```
//! use rebind_core::Property;
//! use rebind_core::bindings::numeric;
//!
//! let a = Property::new(1);
//! let b = Property::new(2);
//! let c = numeric::add(&a, &b);
//! assert_eq!(c.get().ok(), Some(3));
//! a.set(5);
//! assert_eq!(c.get().ok(), Some(7));
//! ```

pub mod bidirectional;
pub mod boolean;
pub mod collection;
pub mod custom;
pub mod numeric;
pub mod object;
pub mod select;
pub(crate) mod short_circuit;
pub mod text;
pub mod when;

pub use bidirectional::{BidirectionalBinding, bind_bidirectional};
pub use custom::create_binding;
pub use select::{IntoSelectValue, SelectLink, SelectRoot, SelectValue, Selectable, select};
pub use when::when;

use crate::binding::Binding;
use crate::error::Result;
use crate::observable::Dependency;
use crate::operand::Operand;

/// A derived binding over one operand.
pub(crate) fn unary<A, R>(a: Operand<A>, f: impl Fn(A) -> Result<R> + 'static) -> Binding<R>
where
    A: Clone + 'static,
    R: Clone + PartialEq + 'static,
{
    let deps: Vec<Dependency> = a.dependency().into_iter().collect();
    Binding::derived(move || f(a.get()?), deps)
}

/// A derived binding over two operands.
pub(crate) fn binary<A, B, R>(
    a: Operand<A>,
    b: Operand<B>,
    f: impl Fn(A, B) -> Result<R> + 'static,
) -> Binding<R>
where
    A: Clone + 'static,
    B: Clone + 'static,
    R: Clone + PartialEq + 'static,
{
    let deps: Vec<Dependency> = a.dependency().into_iter().chain(b.dependency()).collect();
    Binding::derived(move || f(a.get()?, b.get()?), deps)
}

#![forbid(unsafe_code)]

//! rebind public facade crate.
//!
//! Re-exports the engine from `rebind-core` and offers a [`prelude`] that
//! brings the value types, the factory modules and every extension trait
//! into scope at once.
//!
//! ```
//! use rebind::prelude::*;
//!
//! let width = IntegerProperty::new(3);
//! let height = IntegerProperty::new(4);
//! let area = width.multiply(&height);
//! let label = area.as_string_with("area {}").ok();
//! assert_eq!(area.get().ok(), Some(12));
//! height.set(5);
//! assert_eq!(
//!     label.and_then(|b| b.get().ok()).flatten().as_deref(),
//!     Some("area 15")
//! );
//! ```

pub use rebind_core::*;

pub mod prelude {
    pub use rebind_core::bindings::{
        self, BidirectionalBinding, SelectLink, SelectRoot, SelectValue, Selectable,
        bind_bidirectional, create_binding, select, when,
    };
    pub use rebind_core::expression::{
        AsCollectionBinding, list_expression, map_expression, set_expression,
    };
    pub use rebind_core::{
        AsExpression, Binding, BindingError, BindingScope, BooleanExpression, BooleanProperty,
        CollectionBinding, Disposable, DoubleProperty, FloatProperty, IntegerProperty,
        ListBinding, LongProperty, MapBinding, NumberExpression, ObjectExpression,
        ObjectProperty, Observable, ObservableCollection, ObservableList, ObservableMap,
        ObservableSet, ObservableValue, Operand, Property, SetBinding,
        StringExpression, StringProperty, TextPart, deps,
    };
}

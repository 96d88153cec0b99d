//! Global JSON subscriber installation.
#![cfg(feature = "tracing-json")]

use rebind_core::logging::{DEFAULT_FILTER, init_json};
use rebind_core::{IntegerProperty, NumberExpression};

#[test]
fn init_json_installs_once() {
    assert!(DEFAULT_FILTER.starts_with("rebind_core"));
    assert!(init_json().is_ok());
    assert!(init_json().is_err());

    let a = IntegerProperty::new(1);
    let doubled = a.multiply(2_i32);
    assert_eq!(doubled.get().ok(), Some(2));
    doubled.dispose();
}

//! Logical operations.

use super::short_circuit::{and_binding, or_binding};
use super::{binary, unary};
use crate::binding::Binding;
use crate::operand::Operand;

/// Logical AND. With two observable operands the second is only read (and
/// only propagates invalidation) while the first is `true`.
pub fn and(a: impl Into<Operand<bool>>, b: impl Into<Operand<bool>>) -> Binding<bool> {
    match (a.into(), b.into()) {
        (Operand::Observable(a), Operand::Observable(b)) => and_binding(a, b),
        (a, b) => binary(a, b, |a, b| Ok(a && b)),
    }
}

/// Logical OR. With two observable operands the second is only read (and
/// only propagates invalidation) while the first is `false`.
pub fn or(a: impl Into<Operand<bool>>, b: impl Into<Operand<bool>>) -> Binding<bool> {
    match (a.into(), b.into()) {
        (Operand::Observable(a), Operand::Observable(b)) => or_binding(a, b),
        (a, b) => binary(a, b, |a, b| Ok(a || b)),
    }
}

pub fn not(a: impl Into<Operand<bool>>) -> Binding<bool> {
    unary(a.into(), |a: bool| Ok(!a))
}

pub fn equal(a: impl Into<Operand<bool>>, b: impl Into<Operand<bool>>) -> Binding<bool> {
    binary(a.into(), b.into(), |a: bool, b: bool| Ok(a == b))
}

pub fn not_equal(a: impl Into<Operand<bool>>, b: impl Into<Operand<bool>>) -> Binding<bool> {
    binary(a.into(), b.into(), |a: bool, b: bool| Ok(a != b))
}

/// `"true"` or `"false"`.
pub fn convert(a: impl Into<Operand<bool>>) -> Binding<Option<String>> {
    unary(a.into(), |a: bool| Ok(Some(a.to_string())))
}

//! Property-based invariant tests for the bindings algebra.
//!
//! 1. Binary numeric operations evaluate in the wider operand kind.
//! 2. Integer arithmetic wraps; integer division by zero is an error.
//! 3. `equal_within(a, b, eps)` holds iff `|a - b| <= eps`.
//! 4. Absent strings behave exactly like `""` in every string operator.
//! 5. Constants never become dependencies.

use proptest::prelude::*;
use rebind_core::bindings::{numeric, text};
use rebind_core::{
    Binding, BindingError, DoubleProperty, FloatProperty, IntegerProperty, LongProperty,
    NumberExpression, NumericKind, Numeric, Operand, StringProperty, StringExpression,
};

// ── Strategies ────────────────────────────────────────────────────────────

fn finite_f64() -> impl Strategy<Value = f64> {
    -1.0e9f64..1.0e9
}

fn text_value() -> impl Strategy<Value = Option<String>> {
    prop_oneof![Just(None), "[a-zA-Z]{0,6}".prop_map(Some)]
}

fn kind_of<N: Numeric>(_: &Binding<N>) -> NumericKind {
    N::KIND
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Widening
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn int_plus_long_is_long(a in any::<i32>(), b in any::<i64>()) {
        let pa = IntegerProperty::new(a);
        let pb = LongProperty::new(b);
        let sum = numeric::add(&pa, &pb);
        prop_assert_eq!(kind_of(&sum), NumericKind::Long);
        prop_assert_eq!(sum.get().ok(), Some(i64::from(a).wrapping_add(b)));
    }

    #[test]
    fn long_times_float_is_float(a in -10_000i64..10_000, b in -100.0f32..100.0) {
        let pa = LongProperty::new(a);
        let pb = FloatProperty::new(b);
        let product = pa.multiply(&pb);
        prop_assert_eq!(kind_of(&product), NumericKind::Float);
        #[allow(clippy::cast_precision_loss)]
        let expected = a as f32 * b;
        prop_assert_eq!(product.get().ok(), Some(expected));
    }

    #[test]
    fn constant_does_not_narrow_the_observable(a in any::<i64>(), c in any::<i32>()) {
        let pa = LongProperty::new(a);
        let diff = numeric::subtract(&pa, c);
        prop_assert_eq!(kind_of(&diff), NumericKind::Long);
        prop_assert_eq!(diff.dependencies().len(), 1);
        prop_assert_eq!(diff.get().ok(), Some(a.wrapping_sub(i64::from(c))));
    }

    #[test]
    fn wider_constant_widens(a in any::<i32>(), c in finite_f64()) {
        let pa = IntegerProperty::new(a);
        let sum = numeric::add(&pa, c);
        prop_assert_eq!(kind_of(&sum), NumericKind::Double);
        prop_assert_eq!(sum.get().ok(), Some(f64::from(a) + c));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Integer arithmetic
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn integer_multiplication_wraps(a in any::<i32>(), b in any::<i32>()) {
        let pa = IntegerProperty::new(a);
        let pb = IntegerProperty::new(b);
        prop_assert_eq!(pa.multiply(&pb).get().ok(), Some(a.wrapping_mul(b)));
    }

    #[test]
    fn integer_division_by_zero_fails(a in any::<i64>()) {
        let pa = LongProperty::new(a);
        let q = numeric::divide(&pa, 0_i64);
        let err = q.get().err();
        let cause = err
            .as_ref()
            .and_then(BindingError::as_evaluation)
            .and_then(|e| e.cause_as::<BindingError>());
        prop_assert!(matches!(cause, Some(BindingError::DivisionByZero)));
        prop_assert!(!q.is_valid());
    }

    #[test]
    fn integer_division_truncates(a in any::<i32>(), b in any::<i32>().prop_filter("nonzero", |b| *b != 0)) {
        let pa = IntegerProperty::new(a);
        prop_assert_eq!(numeric::divide(&pa, b).get().ok(), Some(a.wrapping_div(b)));
    }

    #[test]
    fn minmax_bound_both_operands(a in finite_f64(), b in finite_f64()) {
        let pa = DoubleProperty::new(a);
        let pb = DoubleProperty::new(b);
        let lo = pa.min(&pb).get().ok().unwrap_or(f64::NAN);
        let hi = pa.max(&pb).get().ok().unwrap_or(f64::NAN);
        prop_assert!(lo <= a && lo <= b);
        prop_assert!(hi >= a && hi >= b);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Epsilon equality
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn equal_within_matches_abs_difference(
        a in finite_f64(),
        b in finite_f64(),
        eps in 0.0f64..1.0e9,
    ) {
        let pa = DoubleProperty::new(a);
        let pb = DoubleProperty::new(b);
        let eq = numeric::equal_within(&pa, &pb, eps).get().ok();
        let ne = numeric::not_equal_within(&pa, &pb, eps).get().ok();
        prop_assert_eq!(eq, Some((a - b).abs() <= eps));
        prop_assert_eq!(ne, eq.map(|v| !v));
    }

    #[test]
    fn epsilon_free_equality_is_exact(a in any::<i64>(), b in any::<i64>()) {
        let pa = LongProperty::new(a);
        let pb = LongProperty::new(b);
        prop_assert_eq!(pa.is_equal_to(&pb).get().ok(), Some(a == b));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Absent strings behave as empty
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn absent_and_empty_are_indistinguishable(other in text_value()) {
        let absent = StringProperty::null();
        let empty = StringProperty::of("");
        let other = Operand::constant(other);
        let pairs = [
            (text::equal(&absent, other.clone()), text::equal(&empty, other.clone())),
            (text::not_equal(&absent, other.clone()), text::not_equal(&empty, other.clone())),
            (text::less_than(&absent, other.clone()), text::less_than(&empty, other.clone())),
            (text::greater_than_or_equal(&absent, other.clone()), text::greater_than_or_equal(&empty, other.clone())),
            (text::equal_ignore_case(&absent, other.clone()), text::equal_ignore_case(&empty, other)),
        ];
        for (a, e) in pairs {
            prop_assert_eq!(a.get().ok(), e.get().ok());
        }
        prop_assert_eq!(absent.length().get().ok(), Some(0));
        prop_assert_eq!(absent.is_empty().get().ok(), Some(true));
    }

    #[test]
    fn string_ordering_matches_str(a in text_value(), b in text_value()) {
        let pa = StringProperty::new(a.clone());
        let pb = StringProperty::new(b.clone());
        let sa = a.unwrap_or_default();
        let sb = b.unwrap_or_default();
        prop_assert_eq!(pa.less_than(&pb).get().ok(), Some(sa < sb));
        prop_assert_eq!(pa.greater_than_or_equal_to(&pb).get().ok(), Some(sa >= sb));
        prop_assert_eq!(pa.is_equal_to(&pb).get().ok(), Some(sa == sb));
    }

    #[test]
    fn length_counts_chars(s in "\\PC{0,12}") {
        let p = StringProperty::of(&s);
        let expected = i32::try_from(s.chars().count()).unwrap_or(i32::MAX);
        prop_assert_eq!(p.length().get().ok(), Some(expected));
    }
}

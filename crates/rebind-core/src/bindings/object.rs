//! Operations on optional object values.

use std::fmt::Display;

use super::{binary, unary};
use crate::binding::Binding;
use crate::operand::Operand;

pub fn equal<T>(a: impl Into<Operand<Option<T>>>, b: impl Into<Operand<Option<T>>>) -> Binding<bool>
where
    T: Clone + PartialEq + 'static,
{
    binary(a.into(), b.into(), |a: Option<T>, b: Option<T>| Ok(a == b))
}

pub fn not_equal<T>(
    a: impl Into<Operand<Option<T>>>,
    b: impl Into<Operand<Option<T>>>,
) -> Binding<bool>
where
    T: Clone + PartialEq + 'static,
{
    binary(a.into(), b.into(), |a: Option<T>, b: Option<T>| Ok(a != b))
}

pub fn is_null<T: Clone + 'static>(a: impl Into<Operand<Option<T>>>) -> Binding<bool> {
    unary(a.into(), |a: Option<T>| Ok(a.is_none()))
}

pub fn is_not_null<T: Clone + 'static>(a: impl Into<Operand<Option<T>>>) -> Binding<bool> {
    unary(a.into(), |a: Option<T>| Ok(a.is_some()))
}

/// The value rendered with `Display`. Absent stays absent.
pub fn convert<T: Clone + Display + 'static>(
    a: impl Into<Operand<Option<T>>>,
) -> Binding<Option<String>> {
    unary(a.into(), |a: Option<T>| Ok(a.map(|v| v.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::ObjectProperty;

    #[derive(Debug, Clone, PartialEq)]
    struct Point(i32, i32);

    impl Display for Point {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "({}, {})", self.0, self.1)
        }
    }

    #[test]
    fn null_checks_follow_the_value() {
        let p: ObjectProperty<Point> = ObjectProperty::null();
        let missing = is_null(&p);
        assert_eq!(missing.get().ok(), Some(true));
        p.set(Some(Point(1, 2)));
        assert_eq!(missing.get().ok(), Some(false));
        assert_eq!(is_not_null(&p).get().ok(), Some(true));
    }

    #[test]
    fn equality_compares_values() {
        let p = ObjectProperty::new(Some(Point(1, 2)));
        assert_eq!(equal(&p, Some(Point(1, 2))).get().ok(), Some(true));
        assert_eq!(not_equal(&p, None).get().ok(), Some(true));
    }

    #[test]
    fn convert_renders_display() {
        let p = ObjectProperty::new(Some(Point(3, 4)));
        assert_eq!(convert(&p).get().ok().flatten().as_deref(), Some("(3, 4)"));
        p.set(None);
        assert_eq!(convert(&p).get().ok(), Some(None));
    }
}

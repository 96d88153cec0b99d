//! String operations.
//!
//! Absent strings behave as the empty string everywhere in this module:
//! they compare equal to `""`, have length 0 and are empty. Ordering is
//! lexicographic over chars.

use std::cmp::Ordering;

use super::{binary, unary};
use crate::binding::Binding;
use crate::error::Result;
use crate::format::{DisplayValue, Template, TextPart, part_dependencies};
use crate::observable::{ObservableValue, dependency};
use crate::operand::Operand;

type Text = Option<String>;

fn safe(value: Text) -> String {
    value.unwrap_or_default()
}

fn compare(
    a: impl Into<Operand<Text>>,
    b: impl Into<Operand<Text>>,
    test: fn(Ordering) -> bool,
) -> Binding<bool> {
    binary(a.into(), b.into(), move |a: Text, b: Text| {
        Ok(test(safe(a).cmp(&safe(b))))
    })
}

fn lowercase(value: Text) -> String {
    safe(value).to_lowercase()
}

pub fn equal(a: impl Into<Operand<Text>>, b: impl Into<Operand<Text>>) -> Binding<bool> {
    compare(a, b, Ordering::is_eq)
}

pub fn not_equal(a: impl Into<Operand<Text>>, b: impl Into<Operand<Text>>) -> Binding<bool> {
    compare(a, b, Ordering::is_ne)
}

/// Equality of the Unicode lowercase forms.
pub fn equal_ignore_case(
    a: impl Into<Operand<Text>>,
    b: impl Into<Operand<Text>>,
) -> Binding<bool> {
    binary(a.into(), b.into(), |a: Text, b: Text| {
        Ok(lowercase(a) == lowercase(b))
    })
}

pub fn not_equal_ignore_case(
    a: impl Into<Operand<Text>>,
    b: impl Into<Operand<Text>>,
) -> Binding<bool> {
    binary(a.into(), b.into(), |a: Text, b: Text| {
        Ok(lowercase(a) != lowercase(b))
    })
}

pub fn greater_than(a: impl Into<Operand<Text>>, b: impl Into<Operand<Text>>) -> Binding<bool> {
    compare(a, b, Ordering::is_gt)
}

pub fn less_than(a: impl Into<Operand<Text>>, b: impl Into<Operand<Text>>) -> Binding<bool> {
    compare(a, b, Ordering::is_lt)
}

pub fn greater_than_or_equal(
    a: impl Into<Operand<Text>>,
    b: impl Into<Operand<Text>>,
) -> Binding<bool> {
    compare(a, b, Ordering::is_ge)
}

pub fn less_than_or_equal(
    a: impl Into<Operand<Text>>,
    b: impl Into<Operand<Text>>,
) -> Binding<bool> {
    compare(a, b, Ordering::is_le)
}

/// Number of chars; 0 for an absent string.
pub fn length(a: impl Into<Operand<Text>>) -> Binding<i32> {
    unary(a.into(), |a: Text| {
        let chars = a.as_deref().map_or(0, |s| s.chars().count());
        Ok(i32::try_from(chars).unwrap_or(i32::MAX))
    })
}

/// True for absent or `""`.
pub fn is_empty(a: impl Into<Operand<Text>>) -> Binding<bool> {
    unary(a.into(), |a: Text| Ok(a.as_deref().is_none_or(str::is_empty)))
}

pub fn is_not_empty(a: impl Into<Operand<Text>>) -> Binding<bool> {
    unary(a.into(), |a: Text| {
        Ok(a.as_deref().is_some_and(|s| !s.is_empty()))
    })
}

/// Concatenation of all parts, absent parts rendering empty.
pub fn concat<P: Into<TextPart>>(parts: impl IntoIterator<Item = P>) -> Binding<Text> {
    let parts: Vec<TextPart> = parts.into_iter().map(Into::into).collect();
    let deps = part_dependencies(&parts);
    Binding::derived(
        move || {
            let mut out = String::new();
            for part in &parts {
                out.push_str(&part.render_text()?);
            }
            Ok(Some(out))
        },
        deps,
    )
}

/// Render `template` with one part per placeholder.
///
/// # Errors
///
/// `InvalidFormat` if the template is malformed or its placeholder count
/// differs from the number of parts.
pub fn format<P: Into<TextPart>>(
    template: &str,
    parts: impl IntoIterator<Item = P>,
) -> Result<Binding<Text>> {
    let template = Template::parse(template)?;
    let parts: Vec<TextPart> = parts.into_iter().map(Into::into).collect();
    template.expect_args(parts.len())?;
    let deps = part_dependencies(&parts);
    Ok(Binding::derived(
        move || Ok(Some(template.render(&parts)?)),
        deps,
    ))
}

/// Any displayable observable as a string. Absent stays absent.
pub fn convert<V, O>(source: &O) -> Binding<Text>
where
    V: DisplayValue + 'static,
    O: ObservableValue<V> + Clone + 'static,
{
    let dep = dependency(source);
    let source = source.clone();
    Binding::derived(move || Ok(source.value()?.to_text()), [dep])
}

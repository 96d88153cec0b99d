//! Text rendering for string conversion, `concat` and `format`.
//!
//! Templates use a small subset of `std::fmt` syntax: `{}` and `{:.N}`
//! placeholders, with `{{` and `}}` as escapes. Precision follows the
//! standard library: fixed decimals for floats, truncation for strings,
//! ignored for integers and booleans. Absent values render as the empty
//! string.

use std::fmt;
use std::rc::Rc;

use crate::binding::Binding;
use crate::error::{BindingError, Result};
use crate::observable::{Dependency, ObservableValue, dependency};
use crate::property::Property;

/// A value that can be rendered into a template slot.
pub trait DisplayValue {
    /// Rendered text, or `None` for an absent value.
    fn to_text(&self) -> Option<String>;

    fn to_text_with_precision(&self, precision: usize) -> Option<String>;
}

macro_rules! display_value {
    (exact: $($ty:ty),*) => {
        $(impl DisplayValue for $ty {
            fn to_text(&self) -> Option<String> {
                Some(self.to_string())
            }

            fn to_text_with_precision(&self, _precision: usize) -> Option<String> {
                self.to_text()
            }
        })*
    };
    (precise: $($ty:ty),*) => {
        $(impl DisplayValue for $ty {
            fn to_text(&self) -> Option<String> {
                Some(self.to_string())
            }

            fn to_text_with_precision(&self, precision: usize) -> Option<String> {
                Some(format!("{self:.precision$}"))
            }
        })*
    };
}

display_value!(exact: bool, char, i32, i64);
display_value!(precise: f32, f64, String, str);

impl<T: DisplayValue> DisplayValue for Option<T> {
    fn to_text(&self) -> Option<String> {
        self.as_ref().and_then(DisplayValue::to_text)
    }

    fn to_text_with_precision(&self, precision: usize) -> Option<String> {
        self.as_ref()
            .and_then(|value| value.to_text_with_precision(precision))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Slot { precision: Option<usize> },
}

/// A parsed format template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    pieces: Vec<Piece>,
}

impl Template {
    /// # Errors
    ///
    /// `InvalidFormat` for an unterminated or malformed placeholder, or an
    /// unmatched `}`.
    pub fn parse(template: &str) -> Result<Self> {
        let fail = |message: &str| BindingError::InvalidFormat {
            template: template.to_owned(),
            message: message.to_owned(),
        };
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut spec = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => spec.push(ch),
                            None => return Err(fail("unterminated placeholder")),
                        }
                    }
                    let precision = if spec.is_empty() {
                        None
                    } else {
                        let digits = spec
                            .strip_prefix(":.")
                            .ok_or_else(|| fail("unsupported placeholder"))?;
                        Some(
                            digits
                                .parse()
                                .map_err(|_| fail("precision must be a number"))?,
                        )
                    };
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    pieces.push(Piece::Slot { precision });
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(fail("unmatched '}'")),
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }
        Ok(Self {
            source: template.to_owned(),
            pieces,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of placeholders.
    #[must_use]
    pub fn slots(&self) -> usize {
        self.pieces
            .iter()
            .filter(|p| matches!(p, Piece::Slot { .. }))
            .count()
    }

    /// # Errors
    ///
    /// `InvalidFormat` unless the template has exactly `count` placeholders.
    pub fn expect_args(&self, count: usize) -> Result<()> {
        let slots = self.slots();
        if slots == count {
            Ok(())
        } else {
            Err(BindingError::InvalidFormat {
                template: self.source.clone(),
                message: format!("{slots} placeholder(s) but {count} argument(s)"),
            })
        }
    }

    /// Render with one part per placeholder. Missing parts render empty.
    ///
    /// # Errors
    ///
    /// Propagates a failure to read an observable part.
    pub fn render(&self, parts: &[TextPart]) -> Result<String> {
        let mut out = String::new();
        let mut args = parts.iter();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Slot { precision } => {
                    if let Some(part) = args.next()
                        && let Some(text) = part.render(*precision)?
                    {
                        out.push_str(&text);
                    }
                }
            }
        }
        Ok(out)
    }
}

type Render = dyn Fn(Option<usize>) -> Result<Option<String>>;

/// One argument of `concat` or `format`: a literal or an observable.
#[derive(Clone)]
pub struct TextPart {
    render: Rc<Render>,
    dependency: Option<Dependency>,
}

impl TextPart {
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            render: Rc::new(move |precision| Ok(render_with(&text, precision))),
            dependency: None,
        }
    }

    /// A constant displayable value.
    pub fn value<V: DisplayValue + 'static>(value: V) -> Self {
        Self {
            render: Rc::new(move |precision| Ok(render_with(&value, precision))),
            dependency: None,
        }
    }

    /// An observable part, read on every render.
    pub fn of<V, O>(observable: &O) -> Self
    where
        V: DisplayValue + 'static,
        O: ObservableValue<V> + Clone + 'static,
    {
        let dep = dependency(observable);
        let source = observable.clone();
        Self {
            render: Rc::new(move |precision| {
                source.value().map(|value| render_with(&value, precision))
            }),
            dependency: Some(dep),
        }
    }

    /// # Errors
    ///
    /// Propagates a failure to read an observable part.
    pub fn render(&self, precision: Option<usize>) -> Result<Option<String>> {
        (self.render)(precision)
    }

    /// Rendered text with absent as empty.
    ///
    /// # Errors
    ///
    /// Propagates a failure to read an observable part.
    pub fn render_text(&self) -> Result<String> {
        Ok(self.render(None)?.unwrap_or_default())
    }

    #[must_use]
    pub fn dependency(&self) -> Option<Dependency> {
        self.dependency.clone()
    }
}

fn render_with<V: DisplayValue + ?Sized>(value: &V, precision: Option<usize>) -> Option<String> {
    match precision {
        Some(p) => value.to_text_with_precision(p),
        None => value.to_text(),
    }
}

impl fmt::Debug for TextPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextPart")
            .field("dependency", &self.dependency.as_ref().map(|d| d.id()))
            .finish_non_exhaustive()
    }
}

impl From<&str> for TextPart {
    fn from(text: &str) -> Self {
        Self::literal(text)
    }
}

impl From<String> for TextPart {
    fn from(text: String) -> Self {
        Self::literal(text)
    }
}

impl<V> From<&Property<V>> for TextPart
where
    V: DisplayValue + Clone + PartialEq + 'static,
{
    fn from(property: &Property<V>) -> Self {
        Self::of::<V, _>(property)
    }
}

impl<V> From<&Binding<V>> for TextPart
where
    V: DisplayValue + Clone + PartialEq + 'static,
{
    fn from(binding: &Binding<V>) -> Self {
        Self::of::<V, _>(binding)
    }
}

/// Collect the dependencies of observable parts.
pub(crate) fn part_dependencies(parts: &[TextPart]) -> Vec<Dependency> {
    parts.iter().filter_map(TextPart::dependency).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_escapes_and_precision() {
        let t = Template::parse("{{x}} = {:.2}, {}").ok();
        let t = t.as_ref();
        assert_eq!(t.map(Template::slots), Some(2));
        let parts = [TextPart::value(1.23456_f64), TextPart::literal("ok")];
        assert_eq!(
            t.and_then(|t| t.render(&parts).ok()).as_deref(),
            Some("{x} = 1.23, ok")
        );
    }

    #[test]
    fn malformed_templates_are_rejected() {
        for bad in ["{", "}", "{:x}", "{:.a}", "a } b"] {
            assert!(
                matches!(Template::parse(bad), Err(BindingError::InvalidFormat { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn argument_count_is_checked() {
        let t = Template::parse("{} {}").ok();
        assert!(t.as_ref().is_some_and(|t| t.expect_args(2).is_ok()));
        assert!(t.as_ref().is_some_and(|t| t.expect_args(1).is_err()));
    }

    #[test]
    fn absent_renders_empty() {
        let p: Property<Option<String>> = Property::null();
        let part = TextPart::from(&p);
        assert_eq!(part.render_text().ok().as_deref(), Some(""));
        p.set(Some("x".into()));
        assert_eq!(part.render_text().ok().as_deref(), Some("x"));
    }

    #[test]
    fn precision_uses_std_semantics() {
        assert_eq!(1.5_f32.to_text_with_precision(3).as_deref(), Some("1.500"));
        assert_eq!(42_i32.to_text_with_precision(2).as_deref(), Some("42"));
        assert_eq!(true.to_text_with_precision(1).as_deref(), Some("true"));
        assert_eq!(
            String::from("abcdef").to_text_with_precision(3).as_deref(),
            Some("abc")
        );
    }
}

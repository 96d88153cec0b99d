//! Bindings that follow a property path through a graph of objects.
//!
//! `select(root, ["address", "city"])` reads `root.address.city`. Every link
//! reached during evaluation is observed: when one fires, the links after
//! it are released and the binding invalidates. The next `get()` walks the
//! path again, so the binding follows whatever objects are current at the
//! time.
//!
//! A broken link (absent intermediate value, a value that is not an object,
//! or an unknown property name) yields the kind default and is reported
//! through `select.broken_link`; it is never an error. Failures of the
//! observed values themselves still propagate.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

#[cfg(feature = "tracing")]
use crate::logging::{debug, warn};
#[cfg(not(feature = "tracing"))]
use crate::{debug, warn};

use crate::binding::{Binding, WeakBinding};
use crate::config::{LinkReport, SelectConfig};
use crate::error::{BindingError, Result};
use crate::numeric::Number;
use crate::observable::{
    Dependency, InvalidationCallback, InvalidationListener, Observable, ObservableValue,
    dependency,
};

/// An object whose properties can be reached by name from a select path.
pub trait Selectable: Any {
    /// The observable property called `name`, or `None` if there is none.
    fn select_property(&self, name: &str) -> Option<SelectLink>;
}

/// Dynamically typed value flowing along a select path.
#[derive(Clone, Default)]
pub enum SelectValue {
    #[default]
    Absent,
    Bool(bool),
    Number(Number),
    Text(String),
    Object(Rc<dyn Selectable>),
}

impl SelectValue {
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Rc<dyn Selectable>> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::Object(_) => "object",
        }
    }
}

/// Objects compare by identity.
impl PartialEq for SelectValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Absent, Self::Absent) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for SelectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Self::Object(obj) => f
                .debug_tuple("Object")
                .field(&Rc::as_ptr(obj).cast::<()>())
                .finish(),
        }
    }
}

/// Conversion of property values into [`SelectValue`].
pub trait IntoSelectValue {
    fn into_select_value(self) -> SelectValue;
}

impl IntoSelectValue for SelectValue {
    fn into_select_value(self) -> SelectValue {
        self
    }
}

impl IntoSelectValue for bool {
    fn into_select_value(self) -> SelectValue {
        SelectValue::Bool(self)
    }
}

macro_rules! number_into_select {
    ($($ty:ty => $variant:ident),*) => {
        $(impl IntoSelectValue for $ty {
            fn into_select_value(self) -> SelectValue {
                SelectValue::Number(Number::$variant(self))
            }
        })*
    };
}

number_into_select!(i32 => Int, i64 => Long, f32 => Float, f64 => Double);

impl IntoSelectValue for String {
    fn into_select_value(self) -> SelectValue {
        SelectValue::Text(self)
    }
}

impl<S: Selectable> IntoSelectValue for Rc<S> {
    fn into_select_value(self) -> SelectValue {
        SelectValue::Object(self)
    }
}

impl<T: IntoSelectValue> IntoSelectValue for Option<T> {
    fn into_select_value(self) -> SelectValue {
        self.map_or(SelectValue::Absent, IntoSelectValue::into_select_value)
    }
}

/// A type-erased observable property: its dependency handle and a reader.
#[derive(Clone)]
pub struct SelectLink {
    dependency: Dependency,
    read: Rc<dyn Fn() -> Result<SelectValue>>,
}

impl SelectLink {
    pub fn of<V, O>(observable: &O) -> Self
    where
        V: IntoSelectValue + 'static,
        O: ObservableValue<V> + Clone + 'static,
    {
        let source = observable.clone();
        Self {
            dependency: dependency(observable),
            read: Rc::new(move || source.value().map(IntoSelectValue::into_select_value)),
        }
    }

    pub fn read(&self) -> Result<SelectValue> {
        (self.read)()
    }

    #[must_use]
    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }
}

impl fmt::Debug for SelectLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SelectLink")
            .field(&self.dependency.id())
            .finish()
    }
}

/// Where a select path starts.
#[derive(Clone, Debug)]
pub enum SelectRoot {
    /// An observable holding the first object, observed for the binding's
    /// lifetime.
    Observable(SelectLink),
    /// A fixed object.
    Object(Rc<dyn Selectable>),
}

impl SelectRoot {
    pub fn observable<V, O>(observable: &O) -> Self
    where
        V: IntoSelectValue + 'static,
        O: ObservableValue<V> + Clone + 'static,
    {
        Self::Observable(SelectLink::of(observable))
    }
}

impl From<SelectLink> for SelectRoot {
    fn from(link: SelectLink) -> Self {
        Self::Observable(link)
    }
}

impl<S: Selectable> From<Rc<S>> for SelectRoot {
    fn from(object: Rc<S>) -> Self {
        Self::Object(object)
    }
}

impl fmt::Debug for dyn Selectable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Selectable")
    }
}

// ---------------------------------------------------------------------------
// Path resolution
// ---------------------------------------------------------------------------

struct SelectChain {
    root: SelectRoot,
    steps: Vec<String>,
    report: LinkReport,
    /// Links observed by the last evaluation, in path order.
    links: RefCell<Vec<SelectLink>>,
    observer: InvalidationListener,
    binding: RefCell<Option<WeakBinding<SelectValue>>>,
}

struct SelectObserver {
    chain: Weak<SelectChain>,
}

impl InvalidationCallback for SelectObserver {
    fn invalidated(&self, observable: &dyn Observable) {
        if let Some(chain) = self.chain.upgrade() {
            chain.link_invalidated(observable);
        }
    }

    fn is_alive(&self) -> bool {
        self.chain.strong_count() > 0
    }
}

impl SelectChain {
    fn resolve(&self) -> Result<SelectValue> {
        self.unlink_from(0);
        let mut current = match &self.root {
            SelectRoot::Observable(link) => link.read()?,
            SelectRoot::Object(object) => SelectValue::Object(Rc::clone(object)),
        };
        for (step, name) in self.steps.iter().enumerate() {
            let object = match current {
                SelectValue::Object(object) => object,
                SelectValue::Absent => {
                    self.broken(step, name, "absent value");
                    return Ok(SelectValue::Absent);
                }
                other => {
                    self.broken(step, name, other.kind_name());
                    return Ok(SelectValue::Absent);
                }
            };
            let Some(link) = object.select_property(name) else {
                self.broken(step, name, "no such property");
                return Ok(SelectValue::Absent);
            };
            link.dependency.add_listener(self.observer.clone());
            self.links.borrow_mut().push(link.clone());
            current = link.read()?;
        }
        Ok(current)
    }

    fn link_invalidated(&self, observable: &dyn Observable) {
        let id = observable.id();
        let position = self
            .links
            .borrow()
            .iter()
            .position(|link| link.dependency.id() == id);
        match position {
            Some(position) => self.unlink_from(position + 1),
            // The root moved: every link hangs off the old root object.
            None => self.unlink_from(0),
        }
        let binding = self.binding.borrow().as_ref().and_then(WeakBinding::upgrade);
        if let Some(binding) = binding {
            binding.invalidate();
        }
    }

    fn unlink_from(&self, position: usize) {
        let released = {
            let mut links = self.links.borrow_mut();
            if position >= links.len() {
                return;
            }
            links.split_off(position)
        };
        for link in released {
            link.dependency.remove_listener(&self.observer);
        }
    }

    fn broken(&self, step: usize, property: &str, reason: &str) {
        report_broken(self.report, step, property, reason);
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn report_broken(report: LinkReport, step: usize, property: &str, reason: &str) {
    match report {
        LinkReport::Silent => {}
        LinkReport::Debug => {
            debug!(message = "select.broken_link", step, property, reason);
        }
        LinkReport::Warn => {
            warn!(message = "select.broken_link", step, property, reason);
        }
    }
}

fn parse_path<P: AsRef<str>>(
    path: impl IntoIterator<Item = P>,
    config: &SelectConfig,
) -> Result<Vec<String>> {
    let mut steps = Vec::new();
    for segment in path {
        let segment = segment.as_ref();
        if config.split_dotted {
            steps.extend(segment.split('.').map(str::to_owned));
        } else {
            steps.push(segment.to_owned());
        }
    }
    if steps.is_empty() {
        return Err(BindingError::invalid("select path is empty"));
    }
    if steps.iter().any(|s| s.trim().is_empty()) {
        return Err(BindingError::invalid(format!(
            "select path {steps:?} has an empty segment"
        )));
    }
    Ok(steps)
}

/// The value at the end of `path`, [`SelectValue::Absent`] on a broken link.
///
/// # Errors
///
/// `InvalidArgument` if the path is empty or has an empty segment.
pub fn select<P: AsRef<str>>(
    root: impl Into<SelectRoot>,
    path: impl IntoIterator<Item = P>,
) -> Result<Binding<SelectValue>> {
    select_with_config(root, path, &SelectConfig::default())
}

/// [`select`] with explicit path splitting and broken-link reporting.
pub fn select_with_config<P: AsRef<str>>(
    root: impl Into<SelectRoot>,
    path: impl IntoIterator<Item = P>,
    config: &SelectConfig,
) -> Result<Binding<SelectValue>> {
    let steps = parse_path(path, config)?;
    let root = root.into();
    let root_dependency = match &root {
        SelectRoot::Observable(link) => Some(Rc::clone(&link.dependency)),
        SelectRoot::Object(_) => None,
    };
    let chain = Rc::new_cyclic(|weak: &Weak<SelectChain>| SelectChain {
        root,
        steps,
        report: config.report,
        links: RefCell::new(Vec::new()),
        observer: InvalidationListener::from_callback(Rc::new(SelectObserver {
            chain: weak.clone(),
        })),
        binding: RefCell::new(None),
    });
    if let Some(root) = &root_dependency {
        root.add_listener(chain.observer.clone());
    }

    let resolver = Rc::clone(&chain);
    let binding = Binding::new(move || resolver.resolve());
    *chain.binding.borrow_mut() = Some(binding.downgrade());
    binding.on_dispose(move || {
        chain.unlink_from(0);
        if let Some(root) = &root_dependency {
            root.remove_listener(&chain.observer);
        }
    });
    Ok(binding)
}

fn select_typed<R, P>(
    root: impl Into<SelectRoot>,
    path: impl IntoIterator<Item = P>,
    extract: impl Fn(&SelectValue) -> Option<R> + 'static,
    default: R,
) -> Result<Binding<R>>
where
    R: Clone + PartialEq + 'static,
    P: AsRef<str>,
{
    let config = SelectConfig::default();
    let path: Vec<String> = path.into_iter().map(|s| s.as_ref().to_owned()).collect();
    let inner = select_with_config(root, &path, &config)?;
    let terminal = path.last().cloned().unwrap_or_default();
    let source = inner.clone();
    let typed = Binding::derived(
        move || {
            let value = source.get()?;
            if value.is_absent() {
                return Ok(default.clone());
            }
            Ok(extract(&value).unwrap_or_else(|| {
                report_broken(config.report, path.len(), &terminal, value.kind_name());
                default.clone()
            }))
        },
        [dependency(&inner)],
    );
    typed.on_dispose(move || inner.dispose());
    Ok(typed)
}

pub fn select_boolean<P: AsRef<str>>(
    root: impl Into<SelectRoot>,
    path: impl IntoIterator<Item = P>,
) -> Result<Binding<bool>> {
    select_typed(root, path, SelectValue::as_bool, false)
}

macro_rules! select_number {
    ($($name:ident => $ty:ty, $cast:ident, $zero:expr);* $(;)?) => {
        $(pub fn $name<P: AsRef<str>>(
            root: impl Into<SelectRoot>,
            path: impl IntoIterator<Item = P>,
        ) -> Result<Binding<$ty>> {
            select_typed(root, path, |v| v.as_number().map(Number::$cast), $zero)
        })*
    };
}

select_number! {
    select_integer => i32, as_i32, 0;
    select_long => i64, as_i64, 0;
    select_float => f32, as_f32, 0.0;
    select_double => f64, as_f64, 0.0;
}

/// Text at the end of the path; `""` on a broken link or absent value.
pub fn select_string<P: AsRef<str>>(
    root: impl Into<SelectRoot>,
    path: impl IntoIterator<Item = P>,
) -> Result<Binding<Option<String>>> {
    select_typed(
        root,
        path,
        |v| v.as_text().map(|s| Some(s.to_owned())),
        Some(String::new()),
    )
}

/// The object at the end of the path if it is a `T`.
pub fn select_object<T, P>(
    root: impl Into<SelectRoot>,
    path: impl IntoIterator<Item = P>,
) -> Result<Binding<Option<Rc<T>>>>
where
    T: Selectable + PartialEq,
    P: AsRef<str>,
{
    select_typed(
        root,
        path,
        |v| {
            let object: Rc<dyn Any> = v.as_object()?.clone();
            object.downcast::<T>().ok().map(Some)
        },
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{IntegerProperty, Property, StringProperty};

    struct Address {
        city: StringProperty,
    }

    impl Address {
        fn new(city: &str) -> Rc<Self> {
            Rc::new(Self {
                city: StringProperty::of(city),
            })
        }
    }

    impl PartialEq for Address {
        fn eq(&self, other: &Self) -> bool {
            self.city.ptr_eq(&other.city)
        }
    }

    impl Selectable for Address {
        fn select_property(&self, name: &str) -> Option<SelectLink> {
            match name {
                "city" => Some(SelectLink::of(&self.city)),
                _ => None,
            }
        }
    }

    struct Person {
        address: Property<Option<Rc<Address>>>,
        age: IntegerProperty,
    }

    impl PartialEq for Person {
        fn eq(&self, other: &Self) -> bool {
            self.age.ptr_eq(&other.age)
        }
    }

    impl Selectable for Person {
        fn select_property(&self, name: &str) -> Option<SelectLink> {
            match name {
                "address" => Some(SelectLink::of(&self.address)),
                "age" => Some(SelectLink::of(&self.age)),
                _ => None,
            }
        }
    }

    fn person(city: &str) -> Rc<Person> {
        Rc::new(Person {
            address: Property::new(Some(Address::new(city))),
            age: IntegerProperty::new(30),
        })
    }

    #[test]
    fn follows_a_path_from_a_fixed_root() {
        let p = person("Oslo");
        let city = select_string(Rc::clone(&p), ["address", "city"]).ok();
        let read = || city.as_ref().and_then(|b| b.get().ok()).flatten();
        assert_eq!(read().as_deref(), Some("Oslo"));
        if let Some(address) = p.address.get() {
            address.city.set(Some("Bergen".into()));
        }
        assert_eq!(read().as_deref(), Some("Bergen"));
    }

    #[test]
    fn rewires_when_an_intermediate_link_changes() {
        let p = person("Oslo");
        let old = p.address.get();
        let city = select(Rc::clone(&p), ["address.city"]).ok();
        assert_eq!(
            city.as_ref().and_then(|b| b.get().ok()),
            Some(SelectValue::Text("Oslo".into()))
        );
        let next = Address::new("Rome");
        p.address.set(Some(Rc::clone(&next)));
        let old_listeners = old.as_ref().map(|a| a.city.invalidation_listener_count());
        assert_eq!(old_listeners, Some(0));
        assert_eq!(
            city.as_ref().and_then(|b| b.get().ok()),
            Some(SelectValue::Text("Rome".into()))
        );
        assert_eq!(next.city.invalidation_listener_count(), 1);
        if let Some(old) = old {
            old.city.set(Some("ignored".into()));
        }
        assert_eq!(city.as_ref().map(Binding::is_valid), Some(true));
    }

    #[test]
    fn broken_links_yield_defaults() {
        let p = person("Oslo");
        p.address.set(None);
        let city = select_string(Rc::clone(&p), ["address", "city"]).ok();
        assert_eq!(
            city.and_then(|b| b.get().ok()).flatten().as_deref(),
            Some("")
        );
        let missing = select_integer(Rc::clone(&p), ["salary"]).ok();
        assert_eq!(missing.and_then(|b| b.get().ok()), Some(0));
        let mistyped = select_boolean(Rc::clone(&p), ["age"]).ok();
        assert_eq!(mistyped.and_then(|b| b.get().ok()), Some(false));
    }

    #[test]
    fn numeric_selects_convert_kind() {
        let p = person("Oslo");
        let age = select_double(Rc::clone(&p), ["age"]).ok();
        assert_eq!(age.as_ref().and_then(|b| b.get().ok()), Some(30.0));
        p.age.set(31);
        assert_eq!(age.and_then(|b| b.get().ok()), Some(31.0));
    }

    #[test]
    fn observable_root_follows_the_current_object() {
        let current: Property<Option<Rc<Person>>> = Property::new(Some(person("Oslo")));
        let city = select_string(SelectRoot::observable(&current), ["address", "city"]).ok();
        let read = || city.as_ref().and_then(|b| b.get().ok()).flatten();
        assert_eq!(read().as_deref(), Some("Oslo"));
        current.set(Some(person("Lima")));
        assert_eq!(read().as_deref(), Some("Lima"));
        current.set(None);
        assert_eq!(read().as_deref(), Some(""));
    }

    #[test]
    fn root_change_releases_old_links_before_the_next_read() {
        let first = person("Oslo");
        let current: Property<Option<Rc<Person>>> = Property::new(Some(Rc::clone(&first)));
        let city = select(SelectRoot::observable(&current), ["address", "city"]).ok();
        assert_eq!(
            city.as_ref().and_then(|b| b.get().ok()),
            Some(SelectValue::Text("Oslo".into()))
        );
        assert_eq!(first.address.invalidation_listener_count(), 1);

        current.set(Some(person("Lima")));
        assert_eq!(first.address.invalidation_listener_count(), 0);
        assert_eq!(city.as_ref().map(Binding::is_valid), Some(false));

        if let Some(city) = &city {
            city.dispose();
        }
        assert_eq!(current.invalidation_listener_count(), 0);
    }

    #[test]
    fn select_object_downcasts() {
        let p = person("Oslo");
        let address = select_object::<Address, _>(Rc::clone(&p), ["address"]).ok();
        let found = address.and_then(|b| b.get().ok()).flatten();
        assert!(found.is_some_and(|a| a.city.get().as_deref() == Some("Oslo")));
        let wrong = select_object::<Person, _>(Rc::clone(&p), ["address"]).ok();
        assert_eq!(wrong.and_then(|b| b.get().ok()).map(|o| o.is_none()), Some(true));
    }

    #[test]
    fn empty_paths_are_rejected() {
        let p = person("Oslo");
        let none: [&str; 0] = [];
        assert!(matches!(
            select(Rc::clone(&p), none),
            Err(BindingError::InvalidArgument { .. })
        ));
        assert!(select(Rc::clone(&p), ["address..city"]).is_err());
    }

    #[test]
    fn undotted_config_keeps_segments_whole() {
        let p = person("Oslo");
        let config = SelectConfig::default()
            .with_split_dotted(false)
            .with_report(LinkReport::Silent);
        let b = select_with_config(Rc::clone(&p), ["address.city"], &config).ok();
        assert_eq!(b.and_then(|b| b.get().ok()), Some(SelectValue::Absent));
    }

    #[test]
    fn dispose_releases_links() {
        let p = person("Oslo");
        let city = select(Rc::clone(&p), ["address", "city"]).ok();
        if let Some(city) = &city {
            city.get().ok();
            assert_eq!(p.address.invalidation_listener_count(), 1);
            city.dispose();
        }
        assert_eq!(p.address.invalidation_listener_count(), 0);
    }

    #[cfg(feature = "tracing")]
    mod tracing_events {
        use super::*;
        use std::sync::{Arc, Mutex};
        use tracing::{Level, Subscriber};
        use tracing_subscriber::Layer;
        use tracing_subscriber::layer::{Context, SubscriberExt};

        struct LevelCapture {
            events: Arc<Mutex<Vec<(Level, String)>>>,
        }

        impl<S> Layer<S> for LevelCapture
        where
            S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
        {
            fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                struct Msg(Option<String>);
                impl tracing::field::Visit for Msg {
                    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                        if field.name() == "message" {
                            self.0 = Some(value.to_string());
                        }
                    }

                    fn record_debug(
                        &mut self,
                        field: &tracing::field::Field,
                        value: &dyn std::fmt::Debug,
                    ) {
                        if field.name() == "message" {
                            self.0 = Some(format!("{value:?}").trim_matches('"').to_string());
                        }
                    }
                }
                let mut msg = Msg(None);
                event.record(&mut msg);
                if let Some(message) = msg.0 {
                    self.events
                        .lock()
                        .expect("capture lock")
                        .push((*event.metadata().level(), message));
                }
            }
        }

        fn capture(config: SelectConfig) -> Vec<(Level, String)> {
            let events = Arc::new(Mutex::new(Vec::new()));
            let subscriber = tracing_subscriber::registry().with(LevelCapture {
                events: Arc::clone(&events),
            });
            let _guard = tracing::subscriber::set_default(subscriber);
            let p = person("Oslo");
            if let Ok(b) = select_with_config(Rc::clone(&p), ["nickname"], &config) {
                b.get().ok();
            }
            events.lock().expect("capture lock").clone()
        }

        #[test]
        fn broken_link_level_follows_config() {
            let warned = capture(SelectConfig::default().with_report(LinkReport::Warn));
            assert!(
                warned
                    .iter()
                    .any(|(level, m)| *level == Level::WARN && m == "select.broken_link")
            );
            let silent = capture(SelectConfig::default().with_report(LinkReport::Silent));
            assert!(!silent.iter().any(|(_, m)| m == "select.broken_link"));
        }
    }
}

//! A `tracing` layer that collects the engine's structured events.
//!
//! ```
//! use rebind_harness::EventCapture;
//!
//! let capture = EventCapture::new();
//! let _guard = capture.install();
//! tracing::debug!(message = "binding.dispose", binding = "#1");
//! assert!(capture.contains("binding.dispose"));
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

/// One captured event: level, message and the other fields rendered as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl FieldVisitor {
    fn record(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.push((field.name().to_owned(), value));
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record(field, format!("{value:?}").trim_matches('"').to_owned());
    }
}

/// Collects events into a shared buffer. Clones share the buffer.
#[derive(Clone, Default)]
pub struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl EventCapture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install as the thread's default subscriber until the guard drops.
    #[must_use = "the capture is uninstalled when the guard drops"]
    pub fn install(&self) -> DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::set_default(subscriber)
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<CapturedEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.buffer().clone()
    }

    /// Messages in emission order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.buffer().iter().map(|e| e.message.clone()).collect()
    }

    #[must_use]
    pub fn contains(&self, message: &str) -> bool {
        self.buffer().iter().any(|e| e.message == message)
    }

    #[must_use]
    pub fn count(&self, message: &str) -> usize {
        self.buffer().iter().filter(|e| e.message == message).count()
    }

    pub fn clear(&self) {
        self.buffer().clear();
    }
}

impl fmt::Debug for EventCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventCapture")
            .field("events", &self.buffer().len())
            .finish()
    }
}

impl<S> Layer<S> for EventCapture
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let Some(message) = visitor.message else {
            return;
        };
        self.buffer().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields: visitor.fields,
        });
    }
}

//! Structured logging shims.
//!
//! With the `tracing` feature the usual `tracing` macros are re-exported from
//! here. Without it, crate-root macros of the same names expand to nothing,
//! so call sites compile identically either way:
//!
//! ```ignore
//! #[cfg(feature = "tracing")]
//! use crate::logging::trace;
//! #[cfg(not(feature = "tracing"))]
//! use crate::trace;
//! ```
//!
//! # Events
//!
//! | message                        | level | fields                       |
//! |--------------------------------|-------|------------------------------|
//! | `binding.invalidate`           | TRACE | `binding`                    |
//! | `binding.recompute`            | TRACE | `binding`, `version`         |
//! | `binding.dispose`              | DEBUG | `binding`, `dependencies`    |
//! | `listeners.change_read_failed` | WARN  | `observable`, `error`        |
//! | `bidirectional.bind`           | DEBUG | `a`, `b`                     |
//! | `bidirectional.unbind`         | DEBUG | `a`, `b`                     |
//! | `select.broken_link`           | DEBUG or WARN, see [`SelectConfig`] | `step`, `property`, `reason` |
//!
//! [`SelectConfig`]: crate::config::SelectConfig

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        ()
    };
}

#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        ()
    };
}

#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        ()
    };
}

/// Default filter used by [`init_json`] when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "rebind_core=info";

/// Install a global JSON subscriber filtered by `RUST_LOG`.
///
/// Falls back to [`DEFAULT_FILTER`] when the environment carries no filter.
/// Fails if a global subscriber is already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json() -> std::result::Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
}

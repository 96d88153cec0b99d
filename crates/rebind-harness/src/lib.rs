#![forbid(unsafe_code)]

//! Test fixtures for binding graphs.
//!
//! - [`watch`]: listener watchers that count invalidations, record changes,
//!   and count recomputations.
//! - [`evidence`]: an ordered event log shared by watchers, serializable as
//!   JSONL for postmortem analysis.
//! - [`capture`]: a `tracing` layer collecting the engine's structured
//!   events.

pub mod capture;
pub mod evidence;
pub mod watch;

pub use capture::{CapturedEvent, EventCapture};
pub use evidence::{Evidence, EvidenceLog};
pub use watch::{ChangeRecorder, InvalidationCounter, RecomputeCounter, counting_binding};

//! Configuration for behaviour that is policy rather than semantics.

use std::env;
use std::str::FromStr;

use crate::error::BindingError;

/// Environment variable read by [`SelectConfig::from_env`].
pub const SELECT_REPORT_ENV: &str = "REBIND_SELECT_REPORT";

/// How a select binding reports a broken link in its property path.
///
/// A broken link always yields the kind default; this only controls the
/// log level of the `select.broken_link` event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkReport {
    Silent,
    #[default]
    Debug,
    Warn,
}

impl FromStr for LinkReport {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            v if v.eq_ignore_ascii_case("silent") => Ok(Self::Silent),
            v if v.eq_ignore_ascii_case("debug") => Ok(Self::Debug),
            v if v.eq_ignore_ascii_case("warn") => Ok(Self::Warn),
            other => Err(BindingError::invalid(format!(
                "unknown link report level {other:?} (expected silent, debug or warn)"
            ))),
        }
    }
}

/// Options for [`select`](crate::bindings::select::select_with_config).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectConfig {
    /// Log level for broken links.
    pub report: LinkReport,
    /// Split path segments containing `.` into separate steps.
    pub split_dotted: bool,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            report: LinkReport::Debug,
            split_dotted: true,
        }
    }
}

impl SelectConfig {
    #[must_use]
    pub fn with_report(mut self, report: LinkReport) -> Self {
        self.report = report;
        self
    }

    #[must_use]
    pub fn with_split_dotted(mut self, split: bool) -> Self {
        self.split_dotted = split;
        self
    }

    /// Defaults, with `report` overridden by `REBIND_SELECT_REPORT` when it
    /// holds a recognized level.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_report_var(env::var(SELECT_REPORT_ENV).ok().as_deref())
    }

    fn from_report_var(value: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(report) = value.and_then(|v| v.parse().ok()) {
            config.report = report;
        }
        config
    }
}

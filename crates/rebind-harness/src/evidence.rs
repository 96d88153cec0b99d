//! Ordered evidence of what a binding graph did.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evidence {
    Invalidated { label: String },
    Changed { label: String, old: String, new: String },
    Recomputed { label: String, run: u64 },
}

impl Evidence {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Invalidated { label }
            | Self::Changed { label, .. }
            | Self::Recomputed { label, .. } => label,
        }
    }

    #[must_use]
    pub fn to_json(&self, seq: usize) -> Value {
        match self {
            Self::Invalidated { label } => json!({
                "seq": seq,
                "event": "invalidated",
                "label": label,
            }),
            Self::Changed { label, old, new } => json!({
                "seq": seq,
                "event": "changed",
                "label": label,
                "old": old,
                "new": new,
            }),
            Self::Recomputed { label, run } => json!({
                "seq": seq,
                "event": "recomputed",
                "label": label,
                "run": run,
            }),
        }
    }
}

/// Shared, append-only event log. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct EvidenceLog {
    events: Rc<RefCell<Vec<Evidence>>>,
}

impl EvidenceLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Evidence) {
        self.events.borrow_mut().push(event);
    }

    #[must_use]
    pub fn events(&self) -> Vec<Evidence> {
        self.events.borrow().clone()
    }

    /// Labels in recording order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .map(|e| e.label().to_owned())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// One JSON object per line, numbered by `seq`.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        let mut out = String::new();
        for (seq, event) in self.events.borrow().iter().enumerate() {
            out.push_str(&event.to_json(seq).to_string());
            out.push('\n');
        }
        out
    }
}

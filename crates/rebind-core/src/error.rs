//! Error taxonomy for binding evaluation and factory preconditions.
//!
//! Two families exist and must not be conflated:
//!
//! - [`EvaluationError`]: a binding could not produce a value when `get()`
//!   ran its compute function. It names the binding that failed and carries
//!   the cause. It surfaces to the caller of `get()` once per failed
//!   computation and is never retried or swallowed internally.
//! - Precondition violations ([`BindingError::InvalidArgument`],
//!   [`BindingError::SelfBinding`], [`BindingError::InvalidFormat`]): raised
//!   by a factory before any binding is constructed.
//!
//! Null-safe default substitution (absent strings comparing as empty,
//! broken select links) is policy, not an error, and never appears here.

use std::error::Error as StdError;

use thiserror::Error;

use crate::observable::ObservableId;

pub type Result<T> = std::result::Result<T, BindingError>;

#[derive(Debug, Error)]
pub enum BindingError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("cannot bind property {property} bidirectionally to itself")]
    SelfBinding { property: ObservableId },

    #[error("invalid format template {template:?}: {message}")]
    InvalidFormat { template: String, message: String },

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("unsupported operation on read-only collection: {operation}")]
    UnsupportedOperation { operation: &'static str },

    #[error("integer division by zero")]
    DivisionByZero,

    #[error("no entry for key {key}")]
    MissingKey { key: String },

    #[error("element {position} is absent")]
    AbsentElement { position: String },
}

impl BindingError {
    /// Wrap an arbitrary cause as an evaluation failure.
    ///
    /// The failing binding is filled in by `Binding::get` when the error
    /// leaves the compute function.
    #[must_use]
    pub fn evaluation(cause: impl Into<Box<dyn StdError + 'static>>) -> Self {
        Self::Evaluation(EvaluationError::new(cause))
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Whether this is an evaluation failure (as opposed to a precondition).
    #[must_use]
    pub fn is_evaluation(&self) -> bool {
        matches!(self, Self::Evaluation(_))
    }

    /// The evaluation failure, if this is one.
    #[must_use]
    pub fn as_evaluation(&self) -> Option<&EvaluationError> {
        match self {
            Self::Evaluation(err) => Some(err),
            _ => None,
        }
    }

    /// Attribute an evaluation failure to `binding`.
    ///
    /// Non-evaluation errors escaping a compute function are turned into
    /// evaluation errors. An error already attributed to an inner binding
    /// keeps its attribution, so the innermost failing binding is reported.
    #[must_use]
    pub fn attributed_to(self, binding: ObservableId) -> Self {
        match self {
            Self::Evaluation(mut err) => {
                if err.binding.is_none() {
                    err.binding = Some(binding);
                }
                Self::Evaluation(err)
            }
            other => Self::Evaluation(EvaluationError {
                binding: Some(binding),
                cause: Box::new(other),
            }),
        }
    }
}

/// A binding's compute function failed.
#[derive(Debug, Error)]
#[error("evaluation of binding {} failed: {cause}", binding_label(.binding))]
pub struct EvaluationError {
    binding: Option<ObservableId>,
    #[source]
    cause: Box<dyn StdError + 'static>,
}

impl EvaluationError {
    #[must_use]
    pub fn new(cause: impl Into<Box<dyn StdError + 'static>>) -> Self {
        Self {
            binding: None,
            cause: cause.into(),
        }
    }

    /// The binding whose computation failed.
    #[must_use]
    pub fn binding(&self) -> Option<ObservableId> {
        self.binding
    }

    #[must_use]
    pub fn cause(&self) -> &(dyn StdError + 'static) {
        self.cause.as_ref()
    }

    /// Downcast the cause to a concrete error type.
    #[must_use]
    pub fn cause_as<E: StdError + 'static>(&self) -> Option<&E> {
        self.cause.downcast_ref::<E>()
    }
}

fn binding_label(binding: &Option<ObservableId>) -> String {
    binding.map_or_else(|| "<unattributed>".to_string(), |id| id.to_string())
}

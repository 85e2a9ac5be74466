//! Error types for constraint construction and registration.
//!
//! Every failure is raised before anything is appended to the assertion
//! set, so a rejected call leaves the scheduling context untouched.

use thiserror::Error;

use crate::models::TaskId;

/// Errors raised while building a scheduling model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    /// A parameter is outside its allowed set: an unknown kind name, a
    /// negative offset, a malformed interval list, a bad horizon or duration.
    #[error("invalid parameter for {constraint}: {reason}")]
    Parameter {
        /// Label of the constraint or entity being built.
        constraint: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A structural precondition does not hold, e.g. a task that must be
    /// optional is mandatory.
    #[error("precondition violated for {constraint}: {reason}")]
    Precondition {
        /// Label of the constraint being built.
        constraint: String,
        /// Which precondition failed.
        reason: String,
    },

    /// A task handle that was not issued by this context.
    #[error("unknown task handle {0}")]
    UnknownTask(TaskId),

    /// A task name already used in this context.
    #[error("duplicate task name: {0}")]
    DuplicateName(String),

    /// Valuation checking met a variable without a value.
    #[error("no value bound for variable {0}")]
    UnboundVariable(String),

    /// Valuation checking left the `i64` range while evaluating a sum.
    #[error("integer overflow evaluating {0}")]
    Overflow(String),
}

impl ConstraintError {
    pub(crate) fn parameter(constraint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parameter {
            constraint: constraint.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn precondition(constraint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Precondition {
            constraint: constraint.into(),
            reason: reason.into(),
        }
    }

    /// Whether this is a parameter error.
    pub fn is_parameter(&self) -> bool {
        matches!(self, Self::Parameter { .. })
    }

    /// Whether this is a precondition error.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition { .. })
    }
}

/// Result type for model-building operations.
pub type Result<T> = std::result::Result<T, ConstraintError>;

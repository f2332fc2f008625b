//! # Domain Errors
//!
//! Error types raised by the scoring domain.
//!
//! Scoring functions themselves never fail on degenerate numeric input; the
//! variants here cover misconfiguration (weight vectors, dimension mismatches)
//! and records that fail schema validation at the ingestion boundary.

use crate::domain::value_objects::arithmetic::ArithmeticError;
use thiserror::Error;

/// Error type for domain operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// A weight vector does not sum to one or contains a negative weight.
    #[error("invalid weights for {model}: {reason}")]
    InvalidWeights {
        /// Name of the model or metric owning the weights.
        model: String,
        /// Why the weight vector was rejected.
        reason: String,
    },

    /// Parallel input slices have different lengths.
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Where the mismatch occurred.
        context: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// A scalar input is outside its accepted range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A business entity record failed schema validation.
    #[error("invalid entity {id}: {reason}")]
    InvalidEntity {
        /// Entity identifier (may be empty when the id itself is missing).
        id: String,
        /// Validation failure.
        reason: String,
    },

    /// Checked decimal arithmetic failed.
    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),
}

impl DomainError {
    /// Creates an invalid weights error.
    #[must_use]
    pub fn invalid_weights(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidWeights {
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates an invalid entity error.
    #[must_use]
    pub fn invalid_entity(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEntity {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error indicates a configuration problem rather
    /// than bad request data.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidWeights { .. })
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

//! # Application Errors
//!
//! Error types for the application layer.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── Domain(DomainError)       - Scoring math or entity validation failures
//! ├── Provider(ProviderError)   - Signal provider failures
//! ├── Validation(String)        - Request validation failures
//! ├── Timeout(String)           - Batch or entity deadline exceeded
//! ├── Configuration(String)     - Invalid engine configuration
//! └── Internal(String)          - Task failures and other bugs
//! ```
//!
//! # Examples
//!
//! ```
//! use dealscope::application::error::ApplicationError;
//! use dealscope::application::services::data_provider::ProviderError;
//!
//! let err = ApplicationError::validation("entities must not be empty");
//! assert!(err.is_validation());
//!
//! let err: ApplicationError = ProviderError::unavailable("feed offline").into();
//! assert!(err.is_retryable());
//! ```

use crate::application::services::data_provider::ProviderError;
use crate::domain::errors::DomainError;
use thiserror::Error;

/// Application layer error.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain error from the scoring math.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// Signal provider error.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Request validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A deadline was exceeded.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Engine configuration is invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout(message.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if retrying the request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider(e) => e.is_retryable(),
            Self::Timeout(_) => true,
            _ => false,
        }
    }

    /// Returns true if this is a validation error.
    ///
    /// Entity schema failures raised by the domain count as validation.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Domain(DomainError::InvalidEntity { .. } | DomainError::InvalidInput(_))
        )
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Configuration(_) => true,
            Self::Domain(e) => e.is_configuration(),
            _ => false,
        }
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

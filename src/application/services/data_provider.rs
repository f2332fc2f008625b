//! # Data Provider
//!
//! Capability trait for the market signals the scoring math consumes.
//!
//! This module provides:
//! - [`DataProvider`]: Async trait supplying [`EntitySignals`] for an entity
//! - [`FallbackSignalProvider`]: Chains providers, first success wins
//! - [`ProviderError`]: Provider failure modes
//!
//! Concrete providers live in `infrastructure::providers`.

use crate::domain::entities::{BusinessEntity, EntitySignals};
use crate::domain::value_objects::Timestamp;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error raised by a [`DataProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider cannot serve requests right now.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The provider has no signals for this entity.
    #[error("no signals for entity {0}")]
    NotFound(String),

    /// The provider returned unusable data.
    #[error("invalid data for entity {entity_id}: {reason}")]
    InvalidData {
        /// Entity the data belongs to.
        entity_id: String,
        /// Why the data was rejected.
        reason: String,
    },
}

impl ProviderError {
    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(entity_id: impl Into<String>) -> Self {
        Self::NotFound(entity_id.into())
    }

    /// Creates an invalid data error.
    #[must_use]
    pub fn invalid_data(entity_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            entity_id: entity_id.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Source of market signals for business entities.
///
/// Implementations must be deterministic for a given `(entity, as_of)`
/// pair; the scoring pipeline relies on this for idempotent reports.
#[async_trait]
pub trait DataProvider: Send + Sync + fmt::Debug {
    /// Returns the signals for `entity` as of `as_of`.
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` if no usable signals are available.
    async fn signals(
        &self,
        entity: &BusinessEntity,
        as_of: Timestamp,
    ) -> ProviderResult<EntitySignals>;

    /// Returns the provider name for logs.
    fn name(&self) -> &'static str;
}

/// A provider that tries several providers in order.
///
/// Returns the first success. If every provider fails, the last error is
/// returned; an empty chain reports [`ProviderError::NotFound`].
#[derive(Debug)]
pub struct FallbackSignalProvider {
    providers: Vec<Arc<dyn DataProvider>>,
}

impl FallbackSignalProvider {
    /// Creates a fallback provider from an ordered list.
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn DataProvider>>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl DataProvider for FallbackSignalProvider {
    async fn signals(
        &self,
        entity: &BusinessEntity,
        as_of: Timestamp,
    ) -> ProviderResult<EntitySignals> {
        let mut last_error = ProviderError::not_found(entity.id().as_str());
        for provider in &self.providers {
            match provider.signals(entity, as_of).await {
                Ok(signals) => return Ok(signals),
                Err(e) => {
                    tracing::debug!(
                        provider = provider.name(),
                        entity_id = %entity.id(),
                        error = %e,
                        "signal provider failed, trying next"
                    );
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::BusinessEntityBuilder;
    use rust_decimal::Decimal;

    #[derive(Debug)]
    struct FixedProvider(f64);

    #[async_trait]
    impl DataProvider for FixedProvider {
        async fn signals(
            &self,
            _entity: &BusinessEntity,
            _as_of: Timestamp,
        ) -> ProviderResult<EntitySignals> {
            Ok(EntitySignals {
                base_intensity: self.0,
                ..Default::default()
            })
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[derive(Debug)]
    struct FailingProvider;

    #[async_trait]
    impl DataProvider for FailingProvider {
        async fn signals(
            &self,
            _entity: &BusinessEntity,
            _as_of: Timestamp,
        ) -> ProviderResult<EntitySignals> {
            Err(ProviderError::unavailable("offline"))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn entity() -> BusinessEntity {
        BusinessEntityBuilder::new("e-1", "HVAC", Decimal::new(1_000_000, 0)).build()
    }

    fn as_of() -> Timestamp {
        Timestamp::from_secs(1_700_000_000).unwrap()
    }

    #[tokio::test]
    async fn fallback_skips_failures() {
        let provider = FallbackSignalProvider::new(vec![
            Arc::new(FailingProvider),
            Arc::new(FixedProvider(0.3)),
            Arc::new(FixedProvider(0.9)),
        ]);
        let signals = provider.signals(&entity(), as_of()).await.unwrap();
        assert!((signals.base_intensity - 0.3).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn fallback_returns_last_error() {
        let provider = FallbackSignalProvider::new(vec![Arc::new(FailingProvider)]);
        let err = provider.signals(&entity(), as_of()).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn empty_chain_is_not_found() {
        let provider = FallbackSignalProvider::new(vec![]);
        let err = provider.signals(&entity(), as_of()).await.unwrap_err();
        assert_eq!(err, ProviderError::not_found("e-1"));
    }

    #[test]
    fn retryability() {
        assert!(ProviderError::unavailable("down").is_retryable());
        assert!(!ProviderError::not_found("x").is_retryable());
        assert!(!ProviderError::invalid_data("x", "nan").is_retryable());
    }
}

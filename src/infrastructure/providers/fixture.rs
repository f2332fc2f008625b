//! # Static Signal Provider
//!
//! Serves caller-supplied signals from an in-memory table.
//!
//! Fixtures are keyed by entity id. Entities without a fixture receive the
//! default signals if one is configured, otherwise `NotFound`.
//!
//! # File Format
//!
//! ```json
//! {
//!   "default": { "signal_confidence": 0.5 },
//!   "entities": {
//!     "biz-1": { "competitor_counts": [4, 12, 40], "factors": { "synergy": 0.8 } }
//!   }
//! }
//! ```

use crate::application::services::data_provider::{DataProvider, ProviderError, ProviderResult};
use crate::domain::entities::{BusinessEntity, EntitySignals};
use crate::domain::value_objects::{EntityId, Timestamp};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FixtureFile {
    default: Option<EntitySignals>,
    entities: HashMap<EntityId, EntitySignals>,
}

/// Fixture-backed signal provider.
#[derive(Debug, Clone, Default)]
pub struct StaticSignalProvider {
    fixtures: HashMap<EntityId, EntitySignals>,
    default: Option<EntitySignals>,
}

impl StaticSignalProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fixture for one entity.
    #[must_use]
    pub fn with_fixture(mut self, entity_id: impl Into<String>, signals: EntitySignals) -> Self {
        self.fixtures.insert(EntityId::new(entity_id), signals);
        self
    }

    /// Sets the signals served to entities without a fixture.
    #[must_use]
    pub fn with_default(mut self, signals: EntitySignals) -> Self {
        self.default = Some(signals);
        self
    }

    /// Parses a fixture document.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: FixtureFile = serde_json::from_str(json)?;
        Ok(Self {
            fixtures: file.entities,
            default: file.default,
        })
    }

    /// Returns the number of entity fixtures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    /// Returns true if there are no entity fixtures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}

#[async_trait]
impl DataProvider for StaticSignalProvider {
    async fn signals(
        &self,
        entity: &BusinessEntity,
        _as_of: Timestamp,
    ) -> ProviderResult<EntitySignals> {
        let signals = self
            .fixtures
            .get(entity.id())
            .or(self.default.as_ref())
            .ok_or_else(|| ProviderError::not_found(entity.id().as_str()))?;

        if signals.competitor_revenues.iter().any(|r| !r.is_finite())
            || !signals.base_intensity.is_finite()
        {
            return Err(ProviderError::invalid_data(
                entity.id().as_str(),
                "non-finite value in fixture",
            ));
        }
        Ok(signals.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

//! # Seeded Signal Provider
//!
//! Deterministic synthetic signals for entities with no real market feed.
//!
//! Every entity gets its own [`StdRng`] seeded from the configured seed and a
//! hash of the entity id, so the same `(seed, entity, as_of)` always yields the
//! same signals and results do not depend on batch order or concurrency.
//!
//! The numbers are placeholders. They respect the ranges the scoring math
//! expects but carry a low `signal_confidence`, which widens the error bars of
//! every composite built on them.

use crate::application::services::data_provider::{DataProvider, ProviderResult};
use crate::domain::entities::{BusinessEntity, EntitySignals, FactorSignals};
use crate::domain::value_objects::Timestamp;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;

/// Default provider seed.
pub const DEFAULT_SEED: u64 = 0x5EED_DEA1;

/// Confidence attached to synthetic signals.
pub const SYNTHETIC_CONFIDENCE: f64 = 0.3;

const ACTIVITY_POINTS: usize = 96;
const EVENT_WINDOW_DAYS: i64 = 365;

/// Synthetic signal generator.
///
/// # Examples
///
/// ```
/// use dealscope::application::services::DataProvider;
/// use dealscope::domain::entities::BusinessEntityBuilder;
/// use dealscope::domain::value_objects::Timestamp;
/// use dealscope::infrastructure::providers::SeededSignalProvider;
/// use rust_decimal::Decimal;
///
/// let provider = SeededSignalProvider::new(7);
/// let entity = BusinessEntityBuilder::new("biz-1", "HVAC", Decimal::new(2_000_000, 0)).build();
/// let as_of = Timestamp::from_secs(1_700_000_000).unwrap();
///
/// let a = tokio_test::block_on(provider.signals(&entity, as_of)).unwrap();
/// let b = tokio_test::block_on(provider.signals(&entity, as_of)).unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SeededSignalProvider {
    seed: u64,
    scale_count: usize,
}

impl SeededSignalProvider {
    /// Creates a provider generating counts for three spatial scales.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            scale_count: 3,
        }
    }

    /// Sets how many spatial scales competitor counts are generated for.
    #[must_use]
    pub fn with_scale_count(mut self, scale_count: usize) -> Self {
        self.scale_count = scale_count;
        self
    }

    /// Returns the seed.
    #[inline]
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn rng_for(&self, entity: &BusinessEntity) -> StdRng {
        StdRng::seed_from_u64(self.seed ^ fnv1a(entity.id().as_str().as_bytes()))
    }

    fn generate(&self, entity: &BusinessEntity, as_of: Timestamp) -> EntitySignals {
        let mut rng = self.rng_for(entity);

        // counts grow with the search radius
        let mut count = rng.gen_range(1..12u32);
        let competitor_counts = (0..self.scale_count)
            .map(|_| {
                let current = count;
                count = count.saturating_mul(rng.gen_range(2..5u32));
                current
            })
            .collect();

        let revenue = entity.revenue().to_f64().unwrap_or(0.0).max(1.0);
        let competitor_revenues = (0..rng.gen_range(2..15usize))
            .map(|_| revenue * rng.gen_range(0.1..3.0))
            .collect();

        let mut event_dates: Vec<Timestamp> = (0..rng.gen_range(0..12usize))
            .map(|_| as_of.sub_days(rng.gen_range(0..EVENT_WINDOW_DAYS)))
            .collect();
        event_dates.sort();

        let phase = rng.gen_range(0.0..std::f64::consts::TAU);
        let period = rng.gen_range(8.0..32.0);
        let mut level = 100.0;
        let activity_series = (0..ACTIVITY_POINTS)
            .map(|i| {
                level += rng.gen_range(-1.0..1.0);
                level + 10.0 * ((i as f64) * std::f64::consts::TAU / period + phase).sin()
            })
            .collect();

        let mut unit = || rng.gen_range(0.0..=1.0);
        let factors = FactorSignals {
            geo_fit: unit(),
            synergy: unit(),
            market_position: unit(),
            operational_efficiency: unit(),
            growth_potential: unit(),
            integration_risk: unit(),
            diversification_benefit: unit(),
            liquidity: unit(),
            correlation_benefit: unit(),
            digital_neglect: unit(),
            review_decay: unit(),
            regulatory_risk: unit(),
            financial_stress: unit(),
        };

        EntitySignals {
            competitor_counts,
            competitor_revenues,
            event_dates,
            base_intensity: rng.gen_range(0.05..0.5),
            activity_series,
            factors,
            signal_confidence: SYNTHETIC_CONFIDENCE,
        }
    }
}

impl Default for SeededSignalProvider {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

#[async_trait]
impl DataProvider for SeededSignalProvider {
    async fn signals(
        &self,
        entity: &BusinessEntity,
        as_of: Timestamp,
    ) -> ProviderResult<EntitySignals> {
        Ok(self.generate(entity, as_of))
    }

    fn name(&self) -> &'static str {
        "seeded"
    }
}

/// 64-bit FNV-1a. Must stay stable across releases.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(PRIME))
}

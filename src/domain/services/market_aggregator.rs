//! # Market Aggregator
//!
//! Rolls a population of scored entities up into a [`MarketSnapshot`].

use crate::domain::entities::MarketSnapshot;
use crate::domain::services::metric_computer::hhi_from_revenues;
use crate::domain::value_objects::{ConcentrationLabel, Timestamp};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// The per-entity figures a snapshot aggregates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketObservation {
    /// Entity revenue.
    pub revenue: Decimal,
    /// `SRI` value.
    pub succession_risk: f64,
    /// `MROS` value.
    pub rollup_score: f64,
}

/// Builds market snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketAggregator;

impl MarketAggregator {
    /// Creates a new aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Aggregates `observations` into a snapshot.
    ///
    /// An empty population, or one without revenue, has HHI and
    /// fragmentation of zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use dealscope::domain::services::market_aggregator::{MarketAggregator, MarketObservation};
    /// use dealscope::domain::value_objects::{ConcentrationLabel, Timestamp};
    /// use rust_decimal::Decimal;
    ///
    /// let obs = |revenue| MarketObservation {
    ///     revenue: Decimal::new(revenue, 0),
    ///     succession_risk: 0.4,
    ///     rollup_score: 0.6,
    /// };
    /// let as_of = Timestamp::from_secs(1_700_000_000).unwrap();
    /// let market = [obs(100), obs(100), obs(100), obs(100)];
    /// let snapshot = MarketAggregator::new().aggregate(&market, as_of);
    ///
    /// assert!((snapshot.hhi - 0.25).abs() < 1e-12);
    /// assert_eq!(snapshot.concentration, ConcentrationLabel::Moderate);
    /// ```
    #[must_use]
    pub fn aggregate(
        &self,
        observations: &[MarketObservation],
        as_of: Timestamp,
    ) -> MarketSnapshot {
        if observations.is_empty() {
            return MarketSnapshot::empty();
        }

        let total_revenue = observations
            .iter()
            .fold(Decimal::ZERO, |total, o| total.saturating_add(o.revenue));

        let revenues: Vec<f64> = observations
            .iter()
            .map(|o| o.revenue.to_f64().unwrap_or(0.0))
            .collect();
        let hhi = hhi_from_revenues(&revenues, as_of).value();
        let fragmentation_index = if total_revenue > Decimal::ZERO {
            1.0 - hhi
        } else {
            0.0
        };

        let n = observations.len() as f64;
        let avg_succession_risk = observations.iter().map(|o| o.succession_risk).sum::<f64>() / n;
        let avg_rollup_score = observations.iter().map(|o| o.rollup_score).sum::<f64>() / n;

        MarketSnapshot {
            entity_count: observations.len(),
            total_revenue,
            hhi,
            fragmentation_index,
            avg_succession_risk,
            avg_rollup_score,
            concentration: ConcentrationLabel::from_hhi(hhi),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn as_of() -> Timestamp {
        Timestamp::from_secs(1_700_000_000).unwrap()
    }

    fn observation(revenue: i64, sri: f64, mros: f64) -> MarketObservation {
        MarketObservation {
            revenue: Decimal::new(revenue, 0),
            succession_risk: sri,
            rollup_score: mros,
        }
    }

    #[test]
    fn empty_population_is_all_zero() {
        let snapshot = MarketAggregator::new().aggregate(&[], as_of());
        assert_eq!(snapshot, MarketSnapshot::empty());
        assert_eq!(snapshot.entity_count, 0);
        assert!(snapshot.hhi.abs() < f64::EPSILON);
        assert!(snapshot.avg_succession_risk.abs() < f64::EPSILON);
    }

    #[test]
    fn zero_revenue_population() {
        let snapshot = MarketAggregator::new()
            .aggregate(&[observation(0, 0.2, 0.4), observation(0, 0.4, 0.6)], as_of());
        assert_eq!(snapshot.entity_count, 2);
        assert!(snapshot.hhi.abs() < f64::EPSILON);
        assert!(snapshot.fragmentation_index.abs() < f64::EPSILON);
        assert!((snapshot.avg_succession_risk - 0.3).abs() < 1e-12);
        assert_eq!(snapshot.concentration, ConcentrationLabel::Fragmented);
    }

    #[test]
    fn monopoly_is_concentrated() {
        let snapshot = MarketAggregator::new().aggregate(&[observation(1_000, 0.1, 0.1)], as_of());
        assert!((snapshot.hhi - 1.0).abs() < 1e-12);
        assert!(snapshot.fragmentation_index.abs() < 1e-12);
        assert_eq!(snapshot.concentration, ConcentrationLabel::Concentrated);
    }

    #[test]
    fn fragmented_market() {
        let observations: Vec<_> = (0..10).map(|_| observation(500, 0.5, 0.7)).collect();
        let snapshot = MarketAggregator::new().aggregate(&observations, as_of());
        assert!((snapshot.hhi - 0.1).abs() < 1e-12);
        assert!((snapshot.fragmentation_index - 0.9).abs() < 1e-12);
        assert_eq!(snapshot.total_revenue, Decimal::new(5_000, 0));
        assert!((snapshot.avg_rollup_score - 0.7).abs() < 1e-12);
        assert_eq!(snapshot.concentration, ConcentrationLabel::Fragmented);
    }

    #[test]
    fn label_thresholds() {
        // shares 0.4, 0.2 × 3 → HHI 0.28
        let snapshot = MarketAggregator::new().aggregate(
            &[
                observation(40, 0.0, 0.0),
                observation(20, 0.0, 0.0),
                observation(20, 0.0, 0.0),
                observation(20, 0.0, 0.0),
            ],
            as_of(),
        );
        assert!((snapshot.hhi - 0.28).abs() < 1e-12);
        assert_eq!(snapshot.concentration, ConcentrationLabel::Concentrated);
    }
}

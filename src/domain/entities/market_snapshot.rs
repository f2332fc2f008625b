//! # Market Snapshot
//!
//! Population-level concentration and risk statistics.

use crate::domain::value_objects::ConcentrationLabel;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate statistics over the successfully scored entities of a batch.
///
/// An empty population yields all-zero statistics and a `fragmented` label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MarketSnapshot {
    /// Number of entities aggregated.
    pub entity_count: usize,
    /// Sum of entity revenues.
    pub total_revenue: Decimal,
    /// Herfindahl-Hirschman index of revenue shares.
    pub hhi: f64,
    /// `1 - hhi`, or 0 when there is no revenue.
    pub fragmentation_index: f64,
    /// Mean succession risk.
    pub avg_succession_risk: f64,
    /// Mean rollup opportunity score.
    pub avg_rollup_score: f64,
    /// Concentration classification of `hhi`.
    pub concentration: ConcentrationLabel,
}

impl MarketSnapshot {
    /// Snapshot of an empty population.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entity_count: 0,
            total_revenue: Decimal::ZERO,
            hhi: 0.0,
            fragmentation_index: 0.0,
            avg_succession_risk: 0.0,
            avg_rollup_score: 0.0,
            concentration: ConcentrationLabel::Fragmented,
        }
    }
}

impl fmt::Display for MarketSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Market(n={} hhi={:.4} {} sri={:.3} mros={:.3})",
            self.entity_count,
            self.hhi,
            self.concentration,
            self.avg_succession_risk,
            self.avg_rollup_score
        )
    }
}

//! # Entity Signals
//!
//! Market observations about one entity, supplied by a data provider.
//!
//! Signals are the inputs the scoring math needs but the entity record does
//! not carry: local competitor structure, market event history, an activity
//! time series, and a set of normalised factor signals. They may be synthetic
//! placeholders; the engine treats them as opaque numbers and only relies on
//! the ranges documented here.

use crate::domain::value_objects::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Neutral value used for factor signals a provider does not know.
pub const NEUTRAL_SIGNAL: f64 = 0.5;

/// Normalised factor signals in `[0, 1]`.
///
/// Values outside `[0, 1]` are tolerated here and clamped by the factor
/// models before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FactorSignals {
    /// Fit with the acquirer's geographic footprint.
    pub geo_fit: f64,
    /// Operational synergy with a platform company.
    pub synergy: f64,
    /// Competitive position in the local market.
    pub market_position: f64,
    /// Operational efficiency relative to peers.
    pub operational_efficiency: f64,
    /// Organic growth headroom.
    pub growth_potential: f64,
    /// Post-close integration risk.
    pub integration_risk: f64,
    /// Diversification contributed to an existing portfolio.
    pub diversification_benefit: f64,
    /// Ease of a later exit.
    pub liquidity: f64,
    /// Low correlation with existing holdings.
    pub correlation_benefit: f64,
    /// Neglect of web presence and digital channels.
    pub digital_neglect: f64,
    /// Decay in review volume and rating.
    pub review_decay: f64,
    /// Regulatory or licensing exposure.
    pub regulatory_risk: f64,
    /// Financial stress indicators.
    pub financial_stress: f64,
}

impl Default for FactorSignals {
    fn default() -> Self {
        Self {
            geo_fit: NEUTRAL_SIGNAL,
            synergy: NEUTRAL_SIGNAL,
            market_position: NEUTRAL_SIGNAL,
            operational_efficiency: NEUTRAL_SIGNAL,
            growth_potential: NEUTRAL_SIGNAL,
            integration_risk: NEUTRAL_SIGNAL,
            diversification_benefit: NEUTRAL_SIGNAL,
            liquidity: NEUTRAL_SIGNAL,
            correlation_benefit: NEUTRAL_SIGNAL,
            digital_neglect: NEUTRAL_SIGNAL,
            review_decay: NEUTRAL_SIGNAL,
            regulatory_risk: NEUTRAL_SIGNAL,
            financial_stress: NEUTRAL_SIGNAL,
        }
    }
}

/// Everything a provider knows about one entity's market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EntitySignals {
    /// Number of competitors at each fragmentation scale, aligned with the
    /// configured scales.
    pub competitor_counts: Vec<u32>,
    /// Annual revenues of local competitors, excluding the entity itself.
    pub competitor_revenues: Vec<f64>,
    /// Dates of qualifying market events (openings, closures, listings).
    pub event_dates: Vec<Timestamp>,
    /// Baseline event rate per lookback window.
    pub base_intensity: f64,
    /// Revenue or activity series, oldest first.
    pub activity_series: Vec<f64>,
    /// Normalised factor signals.
    pub factors: FactorSignals,
    /// Provider's confidence in the factor signals.
    pub signal_confidence: f64,
}

impl Default for EntitySignals {
    fn default() -> Self {
        Self {
            competitor_counts: Vec::new(),
            competitor_revenues: Vec::new(),
            event_dates: Vec::new(),
            base_intensity: 0.0,
            activity_series: Vec::new(),
            factors: FactorSignals::default(),
            signal_confidence: NEUTRAL_SIGNAL,
        }
    }
}

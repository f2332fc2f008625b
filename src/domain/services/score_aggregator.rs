//! # Score Aggregator
//!
//! Composite acquisition scores built from per-entity metrics and factor
//! signals.
//!
//! | Score | Meaning | Default factor table |
//! |-------|---------|----------------------|
//! | MROS | Market rollup opportunity | 0.30 fragmentation, 0.20 (1 − size), 0.25 geo fit, 0.25 synergy |
//! | AAS | Acquisition attractiveness | 0.25 financial health, 0.25 market position, 0.20 efficiency, 0.20 growth, 0.10 (1 − integration risk) |
//! | PCVS | Portfolio construction value | 0.30 diversification, 0.35 risk-adjusted return, 0.15 liquidity, 0.20 correlation benefit |
//!
//! Derived factors: `size = revenue / size_cap`, `financial_health =
//! 1 − financial_stress`, `risk_adjusted_return = AAS × (1 − SRI/2)`.
//!
//! Each score is a [`WeightedFactorModel`]; weights come from
//! [`ScoringConfig`] and are validated when the aggregator is built.

use crate::domain::entities::FactorSignals;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::services::weighted_factor::{
    Factor, FactorInput, FactorScore, Polarity, WeightedFactorModel,
};
use crate::domain::value_objects::{CheckedArithmetic, MetricResult, ScoringIntent, Timestamp};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Source tag of the rollup opportunity score.
pub const ROLLUP_TAG: &str = "rollup_opportunity";
/// Source tag of the acquisition attractiveness score.
pub const ACQUISITION_TAG: &str = "acquisition_attractiveness";
/// Source tag of the portfolio construction value score.
pub const PORTFOLIO_TAG: &str = "portfolio_value";

/// Default revenue at which the size factor saturates.
pub const DEFAULT_SIZE_CAP: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);

/// MROS factor weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollupWeights {
    /// Multi-scale fragmentation.
    pub fragmentation: f64,
    /// Inverse of normalised size.
    pub size: f64,
    /// Geographic fit.
    pub geo_fit: f64,
    /// Platform synergy.
    pub synergy: f64,
}

impl Default for RollupWeights {
    fn default() -> Self {
        Self {
            fragmentation: 0.30,
            size: 0.20,
            geo_fit: 0.25,
            synergy: 0.25,
        }
    }
}

/// AAS factor weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionWeights {
    /// `1 − financial_stress`.
    pub financial_health: f64,
    /// Market position.
    pub market_position: f64,
    /// Operational efficiency.
    pub operational_efficiency: f64,
    /// Growth potential.
    pub growth_potential: f64,
    /// Inverse of integration risk.
    pub integration_risk: f64,
}

impl Default for AcquisitionWeights {
    fn default() -> Self {
        Self {
            financial_health: 0.25,
            market_position: 0.25,
            operational_efficiency: 0.20,
            growth_potential: 0.20,
            integration_risk: 0.10,
        }
    }
}

/// PCVS factor weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioWeights {
    /// Diversification benefit.
    pub diversification: f64,
    /// `AAS × (1 − SRI/2)`.
    pub risk_adjusted_return: f64,
    /// Liquidity.
    pub liquidity: f64,
    /// Correlation benefit.
    pub correlation_benefit: f64,
}

impl Default for PortfolioWeights {
    fn default() -> Self {
        Self {
            diversification: 0.30,
            risk_adjusted_return: 0.35,
            liquidity: 0.15,
            correlation_benefit: 0.20,
        }
    }
}

/// Composite score configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// MROS weights.
    pub rollup: RollupWeights,
    /// AAS weights.
    pub acquisition: AcquisitionWeights,
    /// PCVS weights.
    pub portfolio: PortfolioWeights,
    /// Revenue at which the size factor reaches one.
    pub size_cap: Decimal,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            rollup: RollupWeights::default(),
            acquisition: AcquisitionWeights::default(),
            portfolio: PortfolioWeights::default(),
            size_cap: DEFAULT_SIZE_CAP,
        }
    }
}

/// Per-entity inputs to the composite scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringInputs {
    /// `FS_ms` value and confidence.
    pub fragmentation: FactorInput,
    /// Entity revenue.
    pub revenue: Decimal,
    /// `SRI` value and confidence.
    pub succession_risk: FactorInput,
    /// Provider factor signals.
    pub factors: FactorSignals,
    /// Provider confidence in `factors`.
    pub signal_confidence: f64,
}

struct CompanyContext {
    fragmentation: FactorInput,
    size: FactorInput,
    factors: FactorSignals,
    signal_confidence: f64,
}

impl CompanyContext {
    fn signal(&self, value: f64) -> FactorInput {
        FactorInput::new(value, self.signal_confidence)
    }
}

struct PortfolioContext {
    risk_adjusted_return: FactorInput,
    factors: FactorSignals,
    signal_confidence: f64,
}

impl PortfolioContext {
    fn signal(&self, value: f64) -> FactorInput {
        FactorInput::new(value, self.signal_confidence)
    }
}

/// The three composite scores of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeScores {
    /// Market rollup opportunity score.
    pub rollup: MetricResult,
    /// Acquisition attractiveness score.
    pub acquisition: MetricResult,
    /// Portfolio construction value score.
    pub portfolio: MetricResult,
}

impl CompositeScores {
    /// Returns the score that ranks entities for `intent`.
    #[must_use]
    pub fn for_intent(&self, intent: ScoringIntent) -> &MetricResult {
        match intent {
            ScoringIntent::Rollup => &self.rollup,
            ScoringIntent::Acquisition => &self.acquisition,
            ScoringIntent::Portfolio => &self.portfolio,
        }
    }
}

/// Builds MROS, AAS and PCVS from validated factor tables.
#[derive(Debug, Clone)]
pub struct ScoreAggregator {
    rollup: WeightedFactorModel<CompanyContext>,
    acquisition: WeightedFactorModel<CompanyContext>,
    portfolio: WeightedFactorModel<PortfolioContext>,
    size_cap: Decimal,
}

impl ScoreAggregator {
    /// Creates an aggregator from `config`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidWeights` if any weight table fails
    /// validation, or `DomainError::InvalidInput` if `size_cap` is not
    /// positive.
    pub fn new(config: &ScoringConfig) -> DomainResult<Self> {
        if config.size_cap <= Decimal::ZERO {
            return Err(DomainError::invalid_input("size_cap must be positive"));
        }

        let r = config.rollup;
        let rollup = WeightedFactorModel::new(
            ROLLUP_TAG,
            vec![
                Factor::new(
                    "fragmentation",
                    r.fragmentation,
                    Polarity::Direct,
                    |c: &CompanyContext| c.fragmentation,
                ),
                Factor::new("size", r.size, Polarity::Inverse, |c: &CompanyContext| c.size),
                Factor::new("geo_fit", r.geo_fit, Polarity::Direct, |c: &CompanyContext| {
                    c.signal(c.factors.geo_fit)
                }),
                Factor::new("synergy", r.synergy, Polarity::Direct, |c: &CompanyContext| {
                    c.signal(c.factors.synergy)
                }),
            ],
        )?;

        let a = config.acquisition;
        let acquisition = WeightedFactorModel::new(
            ACQUISITION_TAG,
            vec![
                Factor::new(
                    "financial_health",
                    a.financial_health,
                    Polarity::Inverse,
                    |c: &CompanyContext| c.signal(c.factors.financial_stress),
                ),
                Factor::new(
                    "market_position",
                    a.market_position,
                    Polarity::Direct,
                    |c: &CompanyContext| c.signal(c.factors.market_position),
                ),
                Factor::new(
                    "operational_efficiency",
                    a.operational_efficiency,
                    Polarity::Direct,
                    |c: &CompanyContext| c.signal(c.factors.operational_efficiency),
                ),
                Factor::new(
                    "growth_potential",
                    a.growth_potential,
                    Polarity::Direct,
                    |c: &CompanyContext| c.signal(c.factors.growth_potential),
                ),
                Factor::new(
                    "integration_risk",
                    a.integration_risk,
                    Polarity::Inverse,
                    |c: &CompanyContext| c.signal(c.factors.integration_risk),
                ),
            ],
        )?;

        let p = config.portfolio;
        let portfolio = WeightedFactorModel::new(
            PORTFOLIO_TAG,
            vec![
                Factor::new(
                    "diversification",
                    p.diversification,
                    Polarity::Direct,
                    |c: &PortfolioContext| c.signal(c.factors.diversification_benefit),
                ),
                Factor::new(
                    "risk_adjusted_return",
                    p.risk_adjusted_return,
                    Polarity::Direct,
                    |c: &PortfolioContext| c.risk_adjusted_return,
                ),
                Factor::new("liquidity", p.liquidity, Polarity::Direct, |c: &PortfolioContext| {
                    c.signal(c.factors.liquidity)
                }),
                Factor::new(
                    "correlation_benefit",
                    p.correlation_benefit,
                    Polarity::Direct,
                    |c: &PortfolioContext| c.signal(c.factors.correlation_benefit),
                ),
            ],
        )?;

        Ok(Self {
            rollup,
            acquisition,
            portfolio,
            size_cap: config.size_cap,
        })
    }

    /// Revenue normalised by the size cap, clamped to `[0, 1]`.
    #[must_use]
    pub fn size_norm(&self, revenue: Decimal) -> f64 {
        revenue
            .safe_div(self.size_cap)
            .ok()
            .and_then(|ratio| ratio.to_f64())
            .unwrap_or(1.0)
            .clamp(0.0, 1.0)
    }

    /// Computes the three composite scores of one entity.
    #[must_use]
    pub fn score(&self, inputs: &ScoringInputs, as_of: Timestamp) -> CompositeScores {
        let company = CompanyContext {
            fragmentation: inputs.fragmentation,
            size: FactorInput::certain(self.size_norm(inputs.revenue)),
            factors: inputs.factors,
            signal_confidence: inputs.signal_confidence,
        };

        let rollup = self.rollup.evaluate(&company);
        let acquisition = self.acquisition.evaluate(&company);
        let portfolio = self.portfolio.evaluate(&PortfolioContext {
            risk_adjusted_return: risk_adjusted_return(&acquisition, inputs.succession_risk),
            factors: inputs.factors,
            signal_confidence: inputs.signal_confidence,
        });

        CompositeScores {
            rollup: rollup.to_metric(ROLLUP_TAG, as_of),
            acquisition: acquisition.to_metric(ACQUISITION_TAG, as_of),
            portfolio: portfolio.to_metric(PORTFOLIO_TAG, as_of),
        }
    }
}

/// `AAS × (1 − SRI/2)` at the lower of the two confidences.
fn risk_adjusted_return(acquisition: &FactorScore, succession_risk: FactorInput) -> FactorInput {
    let sri = succession_risk.value.clamp(0.0, 1.0);
    FactorInput::new(
        acquisition.value * (1.0 - sri / 2.0),
        acquisition.confidence.min(succession_risk.confidence),
    )
}

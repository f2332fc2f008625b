//! # Valuation Estimator
//!
//! EBITDA-multiple enterprise value ranges and seller propensity.
//!
//! ```text
//! adjusted = industry_range + size_adjustment + Σ tag_penalty
//! EV_low   = max(adjusted.low  × EBITDA, floor_multiple × EBITDA)
//! EV_high  = max(adjusted.high × EBITDA, EV_low)
//! ```
//!
//! Size adjustment is −1 below $2M EBITDA, +1 above $10M, otherwise 0.
//! Tag penalties default to −0.5 (succession), −0.5 (digital neglect) and
//! −0.3 (reputation), applied once per tag occurrence.
//!
//! # Examples
//!
//! ```
//! use dealscope::domain::entities::BusinessEntityBuilder;
//! use dealscope::domain::services::valuation_estimator::{
//!     ValuationConfig, ValuationEstimator, ValuationInputs,
//! };
//! use rust_decimal::Decimal;
//!
//! let estimator = ValuationEstimator::new(ValuationConfig::default()).unwrap();
//! let entity = BusinessEntityBuilder::new("sec-1", "Security", Decimal::new(6_000_000, 0))
//!     .ebitda(Decimal::new(1_000_000, 0))
//!     .risk_factor("succession")
//!     .build();
//!
//! let inputs = ValuationInputs::neutral(Decimal::new(1_000_000, 0));
//! let valuation = estimator.estimate(&entity, &inputs).unwrap();
//! assert_eq!(valuation.ev_low, Decimal::new(2_500_000, 0));
//! assert_eq!(valuation.ev_high, Decimal::new(5_500_000, 0));
//! ```

use crate::domain::entities::{BusinessEntity, FactorSignals, MultipleRange, Valuation};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::services::weighted_factor::{
    Factor, FactorInput, Polarity, WeightedFactorModel,
};
use crate::domain::value_objects::arithmetic::{CheckedArithmetic, round_money};
use crate::domain::value_objects::{RiskLevel, RiskTag};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Source tag of the seller propensity model.
pub const SELLER_PROPENSITY_TAG: &str = "seller_propensity";

/// Tag penalties applied to both ends of the multiple range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPenalties {
    /// Penalty per `succession` tag.
    pub succession: Decimal,
    /// Penalty per `digital-neglect` tag.
    pub digital_neglect: Decimal,
    /// Penalty per `reputation` tag.
    pub reputation: Decimal,
    /// Penalty per `regulatory` tag.
    pub regulatory: Decimal,
    /// Penalty per `financial` tag.
    pub financial: Decimal,
}

impl Default for RiskPenalties {
    fn default() -> Self {
        Self {
            succession: Decimal::new(-5, 1),
            digital_neglect: Decimal::new(-5, 1),
            reputation: Decimal::new(-3, 1),
            regulatory: Decimal::ZERO,
            financial: Decimal::ZERO,
        }
    }
}

impl RiskPenalties {
    /// Returns the penalty for one occurrence of `tag`.
    #[must_use]
    pub fn for_tag(&self, tag: RiskTag) -> Decimal {
        match tag {
            RiskTag::Succession => self.succession,
            RiskTag::DigitalNeglect => self.digital_neglect,
            RiskTag::Reputation => self.reputation,
            RiskTag::Regulatory => self.regulatory,
            RiskTag::Financial => self.financial,
        }
    }

    fn iter(&self) -> impl Iterator<Item = Decimal> {
        [
            self.succession,
            self.digital_neglect,
            self.reputation,
            self.regulatory,
            self.financial,
        ]
        .into_iter()
    }
}

/// Seller propensity factor weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropensityWeights {
    /// Succession risk index.
    pub succession_risk: f64,
    /// Digital neglect signal.
    pub digital_neglect: f64,
    /// Entity age relative to the age horizon.
    pub entity_age: f64,
    /// Review decay signal.
    pub review_decay: f64,
    /// Regulatory risk signal.
    pub regulatory_risk: f64,
    /// Financial stress signal.
    pub financial_stress: f64,
}

impl Default for PropensityWeights {
    fn default() -> Self {
        Self {
            succession_risk: 0.30,
            digital_neglect: 0.15,
            entity_age: 0.15,
            review_decay: 0.10,
            regulatory_risk: 0.10,
            financial_stress: 0.20,
        }
    }
}

fn default_multiples() -> HashMap<String, MultipleRange> {
    let table: [(&str, i64, i64); 12] = [
        ("security", 40, 70),
        ("hvac", 45, 75),
        ("plumbing", 40, 65),
        ("electrical", 40, 65),
        ("landscaping", 30, 50),
        ("pest control", 50, 80),
        ("accounting", 40, 60),
        ("insurance agency", 60, 100),
        ("dental", 50, 80),
        ("veterinary", 60, 100),
        ("auto repair", 30, 50),
        ("restaurant", 20, 40),
    ];
    table
        .into_iter()
        .filter_map(|(industry, low, high)| {
            MultipleRange::new(Decimal::new(low, 1), Decimal::new(high, 1))
                .map(|range| (industry.to_string(), range))
        })
        .collect()
}

/// Valuation tables and thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    /// Multiple ranges keyed by lowercase industry name.
    pub multiples: HashMap<String, MultipleRange>,
    /// Range for industries missing from `multiples`.
    pub fallback_multiple: MultipleRange,
    /// EBITDA below which the size adjustment is `small_discount`.
    pub small_ebitda_threshold: Decimal,
    /// EBITDA above which the size adjustment is `large_premium`.
    pub large_ebitda_threshold: Decimal,
    /// Adjustment below `small_ebitda_threshold`.
    pub small_discount: Decimal,
    /// Adjustment above `large_ebitda_threshold`.
    pub large_premium: Decimal,
    /// Tag penalties.
    pub risk_penalties: RiskPenalties,
    /// `EV_low` never falls below this multiple of EBITDA.
    pub floor_multiple: Decimal,
    /// EBITDA margin assumed when an entity reports none.
    pub default_margin: Decimal,
    /// Years in business at which the entity-age factor saturates.
    pub entity_age_horizon_years: u32,
    /// Seller propensity weights.
    pub propensity: PropensityWeights,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            multiples: default_multiples(),
            fallback_multiple: MultipleRange::new(Decimal::new(5, 0), Decimal::new(9, 0))
                .unwrap_or_default(),
            small_ebitda_threshold: Decimal::new(2_000_000, 0),
            large_ebitda_threshold: Decimal::new(10_000_000, 0),
            small_discount: Decimal::NEGATIVE_ONE,
            large_premium: Decimal::ONE,
            risk_penalties: RiskPenalties::default(),
            floor_multiple: Decimal::TWO,
            default_margin: Decimal::new(15, 2),
            entity_age_horizon_years: 40,
            propensity: PropensityWeights::default(),
        }
    }
}

impl ValuationConfig {
    /// Validates thresholds, margins, penalties and multiple ranges.
    /// Propensity weights are checked when the estimator builds its model.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` for inverted ranges, negative
    /// thresholds, positive penalties, a margin outside `[0, 1]`, or a zero
    /// age horizon.
    pub fn validate(&self) -> DomainResult<()> {
        for (industry, range) in &self.multiples {
            if range.low() > range.high() {
                return Err(DomainError::invalid_input(format!(
                    "multiple range for {industry} is inverted: {range}"
                )));
            }
        }
        if self.fallback_multiple.low() > self.fallback_multiple.high() {
            return Err(DomainError::invalid_input("fallback multiple range is inverted"));
        }
        if self.small_ebitda_threshold < Decimal::ZERO
            || self.large_ebitda_threshold < self.small_ebitda_threshold
        {
            return Err(DomainError::invalid_input(
                "EBITDA thresholds must satisfy 0 <= small <= large",
            ));
        }
        if self.floor_multiple < Decimal::ZERO {
            return Err(DomainError::invalid_input("floor_multiple must be >= 0"));
        }
        if self.default_margin < Decimal::ZERO || self.default_margin > Decimal::ONE {
            return Err(DomainError::invalid_input("default_margin must be in [0, 1]"));
        }
        if self.risk_penalties.iter().any(|p| p > Decimal::ZERO) {
            return Err(DomainError::invalid_input("risk penalties must be <= 0"));
        }
        if self.entity_age_horizon_years == 0 {
            return Err(DomainError::invalid_input(
                "entity_age_horizon_years must be >= 1",
            ));
        }
        Ok(())
    }
}

/// Per-entity valuation inputs computed upstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuationInputs {
    /// Reported or estimated EBITDA.
    pub ebitda: Decimal,
    /// `SRI` value and confidence.
    pub succession_risk: FactorInput,
    /// Provider factor signals.
    pub factors: FactorSignals,
    /// Provider confidence in `factors`.
    pub signal_confidence: f64,
}

impl ValuationInputs {
    /// Inputs with neutral signals and no succession risk information.
    #[must_use]
    pub fn neutral(ebitda: Decimal) -> Self {
        Self {
            ebitda,
            succession_risk: FactorInput::new(0.0, 0.0),
            factors: FactorSignals::default(),
            signal_confidence: 0.0,
        }
    }
}

struct PropensityContext {
    succession_risk: FactorInput,
    entity_age: FactorInput,
    factors: FactorSignals,
    signal_confidence: f64,
}

impl PropensityContext {
    fn signal(&self, value: f64) -> FactorInput {
        FactorInput::new(value, self.signal_confidence)
    }
}

/// Multiple-based enterprise value estimator.
#[derive(Debug, Clone)]
pub struct ValuationEstimator {
    config: ValuationConfig,
    propensity: WeightedFactorModel<PropensityContext>,
}

impl ValuationEstimator {
    /// Creates an estimator after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`ValuationConfig::validate`].
    pub fn new(config: ValuationConfig) -> DomainResult<Self> {
        config.validate()?;

        let w = config.propensity;
        let propensity = WeightedFactorModel::new(
            SELLER_PROPENSITY_TAG,
            vec![
                Factor::new(
                    "succession_risk",
                    w.succession_risk,
                    Polarity::Direct,
                    |c: &PropensityContext| c.succession_risk,
                ),
                Factor::new(
                    "digital_neglect",
                    w.digital_neglect,
                    Polarity::Direct,
                    |c: &PropensityContext| c.signal(c.factors.digital_neglect),
                ),
                Factor::new(
                    "entity_age",
                    w.entity_age,
                    Polarity::Direct,
                    |c: &PropensityContext| c.entity_age,
                ),
                Factor::new(
                    "review_decay",
                    w.review_decay,
                    Polarity::Direct,
                    |c: &PropensityContext| c.signal(c.factors.review_decay),
                ),
                Factor::new(
                    "regulatory_risk",
                    w.regulatory_risk,
                    Polarity::Direct,
                    |c: &PropensityContext| c.signal(c.factors.regulatory_risk),
                ),
                Factor::new(
                    "financial_stress",
                    w.financial_stress,
                    Polarity::Direct,
                    |c: &PropensityContext| c.signal(c.factors.financial_stress),
                ),
            ],
        )?;

        Ok(Self { config, propensity })
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// Reported EBITDA, or revenue times `margin` (default margin if `None`).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Arithmetic` on decimal overflow.
    pub fn estimate_ebitda(
        &self,
        entity: &BusinessEntity,
        margin: Option<Decimal>,
    ) -> DomainResult<Decimal> {
        match entity.ebitda() {
            Some(ebitda) => Ok(ebitda),
            None => {
                let margin = margin.unwrap_or(self.config.default_margin);
                Ok(round_money(entity.revenue().safe_mul(margin)?))
            }
        }
    }

    /// Industry multiple range, case-insensitive, with fallback.
    #[must_use]
    pub fn base_multiple(&self, industry: &str) -> MultipleRange {
        self.config
            .multiples
            .get(&industry.trim().to_lowercase())
            .copied()
            .unwrap_or(self.config.fallback_multiple)
    }

    /// Size adjustment for an EBITDA figure.
    #[must_use]
    pub fn size_adjustment(&self, ebitda: Decimal) -> Decimal {
        if ebitda < self.config.small_ebitda_threshold {
            self.config.small_discount
        } else if ebitda > self.config.large_ebitda_threshold {
            self.config.large_premium
        } else {
            Decimal::ZERO
        }
    }

    /// Sum of tag penalties, once per occurrence.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Arithmetic` on decimal overflow.
    pub fn risk_penalty(&self, tags: &[RiskTag]) -> DomainResult<Decimal> {
        tags.iter()
            .try_fold(Decimal::ZERO, |total, tag| {
                total.safe_add(self.config.risk_penalties.for_tag(*tag))
            })
            .map_err(DomainError::from)
    }

    /// Enterprise value range for an adjusted multiple range.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Arithmetic` on decimal overflow.
    pub fn enterprise_value_range(
        &self,
        ebitda: Decimal,
        adjusted: MultipleRange,
    ) -> DomainResult<(Decimal, Decimal)> {
        let floor = ebitda.safe_mul(self.config.floor_multiple)?;
        let ev_low = adjusted.low().safe_mul(ebitda)?.max(floor);
        let ev_high = adjusted.high().safe_mul(ebitda)?.max(ev_low);
        Ok((round_money(ev_low), round_money(ev_high)))
    }

    /// Seller propensity in `0..=100`.
    #[must_use]
    pub fn seller_propensity(&self, entity: &BusinessEntity, inputs: &ValuationInputs) -> u8 {
        let horizon = f64::from(self.config.entity_age_horizon_years);
        let entity_age = FactorInput::new(
            f64::from(entity.years_in_business_or_default()) / horizon,
            if entity.years_in_business().is_some() { 1.0 } else { 0.5 },
        );
        let score = self.propensity.evaluate(&PropensityContext {
            succession_risk: inputs.succession_risk,
            entity_age,
            factors: inputs.factors,
            signal_confidence: inputs.signal_confidence,
        });
        // clamped to [0, 1] by the model
        (score.value * 100.0).round() as u8
    }

    /// Full valuation of one entity.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Arithmetic` on decimal overflow.
    pub fn estimate(
        &self,
        entity: &BusinessEntity,
        inputs: &ValuationInputs,
    ) -> DomainResult<Valuation> {
        let ebitda = inputs.ebitda;
        let base_multiple = self.base_multiple(entity.industry());
        let size_adjustment = self.size_adjustment(ebitda);
        let risk_penalty = self.risk_penalty(&entity.risk_tags())?;

        let adjusted_multiple = base_multiple.shifted(size_adjustment.safe_add(risk_penalty)?)?;

        let (ev_low, ev_high) = self.enterprise_value_range(ebitda, adjusted_multiple)?;

        Ok(Valuation {
            ebitda,
            base_multiple,
            size_adjustment,
            risk_penalty,
            adjusted_multiple,
            ev_low,
            ev_high,
            seller_propensity: self.seller_propensity(entity, inputs),
            risk_level: RiskLevel::from_tag_count(entity.risk_factors().len()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::BusinessEntityBuilder;

    fn estimator() -> ValuationEstimator {
        ValuationEstimator::new(ValuationConfig::default()).unwrap()
    }

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    mod configuration {
        use super::*;

        #[test]
        fn default_is_valid() {
            assert!(ValuationConfig::default().validate().is_ok());
            assert_eq!(ValuationConfig::default().fallback_multiple.low(), dec(5));
            assert_eq!(ValuationConfig::default().fallback_multiple.high(), dec(9));
        }

        #[test]
        fn propensity_weights_validated() {
            let config = ValuationConfig {
                propensity: PropensityWeights {
                    succession_risk: 0.9,
                    ..Default::default()
                },
                ..Default::default()
            };
            assert!(matches!(
                ValuationEstimator::new(config),
                Err(DomainError::InvalidWeights { .. })
            ));
        }

        #[test]
        fn positive_penalty_rejected() {
            let config = ValuationConfig {
                risk_penalties: RiskPenalties {
                    reputation: Decimal::ONE,
                    ..Default::default()
                },
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn margin_out_of_range_rejected() {
            let config = ValuationConfig {
                default_margin: Decimal::new(15, 1),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }
    }

    mod multiples {
        use super::*;

        #[test]
        fn lookup_is_case_insensitive() {
            let range = estimator().base_multiple("  SECURITY ");
            assert_eq!(range.low(), dec(4));
            assert_eq!(range.high(), dec(7));
        }

        #[test]
        fn unknown_industry_uses_fallback() {
            let range = estimator().base_multiple("Underwater Basket Weaving");
            assert_eq!(range.low(), dec(5));
            assert_eq!(range.high(), dec(9));
        }

        #[test]
        fn size_thresholds_are_strict() {
            let e = estimator();
            assert_eq!(e.size_adjustment(dec(1_999_999)), Decimal::NEGATIVE_ONE);
            assert_eq!(e.size_adjustment(dec(2_000_000)), Decimal::ZERO);
            assert_eq!(e.size_adjustment(dec(10_000_000)), Decimal::ZERO);
            assert_eq!(e.size_adjustment(dec(10_000_001)), Decimal::ONE);
        }

        #[test]
        fn penalties_per_occurrence() {
            let penalty = estimator()
                .risk_penalty(&[RiskTag::Succession, RiskTag::Succession, RiskTag::Reputation])
                .unwrap();
            assert_eq!(penalty, Decimal::new(-13, 1));
        }
    }

    mod enterprise_value {
        use super::*;

        #[test]
        fn security_with_succession_tag() {
            let entity = BusinessEntityBuilder::new("sec-1", "Security", dec(6_000_000))
                .ebitda(dec(1_000_000))
                .risk_factor("succession")
                .build();
            let valuation = estimator()
                .estimate(&entity, &ValuationInputs::neutral(dec(1_000_000)))
                .unwrap();

            assert_eq!(valuation.adjusted_multiple.low(), Decimal::new(25, 1));
            assert_eq!(valuation.adjusted_multiple.high(), Decimal::new(55, 1));
            assert_eq!(valuation.ev_low, dec(2_500_000));
            assert_eq!(valuation.ev_high, dec(5_500_000));
            assert_eq!(valuation.ev_midpoint(), dec(4_000_000));
            assert_eq!(valuation.risk_level, RiskLevel::Medium);
        }

        #[test]
        fn floor_at_twice_ebitda() {
            let entity = BusinessEntityBuilder::new("r-1", "Restaurant", dec(3_000_000))
                .ebitda(dec(500_000))
                .risk_factor("succession")
                .risk_factor("digital-neglect")
                .build();
            let valuation = estimator()
                .estimate(&entity, &ValuationInputs::neutral(dec(500_000)))
                .unwrap();

            // [2, 4] − 1 − 1 = [0, 2]
            assert_eq!(valuation.ev_low, dec(1_000_000));
            assert_eq!(valuation.ev_high, dec(1_000_000));
            assert!(valuation.ev_low <= valuation.ev_high);
            assert_eq!(valuation.risk_level, RiskLevel::High);
        }

        #[test]
        fn large_ebitda_premium() {
            let entity = BusinessEntityBuilder::new("h-1", "HVAC", dec(80_000_000))
                .ebitda(dec(12_000_000))
                .build();
            let valuation = estimator()
                .estimate(&entity, &ValuationInputs::neutral(dec(12_000_000)))
                .unwrap();
            assert_eq!(valuation.adjusted_multiple.low(), Decimal::new(55, 1));
            assert_eq!(valuation.ev_low, dec(66_000_000));
            assert_eq!(valuation.risk_level, RiskLevel::Low);
        }

        #[test]
        fn unrecognised_tags_count_for_risk_level_only() {
            let entity = BusinessEntityBuilder::new("x", "Security", dec(6_000_000))
                .risk_factor("lawsuit")
                .build();
            let valuation = estimator()
                .estimate(&entity, &ValuationInputs::neutral(dec(3_000_000)))
                .unwrap();
            assert_eq!(valuation.risk_penalty, Decimal::ZERO);
            assert_eq!(valuation.risk_level, RiskLevel::Medium);
        }
    }

    mod ebitda_estimate {
        use super::*;

        #[test]
        fn reported_ebitda_wins() {
            let entity = BusinessEntityBuilder::new("a", "HVAC", dec(5_000_000))
                .ebitda(dec(900_000))
                .build();
            assert_eq!(
                estimator()
                    .estimate_ebitda(&entity, Some(Decimal::new(5, 1)))
                    .unwrap(),
                dec(900_000)
            );
        }

        #[test]
        fn default_margin_applied() {
            let entity = BusinessEntityBuilder::new("a", "HVAC", dec(5_000_000)).build();
            assert_eq!(estimator().estimate_ebitda(&entity, None).unwrap(), dec(750_000));
        }

        #[test]
        fn override_margin_applied() {
            let entity = BusinessEntityBuilder::new("a", "HVAC", dec(5_000_000)).build();
            assert_eq!(
                estimator()
                    .estimate_ebitda(&entity, Some(Decimal::new(2, 1)))
                    .unwrap(),
                dec(1_000_000)
            );
        }
    }

    mod propensity {
        use super::*;

        #[test]
        fn neutral_signals() {
            let entity = BusinessEntityBuilder::new("a", "HVAC", dec(5_000_000))
                .years_in_business(20)
                .build();
            let inputs = ValuationInputs {
                succession_risk: FactorInput::new(0.5, 0.8),
                ..ValuationInputs::neutral(dec(750_000))
            };
            // every factor is 0.5 (age 20 / horizon 40)
            assert_eq!(estimator().seller_propensity(&entity, &inputs), 50);
        }

        #[test]
        fn motivated_seller_scores_high() {
            let entity = BusinessEntityBuilder::new("a", "HVAC", dec(5_000_000))
                .years_in_business(45)
                .build();
            let inputs = ValuationInputs {
                ebitda: dec(750_000),
                succession_risk: FactorInput::new(1.0, 0.9),
                factors: FactorSignals {
                    digital_neglect: 1.0,
                    review_decay: 1.0,
                    regulatory_risk: 1.0,
                    financial_stress: 1.0,
                    ..Default::default()
                },
                signal_confidence: 0.7,
            };
            assert_eq!(estimator().seller_propensity(&entity, &inputs), 100);
        }
    }
}

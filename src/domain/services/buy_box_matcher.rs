//! # Buy Box Matcher
//!
//! Screens entities against [`BuyBoxCriteria`] and ranks the survivors.
//!
//! Evaluation order for one entity:
//!
//! 1. Industry filter
//! 2. Minimum revenue
//! 3. Estimated EBITDA (reported, or revenue × margin) vs minimum EBITDA
//! 4. Estimated purchase price (buyer multiple × EBITDA, or the valuation
//!    midpoint) vs the purchase-price range
//! 5. Soft criteria scoring
//!
//! Matches are ordered by score (desc), estimated EBITDA (desc), then entity
//! id (asc).

use crate::domain::entities::{
    BusinessEntity, BuyBoxCriteria, FactorSignals, MatchResult, RETIRING_OWNER_RISK, SoftCriterion,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::services::valuation_estimator::{ValuationEstimator, ValuationInputs};
use crate::domain::services::weighted_factor::FactorInput;
use crate::domain::value_objects::arithmetic::{CheckedArithmetic, round_money};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::warn;

/// One entity with the metrics matching depends on.
#[derive(Debug, Clone, Copy)]
pub struct MatchCandidate<'a> {
    /// Entity record.
    pub entity: &'a BusinessEntity,
    /// `SRI` value and confidence.
    pub succession_risk: FactorInput,
    /// Provider factor signals (used by the valuation fallback).
    pub factors: FactorSignals,
    /// Provider confidence in `factors`.
    pub signal_confidence: f64,
}

impl<'a> MatchCandidate<'a> {
    /// Candidate with neutral signals and the given succession risk.
    #[must_use]
    pub fn new(entity: &'a BusinessEntity, succession_risk: f64) -> Self {
        Self {
            entity,
            succession_risk: FactorInput::new(succession_risk, 1.0),
            factors: FactorSignals::default(),
            signal_confidence: 0.0,
        }
    }
}

/// Buy-box screening and ranking.
#[derive(Debug, Clone)]
pub struct BuyBoxMatcher {
    valuation: Arc<ValuationEstimator>,
}

impl BuyBoxMatcher {
    /// Creates a matcher that prices entities with `valuation`.
    #[must_use]
    pub fn new(valuation: Arc<ValuationEstimator>) -> Self {
        Self { valuation }
    }

    /// Checks the criteria for values no entity could sensibly match.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` for a margin or concentration
    /// outside `[0, 1]`, a negative multiple, or an inverted price range.
    pub fn validate_criteria(criteria: &BuyBoxCriteria) -> DomainResult<()> {
        if let Some(margin) = criteria.assumed_margin
            && (margin < Decimal::ZERO || margin > Decimal::ONE)
        {
            return Err(DomainError::invalid_input("assumed_margin must be in [0, 1]"));
        }
        if let Some(max) = criteria.max_customer_concentration
            && !(0.0..=1.0).contains(&max)
        {
            return Err(DomainError::invalid_input(
                "max_customer_concentration must be in [0, 1]",
            ));
        }
        if criteria.ebitda_multiple.is_some_and(|m| m < Decimal::ZERO) {
            return Err(DomainError::invalid_input("ebitda_multiple must be >= 0"));
        }
        if let (Some(min), Some(max)) = (criteria.purchase_price.min, criteria.purchase_price.max)
            && min > max
        {
            return Err(DomainError::invalid_input(
                "purchase_price.min must not exceed purchase_price.max",
            ));
        }
        Ok(())
    }

    /// Evaluates one candidate; `None` if a hard filter excludes it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Arithmetic` on decimal overflow.
    pub fn evaluate(
        &self,
        criteria: &BuyBoxCriteria,
        candidate: &MatchCandidate<'_>,
    ) -> DomainResult<Option<MatchResult>> {
        let entity = candidate.entity;

        if !criteria.accepts_industry(entity.industry()) {
            return Ok(None);
        }
        if criteria.min_revenue.is_some_and(|min| entity.revenue() < min) {
            return Ok(None);
        }

        let ebitda = self
            .valuation
            .estimate_ebitda(entity, criteria.assumed_margin)?;
        if criteria.min_ebitda.is_some_and(|min| ebitda < min) {
            return Ok(None);
        }

        let price = match criteria.ebitda_multiple {
            Some(multiple) => round_money(multiple.safe_mul(ebitda)?),
            None => {
                let inputs = ValuationInputs {
                    ebitda,
                    succession_risk: candidate.succession_risk,
                    factors: candidate.factors,
                    signal_confidence: candidate.signal_confidence,
                };
                round_money(self.valuation.estimate(entity, &inputs)?.ev_midpoint())
            }
        };
        if !criteria.purchase_price.contains(price) {
            return Ok(None);
        }

        let active = criteria.active_soft_criteria();
        let satisfied: Vec<String> = active
            .iter()
            .filter(|criterion| satisfies(criteria, candidate, **criterion))
            .map(|criterion| criterion.label().to_string())
            .collect();

        Ok(Some(MatchResult {
            entity_id: entity.id().clone(),
            entity_name: entity.display_name().to_string(),
            match_score: match_score(satisfied.len(), active.len()),
            estimated_ebitda: ebitda,
            estimated_purchase_price: price,
            satisfied_criteria: satisfied,
        }))
    }

    /// Screens and ranks `candidates`.
    ///
    /// A candidate whose valuation overflows is logged and skipped; it never
    /// fails the batch.
    #[must_use]
    pub fn match_entities(
        &self,
        criteria: &BuyBoxCriteria,
        candidates: &[MatchCandidate<'_>],
    ) -> Vec<MatchResult> {
        let mut matches: Vec<MatchResult> = candidates
            .iter()
            .filter_map(|candidate| match self.evaluate(criteria, candidate) {
                Ok(result) => result,
                Err(e) => {
                    warn!(
                        entity_id = %candidate.entity.id(),
                        error = %e,
                        "Skipping entity in buy-box match"
                    );
                    None
                }
            })
            .collect();

        matches.sort_by(compare_matches);
        matches
    }
}

/// `round(100 × satisfied / active)`, or 100 when nothing is active.
fn match_score(satisfied: usize, active: usize) -> u8 {
    if active == 0 {
        return 100;
    }
    let score = (200 * satisfied + active) / (2 * active);
    u8::try_from(score.min(100)).unwrap_or(100)
}

fn satisfies(
    criteria: &BuyBoxCriteria,
    candidate: &MatchCandidate<'_>,
    criterion: SoftCriterion,
) -> bool {
    let entity = candidate.entity;
    match criterion {
        SoftCriterion::RecurringRevenue => entity.recurring_revenue() == Some(true),
        SoftCriterion::RemoteOwnable => entity.remote_ownable() == Some(true),
        SoftCriterion::SellerFinancing => entity.seller_financing() == Some(true),
        SoftCriterion::LowCustomerConcentration => criteria
            .max_customer_concentration
            .zip(entity.customer_concentration())
            .is_some_and(|(max, actual)| actual <= max),
        SoftCriterion::Established => criteria
            .min_years_in_business
            .is_some_and(|min| entity.years_in_business_or_default() >= min),
        SoftCriterion::RetiringOwner => candidate.succession_risk.value >= RETIRING_OWNER_RISK,
    }
}

fn compare_matches(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.match_score
        .cmp(&a.match_score)
        .then_with(|| b.estimated_ebitda.cmp(&a.estimated_ebitda))
        .then_with(|| a.entity_id.cmp(&b.entity_id))
}

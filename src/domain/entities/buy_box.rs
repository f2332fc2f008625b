//! # Buy Box
//!
//! Declarative acquisition criteria and the match results they produce.
//!
//! A buy box has two kinds of criteria:
//!
//! - **Hard filters** exclude an entity outright: industry membership,
//!   purchase-price range, minimum revenue, minimum EBITDA.
//! - **Soft criteria** are preferences; each active one an entity satisfies
//!   adds to its match score. A soft criterion is active only when the buy
//!   box sets it (a `true` flag or a present threshold).
//!
//! # Examples
//!
//! ```
//! use dealscope::domain::entities::buy_box::{BuyBoxCriteria, SoftCriterion};
//!
//! let criteria: BuyBoxCriteria = serde_json::from_str(r#"{
//!     "industries": ["HVAC", "Plumbing"],
//!     "min_revenue": 1000000,
//!     "recurring_revenue": true,
//!     "max_customer_concentration": 0.2
//! }"#).unwrap();
//!
//! assert_eq!(
//!     criteria.active_soft_criteria(),
//!     vec![SoftCriterion::RecurringRevenue, SoftCriterion::LowCustomerConcentration]
//! );
//! ```

use crate::domain::value_objects::EntityId;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Succession risk at or above which an owner counts as likely to retire.
pub const RETIRING_OWNER_RISK: f64 = 0.5;

/// Inclusive purchase-price bounds; either end may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct PriceRange {
    /// Minimum purchase price.
    #[serde(default)]
    pub min: Option<Decimal>,
    /// Maximum purchase price.
    #[serde(default)]
    pub max: Option<Decimal>,
}

impl PriceRange {
    /// Returns true if `price` lies within the range.
    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }
}

/// A soft buy-box preference.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SoftCriterion {
    /// Revenue is recurring (contracts, subscriptions, service agreements).
    RecurringRevenue,
    /// The business can run without an on-site owner.
    RemoteOwnable,
    /// The seller accepts a seller note.
    SellerFinancing,
    /// Largest customer share at or below the buy-box maximum.
    LowCustomerConcentration,
    /// Years in business at or above the buy-box minimum.
    Established,
    /// Succession risk at or above [`RETIRING_OWNER_RISK`].
    RetiringOwner,
}

impl SoftCriterion {
    /// Returns the explainability label reported in match results.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RecurringRevenue => "recurring_revenue",
            Self::RemoteOwnable => "remote_ownable",
            Self::SellerFinancing => "seller_financing",
            Self::LowCustomerConcentration => "low_customer_concentration",
            Self::Established => "established",
            Self::RetiringOwner => "retiring_owner",
        }
    }
}

impl fmt::Display for SoftCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Acquisition criteria a buyer screens targets against.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BuyBoxCriteria {
    /// Accepted industries; empty accepts every industry.
    pub industries: BTreeSet<String>,
    /// Minimum annual revenue.
    pub min_revenue: Option<Decimal>,
    /// Minimum EBITDA (reported or estimated).
    pub min_ebitda: Option<Decimal>,
    /// Buyer's underwriting multiple; when set, the estimated purchase price
    /// is this multiple of EBITDA instead of the valuation midpoint.
    #[serde(alias = "min_ebitda_multiple")]
    pub ebitda_multiple: Option<Decimal>,
    /// Accepted purchase-price range.
    pub purchase_price: PriceRange,
    /// EBITDA margin assumed for entities without reported EBITDA.
    pub assumed_margin: Option<Decimal>,
    /// Prefer recurring revenue.
    pub recurring_revenue: bool,
    /// Prefer remote-ownable businesses.
    pub remote_ownable: bool,
    /// Prefer sellers open to seller financing.
    pub seller_financing: bool,
    /// Prefer owners likely to retire.
    pub retiring_owner: bool,
    /// Maximum acceptable largest-customer share.
    pub max_customer_concentration: Option<f64>,
    /// Minimum years in business.
    pub min_years_in_business: Option<u32>,
}

impl BuyBoxCriteria {
    /// Returns true if `industry` passes the industry filter.
    #[must_use]
    pub fn accepts_industry(&self, industry: &str) -> bool {
        self.industries.is_empty()
            || self
                .industries
                .iter()
                .any(|accepted| accepted.trim().eq_ignore_ascii_case(industry.trim()))
    }

    /// Returns the soft criteria this buy box activates, in declaration order.
    #[must_use]
    pub fn active_soft_criteria(&self) -> Vec<SoftCriterion> {
        let mut active = Vec::new();
        if self.recurring_revenue {
            active.push(SoftCriterion::RecurringRevenue);
        }
        if self.remote_ownable {
            active.push(SoftCriterion::RemoteOwnable);
        }
        if self.seller_financing {
            active.push(SoftCriterion::SellerFinancing);
        }
        if self.max_customer_concentration.is_some() {
            active.push(SoftCriterion::LowCustomerConcentration);
        }
        if self.min_years_in_business.is_some() {
            active.push(SoftCriterion::Established);
        }
        if self.retiring_owner {
            active.push(SoftCriterion::RetiringOwner);
        }
        active
    }
}

/// A target that passed every hard filter of a buy box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MatchResult {
    /// Matched entity.
    pub entity_id: EntityId,
    /// Entity display name.
    pub entity_name: String,
    /// Share of active soft criteria satisfied, `0..=100`.
    pub match_score: u8,
    /// Reported EBITDA or revenue times the assumed margin.
    pub estimated_ebitda: Decimal,
    /// Buyer multiple times EBITDA, or the valuation midpoint.
    pub estimated_purchase_price: Decimal,
    /// Labels of satisfied soft criteria, in criteria order.
    pub satisfied_criteria: Vec<String>,
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Match({} score={} ebitda={} price={})",
            self.entity_id, self.match_score, self.estimated_ebitda, self.estimated_purchase_price
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn open_price_range_contains_everything() {
        assert!(PriceRange::default().contains(Decimal::new(123, 0)));
    }

    #[test]
    fn price_range_bounds_inclusive() {
        let range = PriceRange {
            min: Some(Decimal::new(1_000_000, 0)),
            max: Some(Decimal::new(5_000_000, 0)),
        };
        assert!(range.contains(Decimal::new(1_000_000, 0)));
        assert!(range.contains(Decimal::new(5_000_000, 0)));
        assert!(!range.contains(Decimal::new(5_000_001, 0)));
        assert!(!range.contains(Decimal::new(999_999, 0)));
    }

    #[test]
    fn empty_industry_set_accepts_all() {
        assert!(BuyBoxCriteria::default().accepts_industry("Anything"));
    }

    #[test]
    fn industry_set_is_case_insensitive() {
        let criteria = BuyBoxCriteria {
            industries: ["HVAC".to_string()].into_iter().collect(),
            ..Default::default()
        };
        assert!(criteria.accepts_industry("hvac"));
        assert!(!criteria.accepts_industry("Roofing"));
    }

    #[test]
    fn no_preferences_means_no_soft_criteria() {
        assert!(BuyBoxCriteria::default().active_soft_criteria().is_empty());
    }

    #[test]
    fn multiple_alias_accepted() {
        let criteria: BuyBoxCriteria =
            serde_json::from_str(r#"{"min_ebitda_multiple": 4.5}"#).unwrap();
        assert_eq!(criteria.ebitda_multiple, Some(Decimal::new(45, 1)));
    }

    #[test]
    fn labels_are_snake_case() {
        assert_eq!(
            SoftCriterion::LowCustomerConcentration.to_string(),
            "low_customer_concentration"
        );
        let json = serde_json::to_string(&SoftCriterion::RetiringOwner).unwrap();
        assert_eq!(json, "\"retiring_owner\"");
    }
}

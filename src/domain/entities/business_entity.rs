//! # Business Entity
//!
//! The acquisition target record supplied by the caller.
//!
//! This module provides the [`BusinessEntity`] record, its [`Location`], and a
//! [`BusinessEntityBuilder`] for programmatic construction. Records arrive as
//! JSON from the data-sourcing collaborator and are validated once at the
//! ingestion boundary with [`BusinessEntity::validate`]; scoring functions
//! downstream assume a validated record.
//!
//! # Defaults
//!
//! | Field | Default when missing |
//! |-------|----------------------|
//! | `owner_age` | 45 |
//! | `years_in_business` | 10 |
//! | `employee_count` | 10 |
//!
//! # Examples
//!
//! ```
//! use dealscope::domain::entities::business_entity::BusinessEntityBuilder;
//! use rust_decimal::Decimal;
//!
//! let entity = BusinessEntityBuilder::new("biz-1", "HVAC", Decimal::new(2_400_000, 0))
//!     .owner_age(67)
//!     .risk_factor("succession")
//!     .build();
//!
//! assert!(entity.validate().is_ok());
//! assert_eq!(entity.years_in_business_or_default(), 10);
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{EntityId, RiskTag};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Owner age assumed when the record omits it.
pub const DEFAULT_OWNER_AGE: u32 = 45;

/// Years in business assumed when the record omits it.
pub const DEFAULT_TENURE_YEARS: u32 = 10;

/// Employee count assumed when the record omits it.
pub const DEFAULT_EMPLOYEE_COUNT: u32 = 10;

/// Oldest owner age accepted at ingestion.
pub const MAX_OWNER_AGE: u32 = 120;

/// Where a business operates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Location {
    /// WGS84 coordinates.
    Coordinates {
        /// Latitude in degrees.
        lat: f64,
        /// Longitude in degrees.
        lon: f64,
    },
    /// Free-form region tag such as a metro area or county.
    Region {
        /// Region tag.
        region: String,
    },
}

impl Location {
    /// Returns the region tag, if this location is a region.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        match self {
            Self::Region { region } => Some(region.as_str()),
            Self::Coordinates { .. } => None,
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            Self::Coordinates { lat, lon } => {
                if !(-90.0..=90.0).contains(lat) {
                    return Err(format!("latitude {lat} outside [-90, 90]"));
                }
                if !(-180.0..=180.0).contains(lon) {
                    return Err(format!("longitude {lon} outside [-180, 180]"));
                }
                Ok(())
            }
            Self::Region { region } if region.trim().is_empty() => {
                Err("region tag is empty".to_string())
            }
            Self::Region { .. } => Ok(()),
        }
    }
}

/// A small business evaluated as an acquisition target.
///
/// Read-only to the engine. Optional fields fall back to documented defaults
/// through the `*_or_default` accessors; scoring code never reads a raw
/// `Option` for a defaulted field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BusinessEntity {
    id: EntityId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    location: Option<Location>,
    industry: String,
    revenue: Decimal,
    #[serde(default)]
    ebitda: Option<Decimal>,
    #[serde(default)]
    employee_count: Option<u32>,
    #[serde(default)]
    owner_age: Option<u32>,
    #[serde(default)]
    years_in_business: Option<u32>,
    #[serde(default)]
    family_involvement: Option<f64>,
    #[serde(default)]
    has_succession_plan: Option<bool>,
    #[serde(default)]
    risk_factors: Vec<String>,
    #[serde(default)]
    recurring_revenue: Option<bool>,
    #[serde(default)]
    remote_ownable: Option<bool>,
    #[serde(default)]
    seller_financing: Option<bool>,
    #[serde(default)]
    customer_concentration: Option<f64>,
}

impl BusinessEntity {
    /// Validates the record against the ingestion schema.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidEntity` naming the first violated rule:
    /// blank id or industry, negative revenue or EBITDA, ratios outside
    /// `[0, 1]`, coordinates out of range, or an implausible owner age.
    pub fn validate(&self) -> DomainResult<()> {
        let fail = |reason: String| Err(DomainError::invalid_entity(self.id.as_str(), reason));

        if self.id.is_blank() {
            return fail("id is empty".to_string());
        }
        if self.industry.trim().is_empty() {
            return fail("industry is empty".to_string());
        }
        if self.revenue.is_sign_negative() && !self.revenue.is_zero() {
            return fail(format!("revenue {} is negative", self.revenue));
        }
        if let Some(ebitda) = self.ebitda {
            if ebitda.is_sign_negative() && !ebitda.is_zero() {
                return fail(format!("ebitda {ebitda} is negative"));
            }
        }
        if let Some(ratio) = self.family_involvement {
            if !(0.0..=1.0).contains(&ratio) {
                return fail(format!("family_involvement {ratio} outside [0, 1]"));
            }
        }
        if let Some(ratio) = self.customer_concentration {
            if !(0.0..=1.0).contains(&ratio) {
                return fail(format!("customer_concentration {ratio} outside [0, 1]"));
            }
        }
        if let Some(age) = self.owner_age {
            if age > MAX_OWNER_AGE {
                return fail(format!("owner_age {age} exceeds {MAX_OWNER_AGE}"));
            }
        }
        if let Some(location) = &self.location {
            location.validate().or_else(fail)?;
        }
        Ok(())
    }

    /// Returns the entity id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Returns the display name, falling back to the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }

    /// Returns the location, if known.
    #[inline]
    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Returns the region tag, if the location is a region.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.location.as_ref().and_then(Location::region)
    }

    /// Returns the industry label as supplied.
    #[inline]
    #[must_use]
    pub fn industry(&self) -> &str {
        &self.industry
    }

    /// Returns true if the industry equals `industry`, ignoring case and
    /// surrounding whitespace.
    #[must_use]
    pub fn industry_matches(&self, industry: &str) -> bool {
        self.industry.trim().eq_ignore_ascii_case(industry.trim())
    }

    /// Returns annual revenue.
    #[inline]
    #[must_use]
    pub fn revenue(&self) -> Decimal {
        self.revenue
    }

    /// Returns reported EBITDA, if supplied.
    #[inline]
    #[must_use]
    pub fn ebitda(&self) -> Option<Decimal> {
        self.ebitda
    }

    /// Returns the employee count or its default.
    #[inline]
    #[must_use]
    pub fn employee_count_or_default(&self) -> u32 {
        self.employee_count.unwrap_or(DEFAULT_EMPLOYEE_COUNT)
    }

    /// Returns the owner age as supplied.
    #[inline]
    #[must_use]
    pub fn owner_age(&self) -> Option<u32> {
        self.owner_age
    }

    /// Returns the owner age or its default.
    #[inline]
    #[must_use]
    pub fn owner_age_or_default(&self) -> u32 {
        self.owner_age.unwrap_or(DEFAULT_OWNER_AGE)
    }

    /// Returns years in business as supplied.
    #[inline]
    #[must_use]
    pub fn years_in_business(&self) -> Option<u32> {
        self.years_in_business
    }

    /// Returns years in business or its default.
    #[inline]
    #[must_use]
    pub fn years_in_business_or_default(&self) -> u32 {
        self.years_in_business.unwrap_or(DEFAULT_TENURE_YEARS)
    }

    /// Returns the share of family members in management, if known.
    #[inline]
    #[must_use]
    pub fn family_involvement(&self) -> Option<f64> {
        self.family_involvement
    }

    /// Returns whether a succession plan exists, if known.
    #[inline]
    #[must_use]
    pub fn has_succession_plan(&self) -> Option<bool> {
        self.has_succession_plan
    }

    /// Returns the raw risk-factor tags.
    #[inline]
    #[must_use]
    pub fn risk_factors(&self) -> &[String] {
        &self.risk_factors
    }

    /// Returns the tags that parse into recognised [`RiskTag`]s, one entry
    /// per occurrence.
    #[must_use]
    pub fn risk_tags(&self) -> Vec<RiskTag> {
        self.risk_factors
            .iter()
            .filter_map(|tag| tag.parse().ok())
            .collect()
    }

    /// Returns whether revenue is recurring, if known.
    #[inline]
    #[must_use]
    pub fn recurring_revenue(&self) -> Option<bool> {
        self.recurring_revenue
    }

    /// Returns whether the business can be run without an on-site owner, if known.
    #[inline]
    #[must_use]
    pub fn remote_ownable(&self) -> Option<bool> {
        self.remote_ownable
    }

    /// Returns whether the seller accepts seller financing, if known.
    #[inline]
    #[must_use]
    pub fn seller_financing(&self) -> Option<bool> {
        self.seller_financing
    }

    /// Returns the revenue share of the largest customer, if known.
    #[inline]
    #[must_use]
    pub fn customer_concentration(&self) -> Option<f64> {
        self.customer_concentration
    }
}

impl fmt::Display for BusinessEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BusinessEntity({} industry={} revenue={})",
            self.id, self.industry, self.revenue
        )
    }
}

/// Builder for [`BusinessEntity`].
#[derive(Debug, Clone)]
pub struct BusinessEntityBuilder {
    entity: BusinessEntity,
}

impl BusinessEntityBuilder {
    /// Creates a new builder with required fields.
    #[must_use]
    pub fn new(id: impl Into<String>, industry: impl Into<String>, revenue: Decimal) -> Self {
        Self {
            entity: BusinessEntity {
                id: EntityId::new(id),
                name: None,
                location: None,
                industry: industry.into(),
                revenue,
                ebitda: None,
                employee_count: None,
                owner_age: None,
                years_in_business: None,
                family_involvement: None,
                has_succession_plan: None,
                risk_factors: Vec::new(),
                recurring_revenue: None,
                remote_ownable: None,
                seller_financing: None,
                customer_concentration: None,
            },
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.entity.name = Some(name.into());
        self
    }

    /// Sets the location.
    #[must_use]
    pub fn location(mut self, location: Location) -> Self {
        self.entity.location = Some(location);
        self
    }

    /// Sets a region-tag location.
    #[must_use]
    pub fn region(self, region: impl Into<String>) -> Self {
        self.location(Location::Region {
            region: region.into(),
        })
    }

    /// Sets reported EBITDA.
    #[must_use]
    pub fn ebitda(mut self, ebitda: Decimal) -> Self {
        self.entity.ebitda = Some(ebitda);
        self
    }

    /// Sets the employee count.
    #[must_use]
    pub fn employee_count(mut self, count: u32) -> Self {
        self.entity.employee_count = Some(count);
        self
    }

    /// Sets the owner age.
    #[must_use]
    pub fn owner_age(mut self, age: u32) -> Self {
        self.entity.owner_age = Some(age);
        self
    }

    /// Sets years in business.
    #[must_use]
    pub fn years_in_business(mut self, years: u32) -> Self {
        self.entity.years_in_business = Some(years);
        self
    }

    /// Sets the family involvement ratio.
    #[must_use]
    pub fn family_involvement(mut self, ratio: f64) -> Self {
        self.entity.family_involvement = Some(ratio);
        self
    }

    /// Sets the succession plan flag.
    #[must_use]
    pub fn has_succession_plan(mut self, has_plan: bool) -> Self {
        self.entity.has_succession_plan = Some(has_plan);
        self
    }

    /// Appends a risk-factor tag.
    #[must_use]
    pub fn risk_factor(mut self, tag: impl Into<String>) -> Self {
        self.entity.risk_factors.push(tag.into());
        self
    }

    /// Sets the recurring revenue flag.
    #[must_use]
    pub fn recurring_revenue(mut self, value: bool) -> Self {
        self.entity.recurring_revenue = Some(value);
        self
    }

    /// Sets the remote-ownable flag.
    #[must_use]
    pub fn remote_ownable(mut self, value: bool) -> Self {
        self.entity.remote_ownable = Some(value);
        self
    }

    /// Sets the seller financing flag.
    #[must_use]
    pub fn seller_financing(mut self, value: bool) -> Self {
        self.entity.seller_financing = Some(value);
        self
    }

    /// Sets the largest-customer revenue share.
    #[must_use]
    pub fn customer_concentration(mut self, ratio: f64) -> Self {
        self.entity.customer_concentration = Some(ratio);
        self
    }

    /// Builds the entity without validation.
    #[must_use]
    pub fn build(self) -> BusinessEntity {
        self.entity
    }

    /// Builds the entity with validation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidEntity` if validation fails.
    pub fn try_build(self) -> DomainResult<BusinessEntity> {
        self.entity.validate()?;
        Ok(self.entity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn builder() -> BusinessEntityBuilder {
        BusinessEntityBuilder::new("biz-1", "Security", Decimal::new(5_000_000, 0))
    }

    mod validation {
        use super::*;

        #[test]
        fn minimal_record_is_valid() {
            assert!(builder().try_build().is_ok());
        }

        #[test]
        fn blank_id_rejected() {
            let err = BusinessEntityBuilder::new(" ", "HVAC", Decimal::ONE)
                .try_build()
                .unwrap_err();
            assert!(err.to_string().contains("id is empty"));
        }

        #[test]
        fn negative_revenue_rejected() {
            let err = BusinessEntityBuilder::new("b", "HVAC", Decimal::new(-1, 0))
                .try_build()
                .unwrap_err();
            assert!(err.to_string().contains("negative"));
        }

        #[test]
        fn ratio_out_of_range_rejected() {
            assert!(builder().family_involvement(1.2).try_build().is_err());
            assert!(builder().customer_concentration(-0.1).try_build().is_err());
        }

        #[test]
        fn coordinates_checked() {
            let entity = builder()
                .location(Location::Coordinates {
                    lat: 95.0,
                    lon: 0.0,
                })
                .build();
            assert!(entity.validate().is_err());
        }

        #[test]
        fn implausible_owner_age_rejected() {
            assert!(builder().owner_age(130).try_build().is_err());
        }
    }

    mod defaults {
        use super::*;

        #[test]
        fn defaults_applied() {
            let entity = builder().build();
            assert_eq!(entity.owner_age_or_default(), DEFAULT_OWNER_AGE);
            assert_eq!(entity.years_in_business_or_default(), DEFAULT_TENURE_YEARS);
            assert_eq!(entity.employee_count_or_default(), DEFAULT_EMPLOYEE_COUNT);
            assert_eq!(entity.display_name(), "biz-1");
        }

        #[test]
        fn supplied_values_win() {
            let entity = builder().owner_age(70).years_in_business(3).build();
            assert_eq!(entity.owner_age_or_default(), 70);
            assert_eq!(entity.years_in_business_or_default(), 3);
        }
    }

    mod tags {
        use super::*;

        #[test]
        fn recognised_tags_parsed_per_occurrence() {
            let entity = builder()
                .risk_factor("succession")
                .risk_factor("weather")
                .risk_factor("Succession")
                .build();
            assert_eq!(
                entity.risk_tags(),
                vec![RiskTag::Succession, RiskTag::Succession]
            );
            assert_eq!(entity.risk_factors().len(), 3);
        }

        #[test]
        fn industry_match_ignores_case() {
            assert!(builder().build().industry_matches(" security "));
        }
    }

    mod serde_tests {
        use super::*;

        #[test]
        fn deserializes_with_numeric_revenue_and_region() {
            let json = r#"{
                "id": "biz-7",
                "industry": "Plumbing",
                "revenue": 1250000,
                "location": {"region": "Austin, TX"},
                "owner_age": 61,
                "risk_factors": ["digital-neglect"]
            }"#;
            let entity: BusinessEntity = serde_json::from_str(json).unwrap();
            assert_eq!(entity.revenue(), Decimal::new(1_250_000, 0));
            assert_eq!(entity.region(), Some("Austin, TX"));
            assert_eq!(entity.risk_tags(), vec![RiskTag::DigitalNeglect]);
            assert!(entity.validate().is_ok());
        }

        #[test]
        fn deserializes_coordinates() {
            let json = r#"{"id":"b","industry":"HVAC","revenue":"10","location":{"lat":30.2,"lon":-97.7}}"#;
            let entity: BusinessEntity = serde_json::from_str(json).unwrap();
            assert!(matches!(
                entity.location(),
                Some(Location::Coordinates { .. })
            ));
            assert_eq!(entity.region(), None);
        }
    }
}

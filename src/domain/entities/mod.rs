//! # Domain Entities
//!
//! Records flowing through the scoring pipeline.
//!
//! ## Inputs
//!
//! - [`BusinessEntity`]: Acquisition target supplied by the caller
//! - [`EntitySignals`]: Market observations supplied by a data provider
//! - [`BuyBoxCriteria`]: Declarative acquisition criteria
//!
//! ## Outputs
//!
//! - [`Valuation`]: EBITDA-multiple enterprise value range
//! - [`MarketSnapshot`]: Population concentration statistics
//! - [`MatchResult`]: Buy-box match with explainability labels

pub mod business_entity;
pub mod buy_box;
pub mod market_snapshot;
pub mod signals;
pub mod valuation;

pub use business_entity::{
    BusinessEntity, BusinessEntityBuilder, DEFAULT_EMPLOYEE_COUNT, DEFAULT_OWNER_AGE,
    DEFAULT_TENURE_YEARS, Location,
};
pub use buy_box::{BuyBoxCriteria, MatchResult, PriceRange, RETIRING_OWNER_RISK, SoftCriterion};
pub use market_snapshot::MarketSnapshot;
pub use signals::{EntitySignals, FactorSignals, NEUTRAL_SIGNAL};
pub use valuation::{MultipleRange, Valuation};

//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Identity Types
//!
//! - [`EntityId`]: Caller-assigned business entity identifier
//!
//! ## Metric Types
//!
//! - [`MetricResult`]: Bounded value with confidence and error bars
//! - [`MetricDomain`]: Declared interval of a metric
//! - [`ErrorBars`]: Uncertainty interval
//!
//! ## Arithmetic
//!
//! - [`ArithmeticError`]: Error type for arithmetic failures
//! - [`CheckedArithmetic`]: Trait for safe decimal arithmetic
//!
//! ## Domain Enums
//!
//! - `ConcentrationLabel`: Fragmented, moderate, or concentrated market
//! - `RiskLevel`: Low, Medium, or High
//! - `ScoringIntent`: Rollup, acquisition, or portfolio thesis
//! - `RiskTag`: Recognised risk-factor tags

pub mod arithmetic;
pub mod enums;
pub mod ids;
pub mod metric_result;
pub mod timestamp;

pub use arithmetic::{ArithmeticError, ArithmeticResult, CheckedArithmetic, round_money};
pub use enums::{ConcentrationLabel, ParseEnumError, RiskLevel, RiskTag, ScoringIntent};
pub use ids::EntityId;
pub use metric_result::{ErrorBars, MetricDomain, MetricResult};
pub use timestamp::Timestamp;

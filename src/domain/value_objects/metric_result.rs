//! # Metric Results
//!
//! Bounded metric values with confidence and error bars.
//!
//! This module provides:
//! - [`MetricDomain`]: The closed interval a metric is defined on
//! - [`ErrorBars`]: Lower and upper uncertainty bounds
//! - [`MetricResult`]: A value with confidence, error bars, source and time
//!
//! # Invariants
//!
//! For every [`MetricResult`]:
//! - `domain.min <= error_bars.low <= value <= error_bars.high <= domain.max`
//! - `0 <= confidence <= 1`
//!
//! Construction clamps every component into its domain, so the invariant
//! holds for any finite input. Confidence values are heuristic priors; they
//! are bounded but not calibrated probabilities.
//!
//! # Examples
//!
//! ```
//! use dealscope::domain::value_objects::metric_result::{MetricDomain, MetricResult};
//! use dealscope::domain::value_objects::timestamp::Timestamp;
//!
//! let as_of = Timestamp::from_secs(1_700_000_000).unwrap();
//! let hhi = MetricResult::with_relative_margin(0.25, 0.8, MetricDomain::UNIT, "hhi", as_of);
//!
//! assert!((hhi.error_bars().low() - 0.20).abs() < 1e-12);
//! assert!((hhi.error_bars().high() - 0.30).abs() < 1e-12);
//! ```

use crate::domain::value_objects::timestamp::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed interval on which a metric is defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MetricDomain {
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound (may be `f64::INFINITY`).
    pub max: f64,
}

impl MetricDomain {
    /// Unit interval for shares, indices, risks and composite scores.
    pub const UNIT: Self = Self { min: 0.0, max: 1.0 };

    /// Range of the attractor complexity estimate.
    pub const COMPLEXITY: Self = Self { min: 0.5, max: 3.0 };

    /// Non-negative rates such as event intensity.
    pub const NON_NEGATIVE: Self = Self {
        min: 0.0,
        max: f64::INFINITY,
    };

    /// Clamps a value into this domain. NaN maps to the lower bound.
    #[inline]
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    /// Returns true if `value` lies in the domain.
    #[inline]
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl fmt::Display for MetricDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Lower and upper uncertainty bounds around a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorBars {
    low: f64,
    high: f64,
}

impl ErrorBars {
    /// Builds `[max(min, value - margin), min(max, value + margin)]`.
    #[must_use]
    pub fn around(value: f64, margin: f64, domain: MetricDomain) -> Self {
        let margin = if margin.is_finite() { margin.abs() } else { 0.0 };
        Self {
            low: (value - margin).max(domain.min),
            high: (value + margin).min(domain.max),
        }
    }

    /// Returns the lower bound.
    #[inline]
    #[must_use]
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Returns the upper bound.
    #[inline]
    #[must_use]
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Returns the width of the interval.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

/// A computed metric with its confidence and error bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MetricResult {
    value: f64,
    confidence: f64,
    error_bars: ErrorBars,
    source_tag: String,
    timestamp: Timestamp,
}

impl MetricResult {
    /// Creates a metric result with an explicit error margin.
    ///
    /// The value is clamped into `domain`, the confidence into `[0, 1]`, and
    /// the error bars are built around the clamped value.
    #[must_use]
    pub fn new(
        value: f64,
        confidence: f64,
        margin: f64,
        domain: MetricDomain,
        source_tag: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        let value = domain.clamp(value);
        let confidence = MetricDomain::UNIT.clamp(confidence);
        let error_bars = ErrorBars::around(value, margin, domain);

        debug_assert!(
            error_bars.low <= value && value <= error_bars.high,
            "error bars must bracket the value"
        );
        debug_assert!(domain.contains(error_bars.low) && domain.contains(error_bars.high));

        Self {
            value,
            confidence,
            error_bars,
            source_tag: source_tag.into(),
            timestamp,
        }
    }

    /// Creates a metric result whose margin is `(1 - confidence) * value`.
    #[must_use]
    pub fn with_relative_margin(
        value: f64,
        confidence: f64,
        domain: MetricDomain,
        source_tag: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        let clamped_value = domain.clamp(value);
        let clamped_confidence = MetricDomain::UNIT.clamp(confidence);
        let margin = (1.0 - clamped_confidence) * clamped_value;
        Self::new(
            clamped_value,
            clamped_confidence,
            margin,
            domain,
            source_tag,
            timestamp,
        )
    }

    /// Returns the metric value.
    #[inline]
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns the heuristic confidence in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Returns the error bars.
    #[inline]
    #[must_use]
    pub fn error_bars(&self) -> ErrorBars {
        self.error_bars
    }

    /// Returns the tag identifying the computation that produced the value.
    #[inline]
    #[must_use]
    pub fn source_tag(&self) -> &str {
        &self.source_tag
    }

    /// Returns when the metric was computed.
    #[inline]
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Returns true if the value, bounds and confidence satisfy the
    /// invariants for `domain`.
    #[must_use]
    pub fn is_consistent_with(&self, domain: MetricDomain) -> bool {
        self.error_bars.low <= self.value
            && self.value <= self.error_bars.high
            && domain.contains(self.error_bars.low)
            && domain.contains(self.error_bars.high)
            && MetricDomain::UNIT.contains(self.confidence)
    }
}

impl fmt::Display for MetricResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={:.4} [{:.4}, {:.4}] conf={:.2}",
            self.source_tag, self.value, self.error_bars.low, self.error_bars.high, self.confidence
        )
    }
}

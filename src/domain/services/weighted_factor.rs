//! # Weighted Factor Model
//!
//! Table-driven linear scoring shared by every composite score.
//!
//! A model is a list of [`Factor`]s, each a `(name, weight, polarity,
//! extractor)` row. Evaluating a model against a context extracts every
//! factor, clamps it to `[0, 1]`, inverts it when the polarity says so, and
//! returns the weighted sum together with a weighted confidence and the
//! per-factor contributions.
//!
//! Weights are validated once, at construction: non-negative, finite, and
//! summing to one within [`WEIGHT_TOLERANCE`].
//!
//! # Examples
//!
//! ```
//! use dealscope::domain::services::weighted_factor::{
//!     Factor, FactorInput, Polarity, WeightedFactorModel,
//! };
//!
//! struct Deal {
//!     upside: f64,
//!     risk: f64,
//! }
//!
//! let model = WeightedFactorModel::new(
//!     "deal",
//!     vec![
//!         Factor::new("upside", 0.6, Polarity::Direct, |d: &Deal| FactorInput::certain(d.upside)),
//!         Factor::new("risk", 0.4, Polarity::Inverse, |d: &Deal| FactorInput::certain(d.risk)),
//!     ],
//! )
//! .unwrap();
//!
//! let score = model.evaluate(&Deal { upside: 1.0, risk: 0.5 });
//! assert!((score.value - 0.8).abs() < 1e-12);
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{MetricDomain, MetricResult, Timestamp};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum accepted deviation of a weight sum from one.
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Validates a weight vector for `model`.
///
/// # Errors
///
/// Returns `DomainError::InvalidWeights` if the vector is empty, contains a
/// negative or non-finite weight, or does not sum to one.
pub fn validate_weights(model: &str, weights: &[f64]) -> DomainResult<()> {
    if weights.is_empty() {
        return Err(DomainError::invalid_weights(model, "no weights"));
    }
    if let Some(bad) = weights.iter().find(|w| !(w.is_finite() && **w >= 0.0)) {
        return Err(DomainError::invalid_weights(
            model,
            format!("weight {bad} is not a non-negative number"),
        ));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(DomainError::invalid_weights(
            model,
            format!("weights sum to {sum}, expected 1"),
        ));
    }
    Ok(())
}

/// Whether a factor raises or lowers the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Higher factor values raise the score.
    Direct,
    /// The score uses `1 - value`.
    Inverse,
}

impl Polarity {
    /// Applies the polarity to a clamped factor value.
    #[inline]
    #[must_use]
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Direct => value,
            Self::Inverse => 1.0 - value,
        }
    }
}

/// One extracted factor value with the confidence of its source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorInput {
    /// Raw value; clamped to `[0, 1]` before weighting.
    pub value: f64,
    /// Confidence of the source in `[0, 1]`.
    pub confidence: f64,
}

impl FactorInput {
    /// Creates a factor input.
    #[inline]
    #[must_use]
    pub const fn new(value: f64, confidence: f64) -> Self {
        Self { value, confidence }
    }

    /// A factor input with full confidence.
    #[inline]
    #[must_use]
    pub const fn certain(value: f64) -> Self {
        Self::new(value, 1.0)
    }

    /// Value and confidence of a computed metric.
    #[inline]
    #[must_use]
    pub fn from_metric(metric: &MetricResult) -> Self {
        Self::new(metric.value(), metric.confidence())
    }
}

/// One row of a factor table.
pub struct Factor<C> {
    name: &'static str,
    weight: f64,
    polarity: Polarity,
    extract: fn(&C) -> FactorInput,
}

impl<C> Factor<C> {
    /// Creates a factor row.
    #[must_use]
    pub fn new(
        name: &'static str,
        weight: f64,
        polarity: Polarity,
        extract: fn(&C) -> FactorInput,
    ) -> Self {
        Self {
            name,
            weight,
            polarity,
            extract,
        }
    }

    /// Returns the factor name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the factor weight.
    #[inline]
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns the factor polarity.
    #[inline]
    #[must_use]
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }
}

impl<C> Clone for Factor<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            weight: self.weight,
            polarity: self.polarity,
            extract: self.extract,
        }
    }
}

impl<C> fmt::Debug for Factor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factor")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .field("polarity", &self.polarity)
            .finish_non_exhaustive()
    }
}

/// Contribution of one factor to an evaluated score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorContribution {
    /// Factor name.
    pub name: &'static str,
    /// Clamped, polarity-adjusted factor value.
    pub value: f64,
    /// Factor weight.
    pub weight: f64,
    /// `weight × value`.
    pub contribution: f64,
}

/// Result of evaluating a [`WeightedFactorModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct FactorScore {
    /// Weighted sum in `[0, 1]`.
    pub value: f64,
    /// Weighted confidence of the inputs.
    pub confidence: f64,
    /// Per-factor breakdown in table order.
    pub contributions: Vec<FactorContribution>,
}

impl FactorScore {
    /// Converts the score to a unit-domain metric with relative error bars.
    #[must_use]
    pub fn to_metric(&self, source_tag: &str, as_of: Timestamp) -> MetricResult {
        MetricResult::with_relative_margin(
            self.value,
            self.confidence,
            MetricDomain::UNIT,
            source_tag,
            as_of,
        )
    }
}

/// A validated factor table.
pub struct WeightedFactorModel<C> {
    name: &'static str,
    factors: Vec<Factor<C>>,
}

impl<C> WeightedFactorModel<C> {
    /// Creates a model after validating its weights.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidWeights` if the weights fail
    /// [`validate_weights`].
    pub fn new(name: &'static str, factors: Vec<Factor<C>>) -> DomainResult<Self> {
        let weights: Vec<f64> = factors.iter().map(Factor::weight).collect();
        validate_weights(name, &weights)?;
        Ok(Self { name, factors })
    }

    /// Returns the model name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the factor table.
    #[inline]
    #[must_use]
    pub fn factors(&self) -> &[Factor<C>] {
        &self.factors
    }

    /// Returns the sum of the weights (one, within tolerance).
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.factors.iter().map(Factor::weight).sum()
    }

    /// Evaluates the model against `context`.
    #[must_use]
    pub fn evaluate(&self, context: &C) -> FactorScore {
        let mut value = 0.0;
        let mut confidence = 0.0;
        let mut contributions = Vec::with_capacity(self.factors.len());

        for factor in &self.factors {
            let input = (factor.extract)(context);
            let clamped = MetricDomain::UNIT.clamp(input.value);
            let adjusted = factor.polarity.apply(clamped);
            let contribution = factor.weight * adjusted;

            value += contribution;
            confidence += factor.weight * MetricDomain::UNIT.clamp(input.confidence);
            contributions.push(FactorContribution {
                name: factor.name,
                value: adjusted,
                weight: factor.weight,
                contribution,
            });
        }

        FactorScore {
            value: MetricDomain::UNIT.clamp(value),
            confidence: MetricDomain::UNIT.clamp(confidence),
            contributions,
        }
    }
}

impl<C> Clone for WeightedFactorModel<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            factors: self.factors.clone(),
        }
    }
}

impl<C> fmt::Debug for WeightedFactorModel<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedFactorModel")
            .field("name", &self.name)
            .field("factors", &self.factors)
            .finish()
    }
}

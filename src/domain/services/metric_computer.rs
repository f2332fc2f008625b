//! # Metric Computer
//!
//! Per-entity market and risk indicators, each returned as a
//! [`MetricResult`] with heuristic confidence and domain-clamped error bars.
//!
//! | Output key | Function | Domain |
//! |------------|----------|--------|
//! | `HHI_local` | [`hhi_from_revenues`] | `[0, 1]` |
//! | `FS_ms` | [`multi_scale_fragmentation`] | `[0, 1]` |
//! | `SRI` | [`succession_risk`] | `[0, 1]` |
//! | `lambda1` | [`event_intensity`] | `[0, ∞)` |
//! | `D2` | [`complexity_estimate`] | `[0.5, 3.0]` |
//!
//! Unless stated otherwise the error margin is `(1 - confidence) × value`.
//! Every function is pure: the same inputs and `as_of` give the same result.
//!
//! # Examples
//!
//! ```
//! use dealscope::domain::services::metric_computer::{fragmentation, hhi_from_revenues};
//! use dealscope::domain::value_objects::Timestamp;
//!
//! let as_of = Timestamp::from_secs(1_700_000_000).unwrap();
//! let hhi = hhi_from_revenues(&[100.0, 100.0, 100.0, 100.0], as_of);
//!
//! assert!((hhi.value() - 0.25).abs() < 1e-12);
//! assert!((fragmentation(&hhi, as_of).value() - 0.75).abs() < 1e-12);
//! ```

use crate::domain::entities::BusinessEntity;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::services::weighted_factor::validate_weights;
use crate::domain::value_objects::{MetricDomain, MetricResult, Timestamp};
use serde::{Deserialize, Serialize};

/// Source tag of the local HHI.
pub const HHI_TAG: &str = "hhi";
/// Source tag of fragmentation derived from an HHI.
pub const FRAGMENTATION_TAG: &str = "fragmentation";
/// Source tag of the multi-scale fragmentation score.
pub const MULTI_SCALE_FRAGMENTATION_TAG: &str = "multi_scale_fragmentation";
/// Source tag of the succession risk index.
pub const SUCCESSION_RISK_TAG: &str = "succession_risk";
/// Source tag of the event intensity.
pub const EVENT_INTENSITY_TAG: &str = "event_intensity";
/// Source tag of the complexity estimate.
pub const COMPLEXITY_TAG: &str = "complexity_estimate";

/// Default excitation added per recent event.
pub const DEFAULT_EXCITATION_PER_EVENT: f64 = 0.05;
/// Default event lookback window in days.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 90;
/// Default delay-embedding dimension.
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 3;

/// Complexity value reported when a series is too short to embed.
pub const NEUTRAL_COMPLEXITY: f64 = 1.5;
/// Confidence attached to [`NEUTRAL_COMPLEXITY`].
const NEUTRAL_COMPLEXITY_CONFIDENCE: f64 = 0.1;
/// Minimum number of embedded vectors for a correlation-sum estimate.
const MIN_EMBEDDED_POINTS: usize = 4;
/// Only the most recent points are embedded; pair counting is quadratic.
const MAX_SERIES_POINTS: usize = 512;

/// Tunables for the per-entity metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricConfig {
    /// Radii (km) of the fragmentation scales, smallest first.
    pub scales_km: Vec<f64>,
    /// Weight of each scale; must sum to one.
    pub scale_weights: Vec<f64>,
    /// Intensity added per event inside the lookback window.
    pub excitation_per_event: f64,
    /// Lookback window for recent events, in days.
    pub lookback_days: i64,
    /// Delay-embedding dimension of the complexity estimate.
    pub embedding_dimension: usize,
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            scales_km: vec![1.0, 5.0, 25.0],
            scale_weights: vec![0.5, 0.3, 0.2],
            excitation_per_event: DEFAULT_EXCITATION_PER_EVENT,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
        }
    }
}

impl MetricConfig {
    /// Validates scales, scale weights and scalar tunables.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DimensionMismatch` if scales and weights differ
    /// in length, `DomainError::InvalidWeights` if the weights do not sum to
    /// one, and `DomainError::InvalidInput` for non-positive scales, negative
    /// excitation, a negative lookback, or a zero embedding dimension.
    pub fn validate(&self) -> DomainResult<()> {
        if self.scales_km.len() != self.scale_weights.len() {
            return Err(DomainError::DimensionMismatch {
                context: "scale weights",
                expected: self.scales_km.len(),
                actual: self.scale_weights.len(),
            });
        }
        validate_scales(&self.scales_km)?;
        validate_weights(MULTI_SCALE_FRAGMENTATION_TAG, &self.scale_weights)?;
        if !(self.excitation_per_event.is_finite() && self.excitation_per_event >= 0.0) {
            return Err(DomainError::invalid_input(
                "excitation_per_event must be a non-negative number",
            ));
        }
        if self.lookback_days < 0 {
            return Err(DomainError::invalid_input("lookback_days must be >= 0"));
        }
        if self.embedding_dimension == 0 {
            return Err(DomainError::invalid_input("embedding_dimension must be >= 1"));
        }
        Ok(())
    }
}

/// Herfindahl-Hirschman index of market shares.
///
/// Shares are normalised by their sum, so raw revenues are accepted as well
/// as fractions. A zero (or empty) total yields an HHI of 0. Negative and
/// non-finite entries count as zero.
///
/// Confidence grows with the number of participants:
/// `clamp(0.5 + n/20, 0.5, 0.95)`.
#[must_use]
pub fn hhi(shares: &[f64], as_of: Timestamp) -> MetricResult {
    let cleaned: Vec<f64> = shares
        .iter()
        .map(|&s| if s.is_finite() && s > 0.0 { s } else { 0.0 })
        .collect();
    let total: f64 = cleaned.iter().sum();

    let value = if total > 0.0 {
        cleaned.iter().map(|s| (s / total).powi(2)).sum()
    } else {
        0.0
    };

    let participants = cleaned.iter().filter(|&&s| s > 0.0).count();
    let confidence = (0.5 + participants as f64 / 20.0).clamp(0.5, 0.95);

    MetricResult::with_relative_margin(value, confidence, MetricDomain::UNIT, HHI_TAG, as_of)
}

/// HHI of a set of revenues; alias of [`hhi`] that documents intent.
#[inline]
#[must_use]
pub fn hhi_from_revenues(revenues: &[f64], as_of: Timestamp) -> MetricResult {
    hhi(revenues, as_of)
}

/// Fragmentation `1 - hhi`, carrying the HHI's confidence.
#[must_use]
pub fn fragmentation(hhi: &MetricResult, as_of: Timestamp) -> MetricResult {
    MetricResult::with_relative_margin(
        1.0 - hhi.value(),
        hhi.confidence(),
        MetricDomain::UNIT,
        FRAGMENTATION_TAG,
        as_of,
    )
}

/// Weighted average of local fragmentation across spatial scales.
///
/// At each scale with `n` competitors, local fragmentation is `1 - 1/n`
/// (the equal-share HHI complement); a count of zero is treated as one.
///
/// Confidence is `clamp(1 - Σ wᵢ/√nᵢ, 0.1, 0.95)`: sparse scales pull it down.
///
/// # Errors
///
/// Returns `DomainError::DimensionMismatch` if the three slices differ in
/// length, `DomainError::InvalidWeights` if the weights are negative or do
/// not sum to one, and `DomainError::InvalidInput` for non-positive scales.
pub fn multi_scale_fragmentation(
    scales: &[f64],
    weights: &[f64],
    local_competitor_counts: &[u32],
    as_of: Timestamp,
) -> DomainResult<MetricResult> {
    if weights.len() != scales.len() {
        return Err(DomainError::DimensionMismatch {
            context: "scale weights",
            expected: scales.len(),
            actual: weights.len(),
        });
    }
    if local_competitor_counts.len() != scales.len() {
        return Err(DomainError::DimensionMismatch {
            context: "competitor counts",
            expected: scales.len(),
            actual: local_competitor_counts.len(),
        });
    }
    validate_scales(scales)?;
    validate_weights(MULTI_SCALE_FRAGMENTATION_TAG, weights)?;

    let (value, dispersion) = weights.iter().zip(local_competitor_counts).fold(
        (0.0, 0.0),
        |(value, dispersion), (&weight, &count)| {
            let n = f64::from(count.max(1));
            (value + weight * (1.0 - 1.0 / n), dispersion + weight / n.sqrt())
        },
    );
    let confidence = (1.0 - dispersion).clamp(0.1, 0.95);

    Ok(MetricResult::with_relative_margin(
        value,
        confidence,
        MetricDomain::UNIT,
        MULTI_SCALE_FRAGMENTATION_TAG,
        as_of,
    ))
}

fn validate_scales(scales: &[f64]) -> DomainResult<()> {
    if let Some(bad) = scales.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
        return Err(DomainError::invalid_input(format!(
            "scale {bad} must be a positive radius"
        )));
    }
    Ok(())
}

/// Inputs to the succession risk heuristic; `None` means not observed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SuccessionInputs {
    /// Owner age in years (default 45 when absent).
    pub owner_age: Option<u32>,
    /// Years the owner has run the business (default 10 when absent).
    pub tenure_years: Option<u32>,
    /// Share of family members in management.
    pub family_involvement: Option<f64>,
    /// Whether a documented succession plan exists.
    pub has_succession_plan: Option<bool>,
}

impl SuccessionInputs {
    /// Extracts the inputs from an entity record.
    #[must_use]
    pub fn from_entity(entity: &BusinessEntity) -> Self {
        Self {
            owner_age: entity.owner_age(),
            tenure_years: entity.years_in_business(),
            family_involvement: entity.family_involvement(),
            has_succession_plan: entity.has_succession_plan(),
        }
    }

    fn data_points(&self) -> u32 {
        u32::from(self.owner_age.is_some())
            + u32::from(self.tenure_years.is_some())
            + u32::from(self.family_involvement.is_some())
            + u32::from(self.has_succession_plan.is_some())
    }
}

/// Additive succession risk heuristic clamped to `[0, 1]`.
///
/// ```text
/// age        > 65: +0.40   > 55: +0.25   > 45: +0.10
/// tenure     > 20: +0.15   <  5: +0.20
/// family     > 0.7: -0.10  < 0.3: +0.15
/// plan       yes: -0.20    no/unknown: +0.25
/// ```
///
/// Confidence is `min(0.4 + observed_inputs/10, 0.9)`.
///
/// # Examples
///
/// ```
/// use dealscope::domain::services::metric_computer::{succession_risk, SuccessionInputs};
/// use dealscope::domain::value_objects::Timestamp;
///
/// let as_of = Timestamp::from_secs(1_700_000_000).unwrap();
/// let sri = succession_risk(
///     &SuccessionInputs {
///         owner_age: Some(68),
///         tenure_years: Some(25),
///         family_involvement: Some(0.1),
///         has_succession_plan: Some(false),
///     },
///     as_of,
/// );
/// // 0.40 + 0.15 + 0.15 + 0.25 = 0.95
/// assert!((sri.value() - 0.95).abs() < 1e-9);
/// assert!((sri.confidence() - 0.8).abs() < 1e-9);
/// ```
#[must_use]
pub fn succession_risk(inputs: &SuccessionInputs, as_of: Timestamp) -> MetricResult {
    use crate::domain::entities::{DEFAULT_OWNER_AGE, DEFAULT_TENURE_YEARS};

    let age = inputs.owner_age.unwrap_or(DEFAULT_OWNER_AGE);
    let tenure = inputs.tenure_years.unwrap_or(DEFAULT_TENURE_YEARS);

    let mut risk = 0.0;

    risk += match age {
        a if a > 65 => 0.4,
        a if a > 55 => 0.25,
        a if a > 45 => 0.1,
        _ => 0.0,
    };

    if tenure > 20 {
        risk += 0.15;
    } else if tenure < 5 {
        risk += 0.2;
    }

    if let Some(family) = inputs.family_involvement {
        if family > 0.7 {
            risk -= 0.1;
        } else if family < 0.3 {
            risk += 0.15;
        }
    }

    risk += if inputs.has_succession_plan == Some(true) {
        -0.2
    } else {
        0.25
    };

    let confidence = (0.4 + f64::from(inputs.data_points()) / 10.0).min(0.9);

    MetricResult::with_relative_margin(
        risk,
        confidence,
        MetricDomain::UNIT,
        SUCCESSION_RISK_TAG,
        as_of,
    )
}

/// Counts events inside `[as_of - lookback_days, as_of]`.
#[must_use]
pub fn count_recent_events(events: &[Timestamp], as_of: Timestamp, lookback_days: i64) -> usize {
    let window_start = as_of.sub_days(lookback_days);
    events
        .iter()
        .filter(|event| event.is_within(&window_start, &as_of))
        .count()
}

/// Self-exciting event intensity `λ = base + excitation × recent`.
///
/// `recent_event_count` counts events inside the lookback window (see
/// [`count_recent_events`]); `total_event_count` is every event observed and
/// only drives confidence: `0.3 + 0.6 × (1 - e^(-total/10))`.
#[must_use]
pub fn event_intensity(
    base_intensity: f64,
    recent_event_count: usize,
    total_event_count: usize,
    excitation_per_event: f64,
    as_of: Timestamp,
) -> MetricResult {
    let base = if base_intensity.is_finite() {
        base_intensity.max(0.0)
    } else {
        0.0
    };
    let lambda = base + excitation_per_event * recent_event_count as f64;
    let confidence = 0.3 + 0.6 * (1.0 - (-(total_event_count as f64) / 10.0).exp());

    MetricResult::with_relative_margin(
        lambda,
        confidence,
        MetricDomain::NON_NEGATIVE,
        EVENT_INTENSITY_TAG,
        as_of,
    )
}

/// Correlation-dimension estimate of an activity series, bounded to
/// `[0.5, 3.0]`.
///
/// The series (most recent 512 points) is z-normalised and delay-embedded in
/// `embedding_dimension` dimensions. With `C(r)` the fraction of embedded
/// pairs closer than `r`, the estimate is the log-log slope between the
/// 10th and 50th percentile pair distances:
///
/// ```text
/// D2 = ln(C(r50) / C(r10)) / ln(r50 / r10)
/// ```
///
/// Series with fewer than four embedded points, or containing non-finite
/// values, yield 1.5 at confidence 0.1. A constant series has no spread and
/// yields the domain minimum. Otherwise confidence is
/// `clamp(0.1 + len/120, 0.1, 0.9)`.
#[must_use]
pub fn complexity_estimate(
    series: &[f64],
    embedding_dimension: usize,
    as_of: Timestamp,
) -> MetricResult {
    let domain = MetricDomain::COMPLEXITY;
    let neutral = || {
        MetricResult::with_relative_margin(
            NEUTRAL_COMPLEXITY,
            NEUTRAL_COMPLEXITY_CONFIDENCE,
            domain,
            COMPLEXITY_TAG,
            as_of,
        )
    };

    let dimension = embedding_dimension.max(1);
    let recent = series
        .len()
        .checked_sub(MAX_SERIES_POINTS)
        .and_then(|skip| series.get(skip..))
        .unwrap_or(series);

    if recent.iter().any(|x| !x.is_finite()) {
        return neutral();
    }
    let embedded_points = (recent.len() + 1).saturating_sub(dimension);
    if embedded_points < MIN_EMBEDDED_POINTS {
        return neutral();
    }

    let confidence = (0.1 + series.len() as f64 / 120.0).clamp(0.1, 0.9);
    let value = correlation_dimension(recent, dimension, embedded_points).unwrap_or(domain.min);

    MetricResult::with_relative_margin(value, confidence, domain, COMPLEXITY_TAG, as_of)
}

/// Returns `None` when the embedded cloud has no usable spread.
fn correlation_dimension(series: &[f64], dimension: usize, points: usize) -> Option<f64> {
    let n = series.len() as f64;
    let mean = series.iter().sum::<f64>() / n;
    let std = (series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();
    if std < f64::EPSILON {
        return None;
    }
    let normalised: Vec<f64> = series.iter().map(|x| (x - mean) / std).collect();

    let embedded: Vec<&[f64]> = normalised.windows(dimension).take(points).collect();
    let mut distances = Vec::with_capacity(points * (points - 1) / 2);
    for (i, a) in embedded.iter().enumerate() {
        for b in embedded.iter().skip(i + 1) {
            let d2: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum();
            distances.push(d2.sqrt());
        }
    }
    let total_pairs = distances.len() as f64;

    let mut positive: Vec<f64> = distances.iter().copied().filter(|d| *d > 0.0).collect();
    if positive.len() < 2 {
        return None;
    }
    positive.sort_by(f64::total_cmp);

    let quantile = |q: f64| {
        let idx = ((positive.len() - 1) as f64 * q).round() as usize;
        positive.get(idx).copied()
    };
    let r_small = quantile(0.1)?;
    let r_large = quantile(0.5)?;
    if r_large <= r_small {
        return None;
    }

    let correlation_sum =
        |r: f64| distances.iter().filter(|d| **d <= r).count() as f64 / total_pairs;
    let c_small = correlation_sum(r_small);
    let c_large = correlation_sum(r_large);

    Some((c_large / c_small).ln() / (r_large / r_small).ln())
}

/// The metric functions bound to one [`MetricConfig`].
#[derive(Debug, Clone)]
pub struct MetricComputer {
    config: MetricConfig,
}

impl MetricComputer {
    /// Creates a computer after validating its configuration.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by [`MetricConfig::validate`].
    pub fn new(config: MetricConfig) -> DomainResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &MetricConfig {
        &self.config
    }

    /// `FS_ms` with the configured scales and weights.
    ///
    /// Missing trailing competitor counts are treated as zero competitors;
    /// extra counts are ignored.
    #[must_use]
    pub fn fragmentation_for(&self, competitor_counts: &[u32], as_of: Timestamp) -> MetricResult {
        let counts: Vec<u32> = (0..self.config.scales_km.len())
            .map(|i| competitor_counts.get(i).copied().unwrap_or(0))
            .collect();
        match multi_scale_fragmentation(
            &self.config.scales_km,
            &self.config.scale_weights,
            &counts,
            as_of,
        ) {
            Ok(result) => result,
            // Unreachable after `MetricConfig::validate`; fall back to the
            // least informative answer rather than failing the entity.
            Err(_) => MetricResult::with_relative_margin(
                0.0,
                0.1,
                MetricDomain::UNIT,
                MULTI_SCALE_FRAGMENTATION_TAG,
                as_of,
            ),
        }
    }

    /// `lambda1` from event dates with the configured window and excitation.
    #[must_use]
    pub fn intensity_for(
        &self,
        base_intensity: f64,
        events: &[Timestamp],
        as_of: Timestamp,
    ) -> MetricResult {
        let recent = count_recent_events(events, as_of, self.config.lookback_days);
        event_intensity(
            base_intensity,
            recent,
            events.len(),
            self.config.excitation_per_event,
            as_of,
        )
    }

    /// `D2` with the configured embedding dimension.
    #[must_use]
    pub fn complexity_for(&self, series: &[f64], as_of: Timestamp) -> MetricResult {
        complexity_estimate(series, self.config.embedding_dimension, as_of)
    }
}

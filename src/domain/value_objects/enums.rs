//! # Domain Enums
//!
//! Enumeration types for domain concepts.
//!
//! - [`ConcentrationLabel`] - Market structure classification from HHI
//! - [`RiskLevel`] - Coarse risk bucket from the number of risk tags
//! - [`ScoringIntent`] - Which composite score ranks a batch
//! - [`RiskTag`] - Recognised risk-factor tags with valuation penalties
//!
//! All enums implement `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`,
//! `Display`, `FromStr`, and Serde traits.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Market concentration classification.
///
/// # Examples
///
/// ```
/// use dealscope::domain::value_objects::enums::ConcentrationLabel;
///
/// assert_eq!(ConcentrationLabel::from_hhi(0.30), ConcentrationLabel::Concentrated);
/// assert_eq!(ConcentrationLabel::from_hhi(0.20), ConcentrationLabel::Moderate);
/// assert_eq!(ConcentrationLabel::from_hhi(0.15), ConcentrationLabel::Fragmented);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConcentrationLabel {
    /// HHI at or below 0.15.
    Fragmented,
    /// HHI above 0.15 and at or below 0.25.
    Moderate,
    /// HHI above 0.25.
    Concentrated,
}

impl ConcentrationLabel {
    /// HHI above which a market is concentrated.
    pub const CONCENTRATED_ABOVE: f64 = 0.25;
    /// HHI above which a market is moderately concentrated.
    pub const MODERATE_ABOVE: f64 = 0.15;

    /// Classifies a Herfindahl-Hirschman index.
    #[must_use]
    pub fn from_hhi(hhi: f64) -> Self {
        if hhi > Self::CONCENTRATED_ABOVE {
            Self::Concentrated
        } else if hhi > Self::MODERATE_ABOVE {
            Self::Moderate
        } else {
            Self::Fragmented
        }
    }
}

impl fmt::Display for ConcentrationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fragmented => write!(f, "fragmented"),
            Self::Moderate => write!(f, "moderate"),
            Self::Concentrated => write!(f, "concentrated"),
        }
    }
}

impl FromStr for ConcentrationLabel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fragmented" => Ok(Self::Fragmented),
            "moderate" => Ok(Self::Moderate),
            "concentrated" => Ok(Self::Concentrated),
            _ => Err(ParseEnumError::InvalidValue(
                "ConcentrationLabel",
                s.to_string(),
            )),
        }
    }
}

/// Risk bucket derived from how many risk-factor tags an entity carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum RiskLevel {
    /// No risk tags.
    Low,
    /// Exactly one risk tag.
    Medium,
    /// Two or more risk tags.
    High,
}

impl RiskLevel {
    /// Classifies by tag count.
    ///
    /// # Examples
    ///
    /// ```
    /// use dealscope::domain::value_objects::enums::RiskLevel;
    ///
    /// assert_eq!(RiskLevel::from_tag_count(0), RiskLevel::Low);
    /// assert_eq!(RiskLevel::from_tag_count(1), RiskLevel::Medium);
    /// assert_eq!(RiskLevel::from_tag_count(3), RiskLevel::High);
    /// ```
    #[inline]
    #[must_use]
    pub const fn from_tag_count(count: usize) -> Self {
        match count {
            0 => Self::Low,
            1 => Self::Medium,
            _ => Self::High,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

impl FromStr for RiskLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseEnumError::InvalidValue("RiskLevel", s.to_string())),
        }
    }
}

/// The acquisition thesis a batch is scored for.
///
/// Selects which composite score orders the batch ranking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ScoringIntent {
    /// Platform-plus-add-on rollup; ranks by MROS.
    Rollup,
    /// Single standalone acquisition; ranks by AAS.
    #[default]
    Acquisition,
    /// Portfolio construction; ranks by PCVS.
    Portfolio,
}

impl fmt::Display for ScoringIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rollup => write!(f, "rollup"),
            Self::Acquisition => write!(f, "acquisition"),
            Self::Portfolio => write!(f, "portfolio"),
        }
    }
}

impl FromStr for ScoringIntent {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rollup" | "roll-up" => Ok(Self::Rollup),
            "acquisition" => Ok(Self::Acquisition),
            "portfolio" => Ok(Self::Portfolio),
            _ => Err(ParseEnumError::InvalidValue("ScoringIntent", s.to_string())),
        }
    }
}

/// Risk-factor tags the valuation model recognises.
///
/// Entities carry free-form tags; tags that do not parse into a `RiskTag`
/// still count toward [`RiskLevel`] but carry no multiple penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RiskTag {
    /// Owner exit without a successor.
    Succession,
    /// Stale web presence, no online booking, poor reviews response.
    DigitalNeglect,
    /// Negative reputation signals.
    Reputation,
    /// Licensing or compliance exposure.
    Regulatory,
    /// Liens, late filings, or other financial stress.
    Financial,
}

impl fmt::Display for RiskTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succession => write!(f, "succession"),
            Self::DigitalNeglect => write!(f, "digital-neglect"),
            Self::Reputation => write!(f, "reputation"),
            Self::Regulatory => write!(f, "regulatory"),
            Self::Financial => write!(f, "financial"),
        }
    }
}

impl FromStr for RiskTag {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "succession" => Ok(Self::Succession),
            "digital-neglect" => Ok(Self::DigitalNeglect),
            "reputation" => Ok(Self::Reputation),
            "regulatory" => Ok(Self::Regulatory),
            "financial" | "financial-stress" => Ok(Self::Financial),
            _ => Err(ParseEnumError::InvalidValue("RiskTag", s.to_string())),
        }
    }
}

/// Error returned when parsing an enum from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEnumError {
    /// The provided string value is not valid for the enum.
    InvalidValue(&'static str, String),
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue(enum_name, value) => {
                write!(f, "invalid {} value: '{}'", enum_name, value)
            }
        }
    }
}

impl std::error::Error for ParseEnumError {}

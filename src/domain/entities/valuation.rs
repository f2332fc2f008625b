//! # Valuation
//!
//! EBITDA-multiple valuation ranges and their adjustments.

use crate::domain::value_objects::RiskLevel;
use crate::domain::value_objects::arithmetic::{ArithmeticResult, CheckedArithmetic};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive `[low, high]` range of EBITDA multiples.
///
/// # Examples
///
/// ```
/// use dealscope::domain::entities::valuation::MultipleRange;
/// use rust_decimal::Decimal;
///
/// let range = MultipleRange::new(Decimal::new(4, 0), Decimal::new(7, 0)).unwrap();
/// assert_eq!(range.shifted(Decimal::new(-15, 1)).unwrap().low(), Decimal::new(25, 1));
///
/// assert!(MultipleRange::new(Decimal::new(7, 0), Decimal::new(4, 0)).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub struct MultipleRange {
    low: Decimal,
    high: Decimal,
}

impl MultipleRange {
    /// Creates a range. Returns `None` if `low > high`.
    #[must_use]
    pub fn new(low: Decimal, high: Decimal) -> Option<Self> {
        (low <= high).then_some(Self { low, high })
    }

    /// Returns the lower multiple.
    #[inline]
    #[must_use]
    pub const fn low(&self) -> Decimal {
        self.low
    }

    /// Returns the upper multiple.
    #[inline]
    #[must_use]
    pub const fn high(&self) -> Decimal {
        self.high
    }

    /// Returns the range shifted by `delta` at both ends.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` if either end overflows.
    pub fn shifted(&self, delta: Decimal) -> ArithmeticResult<Self> {
        Ok(Self {
            low: self.low.safe_add(delta)?,
            high: self.high.safe_add(delta)?,
        })
    }
}

impl fmt::Display for MultipleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}x, {}x]", self.low, self.high)
    }
}

/// Enterprise value estimate for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Valuation {
    /// EBITDA the multiples were applied to.
    pub ebitda: Decimal,
    /// Industry multiple range before adjustments.
    pub base_multiple: MultipleRange,
    /// Size adjustment applied to both ends (−1, 0 or +1).
    pub size_adjustment: Decimal,
    /// Sum of risk-tag penalties (zero or negative).
    pub risk_penalty: Decimal,
    /// `base_multiple` shifted by size adjustment and risk penalty.
    pub adjusted_multiple: MultipleRange,
    /// Lower enterprise value, floored at twice EBITDA.
    pub ev_low: Decimal,
    /// Upper enterprise value, `(adjusted high) × ebitda`.
    ///
    /// Raised to `ev_low` when the floor lifts `ev_low` above it, so the
    /// range is never inverted.
    pub ev_high: Decimal,
    /// Seller propensity score in `0..=100`.
    pub seller_propensity: u8,
    /// Risk bucket from the entity's risk-factor tag count.
    pub risk_level: RiskLevel,
}

impl Valuation {
    /// Returns the midpoint of `[ev_low, ev_high]`.
    ///
    /// Never overflows, even when `ev_low + ev_high` exceeds `Decimal::MAX`.
    #[must_use]
    pub fn ev_midpoint(&self) -> Decimal {
        match self.ev_high.checked_sub(self.ev_low) {
            // lies between the bounds
            Some(span) => self.ev_low + span / Decimal::TWO,
            // opposite signs: the halves cannot overflow
            None => self.ev_low / Decimal::TWO + self.ev_high / Decimal::TWO,
        }
    }
}

impl fmt::Display for Valuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Valuation(ebitda={} multiple={} ev=[{}, {}] propensity={} risk={})",
            self.ebitda,
            self.adjusted_multiple,
            self.ev_low,
            self.ev_high,
            self.seller_propensity,
            self.risk_level
        )
    }
}

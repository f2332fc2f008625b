//! # Timestamp Value Object
//!
//! DateTime wrapper with domain-specific methods.
//!
//! Every [`MetricResult`](super::metric_result::MetricResult) carries the
//! timestamp of the batch that produced it. Batches take an explicit `as_of`
//! instant so that re-running a batch on identical inputs reproduces the
//! same output, including event lookback windows.
//!
//! # Examples
//!
//! ```
//! use dealscope::domain::value_objects::timestamp::Timestamp;
//!
//! let as_of = Timestamp::from_secs(1_700_000_000).unwrap();
//! let window_start = as_of.sub_days(90);
//!
//! assert!(window_start.is_before(&as_of));
//! ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A UTC timestamp.
///
/// Wraps `chrono::DateTime<Utc>`; serialized as an RFC 3339 string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from Unix seconds.
    ///
    /// Returns `None` if the value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use dealscope::domain::value_objects::timestamp::Timestamp;
    ///
    /// let ts = Timestamp::from_secs(1_704_067_200).unwrap();
    /// assert_eq!(ts.timestamp_secs(), 1_704_067_200);
    /// ```
    #[must_use]
    pub fn from_secs(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Returns Unix seconds.
    #[inline]
    #[must_use]
    pub fn timestamp_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Returns a timestamp `days` days earlier.
    #[must_use]
    pub fn sub_days(&self, days: i64) -> Self {
        Self(self.0 - Duration::days(days))
    }

    /// Returns a timestamp `days` days later.
    #[must_use]
    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Returns true if this timestamp is strictly before `other`.
    #[inline]
    #[must_use]
    pub fn is_before(&self, other: &Self) -> bool {
        self.0 < other.0
    }

    /// Returns true if this timestamp is strictly after `other`.
    #[inline]
    #[must_use]
    pub fn is_after(&self, other: &Self) -> bool {
        self.0 > other.0
    }

    /// Returns true if `start <= self <= end`.
    #[inline]
    #[must_use]
    pub fn is_within(&self, start: &Self, end: &Self) -> bool {
        self.0 >= start.0 && self.0 <= end.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

//! # Identifiers
//!
//! String-based identifier for business entities supplied by the caller.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-assigned identifier of a business entity.
///
/// The engine never generates entity ids; it only uses them to key results
/// and to break ranking ties deterministically (ascending lexical order).
///
/// # Examples
///
/// ```
/// use dealscope::domain::value_objects::EntityId;
///
/// let id = EntityId::new("biz-001");
/// assert_eq!(id.as_str(), "biz-001");
/// assert!(EntityId::new("biz-001") < EntityId::new("biz-002"));
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Creates a new entity id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the id is empty or whitespace.
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_detection() {
        assert!(EntityId::new("  ").is_blank());
        assert!(!EntityId::new("a").is_blank());
    }

    #[test]
    fn display_is_raw() {
        assert_eq!(EntityId::from("biz-9").to_string(), "biz-9");
    }
}

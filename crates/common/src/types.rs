use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an aggregate instance.
///
/// Wraps a UUID so book identifiers cannot be mixed up with other
/// UUID-based identifiers at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(Uuid);

impl AggregateId {
    /// Creates a new random aggregate ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an aggregate ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AggregateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AggregateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for AggregateId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<AggregateId> for Uuid {
    fn from(id: AggregateId) -> Self {
        id.0
    }
}

/// Error returned when constructing a [`Ratio`] from an out-of-range value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("ratio must be a finite value between 0 and 1, got {value}")]
pub struct InvalidRatio {
    pub value: f64,
}

/// A fraction in the closed interval `[0, 1]`.
///
/// Used for threshold checks such as the unsold-copies ratio that gates
/// moving a published book out of print.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ratio(f64);

impl Ratio {
    /// Creates a ratio, rejecting values outside `[0, 1]` and non-finite values.
    pub fn new(value: f64) -> Result<Self, InvalidRatio> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidRatio { value })
        }
    }

    /// Creates a ratio from a whole percentage, clamped to 100%.
    pub fn from_percent(percent: u8) -> Self {
        Self(f64::from(percent.min(100)) / 100.0)
    }

    /// The zero ratio.
    pub fn zero() -> Self {
        Self(0.0)
    }

    /// Returns the raw fraction.
    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Ratio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_id_new_creates_unique_ids() {
        let id1 = AggregateId::new();
        let id2 = AggregateId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn aggregate_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = AggregateId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn aggregate_id_serialization_roundtrip() {
        let id = AggregateId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: AggregateId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn ratio_accepts_bounds() {
        assert!(Ratio::new(0.0).is_ok());
        assert!(Ratio::new(1.0).is_ok());
        assert!(Ratio::new(0.1).is_ok());
    }

    #[test]
    fn ratio_rejects_out_of_range() {
        assert!(Ratio::new(-0.01).is_err());
        assert!(Ratio::new(1.01).is_err());
        assert!(Ratio::new(f64::NAN).is_err());
    }

    #[test]
    fn ratio_from_percent_clamps() {
        assert_eq!(Ratio::from_percent(10).as_f64(), 0.10);
        assert_eq!(Ratio::from_percent(200).as_f64(), 1.0);
    }

    #[test]
    fn ratio_display_as_percent() {
        assert_eq!(Ratio::from_percent(10).to_string(), "10.0%");
    }
}

//! RatingValue - peer rating on a weekly update

use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

/// Star rating, always within `1..=5`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct RatingValue(u8);

impl RatingValue {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Create new rating with business validation
    pub fn new(value: i64) -> DomainResult<Self> {
        if !(i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            return Err(DomainError::InvalidRating(value));
        }
        Ok(Self(value as u8))
    }

    /// Get the rating value
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for RatingValue {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RatingValue> for i64 {
    fn from(value: RatingValue) -> Self {
        i64::from(value.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_validation() {
        assert!(RatingValue::new(1).is_ok());
        assert!(RatingValue::new(5).is_ok());
        assert_eq!(RatingValue::new(0), Err(DomainError::InvalidRating(0)));
        assert_eq!(RatingValue::new(6), Err(DomainError::InvalidRating(6)));
        assert!(RatingValue::new(-3).is_err());
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<RatingValue>("4").is_ok());
        assert!(serde_json::from_str::<RatingValue>("9").is_err());
    }
}

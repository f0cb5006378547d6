//! Product rating type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    /// The value exceeds the five-star scale.
    #[error("rating must be at most {max} (got {value})")]
    OutOfRange {
        /// The rejected value.
        value: u8,
        /// Maximum allowed rating.
        max: u8,
    },
}

/// Aggregate product rating on a whole-star scale of 0 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Highest possible rating.
    pub const MAX: u8 = 5;

    /// Create a rating.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::OutOfRange`] if `value` is above [`Rating::MAX`].
    pub const fn new(value: u8) -> Result<Self, RatingError> {
        if value > Self::MAX {
            return Err(RatingError::OutOfRange {
                value,
                max: Self::MAX,
            });
        }
        Ok(Self(value))
    }

    /// Number of stars.
    #[must_use]
    pub const fn stars(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_ok());
        assert!(Rating::new(5).is_ok());
        assert_eq!(
            Rating::new(6),
            Err(RatingError::OutOfRange { value: 6, max: 5 })
        );
    }
}

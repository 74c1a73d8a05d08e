//! Cart line quantities.
//!
//! A [`Quantity`] is never zero. Going below one is a line removal, never a
//! clamped value.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from constructing a [`Quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuantityError {
    /// The requested quantity was below one.
    #[error("Quantity must be at least 1 (got {0})")]
    BelowMinimum(i64),
}

/// A positive item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single item.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::BelowMinimum` if `value` is zero.
    pub fn new(value: u32) -> Result<Self, QuantityError> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(QuantityError::BelowMinimum(i64::from(value)))
    }

    /// Get the underlying count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Sum of two quantities, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0.get()))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(QuantityError::BelowMinimum(value))
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_rejected() {
        assert_eq!(Quantity::new(0), Err(QuantityError::BelowMinimum(0)));
        assert_eq!(Quantity::new(3).unwrap().get(), 3);
    }

    #[test]
    fn test_saturating_add_caps_at_max() {
        let max = Quantity::new(u32::MAX).unwrap();
        assert_eq!(max.saturating_add(Quantity::ONE), max);
        assert_eq!(Quantity::ONE.saturating_add(Quantity::ONE).get(), 2);
    }

    #[test]
    fn test_deserialize_rejects_non_positive() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert!(serde_json::from_str::<Quantity>("-2").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("4").unwrap().get(), 4);
        assert_eq!(serde_json::to_string(&Quantity::ONE).unwrap(), "1");
    }
}

//! Fixed-point types for prices, quantities and logical time
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point errors).
//! Payment matching compares exact decimal values, so `0.10 == 0.1`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::NumericError;

/// Whole asset units. Fractional units do not exist in the sale.
pub type Quantity = u64;

/// Logical time in seconds since the Unix epoch.
pub type Timestamp = i64;

/// Seconds in one day.
pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Positive fixed price of one asset unit, in payment base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct UnitPrice(Decimal);

impl UnitPrice {
    /// Create a price, rejecting zero and negative values.
    pub fn try_new(value: Decimal) -> Result<Self, NumericError> {
        if value <= Decimal::ZERO {
            return Err(NumericError::InvalidPrice(format!(
                "must be positive, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Get the inner decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Exact payment owed for `quantity` units.
    pub fn total_for(&self, quantity: Quantity) -> Result<Decimal, NumericError> {
        Decimal::from(quantity)
            .checked_mul(self.0)
            .ok_or_else(|| NumericError::Overflow {
                quantity,
                unit_price: self.0.to_string(),
            })
    }
}

impl TryFrom<Decimal> for UnitPrice {
    type Error = NumericError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<UnitPrice> for Decimal {
    fn from(price: UnitPrice) -> Self {
        price.0
    }
}

impl fmt::Display for UnitPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

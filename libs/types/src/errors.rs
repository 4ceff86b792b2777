//! Error types for shared numeric validation
//!
//! Comprehensive error taxonomy using thiserror

use thiserror::Error;

/// Numeric validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericError {
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Arithmetic overflow: {quantity} x {unit_price}")]
    Overflow { quantity: u64, unit_price: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_price_display() {
        let err = NumericError::InvalidPrice("must be positive, got 0".to_string());
        assert_eq!(err.to_string(), "Invalid price: must be positive, got 0");
    }

    #[test]
    fn test_overflow_display() {
        let err = NumericError::Overflow {
            quantity: 42,
            unit_price: "0.01".to_string(),
        };
        assert!(err.to_string().contains("42"));
        assert!(err.to_string().contains("0.01"));
    }
}

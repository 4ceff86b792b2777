//! Sale configuration
//!
//! Fixed at construction and immutable for the lifetime of a sale.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::numeric::{UnitPrice, SECONDS_PER_DAY};

use crate::errors::ConfigError;

/// Default maturation period: 365 days.
pub const DEFAULT_MATURATION_SECONDS: u64 = 365 * SECONDS_PER_DAY;

/// Sale parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleConfig {
    /// Price of one asset unit in payment base units (must be positive)
    pub unit_price: Decimal,
    /// Seconds a purchase must age before it can be claimed
    pub maturation_seconds: u64,
}

impl Default for SaleConfig {
    fn default() -> Self {
        Self {
            unit_price: Decimal::new(1, 2), // 0.01
            maturation_seconds: DEFAULT_MATURATION_SECONDS,
        }
    }
}

impl SaleConfig {
    pub fn new(unit_price: Decimal, maturation_seconds: u64) -> Self {
        Self {
            unit_price,
            maturation_seconds,
        }
    }

    /// Parse and validate a JSON document.
    ///
    /// ```json
    /// { "unit_price": "0.01", "maturation_seconds": 31536000 }
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SaleConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validated unit price.
    pub fn unit_price(&self) -> Result<UnitPrice, ConfigError> {
        Ok(UnitPrice::try_new(self.unit_price)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.unit_price().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SaleConfig::default();
        assert_eq!(config.unit_price, Decimal::new(1, 2));
        assert_eq!(config.maturation_seconds, 31_536_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_price_rejected() {
        let config = SaleConfig::new(Decimal::ZERO, 60);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUnitPrice(_))
        ));
    }

    #[test]
    fn test_zero_maturation_allowed() {
        let config = SaleConfig::new(Decimal::ONE, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let config =
            SaleConfig::from_json(r#"{ "unit_price": "0.25", "maturation_seconds": 3600 }"#)
                .unwrap();
        assert_eq!(config.unit_price, Decimal::new(25, 2));
        assert_eq!(config.maturation_seconds, 3600);
    }

    #[test]
    fn test_from_json_malformed() {
        let result = SaleConfig::from_json(r#"{ "unit_price": "0.25" }"#);
        assert!(matches!(result, Err(ConfigError::Malformed(_))));
    }

    #[test]
    fn test_from_json_negative_price() {
        let result =
            SaleConfig::from_json(r#"{ "unit_price": "-1", "maturation_seconds": 10 }"#);
        assert!(matches!(result, Err(ConfigError::InvalidUnitPrice(_))));
    }

    #[test]
    fn test_from_json_negative_maturation_rejected() {
        let result =
            SaleConfig::from_json(r#"{ "unit_price": "1", "maturation_seconds": -10 }"#);
        assert!(matches!(result, Err(ConfigError::Malformed(_))));
    }
}

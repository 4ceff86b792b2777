//! Sale-specific error types
//!
//! Error taxonomy for the asset store, sale configuration, purchases and
//! claims, and snapshot restoration. Every variant is distinguishable by
//! pattern matching; none carries a retry policy.

use thiserror::Error;
use types::errors::NumericError;

/// Asset store errors (token ledger transfers)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    #[error("Insufficient balance for {account}: required {required}, available {available}")]
    InsufficientBalance {
        account: String,
        required: u64,
        available: u64,
    },

    #[error("Transfer amount must be positive")]
    InvalidAmount,

    #[error("Ledger is paused")]
    Paused,

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,

    #[error("Reservation exceeded for {account}: required {required}, reserved {reserved}")]
    ReservationExceeded {
        account: String,
        required: u64,
        reserved: u64,
    },
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid unit price: {0}")]
    InvalidUnitPrice(#[from] NumericError),

    #[error("Malformed configuration: {0}")]
    Malformed(String),
}

/// Sale errors returned by `buy`, `claim` and the read-only queries
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SaleError {
    #[error("Quantity must be positive")]
    InvalidQuantity,

    #[error("Incorrect payment: expected {expected}, paid {paid}")]
    IncorrectPayment { expected: String, paid: String },

    #[error("Insufficient inventory: requested {requested}, available {available}")]
    InsufficientInventory { requested: u64, available: u64 },

    #[error("No tokens to claim")]
    NothingToClaim,

    #[error("Token transfer failed: {0}")]
    TransferFailed(AssetError),

    #[error("Inventory reservation failed: {0}")]
    ReservationFailed(AssetError),

    #[error("Purchase not found: index {index}")]
    PurchaseNotFound { index: usize },

    #[error("Arithmetic overflow in sale accounting")]
    Overflow,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Snapshot errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Integrity check failed: expected {expected}, got {actual}")]
    IntegrityFailure { expected: String, actual: String },

    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),

    #[error("Sale error: {0}")]
    Sale(#[from] SaleError),
}

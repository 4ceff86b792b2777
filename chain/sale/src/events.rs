//! Sale events for external observers and the audit log
//!
//! Events are immutable records appended by successful sale operations.
//! A failed call never emits anything.

use serde::{Deserialize, Serialize};
use types::ids::AccountId;
use types::numeric::{Quantity, Timestamp};

/// A purchase was recorded in the buyer's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecorded {
    pub buyer: AccountId,
    pub quantity: Quantity,
    pub timestamp: Timestamp,
    /// Zero-based position in the buyer's purchase sequence
    pub purchase_index: usize,
}

/// Matured purchases were released to the buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokensClaimed {
    pub buyer: AccountId,
    pub amount: Quantity,
}

/// Enum wrapper for all sale events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleEvent {
    PurchaseRecorded(PurchaseRecorded),
    TokensClaimed(TokensClaimed),
}

impl SaleEvent {
    /// Account the event concerns.
    pub fn buyer(&self) -> AccountId {
        match self {
            SaleEvent::PurchaseRecorded(e) => e.buyer,
            SaleEvent::TokensClaimed(e) => e.buyer,
        }
    }
}

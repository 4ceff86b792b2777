//! Snapshot — durable sale state with an integrity hash
//!
//! Captures everything a sale owns except the asset store (which is an
//! external collaborator and persists itself):
//! - Configuration and custody account
//! - Every buyer's purchase history, keyed in `BTreeMap` order
//! - Collected proceeds
//!
//! The checksum is a hex SHA-256 over the canonical JSON of the body, so
//! identical state always yields an identical snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use types::ids::AccountId;

use crate::asset::AssetStore;
use crate::config::SaleConfig;
use crate::errors::SnapshotError;
use crate::purchase::PurchaseHistory;
use crate::sale::Sale;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Hashed portion of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotBody {
    pub version: u32,
    pub config: SaleConfig,
    pub sale_account: AccountId,
    pub purchases: BTreeMap<AccountId, PurchaseHistory>,
    pub proceeds: Decimal,
}

impl SnapshotBody {
    /// Hex SHA-256 of the body's JSON encoding.
    pub fn compute_hash(&self) -> Result<String, SnapshotError> {
        let bytes =
            serde_json::to_vec(self).map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

/// Serializable sale state plus checksum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleSnapshot {
    pub body: SnapshotBody,
    pub checksum: String,
}

impl SaleSnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|e| SnapshotError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(|e| SnapshotError::Serialization(e.to_string()))
    }

    /// Check version and checksum.
    pub fn verify(&self) -> Result<(), SnapshotError> {
        if self.body.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.body.version));
        }
        let actual = self.body.compute_hash()?;
        if actual != self.checksum {
            return Err(SnapshotError::IntegrityFailure {
                expected: self.checksum.clone(),
                actual,
            });
        }
        Ok(())
    }
}

impl<S: AssetStore> Sale<S> {
    /// Capture the sale's state.
    pub fn snapshot(&self) -> Result<SaleSnapshot, SnapshotError> {
        let body = SnapshotBody {
            version: SNAPSHOT_VERSION,
            config: self.config(),
            sale_account: self.sale_account(),
            purchases: self.purchase_book().clone(),
            proceeds: self.proceeds(),
        };
        let checksum = body.compute_hash()?;
        Ok(SaleSnapshot { body, checksum })
    }

    /// Rebuild a sale over `store` from a verified snapshot. Reservations are
    /// ledger state, so `store` should be the ledger the snapshot was taken against.
    pub fn restore(store: S, snapshot: SaleSnapshot) -> Result<Self, SnapshotError> {
        snapshot.verify()?;
        let body = snapshot.body;
        let sale = Sale::from_parts(
            store,
            body.sale_account,
            body.config,
            body.purchases,
            body.proceeds,
        )?;
        tracing::info!(
            buyers = sale.buyers().count(),
            outstanding = sale.outstanding(),
            "Sale restored from snapshot"
        );
        Ok(sale)
    }
}

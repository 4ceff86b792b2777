//! Purchase records and the per-buyer append-only history
//!
//! A buyer's history is an arena of records addressed by insertion index.
//! Records are never removed or reordered; `claimed` only moves false → true,
//! except when a claim is rolled back before it took effect.

use serde::{Deserialize, Serialize};
use types::ids::AccountId;
use types::numeric::{Quantity, Timestamp};

/// One record per successful `buy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub buyer: AccountId,
    pub quantity: Quantity,
    pub timestamp: Timestamp,
    pub claimed: bool,
}

impl Purchase {
    pub fn new(buyer: AccountId, quantity: Quantity, timestamp: Timestamp) -> Self {
        Self {
            buyer,
            quantity,
            timestamp,
            claimed: false,
        }
    }

    /// Whether the record has aged at least `maturation_seconds` at `now`.
    ///
    /// A record stamped after `now` is never mature.
    pub fn is_mature(&self, now: Timestamp, maturation_seconds: u64) -> bool {
        match now.checked_sub(self.timestamp) {
            Some(age) if age >= 0 => age as u64 >= maturation_seconds,
            _ => false,
        }
    }

    /// Time at which the record becomes claimable, saturating at `i64::MAX`.
    pub fn matures_at(&self, maturation_seconds: u64) -> Timestamp {
        let delta = i64::try_from(maturation_seconds).unwrap_or(i64::MAX);
        self.timestamp.saturating_add(delta)
    }

    fn is_claimable(&self, now: Timestamp, maturation_seconds: u64) -> bool {
        !self.claimed && self.is_mature(now, maturation_seconds)
    }
}

/// Result of speculatively marking matured records as claimed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkedClaim {
    /// Indices flipped to `claimed` by this scan
    pub indices: Vec<usize>,
    /// Sum of their quantities
    pub releasable: Quantity,
}

/// Insertion-ordered purchase history of a single buyer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseHistory {
    records: Vec<Purchase>,
}

impl PurchaseHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, returning its index.
    pub fn append(&mut self, purchase: Purchase) -> usize {
        self.records.push(purchase);
        self.records.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Purchase> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[Purchase] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of quantities not yet claimed.
    pub fn unclaimed_total(&self) -> Option<Quantity> {
        self.records
            .iter()
            .filter(|p| !p.claimed)
            .try_fold(0u64, |acc, p| acc.checked_add(p.quantity))
    }

    /// What `mark_matured` would release at `now`, without mutating.
    pub fn claimable(&self, now: Timestamp, maturation_seconds: u64) -> Option<Quantity> {
        self.records
            .iter()
            .filter(|p| p.is_claimable(now, maturation_seconds))
            .try_fold(0u64, |acc, p| acc.checked_add(p.quantity))
    }

    /// Earliest maturity among unclaimed records.
    pub fn next_release_at(&self, maturation_seconds: u64) -> Option<Timestamp> {
        self.records
            .iter()
            .filter(|p| !p.claimed)
            .map(|p| p.matures_at(maturation_seconds))
            .min()
    }

    /// Scan in insertion order and flip every matured, unclaimed record to
    /// claimed. The flips stay speculative until the caller either keeps them
    /// or hands the indices back to `rollback`.
    ///
    /// Returns `None` (with nothing flipped) if the total would overflow.
    pub fn mark_matured(&mut self, now: Timestamp, maturation_seconds: u64) -> Option<MarkedClaim> {
        self.claimable(now, maturation_seconds)?;

        let mut marked = MarkedClaim::default();
        for (index, purchase) in self.records.iter_mut().enumerate() {
            if purchase.is_claimable(now, maturation_seconds) {
                purchase.claimed = true;
                marked.indices.push(index);
                marked.releasable += purchase.quantity;
            }
        }
        Some(marked)
    }

    /// Undo a speculative `mark_matured`.
    pub fn rollback(&mut self, indices: &[usize]) {
        for &index in indices {
            if let Some(purchase) = self.records.get_mut(index) {
                purchase.claimed = false;
            }
        }
    }
}

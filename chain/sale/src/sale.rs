//! Sale — fixed-price purchases released after a maturation period
//!
//! Lifecycle of a purchase:
//! `buy → (wait maturation) → claim → units transferred to buyer`
//!
//! Every public mutation is all-or-nothing: validation happens before any
//! state changes, and a claim whose transfer fails rolls back the `claimed`
//! flags it set. `claimed == true` therefore always means the buyer holds
//! the units.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use types::ids::AccountId;
use types::numeric::{Quantity, Timestamp, UnitPrice};

use crate::asset::AssetStore;
use crate::config::SaleConfig;
use crate::errors::{AssetError, SaleError};
use crate::events::{PurchaseRecorded, SaleEvent, TokensClaimed};
use crate::purchase::{Purchase, PurchaseHistory};

/// Time-locked token sale ledger.
///
/// Holds inventory in `sale_account` on the asset store. Units sold but not
/// yet claimed stay in custody, reserved on the store, so the inventory still
/// available for sale is `custodial balance - reserved`. The reservation
/// lives in the store, which keeps sales sharing one custody account from
/// selling the same units twice. `outstanding` is this sale's own share.
#[derive(Debug)]
pub struct Sale<S: AssetStore> {
    store: S,
    /// Custody account on the asset store
    sale_account: AccountId,
    unit_price: UnitPrice,
    maturation_seconds: u64,
    /// Per-buyer append-only history, ordered for deterministic snapshots
    purchases: BTreeMap<AccountId, PurchaseHistory>,
    /// Units sold and not yet released
    outstanding: Quantity,
    /// Payments collected and held by the sale
    proceeds: Decimal,
    /// Emitted events log (append-only)
    events: Vec<SaleEvent>,
}

impl<S: AssetStore> Sale<S> {
    /// Create a sale drawing inventory from `sale_account` on `store`.
    ///
    /// The account is expected to be funded before the first `buy`.
    pub fn new(store: S, sale_account: AccountId, config: SaleConfig) -> Result<Self, SaleError> {
        let unit_price = config.unit_price()?;
        Ok(Self {
            store,
            sale_account,
            unit_price,
            maturation_seconds: config.maturation_seconds,
            purchases: BTreeMap::new(),
            outstanding: 0,
            proceeds: Decimal::ZERO,
            events: Vec::new(),
        })
    }

    // ───────────────────────── Buy ─────────────────────────

    /// Buy `quantity` units for exactly `quantity * unit_price`.
    ///
    /// Returns the index of the new record in the buyer's history.
    /// Emits `PurchaseRecorded`.
    pub fn buy(
        &mut self,
        buyer: AccountId,
        quantity: Quantity,
        paid_amount: Decimal,
        now: Timestamp,
    ) -> Result<usize, SaleError> {
        if quantity == 0 {
            debug!(%buyer, "Rejected buy: zero quantity");
            return Err(SaleError::InvalidQuantity);
        }

        let expected = self
            .unit_price
            .total_for(quantity)
            .map_err(|_| SaleError::Overflow)?;
        if paid_amount != expected {
            debug!(%buyer, %expected, paid = %paid_amount, "Rejected buy: incorrect payment");
            return Err(SaleError::IncorrectPayment {
                expected: expected.to_string(),
                paid: paid_amount.to_string(),
            });
        }

        let available = self.available_inventory();
        if quantity > available {
            debug!(%buyer, quantity, available, "Rejected buy: insufficient inventory");
            return Err(SaleError::InsufficientInventory {
                requested: quantity,
                available,
            });
        }

        let outstanding = self
            .outstanding
            .checked_add(quantity)
            .ok_or(SaleError::Overflow)?;
        let proceeds = self
            .proceeds
            .checked_add(paid_amount)
            .ok_or(SaleError::Overflow)?;

        // Reserve last: it is the only fallible step with an external effect
        self.store
            .reserve(&self.sale_account, quantity)
            .map_err(|e| match e {
                AssetError::InsufficientBalance { available, .. } => {
                    debug!(%buyer, quantity, available, "Rejected buy: reservation refused");
                    SaleError::InsufficientInventory {
                        requested: quantity,
                        available,
                    }
                }
                other => SaleError::ReservationFailed(other),
            })?;

        // Commit
        let purchase_index = self
            .purchases
            .entry(buyer)
            .or_default()
            .append(Purchase::new(buyer, quantity, now));
        self.outstanding = outstanding;
        self.proceeds = proceeds;

        self.events.push(SaleEvent::PurchaseRecorded(PurchaseRecorded {
            buyer,
            quantity,
            timestamp: now,
            purchase_index,
        }));

        info!(%buyer, quantity, timestamp = now, purchase_index, "Purchase recorded");
        Ok(purchase_index)
    }

    // ───────────────────────── Claim ─────────────────────────

    /// Release every matured, unclaimed purchase of `buyer`.
    ///
    /// Returns the number of units transferred. Emits `TokensClaimed`.
    pub fn claim(&mut self, buyer: AccountId, now: Timestamp) -> Result<Quantity, SaleError> {
        let Some(history) = self.purchases.get_mut(&buyer) else {
            debug!(%buyer, "Rejected claim: no purchases");
            return Err(SaleError::NothingToClaim);
        };

        let marked = history
            .mark_matured(now, self.maturation_seconds)
            .ok_or(SaleError::Overflow)?;
        if marked.releasable == 0 {
            debug!(%buyer, now, "Rejected claim: nothing matured");
            return Err(SaleError::NothingToClaim);
        }

        let Some(outstanding) = self.outstanding.checked_sub(marked.releasable) else {
            history.rollback(&marked.indices);
            warn!(
                %buyer,
                amount = marked.releasable,
                outstanding = self.outstanding,
                "Claim exceeds outstanding units, rolled back"
            );
            return Err(SaleError::Overflow);
        };

        if let Err(e) = self
            .store
            .transfer_reserved(&self.sale_account, &buyer, marked.releasable)
        {
            history.rollback(&marked.indices);
            warn!(
                %buyer,
                amount = marked.releasable,
                error = %e,
                "Claim transfer failed, rolled back"
            );
            return Err(SaleError::TransferFailed(e));
        }

        self.outstanding = outstanding;
        self.events.push(SaleEvent::TokensClaimed(TokensClaimed {
            buyer,
            amount: marked.releasable,
        }));

        info!(
            %buyer,
            amount = marked.releasable,
            records = marked.indices.len(),
            "Tokens claimed"
        );
        Ok(marked.releasable)
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Record `index` of `buyer`'s history.
    pub fn get_purchase(&self, buyer: &AccountId, index: usize) -> Result<&Purchase, SaleError> {
        self.purchases
            .get(buyer)
            .and_then(|history| history.get(index))
            .ok_or(SaleError::PurchaseNotFound { index })
    }

    /// Full history of `buyer`, oldest first.
    pub fn purchases(&self, buyer: &AccountId) -> &[Purchase] {
        self.purchases
            .get(buyer)
            .map(PurchaseHistory::records)
            .unwrap_or(&[])
    }

    pub fn purchase_count(&self, buyer: &AccountId) -> usize {
        self.purchases.get(buyer).map_or(0, PurchaseHistory::len)
    }

    /// Units a claim at `now` would release. Does not mutate.
    pub fn claimable(&self, buyer: &AccountId, now: Timestamp) -> Result<Quantity, SaleError> {
        match self.purchases.get(buyer) {
            Some(history) => history
                .claimable(now, self.maturation_seconds)
                .ok_or(SaleError::Overflow),
            None => Ok(0),
        }
    }

    /// Earliest time at which one of `buyer`'s unclaimed purchases matures.
    pub fn next_release_at(&self, buyer: &AccountId) -> Option<Timestamp> {
        self.purchases
            .get(buyer)
            .and_then(|history| history.next_release_at(self.maturation_seconds))
    }

    /// Asset balance of any account, as reported by the store.
    pub fn balance_of(&self, account: &AccountId) -> Quantity {
        self.store.balance_of(account)
    }

    /// Units held in custody by the sale.
    pub fn custodial_balance(&self) -> Quantity {
        self.store.balance_of(&self.sale_account)
    }

    /// Units still available for sale.
    pub fn available_inventory(&self) -> Quantity {
        self.custodial_balance()
            .saturating_sub(self.store.reserved(&self.sale_account))
    }

    /// Units sold and awaiting claim.
    pub fn outstanding(&self) -> Quantity {
        self.outstanding
    }

    /// Payments collected so far.
    pub fn proceeds(&self) -> Decimal {
        self.proceeds
    }

    pub fn unit_price(&self) -> UnitPrice {
        self.unit_price
    }

    pub fn maturation_seconds(&self) -> u64 {
        self.maturation_seconds
    }

    pub fn sale_account(&self) -> AccountId {
        self.sale_account
    }

    /// Buyers with at least one purchase, in key order.
    pub fn buyers(&self) -> impl Iterator<Item = &AccountId> {
        self.purchases.keys()
    }

    // ───────────────────────── Asset Store ─────────────────────────

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the store, e.g. to fund the sale account.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[SaleEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<SaleEvent> {
        std::mem::take(&mut self.events)
    }

    // ───────────────────────── Snapshot support ─────────────────────────

    pub(crate) fn purchase_book(&self) -> &BTreeMap<AccountId, PurchaseHistory> {
        &self.purchases
    }

    /// Rebuild a sale from persisted parts, recomputing `outstanding`.
    pub(crate) fn from_parts(
        store: S,
        sale_account: AccountId,
        config: SaleConfig,
        purchases: BTreeMap<AccountId, PurchaseHistory>,
        proceeds: Decimal,
    ) -> Result<Self, SaleError> {
        let outstanding = purchases
            .values()
            .try_fold(0u64, |acc, history| {
                history.unclaimed_total().and_then(|t| acc.checked_add(t))
            })
            .ok_or(SaleError::Overflow)?;

        let mut sale = Self::new(store, sale_account, config)?;
        sale.purchases = purchases;
        sale.outstanding = outstanding;
        sale.proceeds = proceeds;
        Ok(sale)
    }

    pub(crate) fn config(&self) -> SaleConfig {
        SaleConfig::new(self.unit_price.as_decimal(), self.maturation_seconds)
    }
}

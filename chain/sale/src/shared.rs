//! Thread-safe sale handle
//!
//! Serializes every operation on one sale behind a mutex so concurrent
//! callers can never observe or interleave with another call's partial
//! state. Time is read from a `Clock` while the lock is held, so recorded
//! timestamps follow the order in which calls were serialized.

use rust_decimal::Decimal;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use types::ids::AccountId;
use types::numeric::Quantity;

use crate::asset::AssetStore;
use crate::clock::Clock;
use crate::errors::SaleError;
use crate::events::SaleEvent;
use crate::purchase::Purchase;
use crate::sale::Sale;

/// Cloneable handle to a sale shared across threads.
#[derive(Debug)]
pub struct SharedSale<S: AssetStore, C: Clock> {
    inner: Arc<Mutex<Sale<S>>>,
    clock: C,
}

impl<S: AssetStore, C: Clock + Clone> Clone for SharedSale<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            clock: self.clock.clone(),
        }
    }
}

impl<S: AssetStore, C: Clock> SharedSale<S, C> {
    pub fn new(sale: Sale<S>, clock: C) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sale)),
            clock,
        }
    }

    /// `Sale::buy` stamped with the clock's current time.
    pub fn buy(
        &self,
        buyer: AccountId,
        quantity: Quantity,
        paid_amount: Decimal,
    ) -> Result<usize, SaleError> {
        let mut sale = self.lock();
        let now = self.clock.now();
        sale.buy(buyer, quantity, paid_amount, now)
    }

    /// `Sale::claim` at the clock's current time.
    pub fn claim(&self, buyer: AccountId) -> Result<Quantity, SaleError> {
        let mut sale = self.lock();
        let now = self.clock.now();
        sale.claim(buyer, now)
    }

    pub fn get_purchase(&self, buyer: &AccountId, index: usize) -> Result<Purchase, SaleError> {
        self.lock().get_purchase(buyer, index).cloned()
    }

    pub fn balance_of(&self, account: &AccountId) -> Quantity {
        self.lock().balance_of(account)
    }

    pub fn drain_events(&self) -> Vec<SaleEvent> {
        self.lock().drain_events()
    }

    /// Run a read-only query against a consistent view of the sale.
    pub fn read<R>(&self, f: impl FnOnce(&Sale<S>) -> R) -> R {
        f(&self.lock())
    }

    /// Every operation leaves the sale consistent before returning, so a
    /// panic elsewhere while holding the lock cannot leave partial state.
    fn lock(&self) -> MutexGuard<'_, Sale<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

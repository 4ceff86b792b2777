//! Asset store — the fungible token ledger the sale draws inventory from
//!
//! The sale only ever consumes the `AssetStore` interface: it reads its own
//! custodial balance and moves units out of custody on claim. `TokenLedger`
//! is an in-memory implementation:
//! - Fixed supply minted once to a treasury at construction
//! - Checked debit/credit (no underflow, no overflow)
//! - Reservations: units earmarked in an account that only
//!   `transfer_reserved` can move, so sales sharing a custody account never
//!   sell the same units twice
//! - Pause switch that fails every transfer while set

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use types::ids::AccountId;
use types::numeric::Quantity;

use crate::errors::AssetError;

/// Default token name.
pub const DEFAULT_NAME: &str = "MyToken";
/// Default token symbol.
pub const DEFAULT_SYMBOL: &str = "MTK";
/// Default total supply (21 million whole units).
pub const DEFAULT_TOTAL_SUPPLY: Quantity = 21_000_000;

/// Balance storage and transfer semantics consumed by the sale.
pub trait AssetStore {
    /// Current balance of `account`; unknown accounts hold zero.
    fn balance_of(&self, account: &AccountId) -> Quantity;

    /// Move `amount` unreserved units from `from` to `to`. All-or-nothing.
    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Quantity,
    ) -> Result<(), AssetError>;

    /// Units of `account` earmarked by `reserve` and not yet moved.
    fn reserved(&self, account: &AccountId) -> Quantity;

    /// Earmark `amount` of `account`'s unreserved balance.
    fn reserve(&mut self, account: &AccountId, amount: Quantity) -> Result<(), AssetError>;

    /// Move `amount` reserved units from `from` to `to`, consuming the
    /// reservation. All-or-nothing.
    fn transfer_reserved(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Quantity,
    ) -> Result<(), AssetError>;
}

/// In-memory fixed-supply token ledger.
#[derive(Debug, Clone)]
pub struct TokenLedger {
    name: String,
    symbol: String,
    total_supply: Quantity,
    /// Account the supply was minted to
    treasury: AccountId,
    balances: HashMap<AccountId, Quantity>,
    /// Earmarked units per account, never above the account's balance
    reserved: HashMap<AccountId, Quantity>,
    /// While set, every transfer fails
    paused: bool,
}

impl TokenLedger {
    /// Create a ledger and mint `total_supply` to `treasury`.
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        total_supply: Quantity,
        treasury: AccountId,
    ) -> Self {
        let mut balances = HashMap::new();
        if total_supply > 0 {
            balances.insert(treasury, total_supply);
        }
        Self {
            name: name.into(),
            symbol: symbol.into(),
            total_supply,
            treasury,
            balances,
            reserved: HashMap::new(),
            paused: false,
        }
    }

    /// "MyToken" / "MTK" with 21 million units held by `treasury`.
    pub fn with_default_supply(treasury: AccountId) -> Self {
        Self::new(DEFAULT_NAME, DEFAULT_SYMBOL, DEFAULT_TOTAL_SUPPLY, treasury)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn total_supply(&self) -> Quantity {
        self.total_supply
    }

    pub fn treasury(&self) -> AccountId {
        self.treasury
    }

    /// Number of accounts holding a non-zero balance.
    pub fn holder_count(&self) -> usize {
        self.balances.values().filter(|b| **b > 0).count()
    }

    // ───────────────────────── Pause ─────────────────────────

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn unpause(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Balance not covered by a reservation.
    pub fn unreserved(&self, account: &AccountId) -> Quantity {
        self.balance_of(account).saturating_sub(self.reserved(account))
    }

    // ───────────────────────── Safe Transfer ─────────────────────────

    /// Debit of unreserved units with underflow protection. Returns the new balance.
    fn safe_debit(&self, account: &AccountId, amount: Quantity) -> Result<Quantity, AssetError> {
        let available = self.unreserved(account);
        if amount > available {
            return Err(AssetError::InsufficientBalance {
                account: account.to_string(),
                required: amount,
                available,
            });
        }
        self.balance_of(account)
            .checked_sub(amount)
            .ok_or(AssetError::Overflow)
    }

    /// Credit with overflow protection. Returns the new balance.
    fn safe_credit(&self, account: &AccountId, amount: Quantity) -> Result<Quantity, AssetError> {
        self.balance_of(account)
            .checked_add(amount)
            .ok_or(AssetError::Overflow)
    }

    fn check_transfer(&self, amount: Quantity) -> Result<(), AssetError> {
        if self.paused {
            return Err(AssetError::Paused);
        }
        if amount == 0 {
            return Err(AssetError::InvalidAmount);
        }
        Ok(())
    }
}

impl AssetStore for TokenLedger {
    fn balance_of(&self, account: &AccountId) -> Quantity {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Quantity,
    ) -> Result<(), AssetError> {
        self.check_transfer(amount)?;

        // Self-transfer only needs the balance check
        if from == to {
            self.safe_debit(from, amount)?;
            return Ok(());
        }

        // Compute both sides before writing either
        let from_balance = self.safe_debit(from, amount)?;
        let to_balance = self.safe_credit(to, amount)?;

        self.balances.insert(*from, from_balance);
        self.balances.insert(*to, to_balance);
        Ok(())
    }

    fn reserved(&self, account: &AccountId) -> Quantity {
        self.reserved.get(account).copied().unwrap_or(0)
    }

    fn reserve(&mut self, account: &AccountId, amount: Quantity) -> Result<(), AssetError> {
        if amount == 0 {
            return Err(AssetError::InvalidAmount);
        }
        let available = self.unreserved(account);
        if amount > available {
            return Err(AssetError::InsufficientBalance {
                account: account.to_string(),
                required: amount,
                available,
            });
        }
        let held = self
            .reserved(account)
            .checked_add(amount)
            .ok_or(AssetError::Overflow)?;
        self.reserved.insert(*account, held);
        Ok(())
    }

    fn transfer_reserved(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Quantity,
    ) -> Result<(), AssetError> {
        self.check_transfer(amount)?;

        let held = self.reserved(from);
        let remaining_held = held
            .checked_sub(amount)
            .ok_or_else(|| AssetError::ReservationExceeded {
                account: from.to_string(),
                required: amount,
                reserved: held,
            })?;

        if from != to {
            let from_balance = self
                .balance_of(from)
                .checked_sub(amount)
                .ok_or(AssetError::Overflow)?;
            let to_balance = self.safe_credit(to, amount)?;
            self.balances.insert(*from, from_balance);
            self.balances.insert(*to, to_balance);
        }
        self.reserved.insert(*from, remaining_held);
        Ok(())
    }
}

/// A ledger shared between several sales (or a sale and its operator).
///
/// Every ledger operation either fully applies or leaves the ledger
/// untouched, so a lock poisoned by a panicking holder still guards
/// consistent data and is recovered rather than reported.
impl<T: AssetStore> AssetStore for Arc<Mutex<T>> {
    fn balance_of(&self, account: &AccountId) -> Quantity {
        lock_store(self).balance_of(account)
    }

    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Quantity,
    ) -> Result<(), AssetError> {
        lock_store(self).transfer(from, to, amount)
    }

    fn reserved(&self, account: &AccountId) -> Quantity {
        lock_store(self).reserved(account)
    }

    fn reserve(&mut self, account: &AccountId, amount: Quantity) -> Result<(), AssetError> {
        lock_store(self).reserve(account, amount)
    }

    fn transfer_reserved(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Quantity,
    ) -> Result<(), AssetError> {
        lock_store(self).transfer_reserved(from, to, amount)
    }
}

fn lock_store<T>(store: &Mutex<T>) -> MutexGuard<'_, T> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_ledger() -> (TokenLedger, AccountId) {
        let treasury = AccountId::new();
        (TokenLedger::with_default_supply(treasury), treasury)
    }

    #[test]
    fn test_token_name_and_symbol() {
        let (ledger, _) = setup_ledger();
        assert_eq!(ledger.name(), "MyToken");
        assert_eq!(ledger.symbol(), "MTK");
    }

    #[test]
    fn test_total_supply_minted_to_treasury() {
        let (ledger, treasury) = setup_ledger();
        assert_eq!(ledger.total_supply(), 21_000_000);
        assert_eq!(ledger.balance_of(&treasury), 21_000_000);
        assert_eq!(ledger.treasury(), treasury);
        assert_eq!(ledger.holder_count(), 1);
    }

    #[test]
    fn test_balance_of_unknown_account() {
        let (ledger, _) = setup_ledger();
        assert_eq!(ledger.balance_of(&AccountId::new()), 0);
    }

    #[test]
    fn test_transfer_success() {
        let (mut ledger, treasury) = setup_ledger();
        let alice = AccountId::new();
        ledger.transfer(&treasury, &alice, 250).unwrap();
        assert_eq!(ledger.balance_of(&alice), 250);
        assert_eq!(ledger.balance_of(&treasury), 21_000_000 - 250);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let (mut ledger, _) = setup_ledger();
        let alice = AccountId::new();
        let bob = AccountId::new();
        let result = ledger.transfer(&alice, &bob, 1);
        assert!(matches!(
            result,
            Err(AssetError::InsufficientBalance { required: 1, available: 0, .. })
        ));
        assert_eq!(ledger.balance_of(&bob), 0);
    }

    #[test]
    fn test_transfer_zero_amount() {
        let (mut ledger, treasury) = setup_ledger();
        let result = ledger.transfer(&treasury, &AccountId::new(), 0);
        assert_eq!(result, Err(AssetError::InvalidAmount));
    }

    #[test]
    fn test_transfer_to_self_keeps_balance() {
        let (mut ledger, treasury) = setup_ledger();
        ledger.transfer(&treasury, &treasury, 10).unwrap();
        assert_eq!(ledger.balance_of(&treasury), 21_000_000);
    }

    #[test]
    fn test_transfer_entire_balance() {
        let treasury = AccountId::new();
        let mut ledger = TokenLedger::new("Small", "SML", 10, treasury);
        let alice = AccountId::new();
        ledger.transfer(&treasury, &alice, 10).unwrap();
        assert_eq!(ledger.balance_of(&treasury), 0);
        assert_eq!(ledger.balance_of(&alice), 10);
        assert_eq!(ledger.holder_count(), 1);
    }

    #[test]
    fn test_pause_blocks_transfer() {
        let (mut ledger, treasury) = setup_ledger();
        let alice = AccountId::new();
        ledger.pause();
        assert_eq!(ledger.transfer(&treasury, &alice, 1), Err(AssetError::Paused));
        assert_eq!(ledger.balance_of(&alice), 0);
        ledger.unpause();
        assert!(ledger.transfer(&treasury, &alice, 1).is_ok());
    }

    #[test]
    fn test_shared_ledger_sees_same_balances() {
        let (ledger, treasury) = setup_ledger();
        let shared = Arc::new(Mutex::new(ledger));
        let mut handle = shared.clone();
        let alice = AccountId::new();
        handle.transfer(&treasury, &alice, 7).unwrap();
        assert_eq!(shared.balance_of(&alice), 7);
    }

    #[test]
    fn test_reserve_limits_plain_transfers() {
        let (mut ledger, treasury) = setup_ledger();
        let custody = AccountId::new();
        ledger.transfer(&treasury, &custody, 10).unwrap();
        ledger.reserve(&custody, 8).unwrap();

        assert_eq!(ledger.reserved(&custody), 8);
        assert_eq!(ledger.unreserved(&custody), 2);
        assert!(matches!(
            ledger.transfer(&custody, &treasury, 3),
            Err(AssetError::InsufficientBalance { required: 3, available: 2, .. })
        ));
        ledger.transfer(&custody, &treasury, 2).unwrap();
        assert_eq!(ledger.balance_of(&custody), 8);
    }

    #[test]
    fn test_reserve_beyond_unreserved_balance() {
        let (mut ledger, treasury) = setup_ledger();
        let custody = AccountId::new();
        ledger.transfer(&treasury, &custody, 10).unwrap();
        ledger.reserve(&custody, 10).unwrap();

        let result = ledger.reserve(&custody, 1);
        assert!(matches!(
            result,
            Err(AssetError::InsufficientBalance { required: 1, available: 0, .. })
        ));
        assert_eq!(ledger.reserved(&custody), 10);
    }

    #[test]
    fn test_transfer_reserved_consumes_reservation() {
        let (mut ledger, treasury) = setup_ledger();
        let custody = AccountId::new();
        let buyer = AccountId::new();
        ledger.transfer(&treasury, &custody, 10).unwrap();
        ledger.reserve(&custody, 6).unwrap();

        ledger.transfer_reserved(&custody, &buyer, 4).unwrap();
        assert_eq!(ledger.balance_of(&buyer), 4);
        assert_eq!(ledger.balance_of(&custody), 6);
        assert_eq!(ledger.reserved(&custody), 2);

        assert_eq!(
            ledger.transfer_reserved(&custody, &buyer, 3),
            Err(AssetError::ReservationExceeded {
                account: custody.to_string(),
                required: 3,
                reserved: 2,
            })
        );
        assert_eq!(ledger.balance_of(&buyer), 4);
    }

    #[test]
    fn test_transfer_reserved_blocked_by_pause() {
        let (mut ledger, treasury) = setup_ledger();
        let custody = AccountId::new();
        ledger.transfer(&treasury, &custody, 5).unwrap();
        ledger.reserve(&custody, 5).unwrap();
        ledger.pause();

        let result = ledger.transfer_reserved(&custody, &AccountId::new(), 5);
        assert_eq!(result, Err(AssetError::Paused));
        assert_eq!(ledger.reserved(&custody), 5);
    }

    #[test]
    fn test_shared_ledger_recovers_poisoned_lock() {
        let (ledger, treasury) = setup_ledger();
        let shared = Arc::new(Mutex::new(ledger));
        let poison = Arc::clone(&shared);
        let _ = std::thread::spawn(move || {
            let _guard = poison.lock().unwrap();
            panic!("holder panicked");
        })
        .join();
        assert!(shared.is_poisoned());

        let mut handle = Arc::clone(&shared);
        let alice = AccountId::new();
        handle.transfer(&treasury, &alice, 3).unwrap();
        handle.reserve(&alice, 3).unwrap();
        assert_eq!(shared.balance_of(&alice), 3);
        assert_eq!(shared.reserved(&alice), 3);
    }

    #[test]
    fn test_supply_conserved_across_transfers() {
        let (mut ledger, treasury) = setup_ledger();
        let accounts: Vec<AccountId> = (0..5).map(|_| AccountId::new()).collect();
        for (i, acc) in accounts.iter().enumerate() {
            ledger.transfer(&treasury, acc, (i as u64 + 1) * 100).unwrap();
        }
        ledger.transfer(&accounts[4], &accounts[0], 50).unwrap();

        let total: u64 = std::iter::once(&treasury)
            .chain(accounts.iter())
            .map(|a| ledger.balance_of(a))
            .sum();
        assert_eq!(total, ledger.total_supply());
    }
}

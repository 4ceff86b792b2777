//! Time-Locked Token Sale Ledger
//!
//! Sells units of a pre-funded fungible asset at a fixed price, records each
//! purchase with its timestamp, and releases purchased units to the buyer
//! only after a fixed maturation period has elapsed.
//!
//! # Modules
//! - `errors`: Sale, asset store, config and snapshot error types
//! - `events`: `PurchaseRecorded` / `TokensClaimed` audit events
//! - `config`: Unit price and maturation period
//! - `asset`: `AssetStore` interface and in-memory `TokenLedger`
//! - `purchase`: Purchase records and per-buyer append-only history
//! - `clock`: Wall clock and manually advanced clock
//! - `sale`: The sale engine (`buy`, `claim`, queries)
//! - `shared`: Mutex-serialized handle for concurrent callers
//! - `snapshot`: Checksummed state snapshots and restore
//!
//! # Example
//! ```
//! use rust_decimal::Decimal;
//! use sale::asset::{AssetStore, TokenLedger};
//! use sale::config::SaleConfig;
//! use sale::sale::Sale;
//! use types::ids::AccountId;
//!
//! let treasury = AccountId::new();
//! let custody = AccountId::new();
//! let mut ledger = TokenLedger::with_default_supply(treasury);
//! ledger.transfer(&treasury, &custody, 10).unwrap();
//!
//! let mut sale = Sale::new(ledger, custody, SaleConfig::default()).unwrap();
//! let buyer = AccountId::new();
//! sale.buy(buyer, 10, Decimal::new(10, 2), 0).unwrap();
//! assert_eq!(sale.claim(buyer, 365 * 24 * 60 * 60), Ok(10));
//! ```

pub mod errors;
pub mod events;
pub mod config;
pub mod asset;
pub mod purchase;
pub mod clock;
pub mod sale;
pub mod shared;
pub mod snapshot;

/// Sale interface version
pub const SALE_ABI_VERSION: &str = "1.0.0";

//! Types library for the time-locked token sale
//!
//! Shared identity and numeric types used by the sale engine and its
//! collaborators, kept deterministic (no floating point anywhere).
//!
//! # Modules
//! - `ids`: Account identifiers (buyers, sale custody, treasury)
//! - `numeric`: Fixed-point unit price, quantities and timestamps
//! - `errors`: Error taxonomy for numeric validation

pub mod ids;
pub mod numeric;
pub mod errors;


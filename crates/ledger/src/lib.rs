//! # Ledger Crate
//!
//! In-memory account state for a trade ingestion run: per-account symbol
//! positions, accepted trade history, and the concurrent registry that owns them.
//!
//! ## Architectural Principles
//!
//! - **One lock per account:** an account's `PositionLedger` and its trade history
//!   live behind a single mutex, so "apply the delta, check it is non-negative,
//!   append to history" is one critical section. A trade is in history if and only
//!   if its apply was accepted.
//! - **No ambient state:** the `AccountStore` is an ordinary value. The ingestion
//!   engine receives it explicitly and shares it between workers through an `Arc`.
//!
//! ## Public API
//!
//! - `PositionLedger`: symbol -> quantity map with the apply-and-check operation.
//! - `AccountState`: one account's metadata plus its guarded ledger and history.
//! - `AccountStore`: get-or-create registry keyed by account id.
//! - `LedgerError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod account;
pub mod error;
pub mod position;
pub mod store;

// Re-export the key components to provide a clean, public-facing API.
pub use account::{AccountSnapshot, AccountState, Applied};
pub use error::LedgerError;
pub use position::PositionLedger;
pub use store::{AccountStore, default_account_name};

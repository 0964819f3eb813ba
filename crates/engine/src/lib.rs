//! # Ingestion Engine
//!
//! Turns a batch of trade records into account state. Lines are validated in
//! parallel by the `loader`, then each valid trade becomes one independent unit of
//! work on a fixed-size worker pool. A unit resolves its account in the shared
//! `AccountStore` and applies the trade there; failures are logged and tallied
//! per unit and never stop the batch.
//!
//! The store is passed in by the caller. `drain` is a bounded wait: its
//! `DrainOutcome` says whether the store is final or still being written to.

pub mod error;
pub mod loader;
pub mod pool;

pub use error::{EngineError, UnitError};
pub use loader::{LineRejection, LoadedBatch, load_trades, parse_trades};
pub use pool::{DrainOutcome, IngestionEngine, IngestionReport, Rejection, apply_trade, ingest};

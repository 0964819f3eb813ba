//! # Database Crate
//!
//! The persistence sink for a finished ingestion run. Results are written as
//! idempotent upserts, so a run can be replayed against the same store safely.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** all SQL lives here, behind the `PersistenceSink` trait. The rest
//!   of the application never sees a query.
//! - **Idempotent writes:** accounts and trades are insert-if-absent, positions are
//!   last-write-wins. Failures are reported per account and never roll back the
//!   in-memory results.
//!
//! ## Public API
//!
//! - `connect` / `run_migrations`: pool setup and schema migrations.
//! - `DbRepository`: the PostgreSQL `PersistenceSink`.
//! - `InMemorySink`: the same semantics without a database.
//! - `persist_accounts`: drives every account snapshot through a sink.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod persist;
pub mod repository;
pub mod sink;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use memory::InMemorySink;
pub use persist::{PersistFailure, PersistStage, PersistSummary, persist_account, persist_accounts};
pub use repository::DbRepository;
pub use sink::{PersistenceSink, PositionRow};

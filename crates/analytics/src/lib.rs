//! # Analytics Crate
//!
//! The downstream report aggregator. It only ever reads the final account
//! snapshots produced after ingestion has fully drained.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** no knowledge of the worker pool or the database. It depends
//!   only on `core-types` and the `AccountSnapshot` read model from `ledger`.
//! - **Stateless Calculation:** `ReportAggregator` takes snapshots in and returns a
//!   `PortfolioReport`. Rendering to text is a separate step in `render`.
//!
//! ## Public API
//!
//! - `ReportAggregator`: portfolio values, exposure and the value ranking.
//! - `PortfolioReport`: the derived views, ready for rendering.
//! - `render::write_reports`: writes the four text artifacts.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod render;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::ReportAggregator;
pub use error::AnalyticsError;
pub use render::write_reports;
pub use report::{AccountReport, PortfolioReport, RankedAccount};

use ledger::LedgerError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to read trade input {path}: {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build the ingestion worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Ingestion worker count must be greater than 0")]
    NoWorkers,
}

/// Why a single trade unit did not commit. Never escapes the unit's worker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Unexpected fault while applying trade: {0}")]
    Fault(String),
}

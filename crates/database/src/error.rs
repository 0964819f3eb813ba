use core_types::AccountId;
use thiserror::Error;

/// A write the persistence sink refused. In-memory state is never rolled back.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load configuration for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Sink rejected writes for account {0}")]
    Rejected(AccountId),
}

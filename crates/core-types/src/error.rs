use rust_decimal::Decimal;
use thiserror::Error;

/// A malformed trade record. Scoped to the single record that produced it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidTradeError {
    #[error("Expected {expected} fields but found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Invalid input for {field}: '{value}'")]
    Unparseable { field: &'static str, value: String },

    #[error("Only positive quantity is allowed, got {0}")]
    NonPositiveQuantity(i64),

    #[error("Price must not be negative, got {0}")]
    NegativePrice(Decimal),

    #[error("Symbol must not be empty")]
    EmptySymbol,

    #[error("Invalid trade side: '{0}'")]
    InvalidSide(String),

    #[error("Invalid timestamp: '{0}'")]
    InvalidTimestamp(String),
}

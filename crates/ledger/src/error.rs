use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient position to sell {symbol}. Held: {held}, Requested: {requested}")]
    InsufficientPosition {
        symbol: String,
        held: i64,
        requested: i64,
    },

    #[error("Position arithmetic overflowed for symbol: {0}")]
    Overflow(String),
}

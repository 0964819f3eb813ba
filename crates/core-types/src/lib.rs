pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::TradeSide;
pub use error::InvalidTradeError;
pub use structs::{AccountId, TradeId, TradeRecord};

use crate::error::DbError;
use async_trait::async_trait;
use core_types::{AccountId, TradeRecord};
use ledger::AccountSnapshot;

/// One `(account_id, symbol, quantity)` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRow {
    pub account_id: AccountId,
    pub symbol: String,
    pub quantity: i64,
}

impl PositionRow {
    /// Every position held by the account, zero quantities included.
    pub fn from_snapshot(snapshot: &AccountSnapshot) -> Vec<Self> {
        snapshot
            .positions
            .iter()
            .map(|(symbol, quantity)| PositionRow {
                account_id: snapshot.account_id,
                symbol: symbol.clone(),
                quantity: *quantity,
            })
            .collect()
    }
}

/// Durable destination for the results of a run. Every operation is an
/// idempotent upsert, so replaying the same batches changes nothing.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    /// Inserts the account; a no-op if the id already exists.
    async fn upsert_account(&self, account_id: AccountId, account_name: &str) -> Result<(), DbError>;

    /// Last write wins per `(account_id, symbol)`.
    async fn upsert_positions(&self, positions: &[PositionRow]) -> Result<(), DbError>;

    /// Inserts trades; rows whose `trade_id` already exists are left untouched.
    async fn upsert_trades(&self, trades: &[TradeRecord]) -> Result<(), DbError>;
}

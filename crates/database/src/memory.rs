use crate::error::DbError;
use crate::sink::{PersistenceSink, PositionRow};
use async_trait::async_trait;
use core_types::{AccountId, TradeId, TradeRecord};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Default)]
struct Tables {
    accounts: BTreeMap<AccountId, String>,
    positions: BTreeMap<(AccountId, String), i64>,
    trades: BTreeMap<TradeId, TradeRecord>,
}

/// A `PersistenceSink` over in-process maps with the same conflict rules as the
/// PostgreSQL schema. Used when no database is configured.
#[derive(Debug, Default)]
pub struct InMemorySink {
    tables: Mutex<Tables>,
    rejected_accounts: Mutex<HashSet<AccountId>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write touching `account_id` fail with `DbError::Rejected`.
    pub fn reject_account(&self, account_id: AccountId) {
        self.rejected_accounts.lock().insert(account_id);
    }

    pub fn accounts(&self) -> BTreeMap<AccountId, String> {
        self.tables.lock().accounts.clone()
    }

    pub fn positions(&self) -> BTreeMap<(AccountId, String), i64> {
        self.tables.lock().positions.clone()
    }

    pub fn trades(&self) -> BTreeMap<TradeId, TradeRecord> {
        self.tables.lock().trades.clone()
    }

    fn check(&self, account_id: AccountId) -> Result<(), DbError> {
        if self.rejected_accounts.lock().contains(&account_id) {
            return Err(DbError::Rejected(account_id));
        }
        Ok(())
    }
}

#[async_trait]
impl PersistenceSink for InMemorySink {
    async fn upsert_account(&self, account_id: AccountId, account_name: &str) -> Result<(), DbError> {
        self.check(account_id)?;
        self.tables
            .lock()
            .accounts
            .entry(account_id)
            .or_insert_with(|| account_name.to_string());
        Ok(())
    }

    async fn upsert_positions(&self, positions: &[PositionRow]) -> Result<(), DbError> {
        for row in positions {
            self.check(row.account_id)?;
        }
        let mut tables = self.tables.lock();
        for row in positions {
            tables
                .positions
                .insert((row.account_id, row.symbol.clone()), row.quantity);
        }
        Ok(())
    }

    async fn upsert_trades(&self, trades: &[TradeRecord]) -> Result<(), DbError> {
        for trade in trades {
            self.check(trade.account_id())?;
        }
        let mut tables = self.tables.lock();
        for trade in trades {
            tables
                .trades
                .entry(trade.trade_id())
                .or_insert_with(|| trade.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::TradeSide;
    use rust_decimal_macros::dec;

    fn trade(id: i64, qty: i64) -> TradeRecord {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        TradeRecord::new(id, 1, "AAPL", qty, dec!(10), TradeSide::Buy, ts).unwrap()
    }

    #[tokio::test]
    async fn account_upsert_keeps_the_first_name() {
        let sink = InMemorySink::new();
        sink.upsert_account(1, "User-1").await.unwrap();
        sink.upsert_account(1, "Renamed").await.unwrap();
        assert_eq!(sink.accounts().get(&1).map(String::as_str), Some("User-1"));
    }

    #[tokio::test]
    async fn positions_are_last_write_wins() {
        let sink = InMemorySink::new();
        let row = |quantity| PositionRow { account_id: 1, symbol: "AAPL".to_string(), quantity };
        sink.upsert_positions(&[row(10)]).await.unwrap();
        sink.upsert_positions(&[row(4)]).await.unwrap();

        let positions = sink.positions();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions.get(&(1, "AAPL".to_string())), Some(&4));
    }

    #[tokio::test]
    async fn trades_ignore_duplicate_ids() {
        let sink = InMemorySink::new();
        sink.upsert_trades(&[trade(1, 5), trade(2, 3)]).await.unwrap();
        sink.upsert_trades(&[trade(1, 99)]).await.unwrap();

        let trades = sink.trades();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[&1].quantity(), 5);
    }

    #[tokio::test]
    async fn rejected_account_writes_nothing() {
        let sink = InMemorySink::new();
        sink.reject_account(1);
        let err = sink.upsert_trades(&[trade(1, 5)]).await.unwrap_err();
        assert!(matches!(err, DbError::Rejected(1)));
        assert!(sink.trades().is_empty());
    }
}

use crate::error::DbError;
use crate::sink::{PersistenceSink, PositionRow};
use async_trait::async_trait;
use core_types::{AccountId, TradeRecord};
use sqlx::postgres::PgPool;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersistenceSink for DbRepository {
    async fn upsert_account(&self, account_id: AccountId, account_name: &str) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (account_id, account_name)
            VALUES ($1, $2)
            ON CONFLICT (account_id) DO NOTHING
            "#,
        )
        .bind(account_id)
        .bind(account_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The whole batch commits or none of it does.
    async fn upsert_positions(&self, positions: &[PositionRow]) -> Result<(), DbError> {
        if positions.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for row in positions {
            sqlx::query(
                r#"
                INSERT INTO positions (account_id, symbol, quantity)
                VALUES ($1, $2, $3)
                ON CONFLICT (account_id, symbol) DO UPDATE SET quantity = EXCLUDED.quantity
                "#,
            )
            .bind(row.account_id)
            .bind(&row.symbol)
            .bind(row.quantity)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn upsert_trades(&self, trades: &[TradeRecord]) -> Result<(), DbError> {
        if trades.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for trade in trades {
            sqlx::query(
                r#"
                INSERT INTO trades (trade_id, account_id, symbol, quantity, price, side, timestamp)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (trade_id) DO NOTHING
                "#,
            )
            .bind(trade.trade_id())
            .bind(trade.account_id())
            .bind(trade.symbol())
            .bind(trade.quantity())
            .bind(trade.price())
            .bind(trade.side().as_str())
            .bind(trade.timestamp())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

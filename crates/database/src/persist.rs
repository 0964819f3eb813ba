use crate::error::DbError;
use crate::sink::{PersistenceSink, PositionRow};
use core_types::AccountId;
use futures::future::join_all;
use ledger::AccountSnapshot;
use std::fmt;

/// Which upsert failed for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStage {
    Account,
    Positions,
    Trades,
}

impl fmt::Display for PersistStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            PersistStage::Account => "account",
            PersistStage::Positions => "positions",
            PersistStage::Trades => "trades",
        };
        f.write_str(stage)
    }
}

#[derive(Debug)]
pub struct PersistFailure {
    pub account_id: AccountId,
    pub stage: PersistStage,
    pub error: DbError,
}

#[derive(Debug, Default)]
pub struct PersistSummary {
    pub accounts_written: usize,
    pub failures: Vec<PersistFailure>,
}

impl PersistSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Writes one account, then its positions, then its trades.
///
/// Stops at the first failing stage for this account. Nothing is rolled back
/// in memory and nothing is retried.
pub async fn persist_account<S>(sink: &S, snapshot: &AccountSnapshot) -> Result<(), PersistFailure>
where
    S: PersistenceSink + ?Sized,
{
    let fail = |stage, error| PersistFailure {
        account_id: snapshot.account_id,
        stage,
        error,
    };

    sink.upsert_account(snapshot.account_id, &snapshot.name)
        .await
        .map_err(|e| fail(PersistStage::Account, e))?;
    sink.upsert_positions(&PositionRow::from_snapshot(snapshot))
        .await
        .map_err(|e| fail(PersistStage::Positions, e))?;
    sink.upsert_trades(&snapshot.trades)
        .await
        .map_err(|e| fail(PersistStage::Trades, e))?;
    Ok(())
}

/// Persists every account concurrently. A failing account is logged and
/// counted; the others still go through.
///
/// `on_account` runs once per account as its writes finish, for progress reporting.
pub async fn persist_accounts<S, F>(
    sink: &S,
    snapshots: &[AccountSnapshot],
    on_account: F,
) -> PersistSummary
where
    S: PersistenceSink + ?Sized,
    F: Fn(&AccountSnapshot),
{
    let writes = snapshots.iter().map(|snapshot| {
        let on_account = &on_account;
        async move {
            let result = persist_account(sink, snapshot).await;
            on_account(snapshot);
            result
        }
    });

    let mut summary = PersistSummary::default();
    for result in join_all(writes).await {
        match result {
            Ok(()) => summary.accounts_written += 1,
            Err(failure) => {
                tracing::error!(
                    account_id = failure.account_id,
                    stage = %failure.stage,
                    error = %failure.error,
                    "Failed to persist account."
                );
                summary.failures.push(failure);
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemorySink;
    use chrono::NaiveDate;
    use core_types::{TradeRecord, TradeSide};
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn snapshot(account_id: i64, trade_ids: &[i64]) -> AccountSnapshot {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let trades: Vec<TradeRecord> = trade_ids
            .iter()
            .map(|id| {
                TradeRecord::new(*id, account_id, "AAPL", 2, dec!(50), TradeSide::Buy, ts).unwrap()
            })
            .collect();
        AccountSnapshot {
            account_id,
            name: format!("User-{account_id}"),
            positions: [("AAPL".to_string(), 2 * trade_ids.len() as i64)]
                .into_iter()
                .collect(),
            trades,
        }
    }

    #[tokio::test]
    async fn replaying_the_same_batches_is_idempotent() {
        let sink = InMemorySink::new();
        let snapshots = vec![snapshot(1, &[1, 2]), snapshot(2, &[3])];

        let first = persist_accounts(&sink, &snapshots, |_| {}).await;
        let after_first = (sink.accounts(), sink.positions(), sink.trades());
        let second = persist_accounts(&sink, &snapshots, |_| {}).await;

        assert!(first.is_clean() && second.is_clean());
        assert_eq!(second.accounts_written, 2);
        assert_eq!((sink.accounts(), sink.positions(), sink.trades()), after_first);
        assert_eq!(sink.trades().len(), 3);
        assert_eq!(sink.positions().get(&(1, "AAPL".to_string())), Some(&4));
    }

    #[tokio::test]
    async fn one_failing_account_does_not_block_the_rest() {
        let sink = InMemorySink::new();
        sink.reject_account(2);
        let snapshots = vec![snapshot(1, &[1]), snapshot(2, &[2]), snapshot(3, &[3])];
        let seen = AtomicUsize::new(0);

        let summary = persist_accounts(&sink, &snapshots, |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .await;

        assert_eq!(seen.load(Ordering::SeqCst), 3);
        assert_eq!(summary.accounts_written, 2);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].account_id, 2);
        assert_eq!(summary.failures[0].stage, PersistStage::Account);
        assert_eq!(sink.accounts().keys().copied().collect::<Vec<_>>(), vec![1, 3]);
    }
}

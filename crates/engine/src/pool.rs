use crate::error::{EngineError, UnitError};
use configuration::IngestionSettings;
use core_types::{AccountId, TradeId, TradeRecord};
use ledger::{AccountStore, Applied, LedgerError, default_account_name};
use parking_lot::{Condvar, Mutex};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// A trade that was not applied, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub trade_id: TradeId,
    pub account_id: AccountId,
    pub symbol: String,
    pub reason: UnitError,
}

/// Tallies for everything submitted to an engine so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionReport {
    pub submitted: usize,
    pub accepted: usize,
    /// Failed units, ordered by trade id.
    pub rejected: Vec<Rejection>,
}

impl IngestionReport {
    /// Units that have finished, accepted or not.
    pub fn completed(&self) -> usize {
        self.accepted + self.rejected.len()
    }
}

/// What `drain` observed when it stopped waiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every submitted unit finished. The store is final.
    Completed(IngestionReport),
    /// The timeout elapsed first. `outstanding` units are still running and may
    /// keep mutating the store.
    TimedOut {
        outstanding: usize,
        report: IngestionReport,
    },
}

impl DrainOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, DrainOutcome::Completed(_))
    }

    pub fn report(&self) -> &IngestionReport {
        match self {
            DrainOutcome::Completed(report) => report,
            DrainOutcome::TimedOut { report, .. } => report,
        }
    }
}

/// Counters shared between the engine handle and its workers.
#[derive(Debug, Default)]
struct Progress {
    pending: Mutex<usize>,
    idle: Condvar,
    submitted: AtomicUsize,
    accepted: AtomicUsize,
    rejected: Mutex<Vec<Rejection>>,
}

impl Progress {
    fn begin(&self) {
        self.submitted.fetch_add(1, Ordering::SeqCst);
        *self.pending.lock() += 1;
    }

    fn finish(&self) {
        let mut pending = self.pending.lock();
        *pending -= 1;
        if *pending == 0 {
            self.idle.notify_all();
        }
    }

    fn record(&self, trade: &TradeRecord, outcome: Result<Applied, UnitError>) {
        match outcome {
            Ok(applied) => {
                self.accepted.fetch_add(1, Ordering::SeqCst);
                tracing::debug!(
                    trade_id = trade.trade_id(),
                    account_id = trade.account_id(),
                    symbol = %trade.symbol(),
                    new_quantity = applied.new_quantity,
                    "Trade applied."
                );
            }
            Err(reason) => {
                tracing::warn!(
                    trade_id = trade.trade_id(),
                    account_id = trade.account_id(),
                    symbol = %trade.symbol(),
                    reason = %reason,
                    "Trade processing failed."
                );
                self.rejected.lock().push(Rejection {
                    trade_id: trade.trade_id(),
                    account_id: trade.account_id(),
                    symbol: trade.symbol().to_string(),
                    reason,
                });
            }
        }
    }

    fn report(&self) -> IngestionReport {
        let mut rejected = self.rejected.lock().clone();
        rejected.sort_by_key(|r| r.trade_id);
        IngestionReport {
            submitted: self.submitted.load(Ordering::SeqCst),
            accepted: self.accepted.load(Ordering::SeqCst),
            rejected,
        }
    }
}

/// Applies one trade: resolve the account, then apply-and-record under its lock.
pub fn apply_trade(store: &AccountStore, trade: &TradeRecord) -> Result<Applied, UnitError> {
    guarded(|| {
        let account = store.get_or_create(trade.account_id(), default_account_name);
        account.apply_trade(trade)
    })
}

/// Runs a unit body, turning a panic into `UnitError::Fault` so a single bad
/// unit cannot take a worker or its siblings down.
fn guarded<T, F>(body: F) -> Result<T, UnitError>
where
    F: FnOnce() -> Result<T, LedgerError>,
{
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(result) => result.map_err(UnitError::from),
        Err(payload) => Err(UnitError::Fault(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Bounded worker pool that drives trades through an injected `AccountStore`.
pub struct IngestionEngine {
    pool: rayon::ThreadPool,
    store: Arc<AccountStore>,
    progress: Arc<Progress>,
}

impl IngestionEngine {
    /// Creates an engine with a fixed number of worker threads.
    pub fn new(store: Arc<AccountStore>, workers: usize) -> Result<Self, EngineError> {
        if workers == 0 {
            return Err(EngineError::NoWorkers);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|idx| format!("ingest-{idx}"))
            .build()?;

        tracing::info!(workers, "Ingestion engine started.");
        Ok(Self {
            pool,
            store,
            progress: Arc::new(Progress::default()),
        })
    }

    pub fn from_settings(
        store: Arc<AccountStore>,
        settings: &IngestionSettings,
    ) -> Result<Self, EngineError> {
        Self::new(store, settings.resolved_workers())
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn store(&self) -> &Arc<AccountStore> {
        &self.store
    }

    /// Schedules one unit of work for `trade`. Returns immediately.
    pub fn submit(&self, trade: TradeRecord) {
        let store = Arc::clone(&self.store);
        let progress = Arc::clone(&self.progress);
        self.spawn_tracked(move || {
            let outcome = apply_trade(&store, &trade);
            progress.record(&trade, outcome);
        });
    }

    pub fn submit_batch(&self, trades: impl IntoIterator<Item = TradeRecord>) {
        for trade in trades {
            self.submit(trade);
        }
    }

    /// Runs `job` on the pool and counts it as pending until it returns.
    fn spawn_tracked<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.progress.begin();
        let progress = Arc::clone(&self.progress);
        self.pool.spawn(move || {
            job();
            progress.finish();
        });
    }

    /// Blocks until every submitted unit has finished or `timeout` elapses.
    ///
    /// Units still running at the deadline are left alone. Callers must check
    /// `DrainOutcome::is_complete` before treating the store as final.
    pub fn drain(&self, timeout: Duration) -> DrainOutcome {
        // A timeout too large to represent as an instant means "no deadline".
        let deadline = Instant::now().checked_add(timeout);
        let outstanding = {
            let mut pending = self.progress.pending.lock();
            while *pending > 0 {
                match deadline {
                    Some(deadline) => {
                        if self
                            .progress
                            .idle
                            .wait_until(&mut pending, deadline)
                            .timed_out()
                        {
                            break;
                        }
                    }
                    None => self.progress.idle.wait(&mut pending),
                }
            }
            *pending
        };

        let report = self.progress.report();
        if outstanding == 0 {
            tracing::info!(
                submitted = report.submitted,
                accepted = report.accepted,
                rejected = report.rejected.len(),
                "Ingestion drained."
            );
            DrainOutcome::Completed(report)
        } else {
            tracing::warn!(
                outstanding,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                "Drain timed out with work still in flight."
            );
            DrainOutcome::TimedOut {
                outstanding,
                report,
            }
        }
    }
}

/// Submits a whole batch to a fresh engine and drains it with the configured timeout.
pub fn ingest(
    store: Arc<AccountStore>,
    trades: Vec<TradeRecord>,
    settings: &IngestionSettings,
) -> Result<DrainOutcome, EngineError> {
    let engine = IngestionEngine::from_settings(store, settings)?;
    engine.submit_batch(trades);
    Ok(engine.drain(settings.drain_timeout()))
}

use crate::error::LedgerError;
use crate::position::PositionLedger;
use core_types::{AccountId, TradeRecord};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;

/// Result of an accepted trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    /// Quantity held in the trade's symbol after the trade.
    pub new_quantity: i64,
    /// Length of the account's history after the append.
    pub history_len: usize,
}

/// The ledger and the history are only ever touched together.
#[derive(Debug, Default)]
struct AccountBook {
    ledger: PositionLedger,
    history: Vec<TradeRecord>,
}

/// One account: immutable metadata plus its guarded positions and trade history.
#[derive(Debug)]
pub struct AccountState {
    id: AccountId,
    name: String,
    book: Mutex<AccountBook>,
}

impl AccountState {
    pub fn new(id: AccountId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            book: Mutex::new(AccountBook::default()),
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies the trade's signed delta and, only if accepted, appends the trade
    /// to history. Both happen under one lock, so no observer can see one
    /// without the other.
    pub fn apply_trade(&self, trade: &TradeRecord) -> Result<Applied, LedgerError> {
        let mut book = self.book.lock();
        let new_quantity = book.ledger.apply(trade.symbol(), trade.signed_delta())?;
        book.history.push(trade.clone());
        Ok(Applied {
            new_quantity,
            history_len: book.history.len(),
        })
    }

    pub fn quantity(&self, symbol: &str) -> i64 {
        self.book.lock().ledger.quantity(symbol)
    }

    pub fn history_len(&self) -> usize {
        self.book.lock().history.len()
    }

    /// A consistent copy of positions and history, taken under the account lock.
    pub fn snapshot(&self) -> AccountSnapshot {
        let book = self.book.lock();
        AccountSnapshot {
            account_id: self.id,
            name: self.name.clone(),
            positions: book.ledger.snapshot(),
            trades: book.history.clone(),
        }
    }
}

/// Read-only view of an account handed to reporting and persistence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSnapshot {
    pub account_id: AccountId,
    pub name: String,
    pub positions: BTreeMap<String, i64>,
    /// Accepted trades in completion order.
    pub trades: Vec<TradeRecord>,
}

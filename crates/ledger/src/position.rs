use crate::error::LedgerError;
use std::collections::{BTreeMap, HashMap};

/// Net quantity held per symbol for a single account.
///
/// Every stored quantity is non-negative. `apply` is the only mutator and it
/// refuses, without side effects, any delta that would break that.
#[derive(Debug, Clone, Default)]
pub struct PositionLedger {
    positions: HashMap<String, i64>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a signed delta to `symbol` and returns the new quantity.
    ///
    /// An absent symbol counts as zero. If the result would be negative the
    /// ledger is left exactly as it was (an unseen symbol is not inserted).
    pub fn apply(&mut self, symbol: &str, delta: i64) -> Result<i64, LedgerError> {
        let held = self.quantity(symbol);
        let new_qty = held
            .checked_add(delta)
            .ok_or_else(|| LedgerError::Overflow(symbol.to_string()))?;

        if new_qty < 0 {
            return Err(LedgerError::InsufficientPosition {
                symbol: symbol.to_string(),
                held,
                requested: delta.saturating_neg(),
            });
        }

        self.positions.insert(symbol.to_string(), new_qty);
        Ok(new_qty)
    }

    /// Current quantity for `symbol`, zero if it was never traded.
    pub fn quantity(&self, symbol: &str) -> i64 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Symbol-ordered copy of every position.
    pub fn snapshot(&self) -> BTreeMap<String, i64> {
        self.positions
            .iter()
            .map(|(symbol, qty)| (symbol.clone(), *qty))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_then_partial_sell() {
        let mut ledger = PositionLedger::new();
        assert_eq!(ledger.apply("AAPL", 10).unwrap(), 10);
        assert_eq!(ledger.apply("AAPL", -4).unwrap(), 6);
        assert_eq!(ledger.quantity("AAPL"), 6);
    }

    #[test]
    fn oversell_leaves_ledger_untouched() {
        let mut ledger = PositionLedger::new();
        ledger.apply("AAPL", 10).unwrap();

        let err = ledger.apply("AAPL", -15).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientPosition {
                symbol: "AAPL".to_string(),
                held: 10,
                requested: 15,
            }
        );
        assert_eq!(ledger.quantity("AAPL"), 10);
    }

    #[test]
    fn selling_an_unseen_symbol_does_not_insert_it() {
        let mut ledger = PositionLedger::new();
        assert!(ledger.apply("AAPL", -5).is_err());
        assert!(ledger.is_empty());
        assert_eq!(ledger.quantity("AAPL"), 0);
    }

    #[test]
    fn flat_position_is_kept_at_zero() {
        let mut ledger = PositionLedger::new();
        ledger.apply("MSFT", 3).unwrap();
        assert_eq!(ledger.apply("MSFT", -3).unwrap(), 0);
        assert_eq!(ledger.snapshot().get("MSFT"), Some(&0));
    }

    #[test]
    fn overflow_is_an_error_not_a_wrap() {
        let mut ledger = PositionLedger::new();
        ledger.apply("BIG", i64::MAX).unwrap();
        assert_eq!(
            ledger.apply("BIG", 1).unwrap_err(),
            LedgerError::Overflow("BIG".to_string())
        );
        assert_eq!(ledger.quantity("BIG"), i64::MAX);
    }
}

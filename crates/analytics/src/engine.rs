use crate::report::{AccountReport, PortfolioReport, RankedAccount};
use core_types::TradeRecord;
use ledger::AccountSnapshot;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// A stateless calculator for the read-only views produced after ingestion.
#[derive(Debug, Default)]
pub struct ReportAggregator {}

impl ReportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for building every derived view.
    ///
    /// # Arguments
    ///
    /// * `snapshots` - Final account snapshots, taken after a completed drain.
    /// * `top_n` - How many accounts the value ranking keeps.
    pub fn aggregate(&self, snapshots: &[AccountSnapshot], top_n: usize) -> PortfolioReport {
        let mut accounts: Vec<AccountReport> = snapshots
            .iter()
            .map(|snapshot| AccountReport {
                account_id: snapshot.account_id,
                name: snapshot.name.clone(),
                positions: snapshot.positions.clone(),
                trades: snapshot.trades.clone(),
                portfolio_value: self.portfolio_value(&snapshot.trades),
            })
            .collect();
        accounts.sort_by_key(|account| account.account_id);

        let exposure = self.exposure(snapshots);
        let top_accounts = self.rank(&accounts, top_n);

        PortfolioReport {
            accounts,
            exposure,
            top_accounts,
            top_n,
        }
    }

    /// Groups trades by symbol, sums `quantity * price` per group, then sums the groups.
    pub fn portfolio_value(&self, trades: &[TradeRecord]) -> Decimal {
        let mut by_symbol: BTreeMap<&str, Decimal> = BTreeMap::new();
        for trade in trades {
            *by_symbol.entry(trade.symbol()).or_insert(Decimal::ZERO) += trade.notional();
        }
        by_symbol.values().copied().sum()
    }

    /// Aggregate quantity per symbol across all accounts.
    pub fn exposure(&self, snapshots: &[AccountSnapshot]) -> BTreeMap<String, i64> {
        let mut exposure = BTreeMap::new();
        for snapshot in snapshots {
            for (symbol, qty) in &snapshot.positions {
                *exposure.entry(symbol.clone()).or_insert(0) += *qty;
            }
        }
        exposure
    }

    fn rank(&self, accounts: &[AccountReport], top_n: usize) -> Vec<RankedAccount> {
        let mut ranked: Vec<RankedAccount> = accounts
            .iter()
            .map(|account| RankedAccount {
                account_id: account.account_id,
                name: account.name.clone(),
                portfolio_value: account.portfolio_value,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.portfolio_value
                .cmp(&a.portfolio_value)
                .then(a.account_id.cmp(&b.account_id))
        });
        ranked.truncate(top_n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::TradeSide;
    use rust_decimal_macros::dec;

    fn trade(id: i64, account: i64, symbol: &str, side: TradeSide, qty: i64, price: Decimal) -> TradeRecord {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        TradeRecord::new(id, account, symbol, qty, price, side, ts).unwrap()
    }

    fn snapshot(id: i64, positions: &[(&str, i64)], trades: Vec<TradeRecord>) -> AccountSnapshot {
        AccountSnapshot {
            account_id: id,
            name: format!("User-{id}"),
            positions: positions.iter().map(|(s, q)| (s.to_string(), *q)).collect(),
            trades,
        }
    }

    #[test]
    fn portfolio_value_sums_gross_notional_of_accepted_trades() {
        let aggregator = ReportAggregator::new();
        let trades = vec![
            trade(1, 1, "AAPL", TradeSide::Buy, 10, dec!(150.50)),
            trade(2, 1, "AAPL", TradeSide::Sell, 4, dec!(155)),
            trade(3, 1, "MSFT", TradeSide::Buy, 2, dec!(300.25)),
        ];
        // 1505 + 620 + 600.50
        assert_eq!(aggregator.portfolio_value(&trades), dec!(2725.50));
        assert_eq!(aggregator.portfolio_value(&[]), Decimal::ZERO);
    }

    #[test]
    fn exposure_sums_positions_across_accounts() {
        let snapshots = vec![
            snapshot(1, &[("AAPL", 10), ("MSFT", 0)], vec![]),
            snapshot(2, &[("AAPL", 5), ("GOOG", 3)], vec![]),
        ];
        let exposure = ReportAggregator::new().exposure(&snapshots);
        assert_eq!(exposure.get("AAPL"), Some(&15));
        assert_eq!(exposure.get("MSFT"), Some(&0));
        assert_eq!(exposure.get("GOOG"), Some(&3));
    }

    #[test]
    fn ranking_breaks_ties_by_account_id_and_truncates() {
        let snapshots = vec![
            snapshot(3, &[("A", 1)], vec![trade(1, 3, "A", TradeSide::Buy, 1, dec!(100))]),
            snapshot(1, &[("A", 1)], vec![trade(2, 1, "A", TradeSide::Buy, 1, dec!(100))]),
            snapshot(2, &[("A", 1)], vec![trade(3, 2, "A", TradeSide::Buy, 1, dec!(500))]),
            snapshot(4, &[], vec![]),
        ];
        let report = ReportAggregator::new().aggregate(&snapshots, 3);

        let order: Vec<i64> = report.top_accounts.iter().map(|r| r.account_id).collect();
        assert_eq!(order, vec![2, 1, 3]);
        assert_eq!(report.top_accounts[0].portfolio_value, dec!(500));

        let ids: Vec<i64> = report.accounts.iter().map(|a| a.account_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}

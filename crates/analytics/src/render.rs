use crate::error::AnalyticsError;
use crate::report::PortfolioReport;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub const PORTFOLIO_SUMMARY_FILE: &str = "portfolio_summary.txt";
pub const TOP_ACCOUNTS_FILE: &str = "top_accounts.txt";
pub const TOTAL_EXPOSURE_FILE: &str = "total_exposure.txt";
pub const TRADES_BY_ACCOUNT_FILE: &str = "trades_by_account.txt";

// Writing into a `String` cannot fail, so the `fmt::Result`s below are discarded.

pub fn portfolio_summary(report: &PortfolioReport) -> String {
    let mut out = String::from("=== Portfolio Summary per Account ===\n");
    for account in &report.accounts {
        let _ = writeln!(out, "Account: {} - {}", account.account_id, account.name);
        for (symbol, qty) in &account.positions {
            let _ = writeln!(out, "  Symbol: {symbol}, Quantity: {qty}");
        }
    }
    out
}

pub fn top_accounts(report: &PortfolioReport) -> String {
    let mut out = format!("=== Top {} Accounts by Portfolio Value ===\n", report.top_n);
    for ranked in &report.top_accounts {
        let _ = writeln!(
            out,
            "Account: {}, Value: {:.2}",
            ranked.account_id, ranked.portfolio_value
        );
    }
    out
}

pub fn total_exposure(report: &PortfolioReport) -> String {
    let mut out = String::from("=== Total Exposure per Symbol ===\n");
    for (symbol, qty) in &report.exposure {
        let _ = writeln!(out, "Symbol: {symbol}, Total Qty: {qty}");
    }
    out
}

pub fn trades_by_account(report: &PortfolioReport) -> String {
    let mut out = String::from("=== Trades Grouped by Account ===\n");
    for account in &report.accounts {
        let _ = writeln!(
            out,
            "Account: {}, Trades Count: {}",
            account.account_id,
            account.trades.len()
        );
        for trade in &account.trades {
            let _ = writeln!(
                out,
                "  TradeId: {}, Symbol: {}, Qty: {}, Side: {}",
                trade.trade_id(), trade.symbol(), trade.quantity(), trade.side()
            );
        }
    }
    out
}

/// Writes all four text reports into `dir`, creating it if needed.
pub fn write_reports(report: &PortfolioReport, dir: &Path) -> Result<Vec<PathBuf>, AnalyticsError> {
    fs::create_dir_all(dir).map_err(|source| AnalyticsError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let artifacts = [
        (PORTFOLIO_SUMMARY_FILE, portfolio_summary(report)),
        (TOP_ACCOUNTS_FILE, top_accounts(report)),
        (TOTAL_EXPOSURE_FILE, total_exposure(report)),
        (TRADES_BY_ACCOUNT_FILE, trades_by_account(report)),
    ];

    let mut written = Vec::with_capacity(artifacts.len());
    for (file_name, contents) in artifacts {
        let path = dir.join(file_name);
        fs::write(&path, contents).map_err(|source| AnalyticsError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "Report generated.");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ReportAggregator;
    use chrono::NaiveDate;
    use core_types::{TradeRecord, TradeSide};
    use ledger::AccountSnapshot;
    use rust_decimal_macros::dec;

    fn sample_report() -> PortfolioReport {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let buy = TradeRecord::new(1, 1, "AAPL", 10, dec!(150), TradeSide::Buy, ts).unwrap();
        let sell = TradeRecord::new(2, 1, "AAPL", 4, dec!(155), TradeSide::Sell, ts).unwrap();
        let other = TradeRecord::new(3, 2, "MSFT", 2, dec!(300.5), TradeSide::Buy, ts).unwrap();

        let snapshots = vec![
            AccountSnapshot {
                account_id: 1,
                name: "User-1".to_string(),
                positions: [("AAPL".to_string(), 6)].into_iter().collect(),
                trades: vec![buy, sell],
            },
            AccountSnapshot {
                account_id: 2,
                name: "User-2".to_string(),
                positions: [("MSFT".to_string(), 2)].into_iter().collect(),
                trades: vec![other],
            },
        ];
        ReportAggregator::new().aggregate(&snapshots, 5)
    }

    #[test]
    fn portfolio_summary_lists_positions_per_account() {
        assert_eq!(
            portfolio_summary(&sample_report()),
            "=== Portfolio Summary per Account ===\n\
             Account: 1 - User-1\n  Symbol: AAPL, Quantity: 6\n\
             Account: 2 - User-2\n  Symbol: MSFT, Quantity: 2\n"
        );
    }

    #[test]
    fn top_accounts_are_ranked_by_value() {
        assert_eq!(
            top_accounts(&sample_report()),
            "=== Top 5 Accounts by Portfolio Value ===\n\
             Account: 1, Value: 2120.00\n\
             Account: 2, Value: 601.00\n"
        );
    }

    #[test]
    fn exposure_and_trades_render_one_line_per_record() {
        let report = sample_report();
        assert_eq!(
            total_exposure(&report),
            "=== Total Exposure per Symbol ===\nSymbol: AAPL, Total Qty: 6\nSymbol: MSFT, Total Qty: 2\n"
        );
        assert_eq!(
            trades_by_account(&report),
            "=== Trades Grouped by Account ===\n\
             Account: 1, Trades Count: 2\n\
             \x20 TradeId: 1, Symbol: AAPL, Qty: 10, Side: BUY\n\
             \x20 TradeId: 2, Symbol: AAPL, Qty: 4, Side: SELL\n\
             Account: 2, Trades Count: 1\n\
             \x20 TradeId: 3, Symbol: MSFT, Qty: 2, Side: BUY\n"
        );
    }

    #[test]
    fn write_reports_creates_all_four_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("reports");

        let written = write_reports(&sample_report(), &target).unwrap();
        assert_eq!(written.len(), 4);
        for path in &written {
            assert!(path.exists());
        }
        let exposure = fs::read_to_string(target.join(TOTAL_EXPOSURE_FILE)).unwrap();
        assert!(exposure.starts_with("=== Total Exposure per Symbol ==="));
    }
}

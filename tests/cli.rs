use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const TRADES: &str = "\
tradeId,accountId,symbol,quantity,price,side,timestamp
1,1,AAPL,10,100.00,BUY,2024-01-15T10:00:00
2,1,AAPL,5,101.00,SELL,2024-01-15T10:01:00
3,2,MSFT,3,300.00,BUY,2024-01-15T10:02:00
4,2,MSFT,7,301.00,SELL,2024-01-15T10:03:00
5,3,TSLA,abc,1.00,BUY,2024-01-15T10:04:00
";

fn tradeledger(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tradeledger"))
        .current_dir(dir)
        .env_remove("DATABASE_URL")
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn run_writes_all_four_reports() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("trades.csv"), TRADES).unwrap();

    let output = tradeledger(dir.path(), &["run", "--workers", "2", "--no-persist"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let reports = dir.path().join("reports");
    let summary = fs::read_to_string(reports.join("portfolio_summary.txt")).unwrap();
    assert!(summary.contains("Account: 1 - User-1"));
    assert!(summary.contains("  Symbol: AAPL, Quantity: 5"));

    let exposure = fs::read_to_string(reports.join("total_exposure.txt")).unwrap();
    assert!(exposure.contains("Symbol: MSFT, Total Qty: 3"));

    let top = fs::read_to_string(reports.join("top_accounts.txt")).unwrap();
    assert!(top.starts_with("=== Top 5 Accounts by Portfolio Value ==="));
    assert!(top.contains("Account: 2, Value: 900.00"));

    let trades = fs::read_to_string(reports.join("trades_by_account.txt")).unwrap();
    assert!(trades.contains("Account: 2, Trades Count: 1"));
    assert!(!trades.contains("Account: 3"));
}

#[test]
fn missing_input_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();

    let output = tradeledger(dir.path(), &["run", "--no-persist"]);
    assert!(!output.status.success());
    assert!(!dir.path().join("reports").exists());
}

#[test]
fn fatal_error_reaches_the_log_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("tradeledger.toml"),
        "[input]\npath = \"missing.csv\"\n\n[logging]\nlevel = \"info\"\ndirectory = \"logs\"\n",
    )
    .unwrap();

    let output = tradeledger(dir.path(), &["run", "--no-persist"]);
    assert!(!output.status.success());

    let log = fs::read_dir(dir.path().join("logs"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .find(|path| path.file_name().unwrap().to_string_lossy().starts_with("tradeledger.log"))
        .map(|path| fs::read_to_string(path).unwrap())
        .unwrap();
    assert!(log.contains("Run aborted."), "{log}");
}

#[test]
fn validate_counts_rejected_lines() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("batch.csv");
    fs::write(&input, TRADES).unwrap();

    let output = tradeledger(dir.path(), &["validate", "--input", input.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("line 6:"));
    assert!(stdout.contains("4 valid trades, 1 invalid lines."));
}

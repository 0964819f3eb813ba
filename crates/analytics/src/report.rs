use core_types::{AccountId, TradeRecord};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything derived for one account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountReport {
    pub account_id: AccountId,
    pub name: String,
    pub positions: BTreeMap<String, i64>,
    pub trades: Vec<TradeRecord>,
    /// Sum over symbols of accepted `quantity * price`.
    pub portfolio_value: Decimal,
}

/// One row of the portfolio-value ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedAccount {
    pub account_id: AccountId,
    pub name: String,
    pub portfolio_value: Decimal,
}

/// The derived views over a fully drained account store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioReport {
    /// Ordered by account id.
    pub accounts: Vec<AccountReport>,
    /// Aggregate position per symbol across all accounts.
    pub exposure: BTreeMap<String, i64>,
    /// Value descending, ties by account id ascending, at most `top_n` rows.
    pub top_accounts: Vec<RankedAccount>,
    pub top_n: usize,
}

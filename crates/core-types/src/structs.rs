use crate::enums::TradeSide;
use crate::error::InvalidTradeError;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub type TradeId = i64;
pub type AccountId = i64;

/// Number of comma-separated fields on an input line:
/// `trade_id,account_id,symbol,quantity,price,side,timestamp`.
pub const TRADE_FIELD_COUNT: usize = 7;

/// An immutable, validated unit of input.
///
/// Instances can only be obtained through [`TradeRecord::new`], by parsing, or
/// by deserializing (which goes through `new`), so every record that reaches
/// the ledger already satisfies `quantity > 0`, `price >= 0` and carries a
/// non-empty symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTradeRecord")]
pub struct TradeRecord {
    trade_id: TradeId,
    account_id: AccountId,
    symbol: String,
    quantity: i64,
    price: Decimal,
    side: TradeSide,
    timestamp: NaiveDateTime,
}

/// Unvalidated wire shape of a `TradeRecord`.
#[derive(Deserialize)]
struct RawTradeRecord {
    trade_id: TradeId,
    account_id: AccountId,
    symbol: String,
    quantity: i64,
    price: Decimal,
    side: TradeSide,
    timestamp: NaiveDateTime,
}

impl TryFrom<RawTradeRecord> for TradeRecord {
    type Error = InvalidTradeError;

    fn try_from(raw: RawTradeRecord) -> Result<Self, Self::Error> {
        TradeRecord::new(
            raw.trade_id,
            raw.account_id,
            raw.symbol,
            raw.quantity,
            raw.price,
            raw.side,
            raw.timestamp,
        )
    }
}

impl TradeRecord {
    /// Builds a trade from already-typed fields, enforcing the record invariants.
    pub fn new(
        trade_id: TradeId,
        account_id: AccountId,
        symbol: impl Into<String>,
        quantity: i64,
        price: Decimal,
        side: TradeSide,
        timestamp: NaiveDateTime,
    ) -> Result<Self, InvalidTradeError> {
        let symbol = symbol.into().trim().to_string();
        if symbol.is_empty() {
            return Err(InvalidTradeError::EmptySymbol);
        }
        if quantity <= 0 {
            return Err(InvalidTradeError::NonPositiveQuantity(quantity));
        }
        if price < Decimal::ZERO {
            return Err(InvalidTradeError::NegativePrice(price));
        }
        Ok(Self {
            trade_id,
            account_id,
            symbol,
            quantity,
            price,
            side,
            timestamp,
        })
    }

    /// Validates raw text fields in input-file order.
    pub fn from_fields(fields: &[&str]) -> Result<Self, InvalidTradeError> {
        if fields.len() != TRADE_FIELD_COUNT {
            return Err(InvalidTradeError::FieldCount {
                expected: TRADE_FIELD_COUNT,
                found: fields.len(),
            });
        }

        let trade_id = parse_field::<TradeId>("trade_id", fields[0])?;
        let account_id = parse_field::<AccountId>("account_id", fields[1])?;
        let quantity = parse_field::<i64>("quantity", fields[3])?;
        let price = parse_field::<Decimal>("price", fields[4])?;
        let side = fields[5].parse::<TradeSide>()?;
        let timestamp = parse_timestamp(fields[6])?;

        Self::new(trade_id, account_id, fields[2], quantity, price, side, timestamp)
    }

    pub fn trade_id(&self) -> TradeId {
        self.trade_id
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Always strictly positive.
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn side(&self) -> TradeSide {
        self.side
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// The change this trade makes to its symbol's position:
    /// `+quantity` for a buy, `-quantity` for a sell.
    pub fn signed_delta(&self) -> i64 {
        self.side.sign() * self.quantity
    }

    /// Gross traded value, `quantity * price`.
    pub fn notional(&self) -> Decimal {
        Decimal::from(self.quantity) * self.price
    }
}

impl FromStr for TradeRecord {
    type Err = InvalidTradeError;

    /// Parses one delimited input line.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split(',').collect();
        Self::from_fields(&fields)
    }
}

fn parse_field<T: FromStr>(field: &'static str, raw: &str) -> Result<T, InvalidTradeError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| InvalidTradeError::Unparseable {
            field,
            value: raw.to_string(),
        })
}

/// Accepts ISO-8601 local date-times with or without seconds and fractions.
fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, InvalidTradeError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .map_err(|_| InvalidTradeError::InvalidTimestamp(raw.to_string()))
}

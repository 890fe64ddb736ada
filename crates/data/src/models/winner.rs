//! Daily winner data model.
//!
//! One [`WinnerRecord`] is stored per `(partition, trade_date)`. The partition
//! tag and the key columns are internal; callers outside the service only ever
//! see the [`PublicRecord`] projection.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use top_movers_core::Quote;

/// Fractional digits kept for percent change and closing price.
pub const PRICE_SCALE: u32 = 6;

/// Rounds to [`PRICE_SCALE`] digits, half away from zero.
#[must_use]
pub fn quantize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// The largest absolute mover for one trading date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct WinnerRecord {
    /// Fixed partition tag (e.g., "MOVERS")
    pub partition: String,
    /// Trading date as reported by the provider; unique within the partition
    pub trade_date: NaiveDate,
    /// Winning ticker symbol
    pub ticker: String,
    /// Signed percent change, quantized to `PRICE_SCALE`
    pub percent_change: Decimal,
    /// Closing price, quantized to `PRICE_SCALE`
    pub closing_price: Decimal,
}

impl WinnerRecord {
    /// Creates a record from the winning quote, quantizing both prices.
    #[must_use]
    pub fn from_quote(partition: impl Into<String>, quote: &Quote) -> Self {
        Self {
            partition: partition.into(),
            trade_date: quote.trading_date(),
            ticker: quote.ticker().to_string(),
            percent_change: quantize(quote.percent_change()),
            closing_price: quantize(quote.close()),
        }
    }

    #[must_use]
    pub fn to_public(&self) -> PublicRecord {
        PublicRecord {
            date: self.trade_date,
            ticker: self.ticker.clone(),
            percent_change: self.percent_change,
            closing_price: self.closing_price,
        }
    }
}

/// Externally visible fields of a winner record.
///
/// Serializes with exactly the keys `Date`, `Ticker`, `PercentChange` and
/// `ClosingPrice`; the prices are JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublicRecord {
    pub date: NaiveDate,
    pub ticker: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub percent_change: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub closing_price: Decimal,
}

impl From<WinnerRecord> for PublicRecord {
    fn from(record: WinnerRecord) -> Self {
        Self {
            date: record.trade_date,
            ticker: record.ticker,
            percent_change: record.percent_change,
            closing_price: record.closing_price,
        }
    }
}

//! Daily quote and watchlist types.
//!
//! A [`Quote`] is the open/close pair the provider reports for one ticker on
//! one trading date. Fields are private so a quote cannot be altered once it
//! has been fetched.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

/// Reasons a quote or watchlist cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("ticker cannot be empty")]
    EmptyTicker,

    #[error("open price for {ticker} must be positive, got {open}")]
    NonPositiveOpen { ticker: String, open: Decimal },

    #[error("close price for {ticker} cannot be negative, got {close}")]
    NegativeClose { ticker: String, close: Decimal },

    #[error("percent change for {ticker} is out of range (open {open}, close {close})")]
    ChangeOutOfRange {
        ticker: String,
        open: Decimal,
        close: Decimal,
    },

    #[error("watchlist cannot be empty")]
    EmptyWatchlist,

    #[error("watchlist contains {0} more than once")]
    DuplicateTicker(String),
}

/// Open and close price for one ticker on one trading date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    ticker: String,
    trading_date: NaiveDate,
    open: Decimal,
    close: Decimal,
    #[serde(skip)]
    percent_change: Decimal,
}

impl Quote {
    /// Creates a quote, rejecting prices that make the percent change undefined.
    ///
    /// # Errors
    /// Returns an error if the ticker is empty, the open price is zero or
    /// negative, the close price is negative, or the percent change does not
    /// fit in a `Decimal`.
    pub fn new(
        ticker: impl Into<String>,
        trading_date: NaiveDate,
        open: Decimal,
        close: Decimal,
    ) -> Result<Self, QuoteError> {
        let ticker = ticker.into();
        if ticker.is_empty() {
            return Err(QuoteError::EmptyTicker);
        }
        if open <= Decimal::ZERO {
            return Err(QuoteError::NonPositiveOpen { ticker, open });
        }
        if close < Decimal::ZERO {
            return Err(QuoteError::NegativeClose { ticker, close });
        }

        let Some(percent_change) = close
            .checked_sub(open)
            .and_then(|delta| delta.checked_div(open))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        else {
            return Err(QuoteError::ChangeOutOfRange {
                ticker,
                open,
                close,
            });
        };

        Ok(Self {
            ticker,
            trading_date,
            open,
            close,
            percent_change,
        })
    }

    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    #[must_use]
    pub const fn trading_date(&self) -> NaiveDate {
        self.trading_date
    }

    #[must_use]
    pub const fn open(&self) -> Decimal {
        self.open
    }

    #[must_use]
    pub const fn close(&self) -> Decimal {
        self.close
    }

    /// Percent change from open to close, unrounded.
    ///
    /// `((close - open) / open) * 100`, computed once by the constructor.
    #[must_use]
    pub const fn percent_change(&self) -> Decimal {
        self.percent_change
    }
}

/// Ordered, duplicate-free set of tracked tickers.
///
/// The first entry is the anchor ticker used to discover the trading date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlist {
    tickers: Vec<String>,
}

impl Watchlist {
    /// Builds a watchlist, preserving the given order.
    ///
    /// # Errors
    /// Returns an error if the list is empty, contains an empty symbol, or
    /// repeats a symbol.
    pub fn new<I, S>(tickers: I) -> Result<Self, QuoteError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tickers: Vec<String> = tickers.into_iter().map(Into::into).collect();
        if tickers.is_empty() {
            return Err(QuoteError::EmptyWatchlist);
        }

        let mut seen = HashSet::with_capacity(tickers.len());
        for ticker in &tickers {
            if ticker.is_empty() {
                return Err(QuoteError::EmptyTicker);
            }
            if !seen.insert(ticker.as_str()) {
                return Err(QuoteError::DuplicateTicker(ticker.clone()));
            }
        }

        Ok(Self { tickers })
    }

    /// The ticker fetched first on every run.
    #[must_use]
    pub fn anchor(&self) -> &str {
        &self.tickers[0]
    }

    /// Tickers after the anchor, in watchlist order.
    pub fn rest(&self) -> impl Iterator<Item = &str> {
        self.tickers[1..].iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tickers.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    #[must_use]
    pub fn contains(&self, ticker: &str) -> bool {
        self.tickers.iter().any(|t| t == ticker)
    }
}

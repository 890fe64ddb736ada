//! Scripted [`QuoteSource`] for testing consumers without a provider.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use top_movers_core::Quote;

use crate::error::{FetchError, ProviderError};
use crate::fetcher::QuoteSource;

/// Mock quote source for testing.
///
/// Serves pre-registered quotes, counts every call, and can be told to fail
/// for chosen tickers or to stall each call.
#[derive(Debug, Default)]
pub struct MockQuoteSource {
    latest: Mutex<HashMap<String, Quote>>,
    dated: Mutex<HashMap<(String, NaiveDate), Quote>>,
    failing: Mutex<HashSet<String>>,
    calendar: Mutex<Vec<NaiveDate>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
    log: Mutex<Vec<String>>,
}

impl MockQuoteSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `quote` as the latest quote for its ticker.
    #[must_use]
    pub fn with_latest(self, quote: Quote) -> Self {
        self.latest.lock().insert(quote.ticker().to_string(), quote);
        self
    }

    /// Registers `quote` as the answer for its ticker on its trading date.
    #[must_use]
    pub fn with_dated(self, quote: Quote) -> Self {
        self.dated
            .lock()
            .insert((quote.ticker().to_string(), quote.trading_date()), quote);
        self
    }

    /// Makes every call for `ticker` fail as an exhausted server error.
    #[must_use]
    pub fn with_failure(self, ticker: &str) -> Self {
        self.failing.lock().insert(ticker.to_string());
        self
    }

    /// Trading days returned by `trading_dates`.
    #[must_use]
    pub fn with_calendar(self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.calendar.lock().extend(dates);
        self
    }

    /// Sleeps for `delay` at the start of every call.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock() = Some(delay);
        self
    }

    /// Number of calls made across all methods.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Tickers requested, in call order.
    #[must_use]
    pub fn requested(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    async fn record(&self, ticker: &str) -> Result<(), FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().push(ticker.to_string());

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().contains(ticker) {
            return Err(FetchError::Provider {
                ticker: ticker.to_string(),
                source: ProviderError::Server {
                    status: 503,
                    message: "scripted failure".to_string(),
                },
            });
        }
        Ok(())
    }
}

#[async_trait]
impl QuoteSource for MockQuoteSource {
    async fn latest_quote(&self, ticker: &str) -> Result<Quote, FetchError> {
        self.record(ticker).await?;
        self.latest
            .lock()
            .get(ticker)
            .cloned()
            .ok_or_else(|| FetchError::malformed(ticker, "no results"))
    }

    async fn quote_on(&self, ticker: &str, date: NaiveDate) -> Result<Quote, FetchError> {
        self.record(ticker).await?;
        if let Some(quote) = self.dated.lock().get(&(ticker.to_string(), date)) {
            return Ok(quote.clone());
        }
        // fall back to the latest quote so date mismatches can be scripted
        match self.latest.lock().get(ticker) {
            Some(quote) if quote.trading_date() == date => Ok(quote.clone()),
            Some(quote) => Err(FetchError::DateMismatch {
                ticker: ticker.to_string(),
                expected: date,
                actual: quote.trading_date(),
            }),
            None => Err(FetchError::malformed(ticker, "no results")),
        }
    }

    async fn trading_dates(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, FetchError> {
        self.record(ticker).await?;
        let mut dates: Vec<NaiveDate> = self
            .calendar
            .lock()
            .iter()
            .copied()
            .filter(|d| (from..=to).contains(d))
            .collect();
        dates.sort_unstable();
        dates.dedup();
        if dates.is_empty() {
            return Err(FetchError::malformed(
                ticker,
                format!("no trading days between {from} and {to}"),
            ));
        }
        Ok(dates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn quote(ticker: &str, day: u32) -> Quote {
        Quote::new(ticker, date(day), dec!(100), dec!(101)).unwrap()
    }

    #[tokio::test]
    async fn test_serves_latest_and_counts_calls() {
        let source = MockQuoteSource::new().with_latest(quote("AAPL", 7));

        assert_eq!(source.latest_quote("AAPL").await.unwrap(), quote("AAPL", 7));
        assert!(source.latest_quote("MSFT").await.is_err());
        assert_eq!(source.call_count(), 2);
        assert_eq!(source.requested(), vec!["AAPL", "MSFT"]);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let source = MockQuoteSource::new()
            .with_latest(quote("TSLA", 7))
            .with_failure("TSLA");
        let err = source.latest_quote("TSLA").await.unwrap_err();
        assert!(matches!(err, FetchError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_quote_on_prefers_dated_then_reports_mismatch() {
        let source = MockQuoteSource::new()
            .with_dated(quote("AAPL", 5))
            .with_latest(quote("AAPL", 7));

        assert_eq!(source.quote_on("AAPL", date(5)).await.unwrap(), quote("AAPL", 5));
        assert_eq!(source.quote_on("AAPL", date(7)).await.unwrap(), quote("AAPL", 7));
        assert!(matches!(
            source.quote_on("AAPL", date(6)).await,
            Err(FetchError::DateMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_calendar_is_filtered_and_sorted() {
        let source = MockQuoteSource::new().with_calendar([date(7), date(3), date(5), date(3)]);
        let dates = source.trading_dates("AAPL", date(4), date(7)).await.unwrap();
        assert_eq!(dates, vec![date(5), date(7)]);
    }
}

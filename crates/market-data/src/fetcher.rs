//! Daily open/close quotes from the provider's aggregates endpoints.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use top_movers_core::Quote;

use crate::client::PacedClient;
use crate::error::{FetchError, ProviderError};
use crate::models::{AggregateBar, AggregatesResponse};

/// Source of daily quotes for the ingestion pipeline.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Most recent completed trading day for `ticker`.
    async fn latest_quote(&self, ticker: &str) -> Result<Quote, FetchError>;

    /// Quote for `ticker` on exactly `date`.
    ///
    /// Fails with [`FetchError::DateMismatch`] if the provider answers for a
    /// different day.
    async fn quote_on(&self, ticker: &str, date: NaiveDate) -> Result<Quote, FetchError>;

    /// Trading days with a bar for `ticker` in `[from, to]`, ascending and
    /// deduplicated.
    async fn trading_dates(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, FetchError>;
}

/// [`QuoteSource`] backed by a [`PacedClient`].
#[derive(Debug)]
pub struct DailyQuoteFetcher {
    client: PacedClient,
}

impl DailyQuoteFetcher {
    #[must_use]
    pub fn new(client: PacedClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &PacedClient {
        &self.client
    }
}

fn provider_error(ticker: &str) -> impl FnOnce(ProviderError) -> FetchError + '_ {
    move |source| FetchError::Provider {
        ticker: ticker.to_string(),
        source,
    }
}

fn first_bar<'a>(ticker: &str, response: &'a AggregatesResponse) -> Result<&'a AggregateBar, FetchError> {
    if !response.is_ok() {
        return Err(FetchError::malformed(
            ticker,
            format!(
                "unexpected status {}",
                response.status.as_deref().unwrap_or("<missing>")
            ),
        ));
    }
    response
        .bars()
        .first()
        .ok_or_else(|| FetchError::malformed(ticker, "no results"))
}

fn price(ticker: &str, field: &str, value: Option<f64>) -> Result<Decimal, FetchError> {
    let value = value.ok_or_else(|| FetchError::malformed(ticker, format!("missing {field}")))?;
    Decimal::try_from(value)
        .map_err(|_| FetchError::malformed(ticker, format!("non-finite {field}: {value}")))
}

/// Converts one bar into a validated [`Quote`].
fn bar_to_quote(ticker: &str, bar: &AggregateBar) -> Result<Quote, FetchError> {
    let open = price(ticker, "open", bar.open)?;
    let close = price(ticker, "close", bar.close)?;
    let date = bar
        .trading_date()
        .ok_or_else(|| FetchError::malformed(ticker, "missing or invalid timestamp"))?;

    Quote::new(ticker, date, open, close).map_err(|e| FetchError::malformed(ticker, e.to_string()))
}

#[async_trait]
impl QuoteSource for DailyQuoteFetcher {
    async fn latest_quote(&self, ticker: &str) -> Result<Quote, FetchError> {
        let response = self
            .client
            .previous_close(ticker)
            .await
            .map_err(provider_error(ticker))?;
        let quote = bar_to_quote(ticker, first_bar(ticker, &response)?)?;
        tracing::debug!(
            "Fetched {} for {}: open {} close {}",
            ticker,
            quote.trading_date(),
            quote.open(),
            quote.close()
        );
        Ok(quote)
    }

    async fn quote_on(&self, ticker: &str, date: NaiveDate) -> Result<Quote, FetchError> {
        let response = self
            .client
            .daily_range(ticker, date, date)
            .await
            .map_err(provider_error(ticker))?;
        let quote = bar_to_quote(ticker, first_bar(ticker, &response)?)?;
        if quote.trading_date() != date {
            return Err(FetchError::DateMismatch {
                ticker: ticker.to_string(),
                expected: date,
                actual: quote.trading_date(),
            });
        }
        Ok(quote)
    }

    async fn trading_dates(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, FetchError> {
        let response = self
            .client
            .daily_range(ticker, from, to)
            .await
            .map_err(provider_error(ticker))?;

        let mut dates: Vec<NaiveDate> = response
            .bars()
            .iter()
            .filter_map(AggregateBar::trading_date)
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

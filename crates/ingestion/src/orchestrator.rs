//! Ingestion run sequencing: anchor fetch, short-circuit, full fetch,
//! selection, conditional commit.
//!
//! A run writes either nothing or exactly one record. Any fetch failure or
//! date mismatch aborts before the store is touched, and the store's
//! conditional insert settles concurrent runs for the same day.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use top_movers_core::{IngestionConfig, Quote, Watchlist};
use top_movers_data::WinnerStore;
use top_movers_market_data::QuoteSource;
use tracing::{info, warn};

use crate::error::{IngestionError, Result};
use crate::report::IngestionReport;
use crate::selector::WinnerSelector;
use crate::writer::{CommitOutcome, IdempotentWriter};

/// Calendar days searched backwards from the backfill end date.
pub const BACKFILL_LOOKBACK_DAYS: u64 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// Whatever the provider reports as the last completed session.
    Latest,
    /// A specific trading date.
    On(NaiveDate),
}

pub struct IngestionOrchestrator {
    source: Arc<dyn QuoteSource>,
    writer: IdempotentWriter,
    selector: WinnerSelector,
    watchlist: Watchlist,
    run_timeout: Duration,
}

impl IngestionOrchestrator {
    /// Creates an orchestrator for the configured watchlist and partition.
    ///
    /// # Errors
    /// Returns an error if the watchlist is empty or has duplicates.
    pub fn new(
        source: Arc<dyn QuoteSource>,
        store: Arc<dyn WinnerStore>,
        config: &IngestionConfig,
    ) -> Result<Self> {
        let watchlist = config.watchlist()?;
        Ok(Self {
            source,
            writer: IdempotentWriter::new(store, config.partition.clone()),
            selector: WinnerSelector::new(config.partition.clone()),
            watchlist,
            run_timeout: config.run_timeout(),
        })
    }

    #[must_use]
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = timeout;
        self
    }

    #[must_use]
    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    /// Ingests the most recent completed trading day.
    ///
    /// # Errors
    /// Returns an error if any quote cannot be fetched, dates disagree, the
    /// store fails, or the run exceeds its timeout. Nothing is written in
    /// any of these cases.
    pub async fn run(&self) -> Result<IngestionReport> {
        self.bounded(self.execute(Target::Latest)).await
    }

    /// Ingests an explicit trading date.
    ///
    /// The store is checked before any provider call, so an already stored
    /// day costs no provider requests.
    ///
    /// # Errors
    /// Same as [`run`](Self::run).
    pub async fn run_for_date(&self, date: NaiveDate) -> Result<IngestionReport> {
        self.bounded(self.execute(Target::On(date))).await
    }

    /// Ingests the last `days` trading dates on or before `end_date`,
    /// oldest first.
    ///
    /// Stops at the first failing date; dates ingested before it stay stored.
    ///
    /// # Errors
    /// Returns an error if too few trading dates are found or any date's run
    /// fails.
    pub async fn backfill(&self, end_date: NaiveDate, days: usize) -> Result<Vec<IngestionReport>> {
        let dates = self.discover_trading_dates(end_date, days).await?;
        info!(
            "Backfilling {} trading dates: {:?} to {:?}",
            dates.len(),
            dates.first(),
            dates.last()
        );

        let mut reports = Vec::with_capacity(dates.len());
        for date in dates {
            let report = self.run_for_date(date).await?;
            reports.push(report);
        }
        Ok(reports)
    }

    /// Returns the last `days` trading dates `<= end_date`, ascending, using
    /// the anchor ticker's bars as the calendar.
    ///
    /// # Errors
    /// Returns [`IngestionError::InsufficientTradingDates`] if the lookback
    /// window holds fewer than `days` sessions.
    pub async fn discover_trading_dates(
        &self,
        end_date: NaiveDate,
        days: usize,
    ) -> Result<Vec<NaiveDate>> {
        if days == 0 {
            return Ok(Vec::new());
        }

        let from = end_date
            .checked_sub_days(Days::new(BACKFILL_LOOKBACK_DAYS))
            .unwrap_or(NaiveDate::MIN);
        let mut dates = self
            .source
            .trading_dates(self.watchlist.anchor(), from, end_date)
            .await?;
        dates.retain(|d| *d <= end_date);

        if dates.len() < days {
            return Err(IngestionError::InsufficientTradingDates {
                requested: days,
                found: dates.len(),
                end_date,
            });
        }
        Ok(dates.split_off(dates.len() - days))
    }

    async fn bounded<F>(&self, run: F) -> Result<IngestionReport>
    where
        F: Future<Output = Result<IngestionReport>>,
    {
        match tokio::time::timeout(self.run_timeout, run).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Ingestion run exceeded {:?}, nothing written", self.run_timeout);
                Err(IngestionError::Timeout(self.run_timeout))
            }
        }
    }

    async fn fetch(&self, ticker: &str, target: Target) -> Result<Quote> {
        let quote = match target {
            Target::Latest => self.source.latest_quote(ticker).await,
            Target::On(date) => self.source.quote_on(ticker, date).await,
        };
        quote.map_err(|e| {
            warn!("Aborting run, fetch failed for {}: {}", ticker, e);
            IngestionError::from(e)
        })
    }

    async fn execute(&self, target: Target) -> Result<IngestionReport> {
        if let Target::On(date) = target {
            if let Some(existing) = self.writer.existing(date).await? {
                info!("Winner for {} already stored ({})", date, existing.ticker);
                return Ok(IngestionReport::already_stored(date, &existing));
            }
        }

        let anchor_ticker = self.watchlist.anchor();
        let anchor = self.fetch(anchor_ticker, target).await?;
        let trading_date = anchor.trading_date();
        if let Target::On(expected) = target {
            check_date(&anchor, expected)?;
        }

        if target == Target::Latest {
            if let Some(existing) = self.writer.existing(trading_date).await? {
                info!(
                    "Winner for {} already stored ({}), skipping full fetch",
                    trading_date, existing.ticker
                );
                return Ok(IngestionReport::already_stored(trading_date, &existing));
            }
        }

        let mut quotes = Vec::with_capacity(self.watchlist.len());
        quotes.push(anchor);
        for ticker in self.watchlist.rest() {
            let quote = self.fetch(ticker, target).await?;
            check_date(&quote, trading_date)?;
            quotes.push(quote);
        }

        let record = self.selector.select(&quotes)?;
        match self.writer.commit(&record).await? {
            CommitOutcome::Stored => {
                info!(
                    "Stored winner for {}: {} {}% close {}",
                    record.trade_date, record.ticker, record.percent_change, record.closing_price
                );
                Ok(IngestionReport::stored(&record, quotes.len()))
            }
            CommitOutcome::AlreadyStored => {
                info!(
                    "Winner for {} committed by a concurrent run",
                    record.trade_date
                );
                let existing = match self.writer.existing(trading_date).await {
                    Ok(existing) => existing,
                    Err(e) => {
                        warn!("Could not read back winner for {}: {}", trading_date, e);
                        None
                    }
                };
                Ok(IngestionReport::race_lost(trading_date, existing.as_ref()))
            }
        }
    }
}

fn check_date(quote: &Quote, expected: NaiveDate) -> Result<()> {
    if quote.trading_date() != expected {
        warn!(
            "Aborting run, {} reported {} instead of {}",
            quote.ticker(),
            quote.trading_date(),
            expected
        );
        return Err(IngestionError::DateInconsistency {
            ticker: quote.ticker().to_string(),
            expected,
            actual: quote.trading_date(),
        });
    }
    Ok(())
}

//! Market-data provider integration for the daily top mover service.
//!
//! This crate provides:
//! - A paced, retrying REST client ([`PacedClient`])
//! - The [`QuoteSource`] contract and its provider-backed implementation
//! - Typed provider errors with retry classification
//! - A scripted [`MockQuoteSource`] for downstream tests
//!
//! HTTP I/O sits behind the [`Transport`] trait so pacing and retry
//! behavior can be exercised without a network.

pub mod client;
pub mod error;
pub mod fetcher;
pub mod mock;
pub mod models;
pub mod pacer;
pub mod retry;
pub mod transport;

pub use client::{PacedClient, MAX_TICKER_LEN};
pub use error::{ErrorKind, FetchError, ProviderError, Result};
pub use fetcher::{DailyQuoteFetcher, QuoteSource};
pub use mock::MockQuoteSource;
pub use models::{AggregateBar, AggregatesResponse};
pub use pacer::Pacer;
pub use retry::{RetryPolicy, RetryState};
pub use transport::{HttpReply, ReqwestTransport, Transport};

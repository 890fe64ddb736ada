//! Paced, retrying REST client for the market-data provider.
//!
//! Every attempt passes the [`Pacer`], failed attempts are retried per the
//! [`RetryPolicy`], and the API key is attached only when the request is
//! handed to the [`Transport`].
//!
//! # Example
//!
//! ```ignore
//! use top_movers_core::AppConfig;
//! use top_movers_market_data::PacedClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::default();
//!     let client = PacedClient::new(&config.provider, &config.pacing)?;
//!
//!     let prev = client.previous_close("AAPL").await?;
//!     println!("{} bars", prev.bars().len());
//!
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use top_movers_core::{PacingConfig, ProviderConfig};
use tracing::{debug, warn};

use crate::error::{ProviderError, Result};
use crate::models::AggregatesResponse;
use crate::pacer::Pacer;
use crate::retry::{RetryPolicy, RetryState};
use crate::transport::{HttpReply, ReqwestTransport, Transport};

// =============================================================================
// Constants
// =============================================================================

/// Longest ticker symbol accepted.
pub const MAX_TICKER_LEN: usize = 16;

const API_KEY_PARAM: &str = "apiKey";

// =============================================================================
// Client
// =============================================================================

pub struct PacedClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    api_key: SecretString,
    pacer: Pacer,
    policy: RetryPolicy,
}

impl std::fmt::Debug for PacedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacedClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("pacer", &self.pacer)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl PacedClient {
    /// Creates a client over HTTPS using the configured provider settings.
    ///
    /// # Errors
    /// Returns [`ProviderError::Configuration`] if no API key is configured
    /// or the HTTP client cannot be built.
    pub fn new(provider: &ProviderConfig, pacing: &PacingConfig) -> Result<Self> {
        let api_key = provider.api_key.clone().ok_or_else(|| {
            ProviderError::Configuration("provider API key is not configured".to_string())
        })?;
        let transport = ReqwestTransport::new(provider.request_timeout())?;
        Ok(Self::with_transport(
            Arc::new(transport),
            provider.base_url.clone(),
            api_key,
            pacing,
        ))
    }

    /// Creates a client over an arbitrary transport.
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        base_url: impl Into<String>,
        api_key: SecretString,
        pacing: &PacingConfig,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            pacer: Pacer::new(pacing.request_spacing(), pacing.jitter_max()),
            policy: RetryPolicy::from_config(pacing),
        }
    }

    /// Sets the base URL (useful for testing with mock servers).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Validates a ticker symbol before it is placed in a URL path.
    ///
    /// # Errors
    /// Returns [`ProviderError::InvalidRequest`] for empty, overlong, or
    /// non-symbol input.
    pub fn validate_ticker(ticker: &str) -> Result<&str> {
        if ticker.is_empty() {
            return Err(ProviderError::InvalidRequest(
                "ticker cannot be empty".to_string(),
            ));
        }

        if ticker.len() > MAX_TICKER_LEN {
            return Err(ProviderError::InvalidRequest(format!(
                "invalid ticker: exceeds maximum length of {}: {}",
                MAX_TICKER_LEN, ticker
            )));
        }

        if ticker.contains("..")
            || !ticker
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(ProviderError::InvalidRequest(format!(
                "invalid ticker: must contain only alphanumeric, dot, or hyphen: {}",
                ticker
            )));
        }

        Ok(ticker)
    }

    /// Performs a paced GET with retries and decodes the JSON body.
    ///
    /// `path` is appended to the base URL; `params` are sent as query
    /// parameters alongside the API key.
    ///
    /// # Errors
    /// Returns the last attempt's error once the retry policy gives up, or
    /// immediately for non-retryable failures.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut query: Vec<(&str, &str)> = params.to_vec();
        query.push((API_KEY_PARAM, self.api_key.expose_secret()));

        let mut state = RetryState::new();
        loop {
            let attempt = state.begin_attempt();
            self.pacer.acquire().await;
            debug!("GET {} (attempt {})", url, attempt);

            let error = match self.send_once::<T>(&url, &query).await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };
            state.record_failure(error.kind());

            match self.policy.next_delay(&state) {
                Some(delay) => {
                    warn!(
                        url = %url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        kind = %error.kind(),
                        "Provider call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    if error.is_retryable() {
                        warn!(
                            url = %url,
                            attempts = attempt,
                            kind = %error.kind(),
                            "Provider call failed, giving up"
                        );
                    }
                    return Err(error);
                }
            }
        }
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let reply = self.transport.get(url, query).await?;
        Self::handle_reply(reply)
    }

    fn handle_reply<T: DeserializeOwned>(reply: HttpReply) -> Result<T> {
        if !reply.is_success() {
            return Err(ProviderError::from_status(reply.status, &reply.body));
        }
        serde_json::from_str(&reply.body).map_err(|e| ProviderError::Malformed(e.to_string()))
    }

    // =========================================================================
    // Aggregates endpoints
    // =========================================================================

    /// Gets the most recent completed daily bar for `ticker`.
    ///
    /// # Errors
    /// Returns an error if the ticker is invalid or the request fails.
    pub async fn previous_close(&self, ticker: &str) -> Result<AggregatesResponse> {
        let ticker = Self::validate_ticker(ticker)?;
        let path = format!("/v2/aggs/ticker/{}/prev", ticker);
        self.get_json(&path, &[("adjusted", "true")]).await
    }

    /// Gets daily bars for `ticker` over the inclusive range `[from, to]`.
    ///
    /// # Errors
    /// Returns an error if the ticker is invalid or the request fails.
    pub async fn daily_range(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AggregatesResponse> {
        let ticker = Self::validate_ticker(ticker)?;
        let path = format!(
            "/v2/aggs/ticker/{}/range/1/day/{}/{}",
            ticker,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        );
        self.get_json(&path, &[("adjusted", "true")]).await
    }
}

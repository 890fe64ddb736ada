//! Error types for the market-data provider integration.
//!
//! [`ProviderError`] covers a single HTTP exchange with the provider;
//! [`FetchError`] is what quote consumers see once retries are exhausted.

use chrono::NaiveDate;
use thiserror::Error;

/// Longest slice of a provider error body kept in messages.
const MAX_BODY_CHARS: usize = 250;

/// Coarse classification used by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    RateLimited,
    Server,
    Network,
    Client,
    Malformed,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::RateLimited => "rate_limited",
            Self::Server => "server_error",
            Self::Network => "network_error",
            Self::Client => "client_error",
            Self::Malformed => "malformed_response",
        };
        f.write_str(name)
    }
}

/// Errors from one request to the provider.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// HTTP 429.
    #[error("rate limited by provider (HTTP 429)")]
    RateLimited,

    /// HTTP 5xx.
    #[error("provider server error: {status} - {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        message: String,
    },

    /// Connection failure, timeout, or broken response stream.
    #[error("network error: {0}")]
    Network(String),

    /// HTTP 4xx other than 429.
    #[error("provider rejected request: {status} - {message}")]
    Client {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        message: String,
    },

    /// Request rejected before it was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Successful status with a body that does not parse.
    #[error("malformed provider response: {0}")]
    Malformed(String),

    /// Client could not be constructed.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// Maps a non-success HTTP status and body to an error.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let message: String = body.chars().take(MAX_BODY_CHARS).collect();
        match status {
            429 => Self::RateLimited,
            500..=599 => Self::Server { status, message },
            _ => Self::Client { status, message },
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RateLimited => ErrorKind::RateLimited,
            Self::Server { .. } => ErrorKind::Server,
            Self::Network(_) => ErrorKind::Network,
            Self::Client { .. } | Self::InvalidRequest(_) | Self::Configuration(_) => {
                ErrorKind::Client
            }
            Self::Malformed(_) => ErrorKind::Malformed,
        }
    }

    /// Returns true if another attempt may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::RateLimited | ErrorKind::Server | ErrorKind::Network
        )
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        // the request URL carries the API key
        let err = err.without_url();
        if err.is_timeout() {
            Self::Network(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Errors returned by quote sources.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The provider call failed after the retry policy gave up.
    #[error("provider request for {ticker} failed: {source}")]
    Provider {
        ticker: String,
        #[source]
        source: ProviderError,
    },

    /// The provider answered, but not with a usable quote.
    #[error("malformed quote for {ticker}: {reason}")]
    MalformedQuote { ticker: String, reason: String },

    /// A quote requested for one date came back for another.
    #[error("date mismatch for {ticker}: expected {expected}, got {actual}")]
    DateMismatch {
        ticker: String,
        expected: NaiveDate,
        actual: NaiveDate,
    },
}

impl FetchError {
    pub fn malformed(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedQuote {
            ticker: ticker.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn ticker(&self) -> &str {
        match self {
            Self::Provider { ticker, .. }
            | Self::MalformedQuote { ticker, .. }
            | Self::DateMismatch { ticker, .. } => ticker,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        assert!(matches!(ProviderError::from_status(429, ""), ProviderError::RateLimited));
        assert!(matches!(
            ProviderError::from_status(503, "unavailable"),
            ProviderError::Server { status: 503, .. }
        ));
        assert!(matches!(
            ProviderError::from_status(404, "not found"),
            ProviderError::Client { status: 404, .. }
        ));
        assert!(matches!(
            ProviderError::from_status(401, ""),
            ProviderError::Client { status: 401, .. }
        ));
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(ProviderError::RateLimited.is_retryable());
        assert!(ProviderError::from_status(500, "").is_retryable());
        assert!(ProviderError::Network("reset".to_string()).is_retryable());

        assert!(!ProviderError::from_status(400, "").is_retryable());
        assert!(!ProviderError::Malformed("bad json".to_string()).is_retryable());
        assert!(!ProviderError::InvalidRequest("bad ticker".to_string()).is_retryable());
    }

    #[test]
    fn test_body_is_truncated() {
        let body = "x".repeat(1000);
        match ProviderError::from_status(500, &body) {
            ProviderError::Server { message, .. } => assert_eq!(message.len(), MAX_BODY_CHARS),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::RateLimited.to_string(), "rate_limited");
        assert_eq!(ErrorKind::Malformed.to_string(), "malformed_response");
    }

    #[test]
    fn test_fetch_error_ticker() {
        let err = FetchError::malformed("TSLA", "no results");
        assert_eq!(err.ticker(), "TSLA");
        assert!(err.to_string().contains("no results"));

        let err = FetchError::Provider {
            ticker: "NVDA".to_string(),
            source: ProviderError::RateLimited,
        };
        assert_eq!(err.ticker(), "NVDA");
        assert!(err.to_string().contains("429"));
    }
}

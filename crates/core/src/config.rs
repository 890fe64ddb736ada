use crate::quote::{QuoteError, Watchlist};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Partition tag shared by every stored winner record.
pub const DEFAULT_PARTITION: &str = "MOVERS";

/// Tickers tracked by the reference deployment, anchor first.
pub const DEFAULT_WATCHLIST: [&str; 6] = ["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "NVDA"];

pub const DEFAULT_PROVIDER_URL: &str = "https://api.massive.com";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub provider: ProviderConfig,
    pub pacing: PacingConfig,
    pub ingestion: IngestionConfig,
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Apply embedded migrations when a command connects.
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Resolved provider key. Never logged.
    #[serde(deserialize_with = "deserialize_secret")]
    pub api_key: Option<SecretString>,
    pub request_timeout_secs: u64,
}

/// Spacing and retry tunables for provider calls.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Minimum gap between the start of consecutive provider calls.
    pub request_spacing_secs: f64,
    pub max_attempts: u32,
    pub base_429_backoff_secs: f64,
    pub base_5xx_backoff_secs: f64,
    pub max_backoff_secs: f64,
    /// Upper bound of the uniform jitter added to every sleep.
    pub jitter_max_secs: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub watchlist: Vec<String>,
    pub partition: String,
    /// Wall-clock bound for one ingestion run.
    pub run_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/top_movers".to_string(),
            max_connections: 10,
            run_migrations: true,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_URL.to_string(),
            api_key: None,
            request_timeout_secs: 15,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        // 12.5s spacing keeps six calls at roughly 62s, under per-minute caps
        Self {
            request_spacing_secs: 12.5,
            max_attempts: 4,
            base_429_backoff_secs: 2.0,
            base_5xx_backoff_secs: 0.5,
            max_backoff_secs: 10.0,
            jitter_max_secs: 0.25,
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            watchlist: DEFAULT_WATCHLIST.iter().map(ToString::to_string).collect(),
            partition: DEFAULT_PARTITION.to_string(),
            run_timeout_secs: 600,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { limit: 7 }
    }
}

/// Invalid configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid watchlist: {0}")]
    Watchlist(#[from] QuoteError),

    #[error("{field} must be a finite, non-negative number of seconds, got {value}")]
    InvalidDuration { field: &'static str, value: f64 },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("partition tag cannot be empty")]
    EmptyPartition,
}

impl AppConfig {
    /// Checks every value a component would otherwise have to re-validate.
    ///
    /// # Errors
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pacing.validate()?;
        self.ingestion.watchlist()?;
        if self.ingestion.partition.is_empty() {
            return Err(ConfigError::EmptyPartition);
        }
        if self.ingestion.run_timeout_secs == 0 {
            return Err(ConfigError::Zero("ingestion.run_timeout_secs"));
        }
        if self.retrieval.limit == 0 {
            return Err(ConfigError::Zero("retrieval.limit"));
        }
        Ok(())
    }

    /// `host:port` for the retrieval server.
    #[must_use]
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl PacingConfig {
    /// Checks attempt bounds and that every duration is usable.
    ///
    /// # Errors
    /// Returns an error for zero attempts or a negative/non-finite duration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Zero("pacing.max_attempts"));
        }
        for (field, value) in [
            ("pacing.request_spacing_secs", self.request_spacing_secs),
            ("pacing.base_429_backoff_secs", self.base_429_backoff_secs),
            ("pacing.base_5xx_backoff_secs", self.base_5xx_backoff_secs),
            ("pacing.max_backoff_secs", self.max_backoff_secs),
            ("pacing.jitter_max_secs", self.jitter_max_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDuration { field, value });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn request_spacing(&self) -> Duration {
        secs(self.request_spacing_secs)
    }

    #[must_use]
    pub fn base_429_backoff(&self) -> Duration {
        secs(self.base_429_backoff_secs)
    }

    #[must_use]
    pub fn base_5xx_backoff(&self) -> Duration {
        secs(self.base_5xx_backoff_secs)
    }

    #[must_use]
    pub fn max_backoff(&self) -> Duration {
        secs(self.max_backoff_secs)
    }

    #[must_use]
    pub fn jitter_max(&self) -> Duration {
        secs(self.jitter_max_secs)
    }

    /// No spacing, no jitter, millisecond backoff. Used by tests.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            request_spacing_secs: 0.0,
            max_attempts: 4,
            base_429_backoff_secs: 0.001,
            base_5xx_backoff_secs: 0.001,
            max_backoff_secs: 0.01,
            jitter_max_secs: 0.0,
        }
    }
}

impl IngestionConfig {
    /// Builds the validated watchlist.
    ///
    /// # Errors
    /// Returns an error if the configured list is empty or has duplicates.
    pub fn watchlist(&self) -> Result<Watchlist, QuoteError> {
        Watchlist::new(self.watchlist.iter().cloned())
    }

    #[must_use]
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}

impl ProviderConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// Negative and non-finite values are rejected by `validate`; they collapse
// to zero here instead of panicking.
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or_default()
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(SecretString::from))
}

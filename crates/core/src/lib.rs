pub mod config;
pub mod config_loader;
pub mod quote;

pub use config::{
    AppConfig, ConfigError, DatabaseConfig, IngestionConfig, PacingConfig, ProviderConfig,
    RetrievalConfig, ServerConfig, DEFAULT_PARTITION, DEFAULT_WATCHLIST,
};
pub use config_loader::ConfigLoader;
pub use quote::{Quote, QuoteError, Watchlist};

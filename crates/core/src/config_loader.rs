use crate::config::AppConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Json, Toml},
    Figment,
};
use std::path::Path;

/// Prefix for environment overrides, e.g. `MOVERS_PROVIDER__API_KEY`.
pub const ENV_PREFIX: &str = "MOVERS_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads application configuration by merging TOML, environment variables, and JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed or the result is invalid.
    pub fn load() -> Result<AppConfig> {
        Self::load_from("config/Config.toml")
    }

    /// Loads application configuration from an explicit TOML file.
    ///
    /// A missing file is not an error; defaults and the environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed or the result is invalid.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        let config: AppConfig = Self::figment(path)
            .extract()
            .with_context(|| format!("failed to load configuration from {}", path.display()))?;

        config.validate().context("invalid configuration")?;
        tracing::debug!(
            "Loaded configuration: {} tickers, partition {}",
            config.ingestion.watchlist.len(),
            config.ingestion.partition
        );

        Ok(config)
    }

    fn figment(toml_path: &Path) -> Figment {
        let json_path = toml_path.with_extension("json");
        Figment::new()
            .merge(Toml::file(toml_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .join(Json::file(json_path))
    }
}

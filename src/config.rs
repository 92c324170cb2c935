//! Engine configuration
//!
//! The host passes configuration explicitly or loads it from the
//! environment (a `.env` file is honored, as elsewhere in the app).

use std::time::Duration;
use thiserror::Error;

use crate::cache::DEFAULT_CACHE_TTL;
use crate::engine::PAGE_SIZE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid value for {0}: {1}")]
    InvalidVar(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the FinTrack API, e.g. `https://api.fintrack.app/v1`
    pub api_base_url: String,
    /// Bearer token for the current user session
    pub api_token: String,
    pub page_size: usize,
    pub cache_ttl: Duration,
}

impl EngineConfig {
    pub fn new(api_base_url: String, api_token: String) -> Self {
        Self {
            api_base_url,
            api_token,
            page_size: PAGE_SIZE,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Load configuration from the environment
    ///
    /// `FINTRACK_API_URL` and `FINTRACK_API_TOKEN` are required;
    /// `FINTRACK_PAGE_SIZE` and `FINTRACK_CACHE_TTL_SECS` override the
    /// defaults (20 items, 300 seconds).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let api_base_url = std::env::var("FINTRACK_API_URL")
            .map_err(|_| ConfigError::MissingVar("FINTRACK_API_URL"))?;
        let api_token = std::env::var("FINTRACK_API_TOKEN")
            .map_err(|_| ConfigError::MissingVar("FINTRACK_API_TOKEN"))?;

        let mut config = Self::new(api_base_url, api_token);

        if let Ok(raw) = std::env::var("FINTRACK_PAGE_SIZE") {
            config.page_size = raw
                .parse()
                .map_err(|_| ConfigError::InvalidVar("FINTRACK_PAGE_SIZE", raw))?;
        }
        if let Ok(raw) = std::env::var("FINTRACK_CACHE_TTL_SECS") {
            let secs: u64 = raw
                .parse()
                .map_err(|_| ConfigError::InvalidVar("FINTRACK_CACHE_TTL_SECS", raw))?;
            config.cache_ttl = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_applies_defaults() {
        let config = EngineConfig::new(
            "https://api.fintrack.test".to_string(),
            "token".to_string(),
        );
        assert_eq!(config.page_size, 20);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
    }

    // Single test for the env path: env vars are process-global, so keeping
    // all mutations in one test avoids interference between parallel tests.
    #[test]
    fn test_from_env_reads_and_validates() {
        std::env::set_var("FINTRACK_API_URL", "https://api.fintrack.test");
        std::env::set_var("FINTRACK_API_TOKEN", "secret");
        std::env::set_var("FINTRACK_PAGE_SIZE", "50");
        std::env::set_var("FINTRACK_CACHE_TTL_SECS", "60");

        let config = EngineConfig::from_env().expect("config should load");
        assert_eq!(config.api_base_url, "https://api.fintrack.test");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));

        std::env::set_var("FINTRACK_PAGE_SIZE", "not a number");
        assert!(matches!(
            EngineConfig::from_env(),
            Err(ConfigError::InvalidVar("FINTRACK_PAGE_SIZE", _))
        ));

        std::env::remove_var("FINTRACK_PAGE_SIZE");
        std::env::remove_var("FINTRACK_CACHE_TTL_SECS");
        std::env::remove_var("FINTRACK_API_TOKEN");
        assert!(matches!(
            EngineConfig::from_env(),
            Err(ConfigError::MissingVar("FINTRACK_API_TOKEN"))
        ));
        std::env::remove_var("FINTRACK_API_URL");
    }
}

//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

/// Admin web server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// OpenMic API key. Absent means the sync route fails closed.
    pub openmic_api_key: Option<String>,
    /// OpenMic API base URL.
    pub openmic_api_url: String,
    /// Public base URL of this service, used for the webhook and function
    /// URLs pushed to the provider.
    pub public_base_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `ADMIN_ADDR` | Server bind address | `127.0.0.1:8780` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:intake.db?mode=rwc` |
    /// | `OPENMIC_API_KEY` | OpenMic API key | (unset) |
    /// | `OPENMIC_API_URL` | OpenMic API base URL | `https://api.openmic.ai/v1` |
    /// | `PUBLIC_BASE_URL` | Public base URL for webhook endpoints | `http://localhost:8780` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("ADMIN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8780".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:intake.db?mode=rwc".to_string());

        let openmic_api_key = env::var("OPENMIC_API_KEY").ok().filter(|k| !k.is_empty());

        let openmic_api_url = env::var("OPENMIC_API_URL")
            .unwrap_or_else(|_| openmic::DEFAULT_BASE_URL.to_string());

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8780".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            addr,
            database_url,
            openmic_api_key,
            openmic_api_url,
            public_base_url,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid ADMIN_ADDR format")]
    InvalidAddr,
}

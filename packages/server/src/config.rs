use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection URL. When unset the server falls back to the
    /// in-memory store (development only; state dies with the process).
    pub redis_url: Option<String>,
    pub port: u16,
    /// Key the code pool lives under. The lock key is derived from it.
    pub pool_key: String,
    /// Default number of codes per draw.
    pub num_extract: usize,
    pub lock_ttl: Duration,
    /// Downstream webhook for draw notifications. Unset disables them.
    pub webhook_url: Option<String>,
    pub webhook_timeout: Duration,
    /// Fallback CSV source used when a request carries none.
    pub csv_content: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            redis_url: env::var("REDIS_URL").ok(),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            pool_key: env::var("POOL_KEY").unwrap_or_else(|_| "lions_codes".to_string()),
            num_extract: env::var("NUM_EXTRACT")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .context("NUM_EXTRACT must be a positive number")?,
            lock_ttl: Duration::from_millis(
                env::var("LOCK_TTL_MS")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .context("LOCK_TTL_MS must be a number of milliseconds")?,
            ),
            webhook_url: env::var("WEBHOOK_URL").ok(),
            webhook_timeout: Duration::from_millis(
                env::var("WEBHOOK_TIMEOUT_MS")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .context("WEBHOOK_TIMEOUT_MS must be a number of milliseconds")?,
            ),
            csv_content: env::var("CSV_CONTENT").ok(),
        })
    }
}

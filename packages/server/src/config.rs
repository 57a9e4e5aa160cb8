use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Shared secret gating the admin signup endpoint
    pub admin_secret: String,
    pub identity_provider_url: String,
    pub identity_provider_key: String,
    /// Upper bound on identity-provider calls, in seconds
    pub identity_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            admin_secret: env::var("ADMIN_SECRET")
                .context("ADMIN_SECRET must be set")?,
            identity_provider_url: env::var("IDENTITY_PROVIDER_URL")
                .context("IDENTITY_PROVIDER_URL must be set")?,
            identity_provider_key: env::var("IDENTITY_PROVIDER_KEY")
                .context("IDENTITY_PROVIDER_KEY must be set")?,
            identity_timeout_secs: env::var("IDENTITY_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("IDENTITY_TIMEOUT_SECS must be a valid number")?,
        })
    }
}

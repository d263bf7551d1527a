//! Configuration loaded from environment variables.
//!
//! Required:
//! - `DATABASE_URL` — Postgres connection string
//!
//! Optional:
//! - `HOST` — bind address (default: `0.0.0.0`)
//! - `PORT` — listen port (default: `8083`)
//! - `NATS_URL` — event bus connection; events are skipped when unset
//! - `TOKEN_TTL_HOURS` — bearer-token lifetime (default: `24`)
//! - `DB_MAX_CONNECTIONS` — pool size (default: `10`)

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub nats_url: Option<String>,
    pub token_ttl_hours: i64,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 8083)?,
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?,
            nats_url: std::env::var("NATS_URL").ok(),
            token_ttl_hours: parse_var("TOKEN_TTL_HOURS", 24)?,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 10)?,
        })
    }

    /// Returns the `host:port` bind address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidEnvVar(name.to_string(), raw)),
        Err(_) => Ok(default),
    }
}

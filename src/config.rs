// config.rs
// Runtime configuration read from the environment (.env is loaded by main).

use std::{env, net::SocketAddr, str::FromStr};

use anyhow::{Context, Result};
use rust_decimal::Decimal;

pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 60 * 60 * 24; // 1 day
pub const DEFAULT_CREDIT_LIMIT: Decimal = Decimal::ONE_THOUSAND;

#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub bind_addr: SocketAddr,
    /// Suggested credit card ceiling used when a request does not pass its own.
    pub credit_limit: Decimal,
    pub session_ttl_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            mongodb_uri: env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongodb_db: env::var("MONGODB_DB").unwrap_or_else(|_| "finfusion".to_string()),
            bind_addr: parse_var("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            credit_limit: parse_var("CREDIT_LIMIT", DEFAULT_CREDIT_LIMIT)?,
            session_ttl_seconds: parse_var("SESSION_TTL_SECONDS", DEFAULT_SESSION_TTL_SECONDS)?,
        })
    }

    /// Configuration pointing at a given database with every other value defaulted.
    pub fn for_database(uri: &str, db_name: &str) -> Self {
        Self {
            mongodb_uri: uri.to_string(),
            mongodb_db: db_name.to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            credit_limit: DEFAULT_CREDIT_LIMIT,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        _ => Ok(default),
    }
}

// ⚙️ Configuration
// Settings come from environment variables; every one has a default suitable
// for local development.

use anyhow::{bail, Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_DATABASE_PATH: &str = "calculations.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;
const DEV_SECRET_KEY: &str = "dev-secret-key-change-me";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub bind_addr: SocketAddr,
    /// `None` when `SECRET_KEY` is unset or empty
    pub secret_key: Option<String>,
    pub token_ttl_minutes: i64,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup (the process environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup("DATABASE_PATH")
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string())
            .into();

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address such as 0.0.0.0:8000")?;

        let secret_key = lookup("SECRET_KEY").filter(|key| !key.is_empty());

        let token_ttl_minutes = match lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(raw) => raw
                .parse()
                .context("ACCESS_TOKEN_EXPIRE_MINUTES must be an integer")?,
            None => DEFAULT_TOKEN_TTL_MINUTES,
        };
        if token_ttl_minutes <= 0 {
            bail!("ACCESS_TOKEN_EXPIRE_MINUTES must be positive, got {token_ttl_minutes}");
        }

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(raw) => raw.parse().context("BCRYPT_COST must be an integer")?,
            None => bcrypt::DEFAULT_COST,
        };
        if !(4..=31).contains(&bcrypt_cost) {
            bail!("BCRYPT_COST must be between 4 and 31, got {bcrypt_cost}");
        }

        Ok(Config {
            database_path,
            bind_addr,
            secret_key,
            token_ttl_minutes,
            bcrypt_cost,
        })
    }

    /// Key used to sign access tokens, falling back to the development key
    pub fn signing_key(&self) -> &str {
        match &self.secret_key {
            Some(key) => key,
            None => {
                warn!("SECRET_KEY not set, using the development signing key");
                DEV_SECRET_KEY
            }
        }
    }
}

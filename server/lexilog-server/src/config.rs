//! Server configuration, read from the environment at startup.

use anyhow::Context;
use auth_session::TokenConfig;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_days: i64,
}

impl ServerConfig {
    /// Read configuration from the environment. `DATABASE_URL` and
    /// `LEXILOG_JWT_SECRET` are required; everything else has a default.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret =
            env::var("LEXILOG_JWT_SECRET").context("LEXILOG_JWT_SECRET must be set")?;
        let listen_addr =
            env::var("LEXILOG_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(Self {
            listen_addr,
            database_url,
            jwt_secret,
            access_token_ttl_secs: env_or("LEXILOG_ACCESS_TOKEN_TTL_SECS", 3600)?,
            refresh_token_ttl_days: env_or("LEXILOG_REFRESH_TOKEN_TTL_DAYS", 365)?,
        })
    }

    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            jwt_secret: self.jwt_secret.clone(),
            access_token_ttl_secs: self.access_token_ttl_secs,
            refresh_token_ttl_days: self.refresh_token_ttl_days,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} is not a valid value")),
        Err(_) => Ok(default),
    }
}

use std::env;
use std::str::FromStr;

use crate::auth::token::{ttl_from_secs, DEFAULT_TOKEN_TTL_SECS};
use crate::error::AppError;

/// Process-wide settings, read once at startup.
#[derive(Clone)]
pub struct Config {
    /// Postgres connection string. The in-memory store is used when unset.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    /// Symmetric secret shared by the token issuer and verifier.
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub bcrypt_cost: u32,
    /// Refuse logins for deactivated accounts.
    pub enforce_activation: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("server_port", &self.server_port)
            .field("server_host", &self.server_host)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("enforce_activation", &self.enforce_activation)
            .finish()
    }
}

fn parse_var<T: FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T, AppError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value '{}'", name, value))),
        None => Ok(default),
    }
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| AppError::Config("JWT_SECRET must be set and non-empty".into()))?;

        let token_ttl_secs = parse_var(
            "TOKEN_TTL_SECS",
            lookup("TOKEN_TTL_SECS"),
            DEFAULT_TOKEN_TTL_SECS,
        )?;
        ttl_from_secs(token_ttl_secs)?;

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            server_port: parse_var("SERVER_PORT", lookup("SERVER_PORT"), 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret,
            token_ttl_secs,
            bcrypt_cost: parse_var("BCRYPT_COST", lookup("BCRYPT_COST"), bcrypt::DEFAULT_COST)?,
            enforce_activation: parse_var(
                "ENFORCE_ACTIVATION",
                lookup("ENFORCE_ACTIVATION"),
                true,
            )?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

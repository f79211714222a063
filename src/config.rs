use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use dotenv::dotenv;
use log::warn;

use crate::error::ConfigError;

#[derive(Clone)]
pub struct Config {
    pub mongo_uri: String,
    /// Token signing secret. Nothing served today is authenticated.
    pub jwt_secret: Option<String>,
    pub database: String,
    pub port: u16,
    pub store_timeout: Duration,
}

impl Config {
    /// Reads the process environment after merging in a local `.env` file,
    /// if there is one.
    pub fn load_env_config() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| var(key).filter(|value| !value.is_empty());

        let mongo_uri = var("MONGO_URI").ok_or(ConfigError::Missing("MONGO_URI"))?;
        let jwt_secret = var("JWT_SECRET");
        if jwt_secret.is_none() {
            warn!("JWT_SECRET not set");
        }

        Ok(Config {
            mongo_uri,
            jwt_secret,
            database: var("MONGO_DATABASE").unwrap_or_else(|| "test".to_string()),
            port: parse_or(&var, "PORT", 3001)?,
            store_timeout: Duration::from_secs(parse_or(&var, "STORE_TIMEOUT_SECS", 10)?),
        })
    }
}

fn parse_or<T>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match var(key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("mongo_uri", &"<redacted>")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("port", &self.port)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

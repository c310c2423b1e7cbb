use std::env;
use std::fmt;

use chrono::Duration;
use dotenv::dotenv;
use thiserror::Error;

const DEFAULT_ACCESS_TTL_MINUTES: i64 = 15;
const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{var} is not a valid number: {value}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Secrets and lifetimes for both token classes.
///
/// Built once at startup and handed to [`crate::TokenManager`]. The two secrets
/// should differ per deployment so one token class can never stand in for the other.
#[derive(Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    pub fn new(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Reads `ACCESS_TOKEN_SECRET`, `REFRESH_TOKEN_SECRET`, `ACCESS_TOKEN_TTL_MINUTES`
    /// and `REFRESH_TOKEN_TTL_DAYS`, loading a `.env` file first if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let access_secret = required_var("ACCESS_TOKEN_SECRET")?;
        let refresh_secret = required_var("REFRESH_TOKEN_SECRET")?;
        let access_ttl = duration_var(
            "ACCESS_TOKEN_TTL_MINUTES",
            DEFAULT_ACCESS_TTL_MINUTES,
            Duration::try_minutes,
        )?;
        let refresh_ttl = duration_var(
            "REFRESH_TOKEN_TTL_DAYS",
            DEFAULT_REFRESH_TTL_DAYS,
            Duration::try_days,
        )?;

        Ok(Self::new(access_secret, refresh_secret, access_ttl, refresh_ttl))
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// Hex-encoded AES-256 key for [`crate::Encryptor`].
#[derive(Clone)]
pub struct CipherConfig {
    pub hex_key: String,
}

impl CipherConfig {
    pub fn new(hex_key: impl Into<String>) -> Self {
        Self {
            hex_key: hex_key.into(),
        }
    }

    /// Reads `ENCRYPTION_KEY`. The key itself is validated by the encryptor.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Ok(Self::new(required_var("ENCRYPTION_KEY")?))
    }
}

impl fmt::Debug for CipherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherConfig")
            .field("hex_key", &"<redacted>")
            .finish()
    }
}

fn required_var(var: &'static str) -> Result<String, ConfigError> {
    let value = env::var(var).map_err(|_| ConfigError::Missing(var))?;
    if value.trim().is_empty() {
        return Err(ConfigError::Empty(var));
    }
    Ok(value)
}

/// Reads a whole number of `unit`s; values that don't fit a `Duration` are rejected too.
fn duration_var(
    var: &'static str,
    default: i64,
    unit: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigError> {
    let value = match env::var(var) {
        Ok(value) => value,
        Err(_) => {
            return unit(default).ok_or(ConfigError::InvalidNumber {
                var,
                value: default.to_string(),
            });
        }
    };

    let ttl = value.trim().parse().ok().and_then(unit);
    ttl.ok_or(ConfigError::InvalidNumber { var, value })
}

use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Shortest accepted `JWT_SECRET`, in bytes (256 bits for HS256).
pub const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process-wide settings, read once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_timeout: Duration,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub token_lifetime: chrono::Duration,
    pub bcrypt_cost: u32,
    pub cors_allowed_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));
        let or_default =
            |name: &'static str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::Invalid {
                name: "JWT_SECRET",
                reason: format!("must be at least {} bytes", MIN_SECRET_BYTES),
            });
        }

        let token_minutes: i64 = parse(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            &or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "30"),
        )?;
        if token_minutes <= 0 {
            return Err(ConfigError::Invalid {
                name: "ACCESS_TOKEN_EXPIRE_MINUTES",
                reason: "must be positive".into(),
            });
        }

        let bcrypt_cost: u32 = parse("BCRYPT_COST", &or_default("BCRYPT_COST", "12"))?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                reason: "must be between 4 and 31".into(),
            });
        }

        // Postgres reads statement_timeout=0 as "no limit".
        let timeout_secs: u64 = parse(
            "DATABASE_TIMEOUT_SECS",
            &or_default("DATABASE_TIMEOUT_SECS", "5"),
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "DATABASE_TIMEOUT_SECS",
                reason: "must be positive".into(),
            });
        }

        let database_max_connections: u32 = parse(
            "DATABASE_MAX_CONNECTIONS",
            &or_default("DATABASE_MAX_CONNECTIONS", "10"),
        )?;
        if database_max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: "DATABASE_MAX_CONNECTIONS",
                reason: "must be positive".into(),
            });
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections,
            database_timeout: Duration::from_secs(timeout_secs),
            server_port: parse("SERVER_PORT", &or_default("SERVER_PORT", "8080"))?,
            server_host: or_default("SERVER_HOST", "127.0.0.1"),
            jwt_secret,
            token_lifetime: chrono::Duration::minutes(token_minutes),
            bcrypt_cost,
            cors_allowed_origin: or_default("CORS_ALLOWED_ORIGIN", "http://localhost:3000"),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_max_connections", &self.database_max_connections)
            .field("database_timeout", &self.database_timeout)
            .field("server_port", &self.server_port)
            .field("server_host", &self.server_host)
            .field("token_lifetime", &self.token_lifetime)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("cors_allowed_origin", &self.cors_allowed_origin)
            .finish_non_exhaustive()
    }
}

fn parse<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

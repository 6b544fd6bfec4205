//! Service configuration from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("DAILY_RESET_HOUR must be between 0 and 23, got {0}")]
    ResetHourOutOfRange(u32),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    /// Local hour at which a new study day begins.
    pub daily_reset_hour: u32,
    pub stats_cache_ttl: Duration,
    pub max_write_retries: u32,
    pub slow_call_threshold: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            database_path: PathBuf::from("data/wordeasy.db"),
            daily_reset_hour: 0,
            stats_cache_ttl: Duration::from_secs(30),
            max_write_retries: wordeasy_core::DEFAULT_MAX_RETRIES,
            slow_call_threshold: Duration::from_millis(1000),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Missing variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let daily_reset_hour = parse_or(&lookup, "DAILY_RESET_HOUR", defaults.daily_reset_hour)?;
        if daily_reset_hour > 23 {
            return Err(ConfigError::ResetHourOutOfRange(daily_reset_hour));
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            database_path: lookup("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            daily_reset_hour,
            stats_cache_ttl: Duration::from_secs(parse_or(
                &lookup,
                "STATS_CACHE_TTL_SECS",
                defaults.stats_cache_ttl.as_secs(),
            )?),
            max_write_retries: parse_or(&lookup, "MAX_WRITE_RETRIES", defaults.max_write_retries)?,
            slow_call_threshold: Duration::from_millis(parse_or(
                &lookup,
                "SLOW_CALL_MS",
                defaults.slow_call_threshold.as_millis() as u64,
            )?),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

use std::{env, fmt::Display, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/hotel";
pub const DEFAULT_AUTH_URL: &str = "http://localhost:8080/api/auth";

// Booking timestamps are sent three hours ahead of what the guest typed
pub const DEFAULT_TIMESTAMP_OFFSET_HOURS: i64 = 3;
pub const MAX_TIMESTAMP_OFFSET_HOURS: i64 = 24;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub auth_url: String,
    pub timeout_ms: Option<u64>,
    pub timestamp_offset_hours: i64,
    pub availability_ttl_seconds: u64,
    pub use_system_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            timeout_ms: None,
            timestamp_offset_hours: DEFAULT_TIMESTAMP_OFFSET_HOURS,
            availability_ttl_seconds: 30,
            use_system_proxy: true,
        }
    }
}

impl ClientConfig {
    /// Reads overrides from the environment, falling back to the defaults for
    /// anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            base_url: var("HOTEL_API_BASE_URL").unwrap_or(defaults.base_url),
            auth_url: var("HOTEL_AUTH_BASE_URL").unwrap_or(defaults.auth_url),
            timeout_ms: try_load_optional("HOTEL_API_TIMEOUT_MS")?,
            timestamp_offset_hours: load_offset_hours(defaults.timestamp_offset_hours)?,
            availability_ttl_seconds: try_load(
                "HOTEL_AVAILABILITY_TTL_SECONDS",
                defaults.availability_ttl_seconds,
            )?,
            use_system_proxy: try_load("HOTEL_USE_SYSTEM_PROXY", defaults.use_system_proxy)?,
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn availability_ttl(&self) -> Duration {
        Duration::from_secs(self.availability_ttl_seconds)
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    raw.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::InvalidValue {
            key: key.to_string(),
            reason: e.to_string(),
        }
    })
}

fn try_load<T: FromStr + Display>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    match var(key) {
        Some(raw) => parse(key, &raw),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

fn load_offset_hours(default: i64) -> Result<i64, ConfigError> {
    let key = "HOTEL_TIMESTAMP_OFFSET_HOURS";
    let hours: i64 = try_load(key, default)?;
    if !(-MAX_TIMESTAMP_OFFSET_HOURS..=MAX_TIMESTAMP_OFFSET_HOURS).contains(&hours) {
        warn!("Invalid {key} value: {hours} is outside ±{MAX_TIMESTAMP_OFFSET_HOURS}");
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("must be within ±{MAX_TIMESTAMP_OFFSET_HOURS} hours"),
        });
    }
    Ok(hours)
}

fn try_load_optional<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: Display,
{
    var(key).map(|raw| parse(key, &raw)).transpose()
}

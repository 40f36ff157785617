//! Environment configuration.
//!
//! Every option has a development-friendly default; numeric values that fail
//! to parse are a fatal startup error rather than a silent fallback.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Raised for unparseable environment values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {name}: {value}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
}

/// Process configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_port: u16,
    pub database_url: String,
    pub redis_url: String,
    pub webhook_url: String,
    pub api_key: String,
    pub log_level: String,
    pub stats_window_minutes: i64,
    pub max_retries: i32,
    pub retry_delay: Duration,
    pub cache_ttl: Duration,
}

impl AppConfig {
    /// Resolve configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            http_port: env_parse("HTTP_PORT", 8080)?,
            database_url: database_url_from_env(),
            redis_url: env_or("REDIS_URL", "redis://localhost:6379/0"),
            webhook_url: env_or("WEBHOOK_URL", ""),
            api_key: env_or("SECRET_API_KEY", ""),
            log_level: env_or("LOG_LEVEL", "info"),
            stats_window_minutes: env_parse("STATS_TIME_WINDOWS_MINUTES", 30)?,
            max_retries: env_parse("WEBHOOK_MAX_RETRIES", 3)?,
            retry_delay: Duration::from_secs(env_parse("WEBHOOK_RETRY_DELAY_SECONDS", 60)?),
            cache_ttl: Duration::from_secs(env_parse::<u64>("CACHE_TTL_MINUTES", 10)? * 60),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_owned(),
    }
}

fn env_parse<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => value.parse().map_err(|_| ConfigError {
            name: key,
            value,
        }),
        _ => Ok(default),
    }
}

/// `PG_DB_URL` wins outright; otherwise the URL is assembled from parts.
fn database_url_from_env() -> String {
    if let Ok(url) = env::var("PG_DB_URL") {
        if !url.is_empty() {
            return url;
        }
    }

    compose_database_url(
        &env_or("PG_DB_HOST", "localhost"),
        &env_or("PG_DB_PORT", "5434"),
        &env_or("PG_DB_USER", "postgres"),
        &env_or("PG_DB_PASSWORD", "password"),
        &env_or("PG_DB_NAME", "geonotify_db"),
    )
}

fn compose_database_url(
    host: &str,
    port: &str,
    user: &str,
    password: &str,
    dbname: &str,
) -> String {
    format!("postgres://{user}:{password}@{host}:{port}/{dbname}?sslmode=disable")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_url_assembles_all_parts() {
        let url = compose_database_url("db.internal", "5432", "svc", "pw", "geo");
        assert_eq!(url, "postgres://svc:pw@db.internal:5432/geo?sslmode=disable");
    }
}

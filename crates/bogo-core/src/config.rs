use thiserror::Error;

use crate::app_config::{AppConfig, Environment};

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://www.ubereats.com/";

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it from a
/// `HashMap` without `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("BOGO_ENV", "development"))?;

    let bind_addr = or_default("BOGO_BIND_ADDR", "0.0.0.0:8000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("BOGO_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("BOGO_LOG_LEVEL", "info");

    let upstream_base_url = or_default("BOGO_UPSTREAM_BASE_URL", DEFAULT_UPSTREAM_BASE_URL);
    if !(upstream_base_url.starts_with("http://") || upstream_base_url.starts_with("https://")) {
        return Err(invalid(
            "BOGO_UPSTREAM_BASE_URL",
            format!("\"{upstream_base_url}\" is not an http(s) URL"),
        ));
    }

    let request_timeout_secs = parse_u64("BOGO_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("BOGO_USER_AGENT", DEFAULT_USER_AGENT);
    let max_concurrent_fetches = parse_positive_usize("BOGO_MAX_CONCURRENT_FETCHES", "10")?;
    let run_timeout_secs = parse_u64("BOGO_RUN_TIMEOUT_SECS", "120")?;
    let max_listing_pages = parse_positive_usize("BOGO_MAX_LISTING_PAGES", "200")?;
    let max_retries = parse_u32("BOGO_MAX_RETRIES", "2")?;
    let retry_backoff_base_secs = parse_u64("BOGO_RETRY_BACKOFF_BASE_SECS", "1")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        upstream_base_url,
        request_timeout_secs,
        user_agent,
        max_concurrent_fetches,
        run_timeout_secs,
        max_listing_pages,
        max_retries,
        retry_backoff_base_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BOGO_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

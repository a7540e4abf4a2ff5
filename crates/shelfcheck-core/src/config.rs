use crate::app_config::{AppConfig, Environment, DEFAULT_USER_AGENT};
use crate::ConfigError;

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
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("SHELFCHECK_ENV", "development"))?;
    let log_level = or_default("SHELFCHECK_LOG_LEVEL", "info");
    let retailers_path = PathBuf::from(or_default(
        "SHELFCHECK_RETAILERS_PATH",
        "./config/retailers.yaml",
    ));
    let database_url = lookup("DATABASE_URL").ok().filter(|v| !v.is_empty());

    let db_max_connections = parse_u32("SHELFCHECK_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("SHELFCHECK_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("SHELFCHECK_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let request_timeout_secs = parse_u64("SHELFCHECK_REQUEST_TIMEOUT_SECS", "20")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHELFCHECK_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let user_agent = or_default("SHELFCHECK_USER_AGENT", DEFAULT_USER_AGENT);
    let inter_request_delay_ms = parse_u64("SHELFCHECK_INTER_REQUEST_DELAY_MS", "500")?;

    let scraper_service_url = or_default("SHELFCHECK_SCRAPER_SERVICE_URL", "http://localhost:8080");
    let scraper_service_command = or_default("SHELFCHECK_SCRAPER_SERVICE_COMMAND", "npm run dev");
    let scraper_service_warmup_secs = parse_u64("SHELFCHECK_SCRAPER_SERVICE_WARMUP_SECS", "10")?;

    Ok(AppConfig {
        env,
        log_level,
        retailers_path,
        database_url,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        request_timeout_secs,
        user_agent,
        inter_request_delay_ms,
        scraper_service_url,
        scraper_service_command,
        scraper_service_warmup_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHELFCHECK_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

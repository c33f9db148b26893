use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("POSTPULSE_ENV", "development"))?;
    let log_level = or_default("POSTPULSE_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("POSTPULSE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("POSTPULSE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("POSTPULSE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scorer_url = optional("POSTPULSE_SCORER_URL").map(|u| u.trim_end_matches('/').to_string());
    let scorer_timeout_secs = parse_u64("POSTPULSE_SCORER_TIMEOUT_SECS", "30")?;
    let scorer_batch_size = parse_usize("POSTPULSE_SCORER_BATCH_SIZE", "64")?;
    if scorer_batch_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "POSTPULSE_SCORER_BATCH_SIZE".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let max_post_count = parse_u32("POSTPULSE_MAX_POST_COUNT", "200")?;
    let default_post_count = parse_u32("POSTPULSE_DEFAULT_POST_COUNT", "50")?;
    if default_post_count == 0 || default_post_count > max_post_count {
        return Err(ConfigError::InvalidEnvVar {
            var: "POSTPULSE_DEFAULT_POST_COUNT".to_string(),
            reason: format!("must be between 1 and {max_post_count}"),
        });
    }
    let replies_per_post = parse_u32("POSTPULSE_REPLIES_PER_POST", "30")?;
    let reply_fetch_delay_ms = parse_u64("POSTPULSE_REPLY_FETCH_DELAY_MS", "500")?;

    let twitter_auth_token = optional("TWITTER_AUTH_TOKEN");
    let twitter_ct0 = optional("TWITTER_CT0");

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scorer_url,
        scorer_timeout_secs,
        scorer_batch_size,
        default_post_count,
        max_post_count,
        replies_per_post,
        reply_fetch_delay_ms,
        twitter_auth_token,
        twitter_ct0,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "POSTPULSE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

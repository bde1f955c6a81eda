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
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        let value = raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("must be a positive finite number, got {raw}"),
            })
        }
    };

    let base_url = require("WASHMAP_BASE_URL")?;
    let env = parse_environment(&or_default("WASHMAP_ENV", "development"))?;
    let log_level = or_default("WASHMAP_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("WASHMAP_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("WASHMAP_USER_AGENT", "washmap/0.1 (carwash-locator)");

    let default_radius_km = parse_f64("WASHMAP_DEFAULT_RADIUS_KM", "10")?;
    let default_min_distance_km = parse_f64("WASHMAP_MIN_DISTANCE_KM", "5")?;
    let default_max_settlement_distance_km =
        parse_f64("WASHMAP_MAX_SETTLEMENT_DISTANCE_KM", "10")?;
    let default_competition_radius_km = parse_f64("WASHMAP_COMPETITION_RADIUS_KM", "3")?;

    let token_path = PathBuf::from(or_default("WASHMAP_TOKEN_PATH", "./.washmap-token"));

    Ok(AppConfig {
        base_url,
        env,
        log_level,
        request_timeout_secs,
        user_agent,
        default_radius_km,
        default_min_distance_km,
        default_max_settlement_distance_km,
        default_competition_radius_km,
        token_path,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`, so typos fail loudly instead of
/// quietly running in development mode.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "WASHMAP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use crate::app_config::{AppConfig, Environment};
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
/// Decoupled from the real environment so tests can feed a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_num = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("PRYLOM_ENV", "development"))?;

    let bind_addr = or_default("PRYLOM_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "PRYLOM_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;
    let log_level = or_default("PRYLOM_LOG_LEVEL", "info");
    let listings_path = PathBuf::from(or_default("PRYLOM_LISTINGS_PATH", "./config/listings.yaml"));

    let geocoder_base_url = or_default(
        "PRYLOM_GEOCODER_BASE_URL",
        "https://nominatim.openstreetmap.org",
    );
    let geocoder_user_agent = or_default("PRYLOM_GEOCODER_USER_AGENT", "prylom/0.1 (land-survey)");
    let geocoder_timeout_secs = parse_num("PRYLOM_GEOCODER_TIMEOUT_SECS", "15")?;
    let geocoder_min_interval_ms = parse_num("PRYLOM_GEOCODER_MIN_INTERVAL_MS", "1000")?;
    let geocoder_country_label = or_default("PRYLOM_GEOCODER_COUNTRY_LABEL", "Brasil");
    let geocoder_country_codes = or_default("PRYLOM_GEOCODER_COUNTRY_CODES", "br");

    let analysis_api_key = lookup("PRYLOM_ANALYSIS_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let analysis_base_url = or_default(
        "PRYLOM_ANALYSIS_BASE_URL",
        "https://generativelanguage.googleapis.com",
    );
    let analysis_model = or_default("PRYLOM_ANALYSIS_MODEL", "gemini-3-flash-preview");
    let analysis_timeout_secs = parse_num("PRYLOM_ANALYSIS_TIMEOUT_SECS", "60")?;

    let rate_limit_per_minute = usize::try_from(parse_num("PRYLOM_RATE_LIMIT_PER_MINUTE", "120")?)
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "PRYLOM_RATE_LIMIT_PER_MINUTE".to_string(),
            reason: e.to_string(),
        })?;

    let capture_idle_ttl_secs = parse_num("PRYLOM_CAPTURE_IDLE_TTL_SECS", "1800")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        listings_path,
        geocoder_base_url,
        geocoder_user_agent,
        geocoder_timeout_secs,
        geocoder_min_interval_ms,
        geocoder_country_label,
        geocoder_country_codes,
        analysis_api_key,
        analysis_base_url,
        analysis_model,
        analysis_timeout_secs,
        rate_limit_per_minute,
        capture_idle_ttl_secs,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRYLOM_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

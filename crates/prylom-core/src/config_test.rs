use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "PRYLOM_ENV"));
}

#[test]
fn build_app_config_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.listings_path.to_str(), Some("./config/listings.yaml"));
    assert_eq!(cfg.geocoder_base_url, "https://nominatim.openstreetmap.org");
    assert_eq!(cfg.geocoder_timeout_secs, 15);
    assert_eq!(cfg.geocoder_min_interval_ms, 1000);
    assert_eq!(cfg.geocoder_country_label, "Brasil");
    assert_eq!(cfg.geocoder_country_codes, "br");
    assert!(cfg.analysis_api_key.is_none());
    assert_eq!(cfg.analysis_model, "gemini-3-flash-preview");
    assert_eq!(cfg.analysis_timeout_secs, 60);
    assert_eq!(cfg.rate_limit_per_minute, 120);
    assert_eq!(cfg.capture_idle_ttl_secs, 1800);
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("PRYLOM_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRYLOM_BIND_ADDR"),
        "expected InvalidEnvVar(PRYLOM_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn geocoder_min_interval_override() {
    let mut map = HashMap::new();
    map.insert("PRYLOM_GEOCODER_MIN_INTERVAL_MS", "1500");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.geocoder_min_interval_ms, 1500);
}

#[test]
fn geocoder_min_interval_invalid() {
    let mut map = HashMap::new();
    map.insert("PRYLOM_GEOCODER_MIN_INTERVAL_MS", "fast");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRYLOM_GEOCODER_MIN_INTERVAL_MS"),
        "expected InvalidEnvVar(PRYLOM_GEOCODER_MIN_INTERVAL_MS), got: {result:?}"
    );
}

#[test]
fn analysis_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("PRYLOM_ANALYSIS_TIMEOUT_SECS", "-5");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRYLOM_ANALYSIS_TIMEOUT_SECS")
    );
}

#[test]
fn blank_analysis_key_counts_as_unset() {
    let mut map = HashMap::new();
    map.insert("PRYLOM_ANALYSIS_API_KEY", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.analysis_api_key.is_none());
}

#[test]
fn debug_redacts_analysis_key() {
    let mut map = HashMap::new();
    map.insert("PRYLOM_ANALYSIS_API_KEY", "super-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.analysis_api_key.as_deref(), Some("super-secret"));
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn capture_idle_ttl_override_and_invalid() {
    let mut map = HashMap::new();
    map.insert("PRYLOM_CAPTURE_IDLE_TTL_SECS", "90");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.capture_idle_ttl_secs, 90);

    map.insert("PRYLOM_CAPTURE_IDLE_TTL_SECS", "half an hour");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRYLOM_CAPTURE_IDLE_TTL_SECS"),
        "expected InvalidEnvVar(PRYLOM_CAPTURE_IDLE_TTL_SECS), got: {result:?}"
    );
}

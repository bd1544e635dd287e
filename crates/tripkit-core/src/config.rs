use crate::app_config::AppConfig;
use crate::ConfigError;

/// Loads the app configuration, reading a `.env` file first when one exists.
///
/// # Errors
///
/// Returns `ConfigError` when a required variable is absent or a value fails
/// to parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Loads the app configuration from the process environment as-is.
///
/// Unlike [`load_app_config`], this does NOT touch `.env` files; callers that
/// manage their own environment use this directly.
///
/// # Errors
///
/// Returns `ConfigError` when a required variable is absent or a value fails
/// to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Assembles an [`AppConfig`] from whatever lookup function is supplied.
///
/// This is the core parsing/validation logic, decoupled from the process
/// environment so tests can drive it with a plain `HashMap` lookup instead of
/// `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
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

    let api_base_url = require("TRIPKIT_API_BASE_URL")?;
    let maps_api_key = require("TRIPKIT_MAPS_API_KEY")?;

    let maps_api_base = or_default("TRIPKIT_MAPS_API_BASE", "https://maps.googleapis.com");
    let log_level = or_default("TRIPKIT_LOG_LEVEL", "info");
    let auth_token = lookup("TRIPKIT_AUTH_TOKEN").ok();

    let request_timeout_secs = parse_u64("TRIPKIT_REQUEST_TIMEOUT_SECS", "30")?;
    let debounce_ms = parse_u64("TRIPKIT_DEBOUNCE_MS", "500")?;

    Ok(AppConfig {
        api_base_url,
        maps_api_base,
        maps_api_key,
        request_timeout_secs,
        debounce_ms,
        log_level,
        auth_token,
    })
}

#[cfg(test)]
mod tests {
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

    /// Map with just the required vars set, ready for per-test overrides.
    fn full_env<'a>() -> HashMap<&'a str, &'a str> {
        let mut m = HashMap::new();
        m.insert("TRIPKIT_API_BASE_URL", "http://localhost:8080");
        m.insert("TRIPKIT_MAPS_API_KEY", "test-maps-key");
        m
    }

    #[test]
    fn build_app_config_fails_without_api_base_url() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "TRIPKIT_API_BASE_URL"),
            "expected MissingEnvVar(TRIPKIT_API_BASE_URL), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_without_maps_api_key() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("TRIPKIT_API_BASE_URL", "http://localhost:8080");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "TRIPKIT_MAPS_API_KEY"),
            "expected MissingEnvVar(TRIPKIT_MAPS_API_KEY), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_succeeds_with_all_required_vars() {
        let map = full_env();
        let result = build_app_config(lookup_from_map(&map));
        assert!(result.is_ok(), "expected Ok, got: {result:?}");
        let cfg = result.unwrap();
        assert_eq!(cfg.api_base_url, "http://localhost:8080");
        assert_eq!(cfg.maps_api_base, "https://maps.googleapis.com");
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.debounce_ms, 500);
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.auth_token.is_none());
    }

    #[test]
    fn build_app_config_request_timeout_secs_override() {
        let mut map = full_env();
        map.insert("TRIPKIT_REQUEST_TIMEOUT_SECS", "60");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.request_timeout_secs, 60);
    }

    #[test]
    fn build_app_config_request_timeout_secs_invalid() {
        let mut map = full_env();
        map.insert("TRIPKIT_REQUEST_TIMEOUT_SECS", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TRIPKIT_REQUEST_TIMEOUT_SECS"),
            "expected InvalidEnvVar(TRIPKIT_REQUEST_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_debounce_ms_override() {
        let mut map = full_env();
        map.insert("TRIPKIT_DEBOUNCE_MS", "250");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.debounce_ms, 250);
    }

    #[test]
    fn build_app_config_debounce_ms_invalid() {
        let mut map = full_env();
        map.insert("TRIPKIT_DEBOUNCE_MS", "half-a-second");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TRIPKIT_DEBOUNCE_MS"),
            "expected InvalidEnvVar(TRIPKIT_DEBOUNCE_MS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_maps_api_base_override() {
        let mut map = full_env();
        map.insert("TRIPKIT_MAPS_API_BASE", "http://localhost:9090");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.maps_api_base, "http://localhost:9090");
    }

    #[test]
    fn build_app_config_reads_optional_auth_token() {
        let mut map = full_env();
        map.insert("TRIPKIT_AUTH_TOKEN", "stored-token");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.auth_token.as_deref(), Some("stored-token"));
    }

    #[test]
    fn app_config_debug_redacts_secrets() {
        let mut map = full_env();
        map.insert("TRIPKIT_AUTH_TOKEN", "stored-token");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let printed = format!("{cfg:?}");
        assert!(!printed.contains("test-maps-key"));
        assert!(!printed.contains("stored-token"));
        assert!(printed.contains("[redacted]"));
    }
}

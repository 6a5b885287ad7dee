use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build configuration using the provided env-var lookup function.
///
/// Every variable is optional; an unset variable takes the value from
/// [`AppConfig::default`].
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let defaults = AppConfig::default();

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let api_base_url = or_default("PRODSYNC_API_BASE_URL", &defaults.api_base_url);
    validate_base_url(&api_base_url).map_err(|r| invalid("PRODSYNC_API_BASE_URL", r))?;

    let assets_dir = lookup("PRODSYNC_ASSETS_DIR").map_or(defaults.assets_dir, PathBuf::from);

    let request_timeout_secs = match lookup("PRODSYNC_REQUEST_TIMEOUT_SECS") {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| invalid("PRODSYNC_REQUEST_TIMEOUT_SECS", e.to_string()))?,
        Err(_) => defaults.request_timeout_secs,
    };
    if request_timeout_secs == 0 {
        return Err(invalid(
            "PRODSYNC_REQUEST_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    let user_agent = or_default("PRODSYNC_USER_AGENT", &defaults.user_agent);
    let log_level = or_default("PRODSYNC_LOG_LEVEL", &defaults.log_level);

    Ok(AppConfig {
        api_base_url,
        assets_dir,
        request_timeout_secs,
        user_agent,
        log_level,
    })
}

/// Cheap shape check; the HTTP client does the full URL parse.
fn validate_base_url(raw: &str) -> Result<(), String> {
    let rest = raw
        .strip_prefix("http://")
        .or_else(|| raw.strip_prefix("https://"))
        .ok_or_else(|| format!("\"{raw}\" must start with http:// or https://"))?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_and_port = authority.rsplit('@').next().unwrap_or_default();
    if host_and_port.is_empty() || host_and_port.starts_with(':') {
        return Err(format!("\"{raw}\" has no host"));
    }
    Ok(())
}

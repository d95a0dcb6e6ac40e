use std::env;
use std::str::FromStr;

use super::types::{ConfigError, Environment};

const DEFAULT_CORS_ORIGINS: &[&str] =
    &["http://localhost:5173", "http://localhost:3000", "http://127.0.0.1:5173"];

/// Trimmed value of `key`; blank counts as unset.
pub(super) fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

pub(super) fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

pub(super) fn parse_number<T: FromStr>(field: &'static str, value: String) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::InvalidValue { field, value })
}

pub(super) fn parse_positive_u64(field: &'static str, value: String) -> Result<u64, ConfigError> {
    match parse_number::<u64>(field, value.clone())? {
        0 => Err(ConfigError::InvalidValue { field, value }),
        parsed => Ok(parsed),
    }
}

/// Accepts a JSON array or a comma-separated list. Anything that yields no
/// origins falls back to the local development defaults.
pub(super) fn parse_cors_origins(value: Option<String>) -> Result<Vec<String>, ConfigError> {
    let raw = value.unwrap_or_default();
    let trimmed = raw.trim();

    let origins: Vec<String> = if trimmed.starts_with('[') {
        serde_json::from_str::<Vec<String>>(trimmed)
            .map_err(|_| ConfigError::InvalidCors(raw.clone()))?
            .into_iter()
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect()
    } else {
        trimmed
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    };

    if origins.is_empty() {
        Ok(DEFAULT_CORS_ORIGINS.iter().map(|origin| origin.to_string()).collect())
    } else {
        Ok(origins)
    }
}

pub(super) fn parse_bool(value: &str) -> bool {
    ["1", "true", "yes", "on"].iter().any(|truthy| value.eq_ignore_ascii_case(truthy))
}

pub(super) fn parse_environment(value: Option<String>) -> Environment {
    let Some(value) = value else {
        return Environment::Development;
    };

    match value.to_ascii_lowercase().as_str() {
        "production" | "prod" => Environment::Production,
        "staging" => Environment::Staging,
        "test" | "testing" => Environment::Test,
        _ => Environment::Development,
    }
}

use std::env;
use std::fmt;

use crate::engine::DiscoveryConfig;

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub discovery: DiscoveryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = DiscoveryConfig::default();
        let min_match_score = read_env_or("DISCOVERY_MIN_MATCH_SCORE", defaults.min_match_score)?;
        let max_results = read_env_or("DISCOVERY_MAX_RESULTS", defaults.max_results)?;
        let max_concurrent_fetches = read_env_or(
            "DISCOVERY_MAX_CONCURRENT_FETCHES",
            defaults.max_concurrent_fetches,
        )?;

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            discovery: DiscoveryConfig {
                min_match_score,
                max_results,
                max_concurrent_fetches,
            },
        })
    }
}

fn read_env_or<T: std::str::FromStr>(key: &'static str, fallback: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        Err(_) => Ok(fallback),
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a valid number, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("DISCOVERY_MIN_MATCH_SCORE");
        env::remove_var("DISCOVERY_MAX_RESULTS");
        env::remove_var("DISCOVERY_MAX_CONCURRENT_FETCHES");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.discovery, DiscoveryConfig::default());
    }

    #[test]
    fn reads_discovery_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("DISCOVERY_MIN_MATCH_SCORE", "55.5");
        env::set_var("DISCOVERY_MAX_RESULTS", "25");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.discovery.min_match_score, 55.5);
        assert_eq!(config.discovery.max_results, 25);
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("DISCOVERY_MAX_RESULTS", "lots");
        let err = AppConfig::load().expect_err("invalid number");
        assert!(err.to_string().contains("DISCOVERY_MAX_RESULTS"));
        reset_env();
    }
}

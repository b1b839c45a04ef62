use std::env;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),
    #[error("{key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` only in mock mode.
    pub database_url: Option<String>,
    pub use_mocks: bool,
    pub legacy_api_base_url: String,
    pub legacy_api_timeout: Duration,
    /// Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw,
            })?,
            None => 8080,
        };

        let use_mocks = lookup("USE_MOCKS").map(|v| parse_flag(&v)).unwrap_or(false);

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if database_url.is_none() && !use_mocks {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let legacy_api_base_url = lookup("LEGACY_API_BASE_URL")
            .unwrap_or_else(|| "http://localhost:8000".to_string());

        let timeout_secs = match lookup("LEGACY_API_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: "LEGACY_API_TIMEOUT_SECS",
                value: raw,
            })?,
            None => 5,
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            database_url,
            use_mocks,
            legacy_api_base_url,
            legacy_api_timeout: Duration::from_secs(timeout_secs),
            cors_allowed_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_in_mock_mode() {
        let config = AppConfig::from_lookup(lookup(&[("USE_MOCKS", "true")])).unwrap();
        assert!(config.use_mocks);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.database_url, None);
        assert_eq!(config.legacy_api_timeout, Duration::from_secs(5));
        assert!(config.cors_allowed_origins.is_empty());
    }

    #[test]
    fn database_url_required_without_mocks() {
        assert_eq!(
            AppConfig::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("DATABASE_URL"))
        );
    }

    #[test]
    fn parses_explicit_values() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
            ("DATABASE_URL", "postgres://localhost/portal"),
            ("USE_MOCKS", "0"),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:5173, http://127.0.0.1:5173"),
        ]))
        .unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert!(!config.use_mocks);
        assert_eq!(config.cors_allowed_origins.len(), 2);
    }

    #[test]
    fn invalid_port_is_reported() {
        let err = AppConfig::from_lookup(lookup(&[("USE_MOCKS", "1"), ("PORT", "http")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "PORT",
                value: "http".into()
            }
        );
    }
}

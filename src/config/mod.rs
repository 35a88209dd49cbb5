//! Configuration loading and management
//!
//! Values come from built-in defaults, then an optional YAML file, then the
//! process environment (with `.env` loaded first when present). The database
//! connection string has no default.

use crate::core::ConfigError;
use crate::server::CorsSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming an optional YAML config file
pub const CONFIG_PATH_ENV: &str = "GATEWAY_CONFIG";

/// Browser origins allowed when nothing else is configured
pub const DEFAULT_CORS_ORIGINS: [&str; 4] = [
    "https://port4004-workspaces-ws-cvxwr.eu10.applicationstudio.cloud.sap",
    "http://localhost:3000",
    "http://localhost:5173",
    "http://localhost:8080",
];

/// Gateway process configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listening port
    pub port: u16,

    /// Listening interface
    pub host: String,

    /// PostgreSQL connection string
    pub database_url: Option<String>,

    /// Upper bound of pooled connections
    pub database_max_connections: u32,

    /// libpq-style SSL mode (`disable`, `prefer`, `require`, ...)
    pub database_ssl_mode: String,

    /// Origins allowed to make cross-origin calls
    pub cors_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
            database_url: None,
            database_max_connections: 10,
            database_ssl_mode: "prefer".to_string(),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    /// Overlay values from environment-style variables
    ///
    /// `lookup` abstracts the environment so overrides can be resolved from any
    /// source. Empty values are treated as unset.
    pub fn apply_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(port) = lookup("PORT") {
            self.port = parse_value("PORT", &port)?;
        }
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(max) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database_max_connections = parse_value("DATABASE_MAX_CONNECTIONS", &max)?;
        }
        if let Some(mode) = lookup("DATABASE_SSL_MODE") {
            self.database_ssl_mode = mode;
        }
        if let Some(origins) = lookup("CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(self)
    }

    /// Load the process configuration
    ///
    /// Reads `.env` when present, then the YAML file named by
    /// `GATEWAY_CONFIG` if set, then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }

        let base = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                tracing::debug!(%path, "loading configuration file");
                Self::from_yaml_file(path)?
            }
            _ => Self::default(),
        };

        let config = base.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every required value is present and usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database_url()?;
        if self.database_max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "database_max_connections".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The connection string, or an error if none was configured
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingField("database_url"))
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cors_settings(&self) -> CorsSettings {
        CorsSettings::new(self.cors_origins.clone())
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{}': {}", raw, e),
    })
}

//! # Tracker Configuration
//!
//! Layered configuration loading: Defaults → YAML file → CLI/env overrides
//!
//! ## Configuration File
//!
//! Optional YAML file passed with `--config` (or `TRACKER_CONFIG`):
//!
//! ```yaml
//! server:
//!   bind: 0.0.0.0:8080
//! database:
//!   url: sqlite:///var/lib/release-tracker/tracker.db
//!   busy_timeout: 5s
//! upstream:
//!   api_url: https://api.github.com
//!   timeout: 30s
//! auth:
//!   require_login: true
//! ```
//!
//! Every section and field is optional; missing values fall back to defaults.

mod database;
mod global;
mod server;
mod upstream;

// Re-export all public types
pub use database::DatabaseConfig;
pub use global::TrackerConfig;

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Values supplied on the command line (or their env fallbacks)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind: Option<String>,
    pub database_url: Option<String>,
    pub api_url: Option<String>,
    pub require_login: Option<bool>,
}

impl TrackerConfig {
    /// Load configuration from an optional YAML file, then apply overrides
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply(overrides);
        Ok(config)
    }

    /// Parse a YAML configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty file is a valid "all defaults" config
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }

    fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(bind) = overrides.bind {
            self.server.bind = bind;
        }
        if let Some(url) = overrides.database_url {
            self.database.url = url;
        }
        if let Some(api_url) = overrides.api_url {
            self.upstream.api_url = api_url;
        }
        if let Some(require_login) = overrides.require_login {
            self.auth.require_login = require_login;
        }
    }

    /// Validate the configuration, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = self.bind_addr() {
            errors.push(e.to_string());
        }
        if !self.database.url.starts_with("sqlite:") {
            errors.push(format!(
                "database.url must be a sqlite URL, got '{}'",
                self.database.url
            ));
        }
        if self.database.max_connections == 0 {
            errors.push("database.max_connections must be at least 1".to_string());
        }
        if let Err(e) = self.busy_timeout() {
            errors.push(e.to_string());
        }
        if !self.upstream.api_url.starts_with("http://")
            && !self.upstream.api_url.starts_with("https://")
        {
            errors.push(format!(
                "upstream.api_url must be an http(s) URL, got '{}'",
                self.upstream.api_url
            ));
        }
        if let Err(e) = self.upstream_timeout() {
            errors.push(e.to_string());
        }
        if let Err(e) = self.upstream_connect_timeout() {
            errors.push(e.to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                field: "server.bind".to_string(),
                value: self.server.bind.clone(),
            })
    }

    pub fn busy_timeout(&self) -> Result<Duration, ConfigError> {
        parse_duration("database.busy_timeout", &self.database.busy_timeout)
    }

    pub fn upstream_timeout(&self) -> Result<Duration, ConfigError> {
        parse_duration("upstream.timeout", &self.upstream.timeout)
    }

    pub fn upstream_connect_timeout(&self) -> Result<Duration, ConfigError> {
        parse_duration("upstream.connect_timeout", &self.upstream.connect_timeout)
    }
}

fn parse_duration(field: &str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value).map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}

//! HTTP listener and login gate configuration.

use serde::{Deserialize, Serialize};

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind (e.g., "127.0.0.1:8080")
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Login gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Require an authenticated user for register, refresh and deregister
    #[serde(default = "default_require_login")]
    pub require_login: bool,
}

fn default_require_login() -> bool {
    true
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            require_login: default_require_login(),
        }
    }
}

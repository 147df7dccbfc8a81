//! Upstream release provider configuration.

use serde::{Deserialize, Serialize};

/// GitHub REST API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// API base URL (GitHub Enterprise uses "https://host/api/v3")
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout (humantime, e.g. "30s")
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// Connect timeout (humantime, e.g. "10s")
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: String,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    concat!("release-tracker/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout() -> String {
    "30s".to_string()
}

fn default_connect_timeout() -> String {
    "10s".to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            user_agent: default_user_agent(),
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

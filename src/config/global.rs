//! Top-level tracker configuration.

use serde::{Deserialize, Serialize};

use super::database::DatabaseConfig;
use super::server::{AuthConfig, ServerConfig};
use super::upstream::UpstreamConfig;

/// Global tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrackerConfig {
    /// HTTP listener configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Registry database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Upstream release provider configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Login gate configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

//! Registry database configuration.

use serde::{Deserialize, Serialize};

/// SQLite connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection URL (e.g., "sqlite://release-tracker.db", "sqlite::memory:")
    #[serde(default = "default_url")]
    pub url: String,

    /// Pool size. One connection serializes every registry transaction.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a writer waits on a locked database (humantime, e.g. "5s")
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout: String,
}

fn default_url() -> String {
    "sqlite://release-tracker.db".to_string()
}

fn default_max_connections() -> u32 {
    1
}

fn default_busy_timeout() -> String {
    "5s".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_connections: default_max_connections(),
            busy_timeout: default_busy_timeout(),
        }
    }
}

impl DatabaseConfig {
    /// In-memory database for tests
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            ..Self::default()
        }
    }
}

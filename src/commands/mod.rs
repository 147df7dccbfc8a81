//! Subcommand implementations
//!
//! `serve` runs the HTTP service; the remaining commands run the same
//! registry operations directly against the configured database, for an
//! operator with local access.

pub mod registry;
pub mod serve;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::TrackerConfig;
use crate::infrastructure::{Database, GitHubProvider, RegistryStore, UserStore};
use crate::services::{ReleaseRegistry, TrackingService};

/// Everything a command needs, wired from configuration
pub struct Runtime {
    pub db: Database,
    pub service: TrackingService,
}

impl Runtime {
    /// Open the database and build the service stack
    pub async fn init(config: &TrackerConfig) -> Result<Self> {
        let db = Database::open(&config.database, config.busy_timeout()?)
            .await
            .context("Failed to open registry database")?;
        let provider = GitHubProvider::from_config(config)?;
        tracing::debug!(api_url = %provider.api_url(), "Upstream provider ready");

        let registry = ReleaseRegistry::new(RegistryStore::new(db.clone()), Arc::new(provider));
        let service = TrackingService::new(
            registry,
            UserStore::new(db.clone()),
            config.auth.require_login,
        );
        Ok(Self { db, service })
    }

    pub async fn shutdown(self) {
        self.db.close().await;
    }
}

//! SQLite database lifecycle
//!
//! `open` connects and applies the schema, the stores borrow the pool while
//! serving, and `close` drains it on shutdown. Nothing here is global; the
//! handle is passed to whoever needs it.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::DatabaseConfig;

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS tracked_repositories (
        name            TEXT    PRIMARY KEY NOT NULL,
        credential_hash TEXT    NOT NULL,
        release_title   TEXT    NOT NULL,
        published_at    INTEGER NOT NULL,
        seen            INTEGER NOT NULL DEFAULT 0
    )"#,
    r#"CREATE TABLE IF NOT EXISTS tracked_users (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        username    TEXT    NOT NULL UNIQUE,
        secret_hash TEXT    NOT NULL
    )"#,
];

/// Handle to the registry database
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and make sure the schema exists
    pub async fn open(config: &DatabaseConfig, busy_timeout: Duration) -> Result<Self> {
        let in_memory = config.url.contains(":memory:");

        let mut options = SqliteConnectOptions::from_str(&config.url)
            .with_context(|| format!("Invalid database URL: {}", config.url))?
            .create_if_missing(true)
            .busy_timeout(busy_timeout);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
        if in_memory {
            // Each connection would get its own empty database; pin exactly one forever.
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        info!(url = %config.url, "Opening registry database");
        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to {}", config.url))?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Fresh in-memory database with the schema applied
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        Self::open(&DatabaseConfig::in_memory(), Duration::from_secs(5)).await
    }

    async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to apply registry schema")?;
        }
        debug!("Registry schema ready");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection, waiting for in-flight work
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Registry database closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name LIKE 'tracked_%' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();
        assert_eq!(tables, vec!["tracked_repositories", "tracked_users"]);
    }

    #[tokio::test]
    async fn test_on_disk_database_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("tracker.db").display()),
            ..DatabaseConfig::default()
        };

        let db = Database::open(&config, Duration::from_secs(1)).await.unwrap();
        sqlx::query("INSERT INTO tracked_users (username, secret_hash) VALUES ('alice', 'x')")
            .execute(db.pool())
            .await
            .unwrap();
        db.close().await;

        let db = Database::open(&config, Duration::from_secs(1)).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tracked_users")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
        db.close().await;
    }
}

//! Persistent registry of tracked repositories
//!
//! Each method is one atomic unit against SQLite. The credential hash is
//! written on insert and read back only for the refresh scan; it never
//! appears in a `TrackedRepository`.

use chrono::{DateTime, TimeZone, Utc};
use sqlx::FromRow;
use tracing::debug;

use super::database::Database;
use crate::domain::{Release, RepoName, TrackedRepository};
use crate::error::TrackerError;

/// Stored row; `published_at` is Unix epoch milliseconds
#[derive(Debug, FromRow)]
struct RepositoryRow {
    name: String,
    release_title: String,
    published_at: i64,
    seen: bool,
}

impl TryFrom<RepositoryRow> for TrackedRepository {
    type Error = TrackerError;

    fn try_from(row: RepositoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            published_at: from_millis(row.published_at)?,
            name: row.name,
            release_title: row.release_title,
            seen: row.seen,
        })
    }
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>, TrackerError> {
    Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
        TrackerError::Storage(sqlx::Error::Decode(
            format!("published_at out of range: {}", millis).into(),
        ))
    })
}

/// Stored credential hash of one record, for the refresh scan
#[derive(Debug, Clone, FromRow)]
pub struct StoredCredential {
    pub name: String,
    pub credential_hash: String,
}

#[derive(Clone)]
pub struct RegistryStore {
    db: Database,
}

impl RegistryStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn contains(&self, name: &RepoName) -> Result<bool, TrackerError> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM tracked_repositories WHERE name = ?")
                .bind(name.as_str())
                .fetch_optional(self.db.pool())
                .await?;
        Ok(found.is_some())
    }

    /// Insert a new record; an existing name is a conflict, never an overwrite
    pub async fn insert(
        &self,
        repo: &TrackedRepository,
        credential_hash: &str,
    ) -> Result<(), TrackerError> {
        let result = sqlx::query(
            "INSERT INTO tracked_repositories (name, credential_hash, release_title, published_at, seen) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&repo.name)
        .bind(credential_hash)
        .bind(&repo.release_title)
        .bind(repo.published_at.timestamp_millis())
        .bind(repo.seen)
        .execute(self.db.pool())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                TrackerError::conflict(format!("repo '{}' is already registered", repo.name)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Return the record as it was and mark it seen, in one transaction
    ///
    /// The UPDATE runs first so the transaction holds the write lock before it
    /// reads; a SELECT-first transaction cannot upgrade its lock when several
    /// pooled connections fetch the same record at once. The prior `seen` is
    /// whether the flip changed a row.
    pub async fn fetch_and_mark_seen(
        &self,
        name: &RepoName,
    ) -> Result<TrackedRepository, TrackerError> {
        let mut tx = self.db.pool().begin().await?;

        let flipped =
            sqlx::query("UPDATE tracked_repositories SET seen = 1 WHERE name = ? AND seen = 0")
                .bind(name.as_str())
                .execute(&mut *tx)
                .await?
                .rows_affected()
                > 0;

        let row: Option<RepositoryRow> = sqlx::query_as(
            "SELECT name, release_title, published_at, seen FROM tracked_repositories WHERE name = ?",
        )
        .bind(name.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut row) = row else {
            return Err(TrackerError::not_found(format!(
                "Could not find repo '{}'. Make sure to POST before you try to GET.",
                name
            )));
        };
        tx.commit().await?;

        row.seen = !flipped;
        row.try_into()
    }

    /// Read a record without touching `seen`
    pub async fn peek(&self, name: &RepoName) -> Result<Option<TrackedRepository>, TrackerError> {
        let row: Option<RepositoryRow> = sqlx::query_as(
            "SELECT name, release_title, published_at, seen FROM tracked_repositories WHERE name = ?",
        )
        .bind(name.as_str())
        .fetch_optional(self.db.pool())
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    pub async fn list(&self) -> Result<Vec<TrackedRepository>, TrackerError> {
        let rows: Vec<RepositoryRow> = sqlx::query_as(
            "SELECT name, release_title, published_at, seen FROM tracked_repositories ORDER BY name",
        )
        .fetch_all(self.db.pool())
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    pub async fn credentials(&self) -> Result<Vec<StoredCredential>, TrackerError> {
        Ok(sqlx::query_as(
            "SELECT name, credential_hash FROM tracked_repositories ORDER BY name",
        )
        .fetch_all(self.db.pool())
        .await?)
    }

    /// Move a record to `release` if it is strictly newer than what is stored
    ///
    /// Title, timestamp and the reset of `seen` land in one statement, and the
    /// `published_at < ?` guard keeps the timestamp monotonic even when two
    /// refreshes race. Returns the updated record, or `None` if nothing moved
    /// (including the record having been deregistered meanwhile).
    pub async fn advance_release(
        &self,
        name: &str,
        release: &Release,
    ) -> Result<Option<TrackedRepository>, TrackerError> {
        let millis = release.published_at.timestamp_millis();
        let row: Option<RepositoryRow> = sqlx::query_as(
            "UPDATE tracked_repositories \
             SET release_title = ?, published_at = ?, seen = 0 \
             WHERE name = ? AND published_at < ? \
             RETURNING name, release_title, published_at, seen",
        )
        .bind(&release.title)
        .bind(millis)
        .bind(name)
        .bind(millis)
        .fetch_optional(self.db.pool())
        .await?;

        if row.is_none() {
            debug!(repo = %name, "Stored release is current; nothing to advance");
        }
        row.map(TryInto::try_into).transpose()
    }

    pub async fn remove(&self, name: &RepoName) -> Result<(), TrackerError> {
        let result = sqlx::query("DELETE FROM tracked_repositories WHERE name = ?")
            .bind(name.as_str())
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(TrackerError::not_found(format!(
                "Could not find repo '{}' for deletion.",
                name
            )));
        }
        Ok(())
    }
}

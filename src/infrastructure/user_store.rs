//! Credential store for tracker users
//!
//! Login secrets are Argon2id hashes. An unknown username and a wrong
//! password produce the same `Unauthorized` error.

use sqlx::FromRow;

use super::database::Database;
use super::secret;
use crate::domain::{TrackedUser, UserCredentials};
use crate::error::TrackerError;

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    secret_hash: String,
}

impl From<UserRow> for TrackedUser {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
        }
    }
}

#[derive(Clone)]
pub struct UserStore {
    db: Database,
}

impl UserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// One-time signup
    pub async fn create(&self, credentials: &UserCredentials) -> Result<TrackedUser, TrackerError> {
        let hash = secret::hash(credentials.password.clone()).await?;

        let result: Result<i64, sqlx::Error> = sqlx::query_scalar(
            "INSERT INTO tracked_users (username, secret_hash) VALUES (?, ?) RETURNING id",
        )
        .bind(&credentials.username)
        .bind(&hash)
        .fetch_one(self.db.pool())
        .await;

        match result {
            Ok(id) => Ok(TrackedUser {
                id,
                username: credentials.username.clone(),
            }),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                TrackerError::conflict(format!("user '{}' already exists", credentials.username)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Check a username/password pair
    pub async fn verify(&self, credentials: &UserCredentials) -> Result<TrackedUser, TrackerError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, secret_hash FROM tracked_users WHERE username = ?",
        )
        .bind(&credentials.username)
        .fetch_optional(self.db.pool())
        .await?;

        let rejected = || TrackerError::unauthorized("Invalid username or password.");

        let Some(row) = row else {
            // Same Argon2 cost as a wrong password, so timing does not reveal
            // which usernames exist
            let decoy = secret::decoy_hash().to_string();
            secret::verify(credentials.password.clone(), decoy).await;
            return Err(rejected());
        };
        if !secret::verify(credentials.password.clone(), row.secret_hash.clone()).await {
            return Err(rejected());
        }
        Ok(row.into())
    }

    pub async fn change_secret(
        &self,
        credentials: &UserCredentials,
        new_password: &str,
    ) -> Result<(), TrackerError> {
        if new_password.is_empty() {
            return Err(TrackerError::invalid_input("missing required field 'new_password'"));
        }
        let user = self.verify(credentials).await?;
        let hash = secret::hash(new_password.to_string()).await?;

        let result = sqlx::query("UPDATE tracked_users SET secret_hash = ? WHERE id = ?")
            .bind(&hash)
            .bind(user.id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(TrackerError::not_found(format!("user '{}'", user.username)));
        }
        Ok(())
    }

    pub async fn delete(&self, credentials: &UserCredentials) -> Result<(), TrackerError> {
        let user = self.verify(credentials).await?;

        let result = sqlx::query("DELETE FROM tracked_users WHERE id = ?")
            .bind(user.id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(TrackerError::not_found(format!("user '{}'", user.username)));
        }
        Ok(())
    }
}

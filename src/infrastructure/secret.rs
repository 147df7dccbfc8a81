//! One-way secret hashing
//!
//! Upstream tokens and login passwords are stored as Argon2id PHC strings
//! with a per-secret random salt. Verification compares digests in constant
//! time inside `argon2`, never the plaintext.
//!
//! Hashing is deliberately slow, so the async helpers move the work onto the
//! blocking pool instead of stalling the runtime.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use rand::rngs::OsRng;
use std::sync::OnceLock;

use crate::error::TrackerError;

/// Hash a secret into a PHC string
pub fn hash_secret(secret: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(secret.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a secret against a stored PHC string
///
/// A malformed stored hash never verifies.
pub fn verify_secret(secret: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored secret hash is not a valid PHC string");
            false
        }
    }
}

/// Hash of a random throwaway secret
///
/// Checked against when a login names an unknown user, so that path costs
/// the same Argon2 work as a wrong password. Empty if hashing failed, which
/// never verifies.
pub fn decoy_hash() -> &'static str {
    static DECOY: OnceLock<String> = OnceLock::new();
    DECOY.get_or_init(|| {
        let throwaway = SaltString::generate(&mut OsRng);
        hash_secret(throwaway.as_str()).unwrap_or_default()
    })
}

pub async fn hash(secret: String) -> Result<String, TrackerError> {
    tokio::task::spawn_blocking(move || hash_secret(&secret))
        .await
        .map_err(|e| TrackerError::internal(format!("secret hashing aborted: {}", e)))?
        .map_err(|e| TrackerError::internal(format!("secret cannot be hashed: {}", e)))
}

pub async fn verify(secret: String, stored: String) -> bool {
    tokio::task::spawn_blocking(move || verify_secret(&secret, &stored))
        .await
        .unwrap_or(false)
}

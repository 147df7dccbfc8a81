//! Tracked user entity (login gate for the HTTP surface)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedUser {
    pub id: i64,
    pub username: String,
}

//! Tracked repository entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::release::Release;

/// A repository whose latest release is being tracked
///
/// The stored credential hash is deliberately not part of this type; it
/// never leaves the registry store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedRepository {
    pub name: String,
    pub release_title: String,
    pub published_at: DateTime<Utc>,
    /// Whether the current release was already returned by a fetch
    pub seen: bool,
}

impl TrackedRepository {
    /// A freshly registered record, not yet seen by anyone
    pub fn unseen(name: impl Into<String>, release: Release) -> Self {
        Self {
            name: name.into(),
            release_title: release.title,
            published_at: release.published_at,
            seen: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_record_is_unseen() {
        let published = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let repo = TrackedRepository::unseen("acme/app", Release::new("v1.0", published));
        assert!(!repo.seen);
        assert_eq!(repo.release_title, "v1.0");
        assert_eq!(repo.published_at, published);
    }

    #[test]
    fn test_serialized_shape() {
        let published = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let repo = TrackedRepository::unseen("acme/app", Release::new("v1.0", published));
        let json = serde_json::to_value(&repo).unwrap();
        assert_eq!(json["name"], "acme/app");
        assert_eq!(json["release_title"], "v1.0");
        assert_eq!(json["published_at"], "2024-03-01T12:00:00Z");
        assert_eq!(json["seen"], false);
        assert_eq!(json.as_object().unwrap().len(), 4);
    }
}

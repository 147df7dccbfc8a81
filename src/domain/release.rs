//! Release domain types
//!
//! A release is the single upstream publication the tracker remembers for a
//! repository. Reconciliation against upstream is expressed as a pure
//! decision so it can be tested without a store or provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Most recent release reported by the upstream provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Release label (name, or tag when unnamed)
    pub title: String,
    /// Publish time as reported upstream
    pub published_at: DateTime<Utc>,
}

impl Release {
    pub fn new(title: impl Into<String>, published_at: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            published_at,
        }
    }

    /// Whether this release supersedes one published at `stored`
    ///
    /// Only a strictly later timestamp counts; equal or earlier reports are
    /// ignored so repeated refreshes against the same upstream are no-ops.
    pub fn supersedes(&self, stored: DateTime<Utc>) -> bool {
        self.published_at > stored
    }
}

/// Outcome of reconciling one stored record against upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Upstream is newer; the record must take this release and become unseen
    Advance(Release),
    /// Upstream is the same or older; the record stays as it is
    Unchanged,
}

impl Reconciliation {
    pub fn decide(stored: DateTime<Utc>, upstream: Release) -> Self {
        if upstream.supersedes(stored) {
            Self::Advance(upstream)
        } else {
            Self::Unchanged
        }
    }
}

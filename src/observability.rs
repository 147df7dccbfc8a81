//! # Tracker Observability Module
//!
//! Structured events for registry state changes.
//!
//! ## Event Flow
//!
//! ```text
//! release-tracker → JSON stdout → log shipper → search/alerting
//! ```
//!
//! Events are single JSON lines prefixed with `TRACKER_EVENT:` so a log
//! shipper can pick them out of ordinary `tracing` output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event prefix for log shippers to identify structured events
const EVENT_PREFIX: &str = "TRACKER_EVENT:";

/// Registry event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum TrackerEvent {
    /// A repository started being tracked
    RepositoryRegistered(RepositoryEvent),
    /// A refresh moved a repository to a newer release
    ReleaseAdvanced(ReleaseAdvancedEvent),
    /// A repository stopped being tracked
    RepositoryDeregistered(RepositoryEvent),
    /// A refresh-all pass finished
    RefreshCompleted(RefreshCompletedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryEvent {
    /// Timestamp in RFC3339 format
    pub timestamp: String,
    pub repository: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl RepositoryEvent {
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            repository: repository.into(),
            release_title: None,
            published_at: None,
        }
    }

    pub fn with_release(mut self, title: impl Into<String>, published_at: DateTime<Utc>) -> Self {
        self.release_title = Some(title.into());
        self.published_at = Some(published_at);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseAdvancedEvent {
    pub timestamp: String,
    pub repository: String,
    pub previous_title: String,
    pub previous_published_at: DateTime<Utc>,
    pub release_title: String,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshCompletedEvent {
    pub timestamp: String,
    /// Records whose credential matched the presented token
    pub matched: usize,
    pub updated: usize,
    pub failed: usize,
    pub duration_secs: f64,
}

/// Emits a structured event as JSON to stdout
///
/// Events are prefixed with `TRACKER_EVENT:` for log shippers to parse.
pub fn emit_event(event: TrackerEvent) {
    match serde_json::to_string(&event) {
        Ok(json) => {
            println!("{}{}", EVENT_PREFIX, json);
        }
        Err(e) => {
            tracing::error!("Failed to serialize event: {}", e);
        }
    }
}

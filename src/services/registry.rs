//! Release registry - the tracking state machine
//!
//! Owns every transition of a tracked repository:
//! - register: upstream lookup, then a new unseen record
//! - fetch: return the record, flip it to seen
//! - refresh_all: reconcile matching records against upstream
//! - deregister: delete the record

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::domain::{
    Reconciliation, RefreshRequest, RegisterRequest, RepoName, TrackedRepository, UpstreamToken,
};
use crate::error::{ErrorKind, TrackerError};
use crate::infrastructure::registry_store::StoredCredential;
use crate::infrastructure::{secret, RegistryStore, ReleaseProvider};
use crate::observability::{
    emit_event, RefreshCompletedEvent, ReleaseAdvancedEvent, RepositoryEvent, TrackerEvent,
};

/// A matching record that could not be refreshed
#[derive(Debug, Clone, Serialize)]
pub struct RefreshFailure {
    pub name: String,
    pub error: ErrorKind,
    pub message: String,
}

/// Result of a refresh-all pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshReport {
    /// Records that moved to a newer release, as stored after the update
    pub updated: Vec<TrackedRepository>,
    /// Matching records skipped because upstream (or the store) failed
    pub failed: Vec<RefreshFailure>,
}

#[derive(Clone)]
pub struct ReleaseRegistry {
    store: RegistryStore,
    provider: Arc<dyn ReleaseProvider>,
}

impl ReleaseRegistry {
    pub fn new(store: RegistryStore, provider: Arc<dyn ReleaseProvider>) -> Self {
        Self { store, provider }
    }

    /// Start tracking a repository at its current upstream release
    pub async fn register(&self, request: &RegisterRequest) -> Result<TrackedRepository, TrackerError> {
        if self.store.contains(&request.name).await? {
            return Err(TrackerError::conflict(format!(
                "repo '{}' is already registered",
                request.name
            )));
        }

        let release = self
            .provider
            .latest_release(&request.name, &request.token)
            .await?;
        let credential_hash = secret::hash(request.token.expose().to_string()).await?;

        let repo = TrackedRepository::unseen(request.name.as_str(), release);
        // A concurrent register of the same name surfaces here as Conflict
        self.store.insert(&repo, &credential_hash).await?;

        info!(repo = %repo.name, release = %repo.release_title, "Registered repository");
        emit_event(TrackerEvent::RepositoryRegistered(
            RepositoryEvent::new(&repo.name).with_release(&repo.release_title, repo.published_at),
        ));
        Ok(repo)
    }

    /// Return the stored record and mark it seen
    ///
    /// The returned `seen` is the value before this call, so it tells the
    /// caller whether someone already read the current release.
    pub async fn fetch(&self, name: &RepoName) -> Result<TrackedRepository, TrackerError> {
        self.store.fetch_and_mark_seen(name).await
    }

    /// Reconcile every record registered with the presented token
    ///
    /// Records whose stored hash does not verify against the token are
    /// skipped silently. Each matching record is its own unit: an upstream
    /// failure is logged and reported, and never undoes or blocks the others.
    pub async fn refresh_all(&self, request: &RefreshRequest) -> Result<RefreshReport, TrackerError> {
        let start = Instant::now();
        let mut report = RefreshReport::default();
        let mut matched = 0;

        for stored in self.store.credentials().await? {
            if !self.credential_matches(&request.token, &stored).await {
                continue;
            }
            matched += 1;

            match self.refresh_one(&stored.name, &request.token).await {
                Ok(Some(repo)) => report.updated.push(repo),
                Ok(None) => {}
                Err(e) => {
                    warn!(repo = %stored.name, error = %e, "Refresh failed; skipping repository");
                    report.failed.push(RefreshFailure {
                        name: stored.name.clone(),
                        error: e.kind(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let duration = start.elapsed();
        info!(
            matched,
            updated = report.updated.len(),
            failed = report.failed.len(),
            "Refresh completed in {:.1}s",
            duration.as_secs_f64()
        );
        emit_event(TrackerEvent::RefreshCompleted(RefreshCompletedEvent {
            timestamp: chrono::Utc::now().to_rfc3339(),
            matched,
            updated: report.updated.len(),
            failed: report.failed.len(),
            duration_secs: duration.as_secs_f64(),
        }));

        Ok(report)
    }

    /// The token selects a record only if it is the credential the record was
    /// registered with; each record has its own salt, so this is an identity
    /// check rather than a shared-hash match.
    async fn credential_matches(&self, token: &UpstreamToken, stored: &StoredCredential) -> bool {
        secret::verify(token.expose().to_string(), stored.credential_hash.clone()).await
    }

    async fn refresh_one(
        &self,
        name: &str,
        token: &UpstreamToken,
    ) -> Result<Option<TrackedRepository>, TrackerError> {
        let name = RepoName::parse(Some(name.to_string()))?;
        let upstream = self.provider.latest_release(&name, token).await?;

        // Deregistered while upstream was being queried
        let Some(current) = self.store.peek(&name).await? else {
            return Ok(None);
        };

        let release = match Reconciliation::decide(current.published_at, upstream) {
            Reconciliation::Advance(release) => release,
            Reconciliation::Unchanged => return Ok(None),
        };

        let updated = self.store.advance_release(name.as_str(), &release).await?;
        if let Some(repo) = &updated {
            info!(
                repo = %repo.name,
                from = %current.release_title,
                to = %repo.release_title,
                "Release advanced"
            );
            emit_event(TrackerEvent::ReleaseAdvanced(ReleaseAdvancedEvent {
                timestamp: chrono::Utc::now().to_rfc3339(),
                repository: repo.name.clone(),
                previous_title: current.release_title,
                previous_published_at: current.published_at,
                release_title: repo.release_title.clone(),
                published_at: repo.published_at,
            }));
        }
        Ok(updated)
    }

    pub async fn deregister(&self, name: &RepoName) -> Result<(), TrackerError> {
        self.store.remove(name).await?;
        info!(repo = %name, "Deregistered repository");
        emit_event(TrackerEvent::RepositoryDeregistered(RepositoryEvent::new(
            name.as_str(),
        )));
        Ok(())
    }

    /// All records, without marking anything seen
    pub async fn list(&self) -> Result<Vec<TrackedRepository>, TrackerError> {
        self.store.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Release;
    use crate::infrastructure::upstream::scripted::{ScriptedProvider, Upstream};
    use crate::infrastructure::Database;
    use chrono::{DateTime, TimeZone, Utc};

    const TOKEN: &str = "tok-acme";

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn name(s: &str) -> RepoName {
        RepoName::parse(Some(s.to_string())).unwrap()
    }

    fn register_req(repo: &str, token: &str) -> RegisterRequest {
        RegisterRequest::new(Some(repo.to_string()), Some(token.to_string())).unwrap()
    }

    fn refresh_req(token: &str) -> RefreshRequest {
        RefreshRequest::new(Some(token.to_string())).unwrap()
    }

    async fn setup() -> (ReleaseRegistry, RegistryStore, Arc<ScriptedProvider>) {
        let store = RegistryStore::new(Database::in_memory().await.unwrap());
        let provider = Arc::new(ScriptedProvider::new());
        provider.allow_token(TOKEN);
        let registry = ReleaseRegistry::new(store.clone(), provider.clone());
        (registry, store, provider)
    }

    #[tokio::test]
    async fn test_release_lifecycle_scenario() {
        let (registry, store, upstream) = setup().await;
        upstream.publish("acme/app", Release::new("v1.0", at(1_000)));

        let created = registry.register(&register_req("acme/app", TOKEN)).await.unwrap();
        assert_eq!(created.release_title, "v1.0");
        assert_eq!(created.published_at, at(1_000));
        assert!(!created.seen);

        let fetched = registry.fetch(&name("acme/app")).await.unwrap();
        assert!(!fetched.seen);
        assert!(store.peek(&name("acme/app")).await.unwrap().unwrap().seen);
        assert!(registry.fetch(&name("acme/app")).await.unwrap().seen);

        upstream.publish("acme/app", Release::new("v1.1", at(2_000)));
        let report = registry.refresh_all(&refresh_req(TOKEN)).await.unwrap();
        assert_eq!(report.updated.len(), 1);
        assert_eq!(report.updated[0].release_title, "v1.1");
        assert_eq!(report.updated[0].published_at, at(2_000));
        assert!(!report.updated[0].seen);
        assert!(report.failed.is_empty());

        let again = registry.refresh_all(&refresh_req(TOKEN)).await.unwrap();
        assert!(again.updated.is_empty());
        assert!(!store.peek(&name("acme/app")).await.unwrap().unwrap().seen);
    }

    #[tokio::test]
    async fn test_register_without_releases_creates_nothing() {
        let (registry, store, upstream) = setup().await;
        upstream.set("acme/empty", Upstream::NoReleases);

        let err = registry.register(&register_req("acme/empty", TOKEN)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!store.contains(&name("acme/empty")).await.unwrap());
    }

    #[tokio::test]
    async fn test_register_distinguishes_bad_token_from_missing_repo() {
        let (registry, store, upstream) = setup().await;
        upstream.publish("acme/app", Release::new("v1.0", at(1_000)));

        let err = registry.register(&register_req("acme/app", "wrong")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let err = registry.register(&register_req("acme/ghost", TOKEN)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_register_is_conflict_without_upstream_call() {
        let (registry, store, upstream) = setup().await;
        upstream.publish("acme/app", Release::new("v1.0", at(1_000)));
        registry.register(&register_req("acme/app", TOKEN)).await.unwrap();
        let calls = upstream.calls();

        upstream.publish("acme/app", Release::new("v2.0", at(5_000)));
        let err = registry.register(&register_req("acme/app", TOKEN)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(upstream.calls(), calls);
        assert_eq!(
            store.peek(&name("acme/app")).await.unwrap().unwrap().release_title,
            "v1.0"
        );
    }

    #[tokio::test]
    async fn test_refresh_skips_records_of_other_credentials() {
        let (registry, store, upstream) = setup().await;
        upstream.allow_token("tok-other");
        upstream.publish("acme/app", Release::new("v1.0", at(1_000)));
        upstream.publish("other/lib", Release::new("v3.0", at(1_000)));
        registry.register(&register_req("acme/app", TOKEN)).await.unwrap();
        registry.register(&register_req("other/lib", "tok-other")).await.unwrap();
        registry.fetch(&name("other/lib")).await.unwrap();

        upstream.publish("acme/app", Release::new("v1.1", at(2_000)));
        upstream.publish("other/lib", Release::new("v3.1", at(2_000)));
        let report = registry.refresh_all(&refresh_req(TOKEN)).await.unwrap();

        let names: Vec<_> = report.updated.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["acme/app"]);

        let untouched = store.peek(&name("other/lib")).await.unwrap().unwrap();
        assert_eq!(untouched.release_title, "v3.0");
        assert_eq!(untouched.published_at, at(1_000));
        assert!(untouched.seen);
    }

    #[tokio::test]
    async fn test_refresh_never_rewinds() {
        let (registry, store, upstream) = setup().await;
        upstream.publish("acme/app", Release::new("v1.0", at(1_000)));
        registry.register(&register_req("acme/app", TOKEN)).await.unwrap();
        registry.fetch(&name("acme/app")).await.unwrap();

        upstream.publish("acme/app", Release::new("v0.9-backport", at(900)));
        let report = registry.refresh_all(&refresh_req(TOKEN)).await.unwrap();
        assert!(report.updated.is_empty());

        let stored = store.peek(&name("acme/app")).await.unwrap().unwrap();
        assert_eq!(stored.release_title, "v1.0");
        assert_eq!(stored.published_at, at(1_000));
        assert!(stored.seen);
    }

    #[tokio::test]
    async fn test_upstream_failure_does_not_abort_batch() {
        let (registry, store, upstream) = setup().await;
        upstream.publish("acme/a", Release::new("a1", at(1_000)));
        upstream.publish("acme/b", Release::new("b1", at(1_000)));
        upstream.publish("acme/c", Release::new("c1", at(1_000)));
        for repo in ["acme/a", "acme/b", "acme/c"] {
            registry.register(&register_req(repo, TOKEN)).await.unwrap();
        }

        upstream.publish("acme/a", Release::new("a2", at(2_000)));
        upstream.set("acme/b", Upstream::Broken);
        upstream.publish("acme/c", Release::new("c2", at(2_000)));

        let report = registry.refresh_all(&refresh_req(TOKEN)).await.unwrap();
        let updated: Vec<_> = report.updated.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(updated, vec!["acme/a", "acme/c"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "acme/b");
        assert_eq!(report.failed[0].error, ErrorKind::Upstream);

        assert_eq!(
            store.peek(&name("acme/b")).await.unwrap().unwrap().release_title,
            "b1"
        );
    }

    #[tokio::test]
    async fn test_deregister() {
        let (registry, _store, upstream) = setup().await;
        let err = registry.deregister(&name("acme/app")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        upstream.publish("acme/app", Release::new("v1.0", at(1_000)));
        registry.register(&register_req("acme/app", TOKEN)).await.unwrap();
        registry.deregister(&name("acme/app")).await.unwrap();

        let err = registry.fetch(&name("acme/app")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_see_exactly_one_unseen() {
        let (registry, _store, upstream) = setup().await;
        upstream.publish("acme/app", Release::new("v1.0", at(1_000)));
        registry.register(&register_req("acme/app", TOKEN)).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.fetch(&name("acme/app")).await.unwrap() })
            })
            .collect();

        let mut unseen = 0;
        for handle in handles {
            if !handle.await.unwrap().seen {
                unseen += 1;
            }
        }
        assert_eq!(unseen, 1);
    }
}

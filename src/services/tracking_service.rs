//! Tracking service - binds requests to registry operations
//!
//! The login gate lives here and only here: mutating repository operations
//! pass through `authorize` once before reaching the registry.

use tracing::debug;

use super::registry::{RefreshReport, ReleaseRegistry};
use crate::domain::{
    RefreshRequest, RegisterRequest, RepoName, TrackedRepository, TrackedUser, UserCredentials,
};
use crate::error::TrackerError;
use crate::infrastructure::UserStore;

#[derive(Clone)]
pub struct TrackingService {
    registry: ReleaseRegistry,
    users: UserStore,
    require_login: bool,
}

impl TrackingService {
    pub fn new(registry: ReleaseRegistry, users: UserStore, require_login: bool) -> Self {
        Self {
            registry,
            users,
            require_login,
        }
    }

    pub fn registry(&self) -> &ReleaseRegistry {
        &self.registry
    }

    /// Capability check for mutating operations
    ///
    /// Presented credentials are always verified; their absence is only an
    /// error when login is required.
    pub async fn authorize(
        &self,
        caller: Option<&UserCredentials>,
    ) -> Result<Option<TrackedUser>, TrackerError> {
        match caller {
            Some(credentials) => {
                let user = self.users.verify(credentials).await?;
                debug!(user = %user.username, "Caller authenticated");
                Ok(Some(user))
            }
            None if self.require_login => Err(TrackerError::unauthorized(
                "Login required. Provide HTTP Basic credentials.",
            )),
            None => Ok(None),
        }
    }

    pub async fn register(
        &self,
        caller: Option<&UserCredentials>,
        request: &RegisterRequest,
    ) -> Result<TrackedRepository, TrackerError> {
        self.authorize(caller).await?;
        self.registry.register(request).await
    }

    pub async fn fetch(&self, name: &RepoName) -> Result<TrackedRepository, TrackerError> {
        self.registry.fetch(name).await
    }

    pub async fn refresh_all(
        &self,
        caller: Option<&UserCredentials>,
        request: &RefreshRequest,
    ) -> Result<RefreshReport, TrackerError> {
        self.authorize(caller).await?;
        self.registry.refresh_all(request).await
    }

    pub async fn deregister(
        &self,
        caller: Option<&UserCredentials>,
        name: &RepoName,
    ) -> Result<(), TrackerError> {
        self.authorize(caller).await?;
        self.registry.deregister(name).await
    }

    pub async fn signup(&self, credentials: &UserCredentials) -> Result<TrackedUser, TrackerError> {
        self.users.create(credentials).await
    }

    pub async fn whoami(&self, credentials: &UserCredentials) -> Result<TrackedUser, TrackerError> {
        self.users.verify(credentials).await
    }

    pub async fn change_password(
        &self,
        credentials: &UserCredentials,
        new_password: &str,
    ) -> Result<(), TrackerError> {
        self.users.change_secret(credentials, new_password).await
    }

    pub async fn delete_user(&self, credentials: &UserCredentials) -> Result<(), TrackerError> {
        self.users.delete(credentials).await
    }
}

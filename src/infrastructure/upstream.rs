//! Upstream release provider seam
//!
//! The registry only needs "latest release of this repository, using this
//! credential". The GitHub client implements it for production; tests use the
//! scripted provider below.

use async_trait::async_trait;

use crate::domain::{Release, RepoName, UpstreamToken};
use crate::error::UpstreamError;

#[async_trait]
pub trait ReleaseProvider: Send + Sync {
    /// Most recent release of `name`, read with `token`
    ///
    /// Must distinguish a rejected credential (`BadCredentials`) from a
    /// missing repository or empty release list (`RepoNotFound`/`NoReleases`).
    async fn latest_release(
        &self,
        name: &RepoName,
        token: &UpstreamToken,
    ) -> Result<Release, UpstreamError>;
}

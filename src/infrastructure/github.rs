//! GitHub release provider
//!
//! Reads the most recent release of a repository through the GitHub REST API.
//!
//! ## Name resolution
//!
//! `owner/repo` names are used as-is. A bare `repo` name is looked up under
//! the login of the token's owner (`GET /user`), so a client can register
//! its own repositories without spelling out the owner.
//!
//! ## Configuration
//!
//! Set `GITHUB_API_URL` (or `upstream.api_url`) to target GitHub Enterprise:
//! ```bash
//! export GITHUB_API_URL=https://github.example.com/api/v3
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::upstream::ReleaseProvider;
use crate::config::TrackerConfig;
use crate::domain::{Release, RepoName, UpstreamToken};
use crate::error::UpstreamError;

/// GitHub REST API client
pub struct GitHubProvider {
    client: Client,
    api_url: String,
}

/// Subset of the release payload the tracker needs
#[derive(Debug, Clone, Deserialize)]
struct GitHubRelease {
    name: Option<String>,
    tag_name: String,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl GitHubRelease {
    /// Unnamed releases fall back to their tag; drafts to their creation time
    fn into_release(self) -> Release {
        let title = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.tag_name,
        };
        Release::new(title, self.published_at.unwrap_or(self.created_at))
    }
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
}

impl GitHubProvider {
    pub fn new(
        api_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .context("Failed to build upstream HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a provider from the tracker configuration
    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        Self::new(
            config.upstream.api_url.clone(),
            &config.upstream.user_agent,
            config.upstream_timeout()?,
            config.upstream_connect_timeout()?,
        )
    }

    /// Get the base URL
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn get(&self, path: &str, token: &UpstreamToken) -> Result<Response, UpstreamError> {
        let url = format!("{}{}", self.api_url, path);
        debug!(url = %url, "GitHub request");
        Ok(self
            .client
            .get(&url)
            .bearer_auth(token.expose())
            .send()
            .await?)
    }

    /// `owner/repo` for the given name, resolving bare names via the token owner
    async fn full_name(&self, name: &RepoName, token: &UpstreamToken) -> Result<String, UpstreamError> {
        if name.owner().is_some() {
            return Ok(name.to_string());
        }

        let response = self.get("/user", token).await?;
        if !response.status().is_success() {
            return Err(classify(name, response).await);
        }
        let user: GitHubUser = response.json().await?;
        Ok(format!("{}/{}", user.login, name))
    }
}

/// Map a failed GitHub response onto the provider error taxonomy
async fn classify(name: &RepoName, response: Response) -> UpstreamError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = github_message(&body);

    match status {
        StatusCode::UNAUTHORIZED => UpstreamError::BadCredentials {
            repo: name.to_string(),
            message,
        },
        // GitHub answers 404 (or 403 for some org policies) when the token
        // cannot see the repository
        StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => UpstreamError::RepoNotFound {
            repo: name.to_string(),
            message,
        },
        other => UpstreamError::UnexpectedStatus {
            status: other.as_u16(),
            body: message,
        },
    }
}

/// Pull the `message` field out of a GitHub error body when there is one
fn github_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.to_string())
}

fn releases_path(full_name: &str) -> String {
    let encoded: Vec<String> = full_name
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("/repos/{}/releases?per_page=1", encoded.join("/"))
}

#[async_trait]
impl ReleaseProvider for GitHubProvider {
    async fn latest_release(
        &self,
        name: &RepoName,
        token: &UpstreamToken,
    ) -> Result<Release, UpstreamError> {
        let full_name = self.full_name(name, token).await?;

        let response = self.get(&releases_path(&full_name), token).await?;
        if !response.status().is_success() {
            return Err(classify(name, response).await);
        }

        let releases: Vec<GitHubRelease> = response.json().await?;
        releases
            .into_iter()
            .next()
            .map(GitHubRelease::into_release)
            .ok_or_else(|| UpstreamError::NoReleases {
                repo: name.to_string(),
            })
    }
}

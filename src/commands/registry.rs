//! Direct registry commands: register, fetch, refresh, deregister, list

use anyhow::Result;

use super::Runtime;
use crate::config::TrackerConfig;
use crate::domain::{RefreshRequest, RegisterRequest, RepoName};
use crate::ui;

pub async fn register(config: TrackerConfig, name: String, token: String) -> Result<()> {
    let request = RegisterRequest::new(Some(name), Some(token))?;
    let runtime = Runtime::init(&config).await?;

    let result = runtime.service.registry().register(&request).await;
    runtime.shutdown().await;

    let repo = result?;
    ui::print_success(&format!("Tracking {}", repo.name));
    ui::print_repository(&repo);
    Ok(())
}

pub async fn fetch(config: TrackerConfig, name: String) -> Result<()> {
    let name = RepoName::parse(Some(name))?;
    let runtime = Runtime::init(&config).await?;

    let result = runtime.service.registry().fetch(&name).await;
    runtime.shutdown().await;

    ui::print_repository(&result?);
    Ok(())
}

pub async fn refresh(config: TrackerConfig, token: String) -> Result<()> {
    let request = RefreshRequest::new(Some(token))?;
    let runtime = Runtime::init(&config).await?;

    ui::print_header("Refreshing tracked repositories");
    let result = runtime.service.registry().refresh_all(&request).await;
    runtime.shutdown().await;

    ui::print_refresh_report(&result?);
    Ok(())
}

pub async fn deregister(config: TrackerConfig, name: String) -> Result<()> {
    let name = RepoName::parse(Some(name))?;
    let runtime = Runtime::init(&config).await?;

    let result = runtime.service.registry().deregister(&name).await;
    runtime.shutdown().await;

    result?;
    ui::print_success(&format!("Stopped tracking {}", name));
    Ok(())
}

pub async fn list(config: TrackerConfig) -> Result<()> {
    let runtime = Runtime::init(&config).await?;

    let result = runtime.service.registry().list().await;
    runtime.shutdown().await;

    let repos = result?;
    if repos.is_empty() {
        ui::print_info("No repositories are tracked");
        return Ok(());
    }
    ui::print_header(&format!("{} tracked repositories", repos.len()));
    for repo in &repos {
        ui::print_repository(repo);
    }
    Ok(())
}

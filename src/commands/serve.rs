//! `serve` - run the HTTP service until interrupted

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::Runtime;
use crate::config::TrackerConfig;
use crate::http::{self, AppState};

pub async fn execute(config: TrackerConfig) -> Result<()> {
    let addr = config.bind_addr()?;
    if !config.auth.require_login {
        warn!("Login gate disabled: anyone can register, refresh and deregister repositories");
    }

    let runtime = Runtime::init(&config).await?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let result = http::serve(
        listener,
        AppState::new(runtime.service.clone()),
        shutdown_signal(),
    )
    .await;

    runtime.shutdown().await;
    info!("Release tracker stopped");
    result
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(error = %e, "Failed to listen for shutdown signal"),
    }
}

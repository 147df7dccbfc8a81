use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod domain;
mod error;
mod http;
mod infrastructure;
mod observability;
mod services;
mod ui;

use cli::{Cli, Commands};
use commands::{registry, serve};
use config::TrackerConfig;

/// Load and validate configuration: defaults, then the YAML file, then flags/env
fn load_config(cli: &Cli) -> Result<TrackerConfig> {
    let config = TrackerConfig::load(cli.config.as_deref(), cli.overrides())?;
    config.validate().map_err(|errors| {
        anyhow::anyhow!("Invalid configuration:\n  {}", errors.join("\n  "))
    })?;
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Serve { .. } => serve::execute(config).await,
        Commands::Register { name, token } => registry::register(config, name, token).await,
        Commands::Fetch { name } => registry::fetch(config, name).await,
        Commands::Refresh { token } => registry::refresh(config, token).await,
        Commands::Deregister { name } => registry::deregister(config, name).await,
        Commands::List => registry::list(config).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging with LOGGING env var support
    // LOGGING=debug,info,warn,error or just LOGGING=debug
    let log_level = std::env::var("LOGGING")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| {
            if cli.verbose {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false) // Disable ANSI escape codes for cleaner output
        .init();

    if let Err(e) = run(cli).await {
        ui::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

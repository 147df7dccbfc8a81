//! CLI definitions for release-tracker
//!
//! This module contains all CLI argument parsing structures using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ConfigOverrides;

#[derive(Parser)]
#[command(
    name = "release-tracker",
    version,
    about = "Tracks the latest upstream release of registered repositories",
    long_about = "Keeps one record per repository with its latest known release.\nClients register repositories, poll them, and trigger refreshes against GitHub."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to YAML configuration file
    #[arg(long, global = true, env = "TRACKER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Registry database URL
    #[arg(long, global = true, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Upstream API base URL
    #[arg(long, global = true, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Socket address to bind
        #[arg(long, env = "TRACKER_BIND")]
        bind: Option<String>,

        /// Allow register/refresh/deregister without a logged-in user
        #[arg(long)]
        no_login: bool,
    },

    /// Start tracking a repository at its current release
    Register {
        /// Repository name (owner/repo, or repo under the token's owner)
        name: String,

        /// Upstream access token
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Show a tracked repository and mark it seen
    Fetch {
        /// Repository name
        name: String,
    },

    /// Re-check every repository registered with the given token
    Refresh {
        /// Upstream access token the repositories were registered with
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Stop tracking a repository
    Deregister {
        /// Repository name
        name: String,
    },

    /// List tracked repositories without marking them seen
    List,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        let (bind, require_login) = match &self.command {
            Commands::Serve { bind, no_login } => (bind.clone(), no_login.then_some(false)),
            _ => (None, None),
        };
        ConfigOverrides {
            bind,
            database_url: self.database_url.clone(),
            api_url: self.api_url.clone(),
            require_login,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::parse_from([
            "release-tracker",
            "--database-url",
            "sqlite::memory:",
            "serve",
            "--bind",
            "0.0.0.0:9000",
            "--no-login",
        ]);
        let overrides = cli.overrides();
        assert_eq!(overrides.bind.as_deref(), Some("0.0.0.0:9000"));
        assert_eq!(overrides.database_url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(overrides.require_login, Some(false));
    }

    #[test]
    fn test_register_args() {
        let cli = Cli::parse_from(["release-tracker", "register", "acme/app", "--token", "t"]);
        match &cli.command {
            Commands::Register { name, token } => {
                assert_eq!(name, "acme/app");
                assert_eq!(token, "t");
            }
            _ => panic!("expected register"),
        }
        assert_eq!(cli.overrides().require_login, None);
    }
}

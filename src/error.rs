//! Centralized error types for the release tracker
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.

use serde::Serialize;
use thiserror::Error;

/// Stable classification of a tracker failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    Conflict,
    InvalidInput,
    Upstream,
    Storage,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::InvalidInput => "invalid_input",
            Self::Upstream => "upstream",
            Self::Storage => "storage",
            Self::Internal => "internal",
        }
    }
}

/// Top-level error type for registry and service operations
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Conflict: {what}")]
    Conflict { what: String },

    #[error("Invalid input: {field}")]
    InvalidInput { field: String },

    #[error("Upstream provider failed: {message}")]
    Upstream { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// A failure on our side that no input could have caused
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl TrackerError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn conflict(what: impl Into<String>) -> Self {
        Self::Conflict { what: what.into() }
    }

    pub fn invalid_input(field: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }
}

/// Upstream release provider errors
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Invalid token provided for '{repo}': {message}")]
    BadCredentials { repo: String, message: String },

    #[error("Cannot find repo '{repo}' using provided token: {message}")]
    RepoNotFound { repo: String, message: String },

    #[error("No releases associated with repo '{repo}'")]
    NoReleases { repo: String },

    #[error("Request to upstream failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected upstream response ({status}): {body}")]
    UnexpectedStatus { status: u16, body: String },
}

impl From<UpstreamError> for TrackerError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::BadCredentials { .. } => Self::unauthorized(err.to_string()),
            UpstreamError::RepoNotFound { .. } | UpstreamError::NoReleases { .. } => {
                Self::not_found(err.to_string())
            }
            UpstreamError::Transport(_) | UpstreamError::UnexpectedStatus { .. } => {
                Self::Upstream {
                    message: err.to_string(),
                }
            }
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },
}

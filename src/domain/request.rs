//! Typed requests, validated at construction
//!
//! Every operation takes one of these instead of loose strings, so a request
//! that reaches the registry already has its required fields.

use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::sync::OnceLock;

use crate::error::TrackerError;

/// Accepts `repo` or `owner/repo` using the characters hosting providers allow
fn repository_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.-]+(/[A-Za-z0-9_.-]+)?$").expect("valid repository name regex")
    })
}

fn required(field: &str, value: Option<String>) -> Result<String, TrackerError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(TrackerError::invalid_input(format!("missing required field '{}'", field))),
    }
}

/// Validated repository name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoName(String);

impl RepoName {
    pub fn parse(value: Option<String>) -> Result<Self, TrackerError> {
        let value = required("name", value)?;
        let value = value.trim().to_string();
        if !repository_name_pattern().is_match(&value) {
            return Err(TrackerError::invalid_input(format!(
                "'{}' is not a valid repository name",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Owner part of an `owner/repo` name
    pub fn owner(&self) -> Option<&str> {
        self.0.split_once('/').map(|(owner, _)| owner)
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Upstream access credential; never printed
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamToken(String);

impl UpstreamToken {
    pub fn parse(value: Option<String>) -> Result<Self, TrackerError> {
        required("token", value).map(|v| Self(v.trim().to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UpstreamToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UpstreamToken(***)")
    }
}

/// Raw body of a register call, before validation
#[derive(Debug, Default, Deserialize)]
pub struct RegisterBody {
    pub name: Option<String>,
    pub token: Option<String>,
}

/// Raw body of a refresh call, before validation
#[derive(Debug, Default, Deserialize)]
pub struct RefreshBody {
    pub token: Option<String>,
}

/// Raw query of fetch/deregister calls, before validation
#[derive(Debug, Default, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub name: RepoName,
    pub token: UpstreamToken,
}

impl RegisterRequest {
    pub fn new(name: Option<String>, token: Option<String>) -> Result<Self, TrackerError> {
        Ok(Self {
            name: RepoName::parse(name)?,
            token: UpstreamToken::parse(token)?,
        })
    }
}

impl TryFrom<RegisterBody> for RegisterRequest {
    type Error = TrackerError;

    fn try_from(body: RegisterBody) -> Result<Self, Self::Error> {
        Self::new(body.name, body.token)
    }
}

#[derive(Debug, Clone)]
pub struct RefreshRequest {
    pub token: UpstreamToken,
}

impl RefreshRequest {
    pub fn new(token: Option<String>) -> Result<Self, TrackerError> {
        Ok(Self {
            token: UpstreamToken::parse(token)?,
        })
    }
}

impl TryFrom<RefreshBody> for RefreshRequest {
    type Error = TrackerError;

    fn try_from(body: RefreshBody) -> Result<Self, Self::Error> {
        Self::new(body.token)
    }
}

impl TryFrom<NameQuery> for RepoName {
    type Error = TrackerError;

    fn try_from(query: NameQuery) -> Result<Self, Self::Error> {
        Self::parse(query.name)
    }
}

/// Login credentials for the user gate
#[derive(Clone)]
pub struct UserCredentials {
    pub username: String,
    pub password: String,
}

impl UserCredentials {
    pub fn new(username: Option<String>, password: Option<String>) -> Result<Self, TrackerError> {
        let username = required("username", username)?.trim().to_string();
        // Passwords are taken verbatim; only emptiness is rejected.
        let password = match password {
            Some(p) if !p.is_empty() => p,
            _ => return Err(TrackerError::invalid_input("missing required field 'password'")),
        };
        Ok(Self { username, password })
    }
}

impl fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SignupBody {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangePasswordBody {
    pub new_password: Option<String>,
}

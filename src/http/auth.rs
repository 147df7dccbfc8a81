//! HTTP Basic credentials for the login gate

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use base64::Engine;

use super::error::ApiError;
use crate::domain::UserCredentials;
use crate::error::TrackerError;

/// Credentials presented by the caller, if any
///
/// A present but malformed header is rejected rather than treated as
/// anonymous.
pub struct Caller(pub Option<UserCredentials>);

impl Caller {
    pub fn credentials(&self) -> Option<&UserCredentials> {
        self.0.as_ref()
    }
}

/// Credentials the route cannot do without
pub struct RequiredCaller(pub UserCredentials);

fn parse_basic(value: &str) -> Result<UserCredentials, TrackerError> {
    let malformed = || TrackerError::unauthorized("Malformed Basic authorization header.");

    let encoded = value
        .strip_prefix("Basic ")
        .ok_or_else(|| TrackerError::unauthorized("Only Basic authorization is supported."))?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|_| malformed())?;
    let decoded = String::from_utf8(decoded).map_err(|_| malformed())?;
    let (username, password) = decoded.split_once(':').ok_or_else(malformed)?;

    UserCredentials::new(Some(username.to_string()), Some(password.to_string()))
        .map_err(|_| malformed())
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
            return Ok(Self(None));
        };
        let value = value
            .to_str()
            .map_err(|_| TrackerError::unauthorized("Malformed Basic authorization header."))?;
        Ok(Self(Some(parse_basic(value)?)))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequiredCaller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Caller::from_request_parts(parts, state).await?.0 {
            Some(credentials) => Ok(Self(credentials)),
            None => Err(TrackerError::unauthorized("Login required. Provide HTTP Basic credentials.").into()),
        }
    }
}

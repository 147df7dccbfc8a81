//! Route handlers for the repository and user resources

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use super::auth::{Caller, RequiredCaller};
use super::error::ApiResult;
use super::AppState;
use crate::domain::request::{ChangePasswordBody, NameQuery, RefreshBody, RegisterBody, SignupBody};
use crate::domain::{RefreshRequest, RegisterRequest, RepoName, TrackedRepository, TrackedUser, UserCredentials};
use crate::services::RefreshReport;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /repo?name=; `seen` in the response is the value before this read
pub async fn fetch_repo(
    State(state): State<AppState>,
    query: Result<Query<NameQuery>, QueryRejection>,
) -> ApiResult<Json<TrackedRepository>> {
    let Query(query) = query?;
    let name = RepoName::try_from(query)?;
    Ok(Json(state.service.fetch(&name).await?))
}

/// POST /repo {name, token}
pub async fn register_repo(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<RegisterBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TrackedRepository>)> {
    let Json(body) = body?;
    let request = RegisterRequest::try_from(body)?;
    let repo = state
        .service
        .register(caller.credentials(), &request)
        .await?;
    Ok((StatusCode::CREATED, Json(repo)))
}

/// PATCH /repo {token}
pub async fn refresh_repos(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<RefreshBody>, JsonRejection>,
) -> ApiResult<Json<RefreshReport>> {
    let Json(body) = body?;
    let request = RefreshRequest::try_from(body)?;
    Ok(Json(
        state
            .service
            .refresh_all(caller.credentials(), &request)
            .await?,
    ))
}

/// DELETE /repo?name=
pub async fn deregister_repo(
    State(state): State<AppState>,
    caller: Caller,
    query: Result<Query<NameQuery>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let Query(query) = query?;
    let name = RepoName::try_from(query)?;
    state.service.deregister(caller.credentials(), &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /user {username, password}
pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TrackedUser>)> {
    let Json(body) = body?;
    let credentials = UserCredentials::new(body.username, body.password)?;
    let user = state.service.signup(&credentials).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /user (Basic auth)
pub async fn whoami(
    State(state): State<AppState>,
    RequiredCaller(credentials): RequiredCaller,
) -> ApiResult<Json<TrackedUser>> {
    Ok(Json(state.service.whoami(&credentials).await?))
}

/// PATCH /user {new_password} (Basic auth with the current password)
pub async fn change_password(
    State(state): State<AppState>,
    RequiredCaller(credentials): RequiredCaller,
    body: Result<Json<ChangePasswordBody>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(body) = body?;
    let new_password = body.new_password.unwrap_or_default();
    state
        .service
        .change_password(&credentials, &new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /user (Basic auth)
pub async fn delete_user(
    State(state): State<AppState>,
    RequiredCaller(credentials): RequiredCaller,
) -> ApiResult<StatusCode> {
    state.service.delete_user(&credentials).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! HTTP surface
//!
//! A thin axum adapter over `TrackingService`. Routes:
//!
//! | Method | Path | Operation |
//! |---|---|---|
//! | GET | `/repo?name=` | fetch (flips seen) |
//! | POST | `/repo` | register |
//! | PATCH | `/repo` | refresh all |
//! | DELETE | `/repo?name=` | deregister |
//! | POST/GET/PATCH/DELETE | `/user` | signup / whoami / change password / delete |

mod auth;
mod error;
mod handlers;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::services::TrackingService;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub service: TrackingService,
}

impl AppState {
    pub fn new(service: TrackingService) -> Self {
        Self { service }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health))
        .route(
            "/repo",
            get(handlers::fetch_repo)
                .post(handlers::register_repo)
                .patch(handlers::refresh_repos)
                .delete(handlers::deregister_repo),
        )
        .route(
            "/user",
            get(handlers::whoami)
                .post(handlers::signup)
                .patch(handlers::change_password)
                .delete(handlers::delete_user),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` resolves, letting in-flight requests finish
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = listener.local_addr().context("Listener has no local address")?;
    info!(%addr, "Release tracker listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Release;
    use crate::infrastructure::upstream::scripted::ScriptedProvider;
    use crate::infrastructure::{Database, RegistryStore, UserStore};
    use crate::services::ReleaseRegistry;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use base64::Engine;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct Harness {
        app: Router,
        upstream: Arc<ScriptedProvider>,
    }

    async fn harness(require_login: bool) -> Harness {
        let db = Database::in_memory().await.unwrap();
        let upstream = Arc::new(ScriptedProvider::new());
        upstream.allow_token("tok");
        upstream.publish(
            "acme/app",
            Release::new("v1.0", Utc.timestamp_opt(1_000, 0).unwrap()),
        );
        let registry = ReleaseRegistry::new(RegistryStore::new(db.clone()), upstream.clone());
        let service = TrackingService::new(registry, UserStore::new(db), require_login);
        Harness {
            app: router(AppState::new(service)),
            upstream,
        }
    }

    fn basic(user: &str, password: &str) -> String {
        let raw = format!("{}:{}", user, password);
        format!("Basic {}", base64::engine::general_purpose::STANDARD.encode(raw))
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_repository_resource_flow() {
        let Harness { app, upstream } = harness(true).await;
        let alice = basic("alice", "pw");

        let (status, _) = call(
            &app,
            Method::POST,
            "/user",
            None,
            Some(json!({"username": "alice", "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = call(
            &app,
            Method::POST,
            "/repo",
            Some(alice.as_str()),
            Some(json!({"name": "acme/app", "token": "tok"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["release_title"], "v1.0");
        assert_eq!(body["seen"], false);
        assert!(body.get("credential_hash").is_none());

        let (status, body) = call(&app, Method::GET, "/repo?name=acme/app", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["seen"], false);
        let (_, body) = call(&app, Method::GET, "/repo?name=acme/app", None, None).await;
        assert_eq!(body["seen"], true);

        upstream.publish(
            "acme/app",
            Release::new("v1.1", Utc.timestamp_opt(2_000, 0).unwrap()),
        );
        let (status, body) = call(
            &app,
            Method::PATCH,
            "/repo",
            Some(alice.as_str()),
            Some(json!({"token": "tok"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["updated"][0]["release_title"], "v1.1");
        assert_eq!(body["updated"][0]["seen"], false);

        let (_, body) = call(
            &app,
            Method::PATCH,
            "/repo",
            Some(alice.as_str()),
            Some(json!({"token": "tok"})),
        )
        .await;
        assert_eq!(body["updated"], json!([]));

        let (status, body) =
            call(&app, Method::DELETE, "/repo?name=acme/app", Some(alice.as_str()), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, body) = call(&app, Method::GET, "/repo?name=acme/app", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_error_status_codes() {
        let Harness { app, .. } = harness(true).await;

        let (status, _) = call(
            &app,
            Method::POST,
            "/repo",
            None,
            Some(json!({"name": "acme/app", "token": "tok"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        call(
            &app,
            Method::POST,
            "/user",
            None,
            Some(json!({"username": "alice", "password": "pw"})),
        )
        .await;
        let alice = basic("alice", "pw");

        let (status, body) = call(
            &app,
            Method::POST,
            "/repo",
            Some(alice.as_str()),
            Some(json!({"name": "acme/app"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");

        let (status, _) = call(
            &app,
            Method::POST,
            "/repo",
            Some(alice.as_str()),
            Some(json!({"name": "acme/app", "token": "revoked"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(
            &app,
            Method::POST,
            "/repo",
            Some(alice.as_str()),
            Some(json!({"name": "acme/none", "token": "tok"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let register = json!({"name": "acme/app", "token": "tok"});
        call(&app, Method::POST, "/repo", Some(alice.as_str()), Some(register.clone())).await;
        let (status, body) = call(&app, Method::POST, "/repo", Some(alice.as_str()), Some(register)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "conflict");

        let (status, _) = call(&app, Method::DELETE, "/repo?name=acme/ghost", Some(alice.as_str()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, Method::GET, "/repo", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_user_resource() {
        let Harness { app, .. } = harness(true).await;
        let signup = json!({"username": "alice", "password": "pw"});

        let (status, body) = call(&app, Method::POST, "/user", None, Some(signup.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["username"], "alice");
        let (status, _) = call(&app, Method::POST, "/user", None, Some(signup)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = call(&app, Method::GET, "/user", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = call(&app, Method::GET, "/user", Some(basic("alice", "bad").as_str()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, body) = call(&app, Method::GET, "/user", Some(basic("alice", "pw").as_str()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alice");

        let (status, _) = call(
            &app,
            Method::PATCH,
            "/user",
            Some(basic("alice", "pw").as_str()),
            Some(json!({"new_password": "pw2"})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, Method::GET, "/user", Some(basic("alice", "pw").as_str()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(&app, Method::DELETE, "/user", Some(basic("alice", "pw2").as_str()), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, Method::GET, "/user", Some(basic("alice", "pw2").as_str()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_health() {
        let Harness { app, .. } = harness(true).await;
        let (status, body) = call(&app, Method::GET, "/healthz", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}

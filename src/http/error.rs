//! Status mapping for tracker errors

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::{ErrorKind, TrackerError};

pub type ApiResult<T> = Result<T, ApiError>;

/// Error body returned by every failing route
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorKind,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError(pub TrackerError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
            ErrorKind::Storage | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(TrackerError::invalid_input(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(TrackerError::invalid_input(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            TrackerError::Storage(e) => {
                tracing::error!(error = %e, "Storage failure while serving request");
                "Internal storage error".to_string()
            }
            TrackerError::Internal { message } => {
                tracing::error!(error = %message, "Internal failure while serving request");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            error: self.0.kind(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (TrackerError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (TrackerError::not_found("x"), StatusCode::NOT_FOUND),
            (TrackerError::conflict("x"), StatusCode::CONFLICT),
            (TrackerError::invalid_input("x"), StatusCode::BAD_REQUEST),
            (
                TrackerError::Upstream {
                    message: "x".to_string(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                TrackerError::Storage(sqlx::Error::PoolClosed),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                TrackerError::internal("x"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_internal_failure_details_stay_in_the_log() {
        let response = ApiError(TrackerError::internal("argon2 exploded")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "internal");
        assert!(!body["message"].as_str().unwrap().contains("argon2"));
    }
}

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::errors::DeadswitchError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Locked(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Locked(_) => StatusCode::LOCKED,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn service_unavailable<S: Into<String>>(msg: S) -> Self {
        ApiError::ServiceUnavailable(msg.into())
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    #[schema(example = "not_found")]
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let (error_kind, message) = match self {
            ApiError::NotFound(msg) => ("not_found", msg),
            ApiError::Locked(msg) => ("locked", msg),
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg),
            ApiError::Internal(msg) => ("internal_error", msg),
        };

        (status, Json(ErrorBody { error: error_kind.to_string(), message })).into_response()
    }
}

impl From<DeadswitchError> for ApiError {
    fn from(err: DeadswitchError) -> Self {
        match err.status_code() {
            404 => ApiError::NotFound(err.to_string()),
            423 => ApiError::Locked(err.to_string()),
            _ => {
                // Store details stay in the logs
                tracing::error!(error = %err, "Request failed with infrastructure error");
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_not_found() {
        for err in [
            DeadswitchError::validation("bad body"),
            DeadswitchError::not_found("secret", "a/b"),
            DeadswitchError::conflict("taken", "secret"),
        ] {
            assert_eq!(ApiError::from(err).status_code(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn test_locked_maps_to_423() {
        let api = ApiError::from(DeadswitchError::locked("secret", "a/b"));
        assert_eq!(api.status_code(), StatusCode::LOCKED);
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let api = ApiError::from(DeadswitchError::database(
            sqlx::Error::PoolTimedOut,
            "Failed to read last seen for client 'alice'",
        ));
        match api {
            ApiError::Internal(message) => assert!(!message.contains("alice")),
            other => panic!("expected internal error, got {other:?}"),
        }
    }
}

//! Vault endpoints.
//!
//! The path kind (`alive` or `store`), method, identifiers and body all go
//! through [`VaultRequest::parse_raw`], so unknown kinds, unsupported
//! methods and malformed deposits share one rejection path.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::{error::ApiError, routes::ApiState};
use crate::vault::{ReleasedSecret, VaultRequest, VaultResponse};

/// Acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = "success")]
    pub status: String,
}

impl StatusResponse {
    fn success() -> Self {
        Self { status: "success".to_string() }
    }
}

/// Deposit body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DepositSecretBody {
    /// Secret payload
    pub key: String,
    /// Wait-units of silence required before release
    #[schema(minimum = 0)]
    pub process_after: u32,
}

/// Heartbeat for a client
#[utoipa::path(
    method(get, post),
    path = "/api/vault/alive/{client_id}",
    tag = "vault",
    params(("client_id" = String, Path, description = "Client identifier")),
    responses(
        (status = 200, description = "Heartbeat recorded", body = StatusResponse),
        (status = 404, description = "Invalid request", body = crate::api::error::ErrorBody)
    )
)]
pub async fn client_handler(
    State(state): State<ApiState>,
    method: Method,
    Path((kind, client_id)): Path<(String, String)>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    dispatch(&state, &kind, &method, &client_id, None, body).await
}

/// Read, delete or deposit a secret
#[utoipa::path(
    method(get, post, delete),
    path = "/api/vault/store/{client_id}/{secret_id}",
    tag = "vault",
    params(
        ("client_id" = String, Path, description = "Client identifier"),
        ("secret_id" = String, Path, description = "Secret identifier")
    ),
    request_body(content = DepositSecretBody, description = "Required for POST"),
    responses(
        (status = 200, description = "Secret released (GET) or deleted (DELETE)", body = ReleasedSecret),
        (status = 201, description = "Secret deposited", body = StatusResponse),
        (status = 404, description = "Missing secret, invalid request or existing key", body = crate::api::error::ErrorBody),
        (status = 423, description = "Client has not been silent long enough", body = crate::api::error::ErrorBody),
        (status = 500, description = "Storage failure", body = crate::api::error::ErrorBody)
    )
)]
pub async fn secret_handler(
    State(state): State<ApiState>,
    method: Method,
    Path((kind, client_id, secret_id)): Path<(String, String, String)>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    dispatch(&state, &kind, &method, &client_id, Some(&secret_id), body).await
}

async fn dispatch(
    state: &ApiState,
    kind: &str,
    method: &Method,
    client_id: &str,
    secret_id: Option<&str>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let body = body.map_err(|e| ApiError::not_found(format!("Unreadable request body: {}", e)))?;
    let body = (!body.is_empty()).then_some(body.as_ref());

    let request = VaultRequest::parse_raw(kind, method.as_str(), Some(client_id), secret_id, body)
        .map_err(|e| {
            tracing::debug!(error = %e, kind, method = %method, "Rejected vault request");
            ApiError::from(e)
        })?;

    tracing::debug!(
        operation = request.operation(),
        client_id = %request.client_id(),
        "Dispatching vault request"
    );

    let response = match state.vault.handle(request).await? {
        VaultResponse::Ack => (StatusCode::OK, Json(StatusResponse::success())).into_response(),
        VaultResponse::Created => {
            (StatusCode::CREATED, Json(StatusResponse::success())).into_response()
        }
        VaultResponse::Secret(secret) => (StatusCode::OK, Json(secret)).into_response(),
    };

    Ok(response)
}

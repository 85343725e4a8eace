use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health_handler,
        crate::api::handlers::health::ready_handler,
        crate::api::handlers::vault::client_handler,
        crate::api::handlers::vault::secret_handler,
    ),
    components(schemas(
        crate::api::handlers::HealthResponse,
        crate::api::handlers::StatusResponse,
        crate::api::handlers::DepositSecretBody,
        crate::api::error::ErrorBody,
        crate::vault::ReleasedSecret,
    )),
    tags(
        (name = "vault", description = "Heartbeats and escrowed secrets"),
        (name = "health", description = "Liveness and readiness probes")
    ),
    info(title = "deadswitch", description = "Dead man's switch secret vault")
)]
pub struct ApiDoc;

/// Serves the OpenAPI document as JSON
pub fn docs_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}

pub mod health;
pub mod vault;

pub use health::{health_handler, ready_handler, HealthResponse};
pub use vault::{client_handler, secret_handler, DepositSecretBody, StatusResponse};

use crate::api::error::ApiError;

/// Fallback for unknown routes
pub async fn not_found_handler(uri: axum::http::Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}


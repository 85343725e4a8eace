//! # HTTP API
//!
//! Axum router exposing the vault operations, health probes and the
//! OpenAPI document.

pub mod docs;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::{build_router, build_router_with_config, ApiState};
pub use server::start_api_server;

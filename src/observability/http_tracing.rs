//! # HTTP Request Metrics Middleware
//!
//! Records a counter and a latency histogram per request, labelled with the
//! matched route template rather than the raw path so client and secret
//! identifiers never become label values.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Label used for requests that matched no route
const UNMATCHED_PATH: &str = "unmatched";

/// Axum middleware recording request count and latency
pub async fn track_http_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = metrics_path(request.extensions().get::<MatchedPath>());
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed = start.elapsed();

    tracing::debug!(
        method = %method,
        path = %path,
        status,
        elapsed_ms = elapsed.as_millis() as u64,
        "HTTP request completed"
    );

    super::metrics::record_http_request(&method, &path, status, elapsed.as_secs_f64());

    response
}

fn metrics_path(matched: Option<&MatchedPath>) -> String {
    matched.map(|path| path.as_str().to_string()).unwrap_or_else(|| UNMATCHED_PATH.to_string())
}

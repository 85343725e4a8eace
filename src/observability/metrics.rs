//! # Metrics Collection
//!
//! Prometheus metrics for the vault. Recording goes through the global
//! [`MetricsRecorder`] once [`init_metrics`] has run; before that every
//! `record_*` call is a no-op.

use crate::config::ObservabilityConfig;
use crate::errors::{DeadswitchError, Result};
use ::tracing::info;
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::net::SocketAddr;

const SECRET_OPERATIONS: &[&str] = &["get", "delete", "deposit"];
const SECRET_OUTCOMES: &[&str] = &["success", "not_found", "locked", "conflict", "error"];

static METRICS: OnceCell<MetricsRecorder> = OnceCell::new();

/// Metrics recorder that tracks application metrics
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorder;

impl MetricsRecorder {
    pub fn new() -> Self {
        Self
    }

    /// Record an HTTP request
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration: f64) {
        counter!(
            "http_requests_total",
            "method" => method.to_string(),
            "path" => path.to_string(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            "http_request_duration_seconds",
            "method" => method.to_string(),
            "path" => path.to_string()
        )
        .record(duration);
    }

    pub fn record_heartbeat(&self) {
        counter!("vault_heartbeats_total").increment(1);
    }

    /// Record a secret operation and how it ended
    pub fn record_secret_operation(&self, operation: &str, outcome: &str) {
        counter!(
            "vault_secret_operations_total",
            "operation" => operation.to_string(),
            "outcome" => outcome.to_string()
        )
        .increment(1);
    }

    /// Register vault metrics so Prometheus exports appear before events occur.
    pub fn register_vault_metrics(&self) {
        describe_counter!("vault_heartbeats_total", Unit::Count, "Heartbeats recorded");
        describe_counter!(
            "vault_secret_operations_total",
            Unit::Count,
            "Secret operations grouped by operation and outcome"
        );
        describe_counter!("http_requests_total", Unit::Count, "HTTP requests served");
        describe_histogram!(
            "http_request_duration_seconds",
            Unit::Seconds,
            "HTTP request latency"
        );

        counter!("vault_heartbeats_total").absolute(0);
        for operation in SECRET_OPERATIONS {
            for outcome in SECRET_OUTCOMES {
                counter!(
                    "vault_secret_operations_total",
                    "operation" => *operation,
                    "outcome" => *outcome
                )
                .absolute(0);
            }
        }
    }
}

/// Install the Prometheus exporter and the global recorder
pub fn init_metrics(config: &ObservabilityConfig) -> Result<()> {
    if !config.enable_metrics {
        return Ok(());
    }

    let metrics_addr = config.metrics_bind_address();
    let socket_addr: SocketAddr = metrics_addr.parse().map_err(|e| {
        DeadswitchError::config(format!("Invalid metrics bind address '{}': {}", metrics_addr, e))
    })?;

    PrometheusBuilder::new()
        .with_http_listener(socket_addr)
        .add_global_label("service", &config.service_name)
        .install()
        .map_err(|e| {
            DeadswitchError::config(format!("Failed to initialize metrics exporter: {}", e))
        })?;

    enable_recording().register_vault_metrics();

    info!(
        metrics_addr = %metrics_addr,
        service_name = %config.service_name,
        "Metrics collection initialized"
    );

    Ok(())
}

/// Route the `record_*` helpers to the `metrics` facade. Done by
/// [`init_metrics`]; callers with their own recorder use it directly.
pub fn enable_recording() -> &'static MetricsRecorder {
    METRICS.get_or_init(MetricsRecorder::new)
}

/// Get the global metrics recorder
pub fn get_metrics() -> Option<&'static MetricsRecorder> {
    METRICS.get()
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: f64) {
    if let Some(metrics) = get_metrics() {
        metrics.record_http_request(method, path, status, duration);
    }
}

pub fn record_heartbeat() {
    if let Some(metrics) = get_metrics() {
        metrics.record_heartbeat();
    }
}

pub fn record_secret_operation(operation: &str, outcome: &str) {
    if let Some(metrics) = get_metrics() {
        metrics.record_secret_operation(operation, outcome);
    }
}

//! # Observability Infrastructure
//!
//! Structured logging through `tracing`, Prometheus metrics through the
//! `metrics` facade, and HTTP request metrics middleware.

pub mod http_tracing;
pub mod logging;
pub mod metrics;

pub use http_tracing::track_http_requests;
pub use logging::{init_logging, log_config_info};
pub use metrics::{init_metrics, MetricsRecorder};

use crate::config::ObservabilityConfig;
use crate::errors::Result;
use ::tracing::info;

/// Initialize logging, then metrics if enabled
pub fn init_observability(config: &ObservabilityConfig, verbose: bool) -> Result<()> {
    init_logging(config, verbose)?;

    if config.enable_metrics {
        init_metrics(config)?;
    }

    info!(
        service_name = %config.service_name,
        log_level = %config.log_level,
        json_logging = config.json_logging,
        metrics_enabled = config.enable_metrics,
        "Observability initialized"
    );

    Ok(())
}

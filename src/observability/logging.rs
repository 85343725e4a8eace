//! # Structured Logging
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` wins over the
//! configured level when set.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{AppConfig, ObservabilityConfig};
use crate::errors::{DeadswitchError, Result};

/// Install the global subscriber
pub fn init_logging(config: &ObservabilityConfig, verbose: bool) -> Result<()> {
    let filter = build_filter(config, verbose)?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json_logging {
        registry.with(fmt::layer().json().with_current_span(true).with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    if installed.is_err() {
        // Subscriber already set elsewhere (e.g. integration tests); ignore.
        tracing::debug!("Global tracing subscriber already installed");
    }

    Ok(())
}

fn build_filter(config: &ObservabilityConfig, verbose: bool) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let level = if verbose { "debug" } else { config.log_level.as_str() };
    EnvFilter::try_new(level).map_err(|e| {
        DeadswitchError::config(format!("Invalid log level '{}': {}", config.log_level, e))
    })
}

/// Log configuration at startup
pub fn log_config_info(config: &AppConfig) {
    tracing::info!(
        server_address = %config.server.bind_address(),
        storage_backend = %config.storage.backend,
        unit_seconds = config.vault.unit_seconds,
        conceal_locked = config.vault.conceal_locked,
        seed_liveness_on_first_access = config.vault.seed_liveness_on_first_access,
        metrics_enabled = config.observability.enable_metrics,
        "deadswitch configuration"
    );
}

//! # Configuration Settings
//!
//! Defines the configuration structure for the deadswitch vault.

use crate::errors::{DeadswitchError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Persistence backend configuration
    #[validate(nested)]
    pub storage: StorageConfig,

    /// Release behaviour
    #[validate(nested)]
    pub vault: VaultConfig,

    /// Observability configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(DeadswitchError::from)?;
        self.validate_custom()
    }

    /// Cross-field rules the validator derive cannot express
    fn validate_custom(&self) -> Result<()> {
        if self.observability.enable_metrics && self.server.port == self.observability.metrics_port
        {
            return Err(DeadswitchError::validation(
                "Server and metrics ports cannot be the same",
            ));
        }

        if self.storage.backend == StorageBackendKind::Sqlite
            && !self.storage.database_url.starts_with("sqlite:")
        {
            return Err(DeadswitchError::validation_field(
                "Database URL must start with 'sqlite:' for the sqlite backend",
                "storage.database_url",
            ));
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,

    /// Maximum request body size in bytes
    #[validate(range(min = 1024, message = "Max body size must be at least 1KB"))]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            timeout_seconds: 30,
            max_body_size: 64 * 1024,
        }
    }
}

impl ServerConfig {
    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Which store implementation backs liveness and secrets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    /// Process-local maps; state is lost on restart
    Memory,
    /// SQLite database with one table per store
    #[default]
    Sqlite,
}

impl std::fmt::Display for StorageBackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendKind::Memory => write!(f, "memory"),
            StorageBackendKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackendKind,

    /// Database connection URL (sqlite backend only)
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub database_url: String,

    /// Maximum number of connections in the pool
    #[validate(range(min = 1, max = 100, message = "Max connections must be between 1 and 100"))]
    pub max_connections: u32,

    /// Connection timeout in seconds
    #[validate(range(
        min = 1,
        max = 60,
        message = "Connect timeout must be between 1 and 60 seconds"
    ))]
    pub connect_timeout_seconds: u64,

    /// Apply pending migrations when the pool is created
    pub auto_migrate: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::default(),
            database_url: "sqlite://./data/deadswitch.db".to_string(),
            max_connections: 5,
            connect_timeout_seconds: 10,
            auto_migrate: true,
        }
    }
}

impl StorageConfig {
    /// In-memory store, used by tests and throwaway deployments
    pub fn memory() -> Self {
        Self { backend: StorageBackendKind::Memory, ..Default::default() }
    }

    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Whether the URL points at a private in-memory SQLite database
    pub fn is_in_memory_sqlite(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

/// Release behaviour of the vault
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct VaultConfig {
    /// Length of one wait-unit in seconds
    #[validate(range(min = 1, message = "Wait unit must be at least one second"))]
    pub unit_seconds: u64,

    /// Report locked secrets as not found instead of locked
    pub conceal_locked: bool,

    /// Persist "now" as last-seen the first time a client without a
    /// heartbeat record touches a secret
    pub seed_liveness_on_first_access: bool,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            unit_seconds: crate::domain::DEFAULT_UNIT_SECONDS,
            conceal_locked: false,
            seed_liveness_on_first_access: false,
        }
    }
}

/// Observability configuration for logging and metrics
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus exporter
    pub enable_metrics: bool,

    /// Metrics listener port
    #[validate(range(min = 1, message = "Metrics port must be between 1 and 65535"))]
    pub metrics_port: u16,

    /// Service name attached to metrics
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error), overridden by RUST_LOG
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            enable_metrics: true,
            metrics_port: 9090,
            service_name: "deadswitch".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}

impl ObservabilityConfig {
    /// Get metrics bind address
    pub fn metrics_bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.metrics_port)
    }
}

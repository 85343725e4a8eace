//! # Configuration Management
//!
//! Configuration is layered: built-in defaults, then an optional YAML/TOML/JSON
//! file, then `DEADSWITCH_`-prefixed environment variables. Nested keys use a
//! double underscore, e.g. `DEADSWITCH_VAULT__UNIT_SECONDS=60`.

pub mod settings;

pub use settings::{
    AppConfig, ObservabilityConfig, ServerConfig, StorageBackendKind, StorageConfig, VaultConfig,
};

use std::collections::HashMap;
use std::path::Path;

use crate::errors::Result;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "DEADSWITCH";

/// Load configuration from defaults, an optional file and the process environment
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    load_config_with_env(path, None)
}

/// Same as [`load_config`], reading overrides from `env` instead of the
/// process environment when given.
pub fn load_config_with_env(
    path: Option<&Path>,
    env: Option<HashMap<String, String>>,
) -> Result<AppConfig> {
    let defaults = config::Config::try_from(&AppConfig::default())?;
    let mut builder = config::Config::builder().add_source(defaults);

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(env),
    );

    let config: AppConfig = builder.build()?.try_deserialize()?;
    config.validate()?;

    tracing::debug!(
        file = ?path.map(|p| p.display().to_string()),
        backend = %config.storage.backend,
        "Configuration loaded"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = load_config_with_env(None, env(&[])).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.vault.unit_seconds, 3600);
    }

    #[test]
    fn test_env_overrides() {
        let config = load_config_with_env(
            None,
            env(&[
                ("DEADSWITCH_SERVER__PORT", "9000"),
                ("DEADSWITCH_VAULT__UNIT_SECONDS", "60"),
                ("DEADSWITCH_VAULT__CONCEAL_LOCKED", "true"),
                ("DEADSWITCH_STORAGE__BACKEND", "memory"),
                ("DEADSWITCH_OBSERVABILITY__LOG_LEVEL", "debug"),
            ]),
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.vault.unit_seconds, 60);
        assert!(config.vault.conceal_locked);
        assert_eq!(config.storage.backend, StorageBackendKind::Memory);
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn test_file_then_env_precedence() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "server:\n  port: 7000\nvault:\n  unit_seconds: 120\n  seed_liveness_on_first_access: true\n"
        )
        .unwrap();

        let config =
            load_config_with_env(Some(file.path()), env(&[("DEADSWITCH_SERVER__PORT", "7100")]))
                .unwrap();

        assert_eq!(config.server.port, 7100);
        assert_eq!(config.vault.unit_seconds, 120);
        assert!(config.vault.seed_liveness_on_first_access);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = load_config_with_env(None, env(&[("DEADSWITCH_VAULT__UNIT_SECONDS", "0")]));
        assert!(result.is_err());

        let result = load_config_with_env(None, env(&[("DEADSWITCH_SERVER__PORT", "not-a-port")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_rejected() {
        let result = load_config_with_env(Some(Path::new("/nonexistent/deadswitch.yaml")), env(&[]));
        assert!(result.is_err());
    }
}

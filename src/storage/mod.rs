//! # Storage and Persistence
//!
//! Liveness and secret stores behind async traits, with an in-memory
//! implementation and a SQLite one.

pub mod backend;
pub mod conformance;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repositories;

use std::sync::Arc;

pub use backend::{LivenessStore, PutOutcome, SecretStore};
pub use memory::{MemoryLivenessStore, MemorySecretStore};
pub use migrations::{list_applied_migrations, pending_migration_count, MigrationInfo};
pub use pool::{create_pool, DbPool};
pub use repositories::{LivenessRepository, SecretRepository};

use crate::config::{StorageBackendKind, StorageConfig};
use crate::errors::Result;

/// Run database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    migrations::run_migrations(pool).await
}

/// The pair of stores a vault runs on
#[derive(Debug, Clone)]
pub struct VaultStores {
    pub liveness: Arc<dyn LivenessStore>,
    pub secrets: Arc<dyn SecretStore>,
    /// Present for the SQLite backend, used by readiness checks
    pub pool: Option<DbPool>,
}

impl VaultStores {
    pub fn memory() -> Self {
        Self {
            liveness: Arc::new(MemoryLivenessStore::new()),
            secrets: Arc::new(MemorySecretStore::new()),
            pool: None,
        }
    }

    pub fn sqlite(pool: DbPool) -> Self {
        Self {
            liveness: Arc::new(LivenessRepository::new(pool.clone())),
            secrets: Arc::new(SecretRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Check the backing database answers queries
    pub async fn ping(&self) -> Result<()> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1")
                .execute(pool)
                .await
                .map_err(|e| crate::errors::DeadswitchError::database(e, "Readiness probe failed"))?;
        }
        Ok(())
    }
}

/// Build the stores selected by configuration
pub async fn open_stores(config: &StorageConfig) -> Result<VaultStores> {
    match config.backend {
        StorageBackendKind::Memory => {
            tracing::warn!("Using in-memory storage; secrets will not survive a restart");
            Ok(VaultStores::memory())
        }
        StorageBackendKind::Sqlite => Ok(VaultStores::sqlite(create_pool(config).await?)),
    }
}

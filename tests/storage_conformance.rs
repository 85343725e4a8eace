//! Store conformance suite, run against the in-memory and SQLite backends.
//!
//! Each check gets a fresh store so failures point at a single contract rule.

use std::sync::Arc;

use deadswitch::config::{StorageBackendKind, StorageConfig};
use deadswitch::storage::{
    conformance, create_pool, LivenessRepository, MemoryLivenessStore, MemorySecretStore,
    SecretRepository,
};

async fn sqlite_pool() -> deadswitch::storage::DbPool {
    let config = StorageConfig {
        backend: StorageBackendKind::Sqlite,
        database_url: "sqlite::memory:".to_string(),
        ..Default::default()
    };
    create_pool(&config).await.expect("create sqlite pool")
}

macro_rules! liveness_checks {
    ($($check:ident),* $(,)?) => {
        mod liveness_memory {
            use super::*;
            $(
                #[tokio::test]
                async fn $check() {
                    conformance::$check(&MemoryLivenessStore::new()).await;
                }
            )*
        }

        mod liveness_sqlite {
            use super::*;
            $(
                #[tokio::test]
                async fn $check() {
                    conformance::$check(&LivenessRepository::new(sqlite_pool().await)).await;
                }
            )*
        }
    };
}

macro_rules! secret_checks {
    ($($check:ident),* $(,)?) => {
        mod secret_memory {
            use super::*;
            $(
                #[tokio::test]
                async fn $check() {
                    conformance::$check(&MemorySecretStore::new()).await;
                }
            )*
        }

        mod secret_sqlite {
            use super::*;
            $(
                #[tokio::test]
                async fn $check() {
                    conformance::$check(&SecretRepository::new(sqlite_pool().await)).await;
                }
            )*
        }
    };
}

liveness_checks!(
    liveness_missing_client_is_none,
    liveness_heartbeat_then_get,
    liveness_heartbeat_overwrites,
    liveness_clients_are_independent,
    liveness_record_if_absent_keeps_existing,
    liveness_heartbeat_clears_seed_mark,
);

secret_checks!(
    secret_missing_is_none,
    secret_put_then_get,
    secret_put_does_not_overwrite,
    secret_keys_are_scoped_by_client,
    secret_wait_period_extremes,
    secret_delete_frees_key,
    secret_delete_missing_is_noop,
);

#[tokio::test]
async fn memory_concurrent_puts_single_winner() {
    conformance::secret_concurrent_puts_single_winner(Arc::new(MemorySecretStore::new())).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_concurrent_puts_single_winner() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = StorageConfig {
        backend: StorageBackendKind::Sqlite,
        database_url: format!("sqlite://{}", dir.path().join("race.db").display()),
        max_connections: 4,
        ..Default::default()
    };
    let pool = create_pool(&config).await.expect("create file pool");

    conformance::secret_concurrent_puts_single_winner(Arc::new(SecretRepository::new(pool))).await;
}

#[tokio::test]
async fn sqlite_data_survives_reconnect() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = StorageConfig {
        backend: StorageBackendKind::Sqlite,
        database_url: format!("sqlite://{}", dir.path().join("vault.db").display()),
        ..Default::default()
    };

    let client = deadswitch::domain::ClientId::parse("alice").unwrap();
    let secret = deadswitch::domain::SecretId::parse("s1").unwrap();

    {
        use deadswitch::storage::{LivenessStore, SecretStore};
        let pool = create_pool(&config).await.expect("first pool");
        LivenessRepository::new(pool.clone()).record_heartbeat(&client, 42).await.unwrap();
        SecretRepository::new(pool.clone()).put(&client, &secret, "kept", 3).await.unwrap();
        pool.close().await;
    }

    use deadswitch::storage::{LivenessStore, SecretStore};
    let pool = create_pool(&config).await.expect("second pool");
    assert_eq!(LivenessRepository::new(pool.clone()).get_last_seen(&client).await.unwrap(), Some(42));
    let stored = SecretRepository::new(pool).get(&client, &secret).await.unwrap().expect("present");
    assert_eq!(stored.payload, "kept");
    assert_eq!(stored.wait_periods, 3);
}

//! Secret repository. Rows are insert-once: a deposit never replaces an
//! existing (client, secret) pair.

use async_trait::async_trait;
use sqlx::FromRow;
use tracing::instrument;

use crate::domain::{ClientId, Secret, SecretId};
use crate::errors::{DeadswitchError, Result};
use crate::storage::{DbPool, PutOutcome, SecretStore};

/// Database row structure for secrets
#[derive(Debug, Clone, FromRow)]
struct SecretRow {
    pub client_id: ClientId,
    pub secret_id: SecretId,
    pub payload: String,
    pub wait_periods: i64,
}

impl TryFrom<SecretRow> for Secret {
    type Error = DeadswitchError;

    fn try_from(row: SecretRow) -> Result<Self> {
        let wait_periods = u32::try_from(row.wait_periods).map_err(|_| {
            DeadswitchError::internal(format!(
                "Stored wait_periods {} out of range for secret '{}/{}'",
                row.wait_periods, row.client_id, row.secret_id
            ))
        })?;

        Ok(Secret {
            client_id: row.client_id,
            secret_id: row.secret_id,
            payload: row.payload,
            wait_periods,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SecretRepository {
    pool: DbPool,
}

impl SecretRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SecretStore for SecretRepository {
    #[instrument(skip(self), fields(client_id = %client_id, secret_id = %secret_id), name = "db_get_secret")]
    async fn get(&self, client_id: &ClientId, secret_id: &SecretId) -> Result<Option<Secret>> {
        let row = sqlx::query_as::<_, SecretRow>(
            "SELECT client_id, secret_id, payload, wait_periods FROM secrets \
             WHERE client_id = $1 AND secret_id = $2",
        )
        .bind(client_id)
        .bind(secret_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, client_id = %client_id, secret_id = %secret_id, "Failed to get secret");
            DeadswitchError::database(
                e,
                format!("Failed to get secret '{}/{}'", client_id, secret_id),
            )
        })?;

        row.map(Secret::try_from).transpose()
    }

    #[instrument(skip(self, payload), fields(client_id = %client_id, secret_id = %secret_id), name = "db_put_secret")]
    async fn put(
        &self,
        client_id: &ClientId,
        secret_id: &SecretId,
        payload: &str,
        wait_periods: u32,
    ) -> Result<PutOutcome> {
        let result = sqlx::query(
            "INSERT INTO secrets (client_id, secret_id, payload, wait_periods) VALUES ($1, $2, $3, $4) \
             ON CONFLICT(client_id, secret_id) DO NOTHING",
        )
        .bind(client_id)
        .bind(secret_id)
        .bind(payload)
        .bind(i64::from(wait_periods))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, client_id = %client_id, secret_id = %secret_id, "Failed to store secret");
            DeadswitchError::database(
                e,
                format!("Failed to store secret '{}/{}'", client_id, secret_id),
            )
        })?;

        if result.rows_affected() == 0 {
            return Ok(PutOutcome::Conflict);
        }

        tracing::info!(client_id = %client_id, secret_id = %secret_id, wait_periods, "Stored new secret");
        Ok(PutOutcome::Created)
    }

    #[instrument(skip(self), fields(client_id = %client_id, secret_id = %secret_id), name = "db_delete_secret")]
    async fn delete(&self, client_id: &ClientId, secret_id: &SecretId) -> Result<()> {
        let result = sqlx::query("DELETE FROM secrets WHERE client_id = $1 AND secret_id = $2")
            .bind(client_id)
            .bind(secret_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, client_id = %client_id, secret_id = %secret_id, "Failed to delete secret");
                DeadswitchError::database(
                    e,
                    format!("Failed to delete secret '{}/{}'", client_id, secret_id),
                )
            })?;

        if result.rows_affected() > 0 {
            tracing::info!(client_id = %client_id, secret_id = %secret_id, "Deleted secret");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StorageBackendKind, StorageConfig};
    use crate::storage::create_pool;

    async fn repository() -> (SecretRepository, DbPool) {
        let config = StorageConfig {
            backend: StorageBackendKind::Sqlite,
            database_url: "sqlite::memory:".to_string(),
            ..Default::default()
        };
        let pool = create_pool(&config).await.unwrap();
        (SecretRepository::new(pool.clone()), pool)
    }

    #[tokio::test]
    async fn test_typed_ids_round_trip_through_columns() {
        let (repo, pool) = repository().await;
        let client = ClientId::parse("7f9c0a1e-client").unwrap();
        let secret = SecretId::parse("backup key #2").unwrap();

        repo.put(&client, &secret, "payload", 3).await.unwrap();

        let stored: (String, String) =
            sqlx::query_as("SELECT client_id, secret_id FROM secrets").fetch_one(&pool).await.unwrap();
        assert_eq!(stored, ("7f9c0a1e-client".to_string(), "backup key #2".to_string()));

        let found = repo.get(&client, &secret).await.unwrap().unwrap();
        assert_eq!(found.client_id, client);
        assert_eq!(found.secret_id, secret);
    }

    #[tokio::test]
    async fn test_empty_stored_id_is_rejected_on_read() {
        let (_repo, pool) = repository().await;
        sqlx::query(
            "INSERT INTO secrets (client_id, secret_id, payload, wait_periods) VALUES ('c', '', 'p', 1)",
        )
        .execute(&pool)
        .await
        .unwrap();

        // No lookup can address this row; decoding it must still fail
        let rows = sqlx::query_as::<_, SecretRow>(
            "SELECT client_id, secret_id, payload, wait_periods FROM secrets",
        )
        .fetch_all(&pool)
        .await;
        assert!(rows.is_err());
    }

    #[tokio::test]
    async fn test_out_of_range_wait_periods_is_reported() {
        let (repo, pool) = repository().await;
        sqlx::query(
            "INSERT INTO secrets (client_id, secret_id, payload, wait_periods) VALUES ('c', 's', 'p', 9999999999)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let result = repo.get(&ClientId::parse("c").unwrap(), &SecretId::parse("s").unwrap()).await;
        assert!(matches!(result, Err(DeadswitchError::Internal { .. })));
    }
}

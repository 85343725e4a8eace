//! Liveness repository: one row per client holding its last contact time.

use async_trait::async_trait;
use sqlx::FromRow;
use tracing::instrument;

use crate::domain::{ClientId, Liveness};
use crate::errors::{DeadswitchError, Result};
use crate::storage::{DbPool, LivenessStore};

#[derive(Debug, Clone, Copy, FromRow)]
struct LivenessRow {
    last_seen: i64,
    seeded: bool,
}

impl From<LivenessRow> for Liveness {
    fn from(row: LivenessRow) -> Self {
        Self { last_seen: row.last_seen, seeded: row.seeded }
    }
}

#[derive(Debug, Clone)]
pub struct LivenessRepository {
    pool: DbPool,
}

impl LivenessRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LivenessStore for LivenessRepository {
    #[instrument(skip(self), fields(client_id = %client_id), name = "db_record_heartbeat")]
    async fn record_heartbeat(&self, client_id: &ClientId, at: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO liveness (client_id, last_seen, seeded) VALUES ($1, $2, 0) \
             ON CONFLICT(client_id) DO UPDATE SET last_seen = excluded.last_seen, seeded = 0",
        )
        .bind(client_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, client_id = %client_id, "Failed to record heartbeat");
            DeadswitchError::database(
                e,
                format!("Failed to record heartbeat for client '{}'", client_id),
            )
        })?;

        Ok(())
    }

    #[instrument(skip(self), fields(client_id = %client_id), name = "db_get_liveness")]
    async fn get_liveness(&self, client_id: &ClientId) -> Result<Option<Liveness>> {
        let row = sqlx::query_as::<_, LivenessRow>(
            "SELECT last_seen, seeded FROM liveness WHERE client_id = $1",
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, client_id = %client_id, "Failed to read last seen");
            DeadswitchError::database(
                e,
                format!("Failed to read last seen for client '{}'", client_id),
            )
        })?;

        Ok(row.map(Liveness::from))
    }

    #[instrument(skip(self), fields(client_id = %client_id), name = "db_record_if_absent")]
    async fn record_if_absent(&self, client_id: &ClientId, at: i64) -> Result<Liveness> {
        // The no-op update makes RETURNING yield the existing row on conflict
        let row = sqlx::query_as::<_, LivenessRow>(
            "INSERT INTO liveness (client_id, last_seen, seeded) VALUES ($1, $2, 1) \
             ON CONFLICT(client_id) DO UPDATE SET last_seen = liveness.last_seen \
             RETURNING last_seen, seeded",
        )
        .bind(client_id)
        .bind(at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, client_id = %client_id, "Failed to seed liveness");
            DeadswitchError::database(
                e,
                format!("Failed to seed liveness for client '{}'", client_id),
            )
        })?;

        Ok(row.into())
    }
}

//! Store traits the vault is written against.
//!
//! Both stores rely only on per-key atomicity. Nothing in the vault needs a
//! transaction spanning liveness and secrets.

use async_trait::async_trait;

use crate::domain::{ClientId, Liveness, Secret, SecretId};
use crate::errors::Result;

/// Outcome of a no-overwrite insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Created,
    /// A secret already exists under that key; it was left untouched
    Conflict,
}

/// Last heartbeat per client
#[async_trait]
pub trait LivenessStore: Send + Sync + std::fmt::Debug {
    /// Overwrite the client's last-seen time, whatever was stored before.
    /// Clears the first-contact mark.
    async fn record_heartbeat(&self, client_id: &ClientId, at: i64) -> Result<()>;

    async fn get_liveness(&self, client_id: &ClientId) -> Result<Option<Liveness>>;

    async fn get_last_seen(&self, client_id: &ClientId) -> Result<Option<i64>> {
        Ok(self.get_liveness(client_id).await?.map(|record| record.last_seen))
    }

    /// Store a first-contact record at `at` only if the client has no record
    /// yet; returns the record that is stored afterwards
    async fn record_if_absent(&self, client_id: &ClientId, at: i64) -> Result<Liveness>;
}

/// Secrets keyed by (client, secret)
#[async_trait]
pub trait SecretStore: Send + Sync + std::fmt::Debug {
    async fn get(&self, client_id: &ClientId, secret_id: &SecretId) -> Result<Option<Secret>>;

    /// Insert unless the key is taken. Check and insert happen atomically.
    async fn put(
        &self,
        client_id: &ClientId,
        secret_id: &SecretId,
        payload: &str,
        wait_periods: u32,
    ) -> Result<PutOutcome>;

    /// Remove the secret. Removing an absent key is not an error.
    async fn delete(&self, client_id: &ClientId, secret_id: &SecretId) -> Result<()>;
}

//! In-memory store implementations.
//!
//! Backed by [`DashMap`], whose sharded locking gives the per-key atomicity
//! the store contracts ask for. Data is lost when the process exits.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::backend::{LivenessStore, PutOutcome, SecretStore};
use crate::domain::{ClientId, Liveness, Secret, SecretId};
use crate::errors::Result;

#[derive(Debug, Default)]
pub struct MemoryLivenessStore {
    records: DashMap<ClientId, Liveness>,
}

impl MemoryLivenessStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LivenessStore for MemoryLivenessStore {
    async fn record_heartbeat(&self, client_id: &ClientId, at: i64) -> Result<()> {
        self.records.insert(client_id.clone(), Liveness::heartbeat(at));
        Ok(())
    }

    async fn get_liveness(&self, client_id: &ClientId) -> Result<Option<Liveness>> {
        Ok(self.records.get(client_id).map(|entry| *entry.value()))
    }

    async fn record_if_absent(&self, client_id: &ClientId, at: i64) -> Result<Liveness> {
        Ok(*self.records.entry(client_id.clone()).or_insert(Liveness::seeded(at)).value())
    }
}

#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: DashMap<(ClientId, SecretId), Secret>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get(&self, client_id: &ClientId, secret_id: &SecretId) -> Result<Option<Secret>> {
        let key = (client_id.clone(), secret_id.clone());
        Ok(self.secrets.get(&key).map(|entry| entry.value().clone()))
    }

    async fn put(
        &self,
        client_id: &ClientId,
        secret_id: &SecretId,
        payload: &str,
        wait_periods: u32,
    ) -> Result<PutOutcome> {
        match self.secrets.entry((client_id.clone(), secret_id.clone())) {
            Entry::Occupied(_) => Ok(PutOutcome::Conflict),
            Entry::Vacant(slot) => {
                slot.insert(Secret {
                    client_id: client_id.clone(),
                    secret_id: secret_id.clone(),
                    payload: payload.to_string(),
                    wait_periods,
                });
                Ok(PutOutcome::Created)
            }
        }
    }

    async fn delete(&self, client_id: &ClientId, secret_id: &SecretId) -> Result<()> {
        self.secrets.remove(&(client_id.clone(), secret_id.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (ClientId, SecretId) {
        (ClientId::parse("alice").unwrap(), SecretId::parse("s1").unwrap())
    }

    #[tokio::test]
    async fn test_record_if_absent_keeps_existing() {
        let store = MemoryLivenessStore::new();
        let (client, _) = ids();

        assert_eq!(store.record_if_absent(&client, 100).await.unwrap(), Liveness::seeded(100));
        assert_eq!(store.record_if_absent(&client, 200).await.unwrap(), Liveness::seeded(100));

        store.record_heartbeat(&client, 50).await.unwrap();
        assert_eq!(store.get_liveness(&client).await.unwrap(), Some(Liveness::heartbeat(50)));
        assert_eq!(store.get_last_seen(&client).await.unwrap(), Some(50));
    }
}

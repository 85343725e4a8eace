//! # Vault Service
//!
//! Orchestrates heartbeats, the release policy and the secret store. The
//! service holds no state of its own beyond store handles, so clones are
//! cheap and every request is handled independently.

pub mod request;

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::VaultConfig;
use crate::domain::{secret_key, Clock, ClientId, Liveness, ReleasePolicy, Secret, SecretId};
use crate::errors::{DeadswitchError, Result};
use crate::observability::metrics;
use crate::storage::{LivenessStore, PutOutcome, SecretStore, VaultStores};

pub use request::{DepositBody, OperationKind, VaultMethod, VaultRequest};

/// Successful outcome of a vault operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultResponse {
    /// Heartbeat recorded or secret deleted
    Ack,
    /// Secret deposited
    Created,
    /// Secret released
    Secret(ReleasedSecret),
}

/// Body returned when a secret is released
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ReleasedSecret {
    pub key: String,
    pub process_after: u32,
}

impl From<Secret> for ReleasedSecret {
    fn from(secret: Secret) -> Self {
        Self { key: secret.payload, process_after: secret.wait_periods }
    }
}

#[derive(Debug, Clone)]
pub struct VaultService {
    liveness: Arc<dyn LivenessStore>,
    secrets: Arc<dyn SecretStore>,
    clock: Arc<dyn Clock>,
    policy: ReleasePolicy,
    conceal_locked: bool,
    seed_liveness: bool,
}

impl VaultService {
    pub fn new(
        liveness: Arc<dyn LivenessStore>,
        secrets: Arc<dyn SecretStore>,
        clock: Arc<dyn Clock>,
        policy: ReleasePolicy,
    ) -> Self {
        Self { liveness, secrets, clock, policy, conceal_locked: false, seed_liveness: false }
    }

    /// Build a service from stores and the `vault` configuration section
    pub fn from_config(stores: &VaultStores, clock: Arc<dyn Clock>, config: &VaultConfig) -> Self {
        Self::new(
            Arc::clone(&stores.liveness),
            Arc::clone(&stores.secrets),
            clock,
            ReleasePolicy::new(config.unit_seconds),
        )
        .with_conceal_locked(config.conceal_locked)
        .with_seed_liveness(config.seed_liveness_on_first_access)
    }

    /// Report locked secrets as missing instead of locked
    pub fn with_conceal_locked(mut self, conceal: bool) -> Self {
        self.conceal_locked = conceal;
        self
    }

    /// Persist "now" as last-seen for clients touched before their first heartbeat
    pub fn with_seed_liveness(mut self, seed: bool) -> Self {
        self.seed_liveness = seed;
        self
    }

    /// Dispatch a validated request
    pub async fn handle(&self, request: VaultRequest) -> Result<VaultResponse> {
        match request {
            VaultRequest::Heartbeat { client_id } => {
                self.heartbeat(&client_id).await.map(|_| VaultResponse::Ack)
            }
            VaultRequest::GetSecret { client_id, secret_id } => self
                .get_secret(&client_id, &secret_id)
                .await
                .map(|secret| VaultResponse::Secret(secret.into())),
            VaultRequest::DeleteSecret { client_id, secret_id } => {
                self.delete_secret(&client_id, &secret_id).await.map(|_| VaultResponse::Ack)
            }
            VaultRequest::DepositSecret { client_id, secret_id, payload, wait_periods } => self
                .deposit_secret(&client_id, &secret_id, payload, wait_periods)
                .await
                .map(|_| VaultResponse::Created),
        }
    }

    /// Record the current time as the client's last heartbeat
    #[instrument(skip(self), fields(client_id = %client_id))]
    pub async fn heartbeat(&self, client_id: &ClientId) -> Result<()> {
        let now = self.clock.now();
        self.liveness.record_heartbeat(client_id, now).await?;
        metrics::record_heartbeat();
        info!(last_seen = now, "Heartbeat recorded");
        Ok(())
    }

    /// Release a secret once its client has been silent long enough
    #[instrument(skip(self), fields(client_id = %client_id, secret_id = %secret_id))]
    pub async fn get_secret(&self, client_id: &ClientId, secret_id: &SecretId) -> Result<Secret> {
        let result = self.unlocked_secret(client_id, secret_id).await;
        metrics::record_secret_operation("get", outcome_label(&result));
        if result.is_ok() {
            info!("Secret released");
        }
        result
    }

    /// Destroy an unlocked secret
    #[instrument(skip(self), fields(client_id = %client_id, secret_id = %secret_id))]
    pub async fn delete_secret(&self, client_id: &ClientId, secret_id: &SecretId) -> Result<()> {
        let result = match self.unlocked_secret(client_id, secret_id).await {
            Ok(_) => self.secrets.delete(client_id, secret_id).await,
            Err(e) => Err(e),
        };
        metrics::record_secret_operation("delete", outcome_label(&result));
        if result.is_ok() {
            info!("Secret deleted");
        }
        result
    }

    /// Store a new secret. An existing secret under the same key is kept
    /// and the deposit fails with a conflict.
    #[instrument(skip(self, payload), fields(client_id = %client_id, secret_id = %secret_id))]
    pub async fn deposit_secret(
        &self,
        client_id: &ClientId,
        secret_id: &SecretId,
        payload: String,
        wait_periods: u32,
    ) -> Result<()> {
        let result = self.try_deposit(client_id, secret_id, &payload, wait_periods).await;
        metrics::record_secret_operation("deposit", outcome_label(&result));
        result
    }

    async fn try_deposit(
        &self,
        client_id: &ClientId,
        secret_id: &SecretId,
        payload: &str,
        wait_periods: u32,
    ) -> Result<()> {
        self.seed_liveness_if_enabled(client_id).await?;

        match self.secrets.put(client_id, secret_id, payload, wait_periods).await? {
            PutOutcome::Created => {
                info!(wait_periods, "Secret deposited");
                Ok(())
            }
            PutOutcome::Conflict => {
                warn!("Deposit rejected, secret already exists");
                Err(DeadswitchError::conflict(
                    format!("Secret '{}' already exists", secret_key(client_id, secret_id)),
                    "secret",
                ))
            }
        }
    }

    /// Look up a secret and apply the release policy
    async fn unlocked_secret(&self, client_id: &ClientId, secret_id: &SecretId) -> Result<Secret> {
        let liveness = match self.seed_liveness_if_enabled(client_id).await? {
            Some(record) => Some(record),
            None => self.liveness.get_liveness(client_id).await?,
        };

        let key = secret_key(client_id, secret_id);
        let secret = self
            .secrets
            .get(client_id, secret_id)
            .await?
            .ok_or_else(|| DeadswitchError::not_found("secret", key.clone()))?;

        let now = self.clock.now();
        if self.policy.is_locked(now, liveness, secret.wait_periods) {
            let last_seen = liveness.map(|record| record.last_seen);
            info!(
                now,
                last_seen,
                wait_periods = secret.wait_periods,
                unlocks_at = last_seen.map(|seen| self.policy.unlocks_at(seen, secret.wait_periods)),
                "Secret still locked"
            );
            return Err(if self.conceal_locked {
                DeadswitchError::not_found("secret", key)
            } else {
                DeadswitchError::locked("secret", key)
            });
        }

        Ok(secret)
    }

    /// Returns the stored liveness when seeding is enabled
    async fn seed_liveness_if_enabled(&self, client_id: &ClientId) -> Result<Option<Liveness>> {
        if !self.seed_liveness {
            return Ok(None);
        }
        let record = self.liveness.record_if_absent(client_id, self.clock.now()).await?;
        Ok(Some(record))
    }
}

fn outcome_label<T>(result: &Result<T>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(DeadswitchError::NotFound { .. }) | Err(DeadswitchError::Validation { .. }) => {
            "not_found"
        }
        Err(DeadswitchError::Locked { .. }) => "locked",
        Err(DeadswitchError::Conflict { .. }) => "conflict",
        Err(_) => "error",
    }
}

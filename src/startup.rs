//! Startup sequence: stores, vault service, then the HTTP server.

use std::sync::Arc;

use tracing::info;

use crate::api::{start_api_server, ApiState};
use crate::config::AppConfig;
use crate::domain::SystemClock;
use crate::errors::Result;
use crate::observability::log_config_info;
use crate::storage::open_stores;
use crate::vault::VaultService;
use crate::{APP_NAME, VERSION};

/// Build everything from configuration and serve until ctrl-c
pub async fn run_server(config: AppConfig) -> Result<()> {
    info!(app_name = APP_NAME, version = VERSION, "Starting deadswitch vault");
    log_config_info(&config);

    let stores = open_stores(&config.storage).await?;
    let vault = VaultService::from_config(&stores, Arc::new(SystemClock), &config.vault);
    let state = ApiState::new(vault, stores.clone());

    start_api_server(&config.server, state).await?;

    if let Some(pool) = stores.pool {
        pool.close().await;
        info!("Database pool closed");
    }

    Ok(())
}

//! Shared harness for API integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use deadswitch::{
    api::{build_router, ApiState},
    config::{StorageBackendKind, StorageConfig},
    domain::{ManualClock, ReleasePolicy},
    storage::{open_stores, VaultStores},
    vault::VaultService,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const T0: i64 = 1_700_000_000;
pub const HOUR: i64 = 3600;

#[derive(Debug, Clone, Copy)]
pub enum Backend {
    Memory,
    Sqlite,
}

pub struct TestApp {
    pub clock: ManualClock,
    pub stores: VaultStores,
    pub vault: VaultService,
}

impl TestApp {
    pub async fn new(backend: Backend) -> Self {
        Self::with_vault(backend, |vault| vault).await
    }

    /// Build an app, letting the caller adjust the vault switches
    pub async fn with_vault(backend: Backend, adjust: impl FnOnce(VaultService) -> VaultService) -> Self {
        let storage = match backend {
            Backend::Memory => StorageConfig::memory(),
            Backend::Sqlite => StorageConfig {
                backend: StorageBackendKind::Sqlite,
                database_url: "sqlite::memory:".to_string(),
                ..Default::default()
            },
        };
        let stores = open_stores(&storage).await.expect("open stores");
        let clock = ManualClock::new(T0);
        let vault = adjust(VaultService::new(
            Arc::clone(&stores.liveness),
            Arc::clone(&stores.secrets),
            Arc::new(clock.clone()),
            ReleasePolicy::default(),
        ));

        Self { clock, stores, vault }
    }

    pub fn router(&self) -> Router {
        build_router(ApiState::new(self.vault.clone(), self.stores.clone()))
    }

    pub async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json).expect("serialize body")))
                .expect("build request"),
            None => builder.body(Body::empty()).expect("build request"),
        };

        self.router().oneshot(request).await.expect("request")
    }

    pub async fn send_raw(&self, method: Method, path: &str, body: &'static str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .expect("build request");

        self.router().oneshot(request).await.expect("request")
    }

    pub async fn heartbeat(&self, client: &str) -> StatusCode {
        self.send(Method::POST, &format!("/api/vault/alive/{client}"), None).await.status()
    }

    pub async fn deposit(&self, client: &str, secret: &str, key: &str, process_after: u32) -> StatusCode {
        let body = serde_json::json!({ "key": key, "process_after": process_after });
        self.send(Method::POST, &format!("/api/vault/store/{client}/{secret}"), Some(body))
            .await
            .status()
    }

    pub async fn get_secret(&self, client: &str, secret: &str) -> (StatusCode, Value) {
        let response =
            self.send(Method::GET, &format!("/api/vault/store/{client}/{secret}"), None).await;
        let status = response.status();
        (status, read_json(response).await)
    }

    pub async fn delete_secret(&self, client: &str, secret: &str) -> (StatusCode, Value) {
        let response =
            self.send(Method::DELETE, &format!("/api/vault/store/{client}/{secret}"), None).await;
        let status = response.status();
        (status, read_json(response).await)
    }
}

pub async fn read_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.expect("read body").to_bytes();
    serde_json::from_slice(&bytes).expect("parse json response")
}

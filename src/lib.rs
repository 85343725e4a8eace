//! # deadswitch
//!
//! A dead man's switch secret vault. Clients send periodic heartbeats and
//! deposit secrets, each with a waiting period. A secret can only be read or
//! deleted once its client has been silent for longer than that period.
//!
//! ```text
//! HTTP API → request validation → VaultService → ReleasePolicy
//!                                      ↓
//!                          LivenessStore / SecretStore
//!                          (in-memory or SQLite)
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod startup;
pub mod storage;
pub mod vault;

pub use config::AppConfig;
pub use errors::{DeadswitchError, Result};
pub use vault::{VaultRequest, VaultResponse, VaultService};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

//! Stored liveness of a client.

use serde::{Deserialize, Serialize};

/// Last time a client was seen, and how that time was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liveness {
    pub last_seen: i64,
    /// Set when the record only marks first contact. Cleared by the first
    /// heartbeat.
    pub seeded: bool,
}

impl Liveness {
    pub fn heartbeat(at: i64) -> Self {
        Self { last_seen: at, seeded: false }
    }

    pub fn seeded(at: i64) -> Self {
        Self { last_seen: at, seeded: true }
    }
}

//! Secret held in escrow.

use serde::{Deserialize, Serialize};

use super::{ClientId, SecretId};

/// A deposited secret and the silence it requires before release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    pub client_id: ClientId,
    pub secret_id: SecretId,
    /// Opaque payload, stored as given
    pub payload: String,
    /// Number of wait-units of silence required before release
    pub wait_periods: u32,
}

/// `client/secret` form used in logs and error messages
pub fn secret_key(client_id: &ClientId, secret_id: &SecretId) -> String {
    format!("{}/{}", client_id, secret_id)
}

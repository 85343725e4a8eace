//! Domain types for the vault: identifiers, liveness, secrets, time and the
//! release rule.

pub mod clock;
pub mod id;
pub mod liveness;
pub mod release;
pub mod secret;

pub use clock::{Clock, ManualClock, SystemClock};
pub use id::{ClientId, SecretId};
pub use liveness::Liveness;
pub use release::{is_locked, ReleasePolicy, DEFAULT_UNIT_SECONDS};
pub use secret::{secret_key, Secret};

//! SQLite-backed store implementations

pub mod liveness;
pub mod secret;

pub use liveness::LivenessRepository;
pub use secret::SecretRepository;

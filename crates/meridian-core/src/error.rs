// crates/meridian-core/src/error.rs

use thiserror::Error;

/// Error type shared by every Meridian crate.
#[derive(Debug, Error)]
pub enum MeridianError {
    /// An endpoint field cannot be represented in the packed record.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A weight or bond entry points at a uid outside the current population.
    #[error("Index out of range: uid {index} is not below population size {n}")]
    IndexOutOfRange { index: u64, n: usize },

    /// A weight or bond value is NaN or infinite.
    #[error("Non-finite value {value} for uid {index}")]
    NonFinite { index: u64, value: f64 },

    /// A sync pass was aborted. The previous snapshot is still current.
    #[error("Sync failed: {0}")]
    SyncFailed(String),

    /// The ledger collaborator could not answer a query.
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// A persisted snapshot file does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persisted bytes are corrupt or incompatible.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// A snapshot could not be encoded for persistence.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Filesystem failure while saving or loading.
    #[error("I/O error: {0}")]
    Io(String),

    /// Snapshot parts violate the population-size invariants.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<serde_json::Error> for MeridianError {
    fn from(e: serde_json::Error) -> Self {
        MeridianError::Deserialization(e.to_string())
    }
}

impl From<std::io::Error> for MeridianError {
    fn from(e: std::io::Error) -> Self {
        MeridianError::Io(e.to_string())
    }
}

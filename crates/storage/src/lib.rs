//! Storage Layer
//!
//! Persists the user-tunable settings so thresholds survive restarts.

mod settings_store;

pub use settings_store::SettingsStore;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

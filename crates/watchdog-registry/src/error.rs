//! Registry error taxonomy.

use thiserror::Error;

/// Errors from registry persistence and invariant enforcement.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("database error: {0}")]
    Database(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("chain corruption: expected previous hash {expected:02x?}, found {found:02x?}")]
    ChainCorruption { expected: Vec<u8>, found: Vec<u8> },
}

pub type Result<T> = std::result::Result<T, RegistryError>;

//! Errors for the posture engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PostureError>;

#[derive(Debug, Error)]
pub enum PostureError {
    #[error("registry error: {0}")]
    Registry(String),

    #[error("invalid manual override: {0}")]
    InvalidOverride(String),
}

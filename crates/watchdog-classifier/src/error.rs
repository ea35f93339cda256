//! Errors for the LLM classifier client.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClassifierError>;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("classifier request timed out after {0}ms")]
    Timeout(u64),

    #[error("classifier model unavailable: {0}")]
    ModelMissing(String),

    #[error("classifier output could not be parsed: {0}")]
    ParseFailure(String),
}

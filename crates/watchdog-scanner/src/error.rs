//! Stage-level errors.
//!
//! A stage error is caught by the pipeline, never propagated raw: the
//! stage is marked degraded, contributes zero flags, and the pipeline
//! continues to the next stage. Only a total-pipeline timeout or an
//! error during the registry write escalates past this boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanStageError {
    #[error("stage timed out after {0}ms")]
    Timeout(u64),

    #[error("collaborator unreachable: {0}")]
    Unreachable(String),

    #[error("collaborator returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("subprocess exited with status {0}")]
    SubprocessFailed(i32),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

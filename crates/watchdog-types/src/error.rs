//! Error taxonomy shared at the configuration boundary.
//!
//! Component-specific errors (`RegistryError`, `ScanStageError`,
//! `PostureError`, `EscalationError`, `ClassifierError`, `GatewayError`)
//! live in their owning crates and convert into each other with
//! `#[from]`, the way `SentinelError` wraps its collaborators.

use thiserror::Error;

/// Errors from loading or validating a `WatchdogConfig` document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("missing required HMAC signing key")]
    MissingSigningKey,
}

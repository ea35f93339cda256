//! Error types owned by the gateway: the messaging-channel transport and
//! the hook protocol boundary, plus the facade error that wraps every
//! collaborator's error.

use thiserror::Error;

use watchdog_registry::RegistryError;
use watchdog_types::error::ConfigError;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel send failed: {0}")]
    SendFailed(String),

    #[error("peer unavailable on channel {0}")]
    PeerUnavailable(String),
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed hook event: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Escalation(#[from] watchdog_escalation::EscalationError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("scan concurrency queue timed out after {0}ms")]
    QueueTimeout(u64),
}

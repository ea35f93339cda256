//! Errors for the escalation queue.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EscalationError>;

#[derive(Debug, Error)]
pub enum EscalationError {
    #[error("escalation queue is full (capacity {0})")]
    QueueFull(usize),

    #[error("no escalation found for short id '{0}'")]
    UnknownShortId(String),

    #[error("escalation store error: {0}")]
    Store(String),

    #[error("channel send failed on every configured route")]
    AllRoutesFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_full_display_includes_capacity() {
        let err = EscalationError::QueueFull(50);
        assert!(err.to_string().contains("50"));
    }

    #[test]
    fn unknown_short_id_display_includes_id() {
        let err = EscalationError::UnknownShortId("esc-abcdef12".to_string());
        assert!(err.to_string().contains("esc-abcdef12"));
    }
}

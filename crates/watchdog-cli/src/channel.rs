//! Placeholder notification transport: logs what would be sent.
//!
//! Wiring a real chat/email transport is a host-integration concern left
//! to whatever embeds this sidecar; this adapter keeps the escalation
//! interface exercised end to end without one.

use async_trait::async_trait;
use tracing::info;

use watchdog_types::bridges::ChannelAdapter;

#[derive(Debug, thiserror::Error)]
#[error("logging channel adapter never fails")]
pub struct LoggingChannelError;

pub struct LoggingChannelAdapter;

impl LoggingChannelAdapter {
    pub fn new() -> Self {
        LoggingChannelAdapter
    }
}

impl Default for LoggingChannelAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChannelAdapter for LoggingChannelAdapter {
    type Error = LoggingChannelError;

    async fn send_message(&self, channel: &str, peer_id: &str, text: &str) -> Result<(), Self::Error> {
        info!(%channel, %peer_id, %text, "escalation notification");
        Ok(())
    }

    async fn is_available(&self, _channel: &str) -> bool {
        true
    }
}

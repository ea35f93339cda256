//! Narrow collaborator interfaces.
//!
//! The source material wires the gateway, scanner, and auditor together
//! through cyclic concrete references. Here each side depends only on the
//! capability it actually uses: the gateway needs something that can scan
//! content and something that can persist a decision; the escalation
//! interface needs something that can send a message. None of the three
//! needs a concrete handle to either of its peers.

use async_trait::async_trait;
use uuid::Uuid;

use crate::enums::{PostureLevel, ScanVerdict};
use crate::model::{Destination, ScanDecision, ScanFlag, StageRecord};

/// Outcome of running the scan pipeline over one piece of content, without
/// the request/session bookkeeping only the caller (the gate) knows.
/// The gate combines this with that bookkeeping to build a full
/// `ScanDecision` for the auditor.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub verdict: ScanVerdict,
    pub flags: Vec<ScanFlag>,
    pub stages: Vec<StageRecord>,
    pub posture_at_decision: PostureLevel,
    pub degraded: bool,
}

/// What the gateway needs from the scan pipeline.
#[async_trait]
pub trait ScannerBridge: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn scan(
        &self,
        content: &str,
        destination: Option<&Destination>,
        posture: PostureLevel,
    ) -> Result<ScanResult, Self::Error>;

    /// True once the circuit breaker governing structural PII detection
    /// has tripped; used by the gate's "scanner unhealthy" fail-closed rule.
    fn is_degraded(&self) -> bool;
}

/// What the gateway (and escalation interface) need from persistence,
/// without depending on the registry's storage concretely.
#[async_trait]
pub trait AuditorBridge: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn record_decision(&self, decision: &ScanDecision) -> Result<(), Self::Error>;
}

/// What the escalation interface needs from a messaging transport.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn send_message(
        &self,
        channel: &str,
        peer_id: &str,
        text: &str,
    ) -> Result<(), Self::Error>;

    async fn is_available(&self, channel: &str) -> bool;
}

/// Result of classifying one quarantined payload, returned across the
/// escalation/classifier boundary without either crate depending on the
/// other's concrete types.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierVerdict {
    pub quarantine_id: Uuid,
    pub decision: ClassifierDecision,
    pub confidence: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierDecision {
    FalsePositive,
    Block,
    Escalate,
}

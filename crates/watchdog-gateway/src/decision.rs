//! Decision types returned by the gate.

use uuid::Uuid;

/// The gate's answer for one intercepted tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Safe to execute.
    Allow {
        reason: AllowReason,
        /// Present only for a clean-scan allow; consumed downstream to
        /// prove the scan happened.
        approval_token: Option<String>,
    },

    /// Do not execute.
    Deny {
        reason: DenyReason,
        quarantine_id: Option<Uuid>,
    },
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Deny { .. })
    }

    pub fn approval_token(&self) -> Option<&str> {
        match self {
            Self::Allow { approval_token, .. } => approval_token.as_deref(),
            Self::Deny { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    /// The kill switch is active; enforcement is off.
    KillSwitchBypass,
    /// The gate is disabled in configuration.
    GateDisabled,
    /// The tool name or destination target is in the bypass list.
    BypassList,
    /// The pipeline returned CLEAN.
    Clean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The scanner's circuit breaker has tripped; fail closed.
    ScannerUnhealthy,
    /// No scan slot became available within the queue timeout.
    QueueTimeout,
    /// The pipeline returned FLAGGED.
    Flagged,
    /// The pipeline could not complete.
    PipelineError,
}

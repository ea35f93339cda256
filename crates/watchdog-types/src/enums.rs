//! Enumerations shared across the Watchdog data model.

use serde::{Deserialize, Serialize};

/// Sensitivity classification assigned to a pattern, user entry, flag, or
/// inventory item.
///
/// Ordered from most to least restrictive so that "most restrictive wins"
/// comparisons (destination-rule overrides, combined classifier decisions)
/// can use a plain numeric comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// Must never leave owner-only channels.
    NeverShare,
    /// Requires explicit confirmation before release.
    AskFirst,
    /// May be shared within internal/private channels only.
    InternalOnly,
    /// No restriction.
    Public,
}

impl Classification {
    /// True if this classification should cause a scan verdict of FLAGGED.
    pub fn is_flaggable(self) -> bool {
        matches!(
            self,
            Classification::NeverShare | Classification::AskFirst | Classification::InternalOnly
        )
    }
}

/// Classification of an outbound destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DestinationType {
    PublicPlatform,
    PrivateChannel,
    LocalFile,
    OwnerOnly,
    ApiCall,
    /// Fail-closed default: treated as public.
    Unknown,
}

impl DestinationType {
    /// Unknown destinations are treated as public for fail-closed scanning.
    pub fn default_is_public(self) -> bool {
        !matches!(
            self,
            DestinationType::OwnerOnly | DestinationType::PrivateChannel
        )
    }
}

/// Where an inventory item's sensitive data physically lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    File,
    Session,
    Memory,
    Context,
}

/// The form sensitive data takes in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataForm {
    Verbatim,
    Paraphrased,
    Derived,
}

/// Where a scan flag originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanFlagSource {
    Structural,
    ExactMatch,
    FuzzyMatch,
    Credential,
}

/// Outcome of the scan pipeline for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanVerdict {
    Clean,
    Flagged,
}

/// Final disposition recorded on a `ScanDecision` once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOutcome {
    Allowed,
    ApprovedByUser,
    DeniedByUser,
    DeniedAndAdded,
    DeniedByTimeout,
    Blocked,
    FalsePositiveReleased,
    PipelineError,
}

/// Quarantine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarantineState {
    Pending,
    Approved,
    Blocked,
    IsolationQueued,
    Expired,
}

/// Escalation lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationState {
    Pending,
    Approved,
    Denied,
    DeniedAndAdded,
    TimedOut,
}

/// System-wide scrutiny level.
///
/// Ordered GREEN < YELLOW < RED < BLACK so hysteresis comparisons
/// (`raw > current`, `raw < current`) can use plain numeric comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostureLevel {
    Green,
    Yellow,
    Red,
    Black,
}

/// What caused a posture transition, recorded in `PostureHistory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostureTrigger {
    InventoryChange,
    ManualOverride,
    Recovery,
    Escalation,
    Startup,
}

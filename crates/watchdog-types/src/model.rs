//! Core data model for the Security Watchdog registry.
//!
//! Every type here is a plain serializable value; no type owns I/O. Storage
//! and invariant enforcement live in `watchdog-registry`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{
    Classification, DataForm, DestinationType, EscalationState, PostureTrigger, QuarantineState,
    ScanFlagSource, ScanOutcome, ScanVerdict, StorageType,
};
use crate::Hash;

/// A structural detector for a locale + category + type.
///
/// Uniquely keyed by `(locale, category, type)`. Created by locale load;
/// soft-deactivated rather than physically removed while referenced by
/// inventory or decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub locale: String,
    pub category: String,
    pub entity_type: String,
    /// Name passed to the external structural-PII analyzer as a recognizer
    /// identifier (the `entities` list in its request).
    pub analyzer_ref: String,
    pub regex: Option<String>,
    pub default_classification: Classification,
    /// Substrings or contexts that, when present, downgrade an otherwise
    /// positive match (reduces false positives for common test data etc).
    pub falsity_hints: Vec<String>,
    pub active: bool,
}

impl Pattern {
    pub fn key(&self) -> (String, String, String) {
        (
            self.locale.clone(),
            self.category.clone(),
            self.entity_type.clone(),
        )
    }
}

/// An owner-defined sensitive value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEntry {
    pub id: Uuid,
    pub label: String,
    pub primary_value: String,
    pub classification: Classification,
    pub category: String,
    pub active: bool,
}

/// An alternative phrasing of a `UserEntry`, unique within that entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: Uuid,
    pub entry_id: Uuid,
    pub text: String,
}

/// Classification of an outbound target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub destination_type: DestinationType,
    pub target: String,
    pub label: String,
    pub is_public: bool,
}

impl Destination {
    /// Builds a destination applying the fail-closed default for `UNKNOWN`.
    pub fn new(destination_type: DestinationType, target: impl Into<String>, label: impl Into<String>) -> Self {
        let is_public = destination_type.default_is_public();
        Destination {
            destination_type,
            target: target.into(),
            label: label.into(),
            is_public,
        }
    }
}

/// Overrides a `UserEntry`'s classification for a specific destination
/// type / target pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationRule {
    pub id: Uuid,
    pub entry_id: Uuid,
    pub destination_type: DestinationType,
    /// Regular expression matched against `Destination::target`; `None`
    /// matches every target of `destination_type`.
    pub target_pattern: Option<String>,
    pub classification: Classification,
}

/// A live record that sensitive data exists in some host-visible storage
/// location.
///
/// Uniquely keyed by `(ref_type, ref_id, storage_location, storage_type)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    /// `"pattern"` or `"user_entry"`.
    pub ref_type: String,
    pub ref_id: String,
    pub storage_location: String,
    pub storage_type: StorageType,
    pub data_form: DataForm,
    pub classification: Classification,
    pub first_detected: DateTime<Utc>,
    pub last_verified: DateTime<Utc>,
    pub active: bool,
}

impl InventoryItem {
    pub fn key(&self) -> (String, String, String, StorageType) {
        (
            self.ref_type.clone(),
            self.ref_id.clone(),
            self.storage_location.clone(),
            self.storage_type,
        )
    }
}

/// An individual finding attached to a `ScanDecision`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanFlag {
    pub id: Uuid,
    pub source: ScanFlagSource,
    pub entity_type: String,
    /// Registry-safe representation of the matched text (never the raw
    /// sensitive value verbatim in logs; callers are responsible for
    /// redaction before display).
    pub matched_text: String,
    pub confidence: f64,
    pub offset_start: usize,
    pub offset_end: usize,
    pub effective_classification: Classification,
    pub registry_ref: Option<Uuid>,
}

/// Per-stage execution record embedded in a `ScanDecision`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: String,
    pub executed: bool,
    pub duration_ms: u64,
    pub flag_count: usize,
    pub degraded: bool,
    pub error: Option<String>,
}

/// Audit record of one scan.
///
/// Immutable once written (I1); rows form a hash chain over their
/// canonical serialization (see `watchdog-registry::canonicalize`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanDecision {
    pub request_id: Uuid,
    pub direction: ScanDirection,
    pub session_key: String,
    pub agent_id: Option<String>,
    pub content_hash: Hash,
    pub destination: Option<Destination>,
    pub posture_at_decision: crate::enums::PostureLevel,
    pub verdict: ScanVerdict,
    pub stages: Vec<StageRecord>,
    pub flags: Vec<ScanFlag>,
    pub outcome: ScanOutcome,
    pub quarantine_id: Option<Uuid>,
    pub approval_token: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub chain_hash: Hash,
}

/// Direction of the intercepted content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanDirection {
    Outbound,
    Inbound,
}

/// Encrypted-at-rest retention of flagged tool arguments pending a
/// decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quarantine {
    pub id: Uuid,
    pub request_id: Uuid,
    pub content_hash: Hash,
    /// Ciphertext of the original tool arguments; decrypted only when an
    /// escalation or classifier needs the underlying content.
    pub sealed_content: Vec<u8>,
    pub destination: Option<Destination>,
    pub state: QuarantineState,
    pub approval_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A pending owner decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Escalation {
    pub id: Uuid,
    pub short_id: String,
    pub state: EscalationState,
    pub priority: u8,
    pub quarantine_id: Uuid,
    /// Additional request ids attached via duplicate suppression.
    pub linked_request_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Singleton posture record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureState {
    pub level: crate::enums::PostureLevel,
    pub manual_override: Option<crate::enums::PostureLevel>,
    pub last_calculated: DateTime<Utc>,
    pub never_share_count: u64,
    pub ask_first_count: u64,
    pub internal_only_count: u64,
    /// When the raw level first qualified for a downward transition;
    /// cleared once the transition completes or the raw level rises again.
    pub downward_eligible_since: Option<DateTime<Utc>>,
}

/// Append-only posture transition record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureHistory {
    pub id: Uuid,
    pub previous_level: crate::enums::PostureLevel,
    pub new_level: crate::enums::PostureLevel,
    pub trigger: PostureTrigger,
    pub inventory_snapshot: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of one periodic self-check against an external collaborator
/// (PII analyzer reachability, classifier reachability, registry flush
/// latency).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckRecord {
    pub id: Uuid,
    pub component: String,
    pub healthy: bool,
    pub detail: Option<String>,
    pub checked_at: DateTime<Utc>,
}

/// Per-day rollup of the gate's counters, keyed by `date` (`YYYY-MM-DD`,
/// UTC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetrics {
    pub date: String,
    pub intercepted: u64,
    pub clean: u64,
    pub quarantined: u64,
    pub failed: u64,
    pub bypassed: u64,
    pub inbound_inspected: u64,
    pub inbound_errors: u64,
}

//! # Registry — Main Facade
//!
//! Coordinates canonicalization, storage, and invariant enforcement for
//! every persisted table in the data model. Every Watchdog component that
//! needs persistent state goes through `Registry`; nothing else touches
//! `Storage` directly.
//!
//! ## Invariants enforced here
//!
//! - (I1) `ScanDecision` rows are immutable once written.
//! - (I2) An approval token exists iff verdict is CLEAN; a quarantine id
//!   exists iff verdict is FLAGGED.
//! - (I3) Each quarantine has at most one unresolved escalation.
//! - (I6) Variant text is unique within an entry.
//!
//! (I4) and (I5) are posture invariants enforced by `watchdog-posture`
//! against the views this module exposes (`inventory_counts`,
//! `PostureState` CRUD).

use std::path::Path;

use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;
use watchdog_types::enums::{Classification, PostureLevel};
use watchdog_types::model::{
    DailyMetrics, Destination, DestinationRule, Escalation, HealthCheckRecord, InventoryItem,
    Pattern, PostureHistory, PostureState, Quarantine, ScanDecision, UserEntry, Variant,
};
use watchdog_types::enums::{EscalationState, QuarantineState, ScanVerdict};
use watchdog_types::Hash;

use crate::canonicalize::chain_hash;
use crate::error::{RegistryError, Result};
use crate::storage::{composite_key, Storage};

const T_PATTERNS: &str = "patterns";
const T_USER_ENTRIES: &str = "user_entries";
const T_VARIANTS: &str = "entry_variants";
const T_DESTINATION_RULES: &str = "destination_rules";
const T_INVENTORY: &str = "inventory";
const T_SCAN_DECISIONS: &str = "scan_decisions";
const T_QUARANTINE: &str = "quarantine_queue";
const T_ESCALATIONS: &str = "escalations";
const T_POSTURE_CURRENT: &str = "posture_current";
const T_POSTURE_HISTORY: &str = "posture_history";
const T_HEALTH_CHECKS: &str = "health_checks";
const T_DAILY_METRICS: &str = "daily_metrics";

const POSTURE_SINGLETON_KEY: &[u8] = b"current";

/// The primary Registry interface.
///
/// # Thread Safety
///
/// Reads are safe from multiple threads (sled trees are `Send + Sync`).
/// Scan-decision writes are serialized through an internal mutex holding
/// the last-committed chain hash, matching the single-writer-path
/// ordering guarantee in the concurrency model.
pub struct Registry {
    storage: Storage,
    chain_tail: Mutex<Hash>,
}

impl Registry {
    /// Opens or creates a registry at `path`, recovering the chain tail
    /// from the most recently written `ScanDecision`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let storage = Storage::open(path)?;
        let chain_tail = Mutex::new(Self::recover_chain_tail(&storage)?);
        Ok(Registry {
            storage,
            chain_tail,
        })
    }

    /// Opens a temporary registry, useful for tests.
    pub fn temporary() -> Result<Self> {
        let storage = Storage::temporary()?;
        Ok(Registry {
            storage,
            chain_tail: Mutex::new([0u8; 32]),
        })
    }

    fn recover_chain_tail(storage: &Storage) -> Result<Hash> {
        let rows: Vec<(Vec<u8>, ScanDecision)> = storage.iter_all(T_SCAN_DECISIONS)?;
        Ok(rows
            .last()
            .map(|(_, d)| d.chain_hash)
            .unwrap_or([0u8; 32]))
    }

    pub fn flush(&self) -> Result<()> {
        self.storage.flush()
    }

    // ---- Pattern -------------------------------------------------------

    pub fn upsert_pattern(&self, pattern: &Pattern) -> Result<()> {
        let (locale, category, entity_type) = pattern.key();
        let key = composite_key(&[&locale, &category, &entity_type]);
        self.storage.put(T_PATTERNS, &key, pattern)
    }

    pub fn get_pattern(&self, locale: &str, category: &str, entity_type: &str) -> Result<Option<Pattern>> {
        let key = composite_key(&[locale, category, entity_type]);
        self.storage.get(T_PATTERNS, &key)
    }

    pub fn deactivate_pattern(&self, locale: &str, category: &str, entity_type: &str) -> Result<()> {
        let key = composite_key(&[locale, category, entity_type]);
        let mut pattern: Pattern = self
            .storage
            .get(T_PATTERNS, &key)?
            .ok_or_else(|| RegistryError::NotFound(format!("{locale}/{category}/{entity_type}")))?;
        pattern.active = false;
        self.storage.put(T_PATTERNS, &key, &pattern)
    }

    pub fn list_active_patterns(&self) -> Result<Vec<Pattern>> {
        let rows: Vec<(Vec<u8>, Pattern)> = self.storage.iter_all(T_PATTERNS)?;
        Ok(rows.into_iter().map(|(_, p)| p).filter(|p| p.active).collect())
    }

    // ---- UserEntry / Variant / DestinationRule --------------------------

    pub fn create_user_entry(&self, entry: &UserEntry) -> Result<()> {
        let key = entry.id.as_bytes();
        if self.storage.contains(T_USER_ENTRIES, key)? {
            return Err(RegistryError::AlreadyExists(entry.id.to_string()));
        }
        for (_, existing) in self.storage.iter_all::<UserEntry>(T_USER_ENTRIES)? {
            if existing.label == entry.label {
                return Err(RegistryError::Constraint(format!(
                    "user entry label already exists: {}",
                    entry.label
                )));
            }
        }
        self.storage.put(T_USER_ENTRIES, key, entry)
    }

    pub fn get_user_entry(&self, id: Uuid) -> Result<Option<UserEntry>> {
        self.storage.get(T_USER_ENTRIES, id.as_bytes())
    }

    pub fn list_active_user_entries(&self) -> Result<Vec<UserEntry>> {
        let rows: Vec<(Vec<u8>, UserEntry)> = self.storage.iter_all(T_USER_ENTRIES)?;
        Ok(rows.into_iter().map(|(_, e)| e).filter(|e| e.active).collect())
    }

    /// Adds a variant, enforcing (I6): text unique within the entry.
    pub fn add_variant(&self, variant: &Variant) -> Result<()> {
        let existing = self.list_variants(variant.entry_id)?;
        if existing.iter().any(|v| v.text == variant.text) {
            return Err(RegistryError::Constraint(format!(
                "variant text already exists for entry {}: {}",
                variant.entry_id, variant.text
            )));
        }
        let key = composite_key(&[&variant.entry_id.to_string(), &variant.id.to_string()]);
        self.storage.put(T_VARIANTS, &key, variant)
    }

    pub fn list_variants(&self, entry_id: Uuid) -> Result<Vec<Variant>> {
        let prefix = composite_key(&[&entry_id.to_string()]);
        let rows: Vec<(Vec<u8>, Variant)> = self.storage.scan_prefix(T_VARIANTS, &prefix)?;
        Ok(rows.into_iter().map(|(_, v)| v).collect())
    }

    pub fn add_destination_rule(&self, rule: &DestinationRule) -> Result<()> {
        self.storage.put(T_DESTINATION_RULES, rule.id.as_bytes(), rule)
    }

    pub fn list_rules_for_entry(&self, entry_id: Uuid) -> Result<Vec<DestinationRule>> {
        let rows: Vec<(Vec<u8>, DestinationRule)> = self.storage.iter_all(T_DESTINATION_RULES)?;
        Ok(rows
            .into_iter()
            .map(|(_, r)| r)
            .filter(|r| r.entry_id == entry_id)
            .collect())
    }

    /// Rules that apply regardless of subject, registered with
    /// `entry_id == Uuid::nil()`. This is how a destination-rule override
    /// reaches pattern-sourced (structural PII) flags, which have no
    /// `UserEntry` to scope a rule to.
    fn list_global_rules(&self) -> Result<Vec<DestinationRule>> {
        self.list_rules_for_entry(Uuid::nil())
    }

    /// Picks the first rule (in storage order) matching `dest`'s
    /// destination type and, if present, whose `target_pattern` regex
    /// matches `dest.target`.
    fn first_matching_rule<'a>(rules: &'a [DestinationRule], dest: &Destination) -> Option<&'a DestinationRule> {
        rules.iter().find(|rule| {
            if rule.destination_type != dest.destination_type {
                return false;
            }
            match &rule.target_pattern {
                None => true,
                Some(pattern) => regex::Regex::new(pattern).map(|re| re.is_match(&dest.target)).unwrap_or(false),
            }
        })
    }

    /// Resolves the effective classification for an entry at a destination,
    /// applying any matching `DestinationRule` override.
    pub fn resolve_classification(
        &self,
        entry: &UserEntry,
        destination: Option<&Destination>,
    ) -> Result<Classification> {
        let Some(dest) = destination else {
            return Ok(entry.classification);
        };
        let rules = self.list_rules_for_entry(entry.id)?;
        Ok(Self::first_matching_rule(&rules, dest)
            .map(|rule| rule.classification)
            .unwrap_or(entry.classification))
    }

    /// Resolves the effective classification for a structural-PII pattern
    /// match at a destination, applying any matching global `DestinationRule`
    /// override (see [`Registry::list_global_rules`]).
    pub fn resolve_pattern_classification(
        &self,
        default_classification: Classification,
        destination: Option<&Destination>,
    ) -> Result<Classification> {
        let Some(dest) = destination else {
            return Ok(default_classification);
        };
        let rules = self.list_global_rules()?;
        Ok(Self::first_matching_rule(&rules, dest)
            .map(|rule| rule.classification)
            .unwrap_or(default_classification))
    }

    // ---- InventoryItem ---------------------------------------------------

    /// Upserts an inventory item keyed by `(ref_type, ref_id, storage_location,
    /// storage_type)`; an existing row has `last_verified` refreshed.
    pub fn upsert_inventory_item(&self, item: &InventoryItem) -> Result<()> {
        let (ref_type, ref_id, loc, storage_type) = item.key();
        let key = composite_key(&[&ref_type, &ref_id, &loc, &format!("{storage_type:?}")]);
        let mut row = item.clone();
        if let Some(existing) = self.storage.get::<InventoryItem>(T_INVENTORY, &key)? {
            row.first_detected = existing.first_detected;
        }
        row.last_verified = Utc::now();
        self.storage.put(T_INVENTORY, &key, &row)
    }

    pub fn list_active_inventory(&self) -> Result<Vec<InventoryItem>> {
        let rows: Vec<(Vec<u8>, InventoryItem)> = self.storage.iter_all(T_INVENTORY)?;
        Ok(rows.into_iter().map(|(_, i)| i).filter(|i| i.active).collect())
    }

    /// Counts active inventory items by classification, used by the
    /// posture engine's raw-level calculation.
    pub fn inventory_counts(&self) -> Result<InventoryCounts> {
        let mut counts = InventoryCounts::default();
        for item in self.list_active_inventory()? {
            match item.classification {
                Classification::NeverShare => counts.never_share += 1,
                Classification::AskFirst => counts.ask_first += 1,
                Classification::InternalOnly => counts.internal_only += 1,
                Classification::Public => {}
            }
        }
        Ok(counts)
    }

    // ---- ScanDecision (hash chain) ----------------------------------------

    /// Appends a `ScanDecision`, computing and stamping its chain hash.
    /// Enforces (I1) by construction (the key is always `(timestamp,
    /// request_id)`, so no existing row can ever be overwritten) and (I2)
    /// by rejecting decisions whose verdict/token/quarantine combination
    /// is inconsistent.
    pub fn append_decision(&self, mut decision: ScanDecision) -> Result<ScanDecision> {
        match decision.verdict {
            ScanVerdict::Clean => {
                if decision.approval_token.is_none() || decision.quarantine_id.is_some() {
                    return Err(RegistryError::Constraint(
                        "CLEAN verdict requires an approval token and no quarantine id".into(),
                    ));
                }
            }
            ScanVerdict::Flagged => {
                if decision.approval_token.is_some() || decision.quarantine_id.is_none() {
                    return Err(RegistryError::Constraint(
                        "FLAGGED verdict requires a quarantine id and no approval token".into(),
                    ));
                }
            }
        }

        let mut tail = self.chain_tail.lock();
        decision.chain_hash = chain_hash(&without_chain_hash(&decision), &tail);

        let key = composite_key(&[
            &decision.timestamp.timestamp_nanos_opt().unwrap_or_default().to_string(),
            &decision.request_id.to_string(),
        ]);
        self.storage.put(T_SCAN_DECISIONS, &key, &decision)?;
        *tail = decision.chain_hash;
        Ok(decision)
    }

    pub fn list_decisions(&self) -> Result<Vec<ScanDecision>> {
        let rows: Vec<(Vec<u8>, ScanDecision)> = self.storage.iter_all(T_SCAN_DECISIONS)?;
        Ok(rows.into_iter().map(|(_, d)| d).collect())
    }

    /// Verifies the entire chain: every row's `chain_hash` must equal
    /// `chainHash(row) = SHA256(canonical(row_without_hash) || previous)`.
    pub fn verify_chain(&self) -> Result<bool> {
        let mut previous = [0u8; 32];
        for decision in self.list_decisions()? {
            let expected = chain_hash(&without_chain_hash(&decision), &previous);
            if expected != decision.chain_hash {
                return Ok(false);
            }
            previous = decision.chain_hash;
        }
        Ok(true)
    }

    // ---- Quarantine --------------------------------------------------------

    pub fn create_quarantine(&self, quarantine: &Quarantine) -> Result<()> {
        self.storage.put(T_QUARANTINE, quarantine.id.as_bytes(), quarantine)
    }

    pub fn get_quarantine(&self, id: Uuid) -> Result<Option<Quarantine>> {
        self.storage.get(T_QUARANTINE, id.as_bytes())
    }

    pub fn transition_quarantine(
        &self,
        id: Uuid,
        state: QuarantineState,
        approval_token: Option<String>,
    ) -> Result<Quarantine> {
        let mut q: Quarantine = self
            .get_quarantine(id)?
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        q.state = state;
        if approval_token.is_some() {
            q.approval_token = approval_token;
        }
        self.storage.put(T_QUARANTINE, id.as_bytes(), &q)?;
        Ok(q)
    }

    // ---- Escalation ----------------------------------------------------------

    /// Creates an escalation, enforcing (I3): at most one unresolved
    /// escalation per quarantine. Returns the existing pending escalation
    /// if one is already linked to this quarantine (duplicate suppression
    /// is applied by the caller, which attaches the new request id).
    pub fn create_escalation(&self, escalation: &Escalation) -> Result<Escalation> {
        for existing in self.list_escalations()? {
            if existing.quarantine_id == escalation.quarantine_id
                && existing.state == EscalationState::Pending
            {
                return Ok(existing);
            }
        }
        self.storage
            .put(T_ESCALATIONS, escalation.id.as_bytes(), escalation)?;
        Ok(escalation.clone())
    }

    pub fn save_escalation(&self, escalation: &Escalation) -> Result<()> {
        self.storage.put(T_ESCALATIONS, escalation.id.as_bytes(), escalation)
    }

    pub fn get_escalation(&self, id: Uuid) -> Result<Option<Escalation>> {
        self.storage.get(T_ESCALATIONS, id.as_bytes())
    }

    pub fn find_escalation_by_short_id(&self, short_id: &str) -> Result<Option<Escalation>> {
        Ok(self
            .list_escalations()?
            .into_iter()
            .find(|e| e.short_id == short_id))
    }

    pub fn list_escalations(&self) -> Result<Vec<Escalation>> {
        let rows: Vec<(Vec<u8>, Escalation)> = self.storage.iter_all(T_ESCALATIONS)?;
        Ok(rows.into_iter().map(|(_, e)| e).collect())
    }

    pub fn list_pending_escalations(&self) -> Result<Vec<Escalation>> {
        Ok(self
            .list_escalations()?
            .into_iter()
            .filter(|e| e.state == EscalationState::Pending)
            .collect())
    }

    // ---- Posture ----------------------------------------------------------

    pub fn get_posture(&self) -> Result<Option<PostureState>> {
        self.storage.get(T_POSTURE_CURRENT, POSTURE_SINGLETON_KEY)
    }

    pub fn save_posture(&self, state: &PostureState) -> Result<()> {
        self.storage.put(T_POSTURE_CURRENT, POSTURE_SINGLETON_KEY, state)
    }

    pub fn append_posture_history(&self, entry: &PostureHistory) -> Result<()> {
        let key = composite_key(&[&entry.timestamp.timestamp_nanos_opt().unwrap_or_default().to_string(), &entry.id.to_string()]);
        self.storage.put(T_POSTURE_HISTORY, &key, entry)
    }

    pub fn list_posture_history(&self) -> Result<Vec<PostureHistory>> {
        let rows: Vec<(Vec<u8>, PostureHistory)> = self.storage.iter_all(T_POSTURE_HISTORY)?;
        Ok(rows.into_iter().map(|(_, h)| h).collect())
    }

    // ---- Health checks ------------------------------------------------------

    /// Appends the outcome of one periodic self-check.
    pub fn record_health_check(&self, record: &HealthCheckRecord) -> Result<()> {
        let key = composite_key(&[&record.checked_at.timestamp_nanos_opt().unwrap_or_default().to_string(), &record.id.to_string()]);
        self.storage.put(T_HEALTH_CHECKS, &key, record)
    }

    pub fn list_health_checks(&self) -> Result<Vec<HealthCheckRecord>> {
        let rows: Vec<(Vec<u8>, HealthCheckRecord)> = self.storage.iter_all(T_HEALTH_CHECKS)?;
        Ok(rows.into_iter().map(|(_, r)| r).collect())
    }

    // ---- Daily metrics --------------------------------------------------

    /// Upserts the rollup row for `metrics.date`, keyed by date.
    pub fn save_daily_metrics(&self, metrics: &DailyMetrics) -> Result<()> {
        self.storage.put(T_DAILY_METRICS, metrics.date.as_bytes(), metrics)
    }

    pub fn get_daily_metrics(&self, date: &str) -> Result<Option<DailyMetrics>> {
        self.storage.get(T_DAILY_METRICS, date.as_bytes())
    }

    pub fn list_daily_metrics(&self) -> Result<Vec<DailyMetrics>> {
        let rows: Vec<(Vec<u8>, DailyMetrics)> = self.storage.iter_all(T_DAILY_METRICS)?;
        Ok(rows.into_iter().map(|(_, m)| m).collect())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").finish()
    }
}

/// Counts of active inventory items by classification, consumed by the
/// posture engine's raw-level calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InventoryCounts {
    pub never_share: u64,
    pub ask_first: u64,
    pub internal_only: u64,
}

impl InventoryCounts {
    pub fn raw_level(&self) -> PostureLevel {
        if self.never_share > 0 {
            PostureLevel::Red
        } else if self.ask_first > 0 || self.internal_only > 0 {
            PostureLevel::Yellow
        } else {
            PostureLevel::Green
        }
    }
}

/// Returns a copy of the decision with `chain_hash` zeroed, used as the
/// canonicalization input (the chain hash cannot depend on itself).
fn without_chain_hash(decision: &ScanDecision) -> ScanDecision {
    let mut d = decision.clone();
    d.chain_hash = [0u8; 32];
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchdog_types::enums::{DataForm, DestinationType};
    use watchdog_types::model::{ScanDirection, StageRecord};

    fn make_decision(request_id: Uuid, verdict: ScanVerdict) -> ScanDecision {
        ScanDecision {
            request_id,
            direction: ScanDirection::Outbound,
            session_key: "s1".into(),
            agent_id: None,
            content_hash: [1u8; 32],
            destination: None,
            posture_at_decision: PostureLevel::Green,
            verdict,
            stages: vec![StageRecord {
                stage: "pii".into(),
                executed: true,
                duration_ms: 1,
                flag_count: 0,
                degraded: false,
                error: None,
            }],
            flags: vec![],
            outcome: if verdict == ScanVerdict::Clean {
                watchdog_types::enums::ScanOutcome::Allowed
            } else {
                watchdog_types::enums::ScanOutcome::Blocked
            },
            quarantine_id: if verdict == ScanVerdict::Flagged {
                Some(Uuid::new_v4())
            } else {
                None
            },
            approval_token: if verdict == ScanVerdict::Clean {
                Some("tok".into())
            } else {
                None
            },
            timestamp: Utc::now(),
            chain_hash: [0u8; 32],
        }
    }

    #[test]
    fn chain_links_successive_decisions() {
        let registry = Registry::temporary().unwrap();
        let d1 = registry
            .append_decision(make_decision(Uuid::new_v4(), ScanVerdict::Clean))
            .unwrap();
        let d2 = registry
            .append_decision(make_decision(Uuid::new_v4(), ScanVerdict::Clean))
            .unwrap();
        assert_ne!(d1.chain_hash, d2.chain_hash);
        assert!(registry.verify_chain().unwrap());
    }

    #[test]
    fn rejects_inconsistent_verdict_token_pairing() {
        let registry = Registry::temporary().unwrap();
        let mut bad = make_decision(Uuid::new_v4(), ScanVerdict::Clean);
        bad.approval_token = None;
        assert!(registry.append_decision(bad).is_err());
    }

    #[test]
    fn variant_uniqueness_enforced_per_entry() {
        let registry = Registry::temporary().unwrap();
        let entry = UserEntry {
            id: Uuid::new_v4(),
            label: "tech_reference".into(),
            primary_value: "QuantumMesh Node".into(),
            classification: Classification::NeverShare,
            category: "technology".into(),
            active: true,
        };
        registry.create_user_entry(&entry).unwrap();

        let v1 = Variant {
            id: Uuid::new_v4(),
            entry_id: entry.id,
            text: "QMesh".into(),
        };
        registry.add_variant(&v1).unwrap();

        let v2 = Variant {
            id: Uuid::new_v4(),
            entry_id: entry.id,
            text: "QMesh".into(),
        };
        assert!(registry.add_variant(&v2).is_err());
    }

    #[test]
    fn escalation_create_is_idempotent_per_quarantine() {
        let registry = Registry::temporary().unwrap();
        let quarantine_id = Uuid::new_v4();
        let e1 = Escalation {
            id: Uuid::new_v4(),
            short_id: "abcdef12".into(),
            state: EscalationState::Pending,
            priority: 0,
            quarantine_id,
            linked_request_ids: vec![],
            created_at: Utc::now(),
            expires_at: Utc::now(),
        };
        let created = registry.create_escalation(&e1).unwrap();
        assert_eq!(created.id, e1.id);

        let e2 = Escalation {
            id: Uuid::new_v4(),
            ..e1.clone()
        };
        let returned = registry.create_escalation(&e2).unwrap();
        assert_eq!(returned.id, e1.id, "existing pending escalation is returned, not duplicated");
    }

    #[test]
    fn inventory_counts_drive_raw_posture() {
        let registry = Registry::temporary().unwrap();
        let item = InventoryItem {
            id: Uuid::new_v4(),
            ref_type: "user_entry".into(),
            ref_id: "abc".into(),
            storage_location: "chat-history".into(),
            storage_type: watchdog_types::enums::StorageType::Session,
            data_form: DataForm::Verbatim,
            classification: Classification::NeverShare,
            first_detected: Utc::now(),
            last_verified: Utc::now(),
            active: true,
        };
        registry.upsert_inventory_item(&item).unwrap();
        let counts = registry.inventory_counts().unwrap();
        assert_eq!(counts.never_share, 1);
        assert_eq!(counts.raw_level(), PostureLevel::Red);
    }

    #[test]
    fn destination_rule_overrides_entry_classification() {
        let registry = Registry::temporary().unwrap();
        let entry = UserEntry {
            id: Uuid::new_v4(),
            label: "home_address".into(),
            primary_value: "123 Main St".into(),
            classification: Classification::NeverShare,
            category: "location".into(),
            active: true,
        };
        registry.create_user_entry(&entry).unwrap();

        let rule = DestinationRule {
            id: Uuid::new_v4(),
            entry_id: entry.id,
            destination_type: DestinationType::OwnerOnly,
            target_pattern: None,
            classification: Classification::Public,
        };
        registry.add_destination_rule(&rule).unwrap();

        let dest = Destination::new(DestinationType::OwnerOnly, "me", "Owner");
        let resolved = registry.resolve_classification(&entry, Some(&dest)).unwrap();
        assert_eq!(resolved, Classification::Public);

        let public_dest = Destination::new(DestinationType::PublicPlatform, "example.social", "Example");
        let resolved_public = registry
            .resolve_classification(&entry, Some(&public_dest))
            .unwrap();
        assert_eq!(resolved_public, Classification::NeverShare);
    }
}

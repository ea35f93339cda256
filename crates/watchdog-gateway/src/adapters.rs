//! Concrete collaborators wiring the narrow bridge traits to
//! `watchdog-registry` and `watchdog-scanner`. This is the one crate
//! allowed to depend on both, so the glue lives here rather than in
//! either component.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use watchdog_registry::{Registry, RegistryError};
use watchdog_scanner::pipeline::{PatternLookup, ScanPipeline, StageGate};
use watchdog_types::enums::{Classification, PostureLevel};
use watchdog_types::bridges::{AuditorBridge, ScanResult, ScannerBridge};
use watchdog_types::model::{Destination, ScanDecision};

use watchdog_escalation::interface::EscalationStore;
use watchdog_escalation::{EscalationError, Resolution};
use watchdog_types::error::ConfigError;
use watchdog_types::model::{Escalation, UserEntry, Variant};

/// Looks up a structural-PII entity type's default classification among
/// the registry's active patterns, then applies any matching global
/// destination rule (patterns have no `UserEntry` to scope a rule to).
pub struct RegistryPatternLookup {
    registry: Arc<Registry>,
}

impl RegistryPatternLookup {
    pub fn new(registry: Arc<Registry>) -> Self {
        RegistryPatternLookup { registry }
    }
}

impl PatternLookup for RegistryPatternLookup {
    fn classification_for(&self, entity_type: &str, destination: Option<&Destination>) -> Option<Classification> {
        let patterns = self.registry.list_active_patterns().ok()?;
        let default_classification = patterns.iter().find(|p| p.entity_type == entity_type)?.default_classification;
        Some(
            self.registry
                .resolve_pattern_classification(default_classification, destination)
                .unwrap_or(default_classification),
        )
    }
}

/// Applies a fuzzy/exact match's `UserEntry` destination-rule override
/// by fetching the entry from the registry and reusing
/// `Registry::resolve_classification`.
pub struct RegistryEntryOverrideResolver {
    registry: Arc<Registry>,
}

impl RegistryEntryOverrideResolver {
    pub fn new(registry: Arc<Registry>) -> Self {
        RegistryEntryOverrideResolver { registry }
    }
}

impl watchdog_scanner::pipeline::EntryOverrideResolver for RegistryEntryOverrideResolver {
    fn resolve_override(&self, entry_id: Uuid, base: Classification, destination: Option<&Destination>) -> Classification {
        let Ok(Some(entry)) = self.registry.get_user_entry(entry_id) else {
            return base;
        };
        self.registry.resolve_classification(&entry, destination).unwrap_or(base)
    }
}

/// Adapts the three-stage scan pipeline to the gate's narrow
/// `ScannerBridge` need: run it, map the result, and expose the PII
/// circuit breaker's tripped state as "degraded".
pub struct PipelineScannerBridge {
    pipeline: Arc<ScanPipeline>,
    pii_breaker: Arc<watchdog_scanner::pii::CircuitBreaker>,
}

impl PipelineScannerBridge {
    pub fn new(pipeline: Arc<ScanPipeline>, pii_breaker: Arc<watchdog_scanner::pii::CircuitBreaker>) -> Self {
        PipelineScannerBridge { pipeline, pii_breaker }
    }
}

#[async_trait]
impl ScannerBridge for PipelineScannerBridge {
    type Error = watchdog_scanner::ScanStageError;

    async fn scan(
        &self,
        content: &str,
        destination: Option<&Destination>,
        posture: PostureLevel,
    ) -> Result<ScanResult, Self::Error> {
        let gate = StageGate {
            destination: destination.cloned(),
            destination_is_public: destination.map(|d| d.is_public).unwrap_or(true),
            posture,
            prior_flags_present: false,
        };
        let output = self.pipeline.run(content, gate).await;
        Ok(ScanResult {
            verdict: output.verdict,
            flags: output.flags,
            stages: output.stages,
            posture_at_decision: posture,
            degraded: output.degraded,
        })
    }

    fn is_degraded(&self) -> bool {
        self.pii_breaker.is_tripped()
    }
}

/// Persists `ScanDecision` rows through the registry's hash-chained
/// append.
pub struct RegistryAuditor {
    registry: Arc<Registry>,
}

impl RegistryAuditor {
    pub fn new(registry: Arc<Registry>) -> Self {
        RegistryAuditor { registry }
    }
}

#[async_trait]
impl AuditorBridge for RegistryAuditor {
    type Error = RegistryError;

    async fn record_decision(&self, decision: &ScanDecision) -> Result<(), Self::Error> {
        self.registry.append_decision(decision.clone()).map(|_| ())
    }
}

/// Environment variable carrying the HMAC key approval tokens are signed
/// with. Mirrors `Gate`'s own signing-key lookup so a released quarantine
/// and an APPROVE-resolved one verify against the same key.
const SIGNING_KEY_ENV: &str = "WATCHDOG_TOKEN_SIGNING_KEY";

/// Backs the escalation interface's persistence needs with the registry's
/// escalation table, quarantine/flag lookups, and DENY_AND_ADD/APPROVE
/// side effects (new user entries, approval tokens).
pub struct RegistryEscalationStore {
    registry: Arc<Registry>,
    signing_key: Vec<u8>,
}

impl RegistryEscalationStore {
    pub fn new(registry: Arc<Registry>) -> Result<Self, ConfigError> {
        let signing_key = std::env::var(SIGNING_KEY_ENV).map_err(|_| ConfigError::MissingSigningKey)?.into_bytes();
        if signing_key.is_empty() {
            return Err(ConfigError::MissingSigningKey);
        }
        Ok(RegistryEscalationStore { registry, signing_key })
    }
}

#[async_trait]
impl EscalationStore for RegistryEscalationStore {
    type Error = EscalationError;

    async fn persist_created(&self, escalation: &Escalation) -> watchdog_escalation::Result<()> {
        self.registry
            .save_escalation(escalation)
            .map_err(|e| EscalationError::Store(e.to_string()))
    }

    async fn apply_resolution(&self, resolution: &Resolution) -> watchdog_escalation::Result<()> {
        let mut escalation = self
            .registry
            .get_escalation(resolution.escalation_id)
            .map_err(|e| EscalationError::Store(e.to_string()))?
            .ok_or_else(|| EscalationError::Store(format!("unknown escalation {}", resolution.escalation_id)))?;
        escalation.state = resolution.new_state;
        self.registry
            .save_escalation(&escalation)
            .map_err(|e| EscalationError::Store(e.to_string()))?;

        for denied in &resolution.deny_add_entries {
            let entry = UserEntry {
                id: Uuid::new_v4(),
                label: denied.label.clone(),
                primary_value: denied.variant_text.clone(),
                classification: denied.classification,
                category: "denied".to_string(),
                active: true,
            };
            self.registry.create_user_entry(&entry).map_err(|e| EscalationError::Store(e.to_string()))?;
            self.registry
                .add_variant(&Variant {
                    id: Uuid::new_v4(),
                    entry_id: entry.id,
                    text: denied.variant_text.clone(),
                })
                .map_err(|e| EscalationError::Store(e.to_string()))?;
        }

        let quarantine_state = match resolution.new_state {
            watchdog_types::enums::EscalationState::Approved => watchdog_types::enums::QuarantineState::Approved,
            watchdog_types::enums::EscalationState::Denied
            | watchdog_types::enums::EscalationState::DeniedAndAdded
            | watchdog_types::enums::EscalationState::TimedOut => watchdog_types::enums::QuarantineState::Blocked,
            watchdog_types::enums::EscalationState::Pending => watchdog_types::enums::QuarantineState::Pending,
        };

        let approval_token = if resolution.issue_approval_token {
            let quarantine = self
                .registry
                .get_quarantine(resolution.quarantine_id)
                .map_err(|e| EscalationError::Store(e.to_string()))?
                .ok_or_else(|| EscalationError::Store(format!("unknown quarantine {}", resolution.quarantine_id)))?;
            Some(crate::token::generate(
                &self.signing_key,
                quarantine.request_id,
                &crate::gate::hash_hex(&quarantine.content_hash),
                resolution.resolved_at.timestamp(),
                "APPROVED",
            ))
        } else {
            None
        };

        self.registry
            .transition_quarantine(resolution.quarantine_id, quarantine_state, approval_token)
            .map_err(|e| EscalationError::Store(e.to_string()))?;

        Ok(())
    }

    async fn flagged_texts(&self, quarantine_id: Uuid) -> watchdog_escalation::Result<Vec<(String, Classification)>> {
        let decisions = self
            .registry
            .list_decisions()
            .map_err(|e| EscalationError::Store(e.to_string()))?;
        Ok(decisions
            .into_iter()
            .find(|d| d.quarantine_id == Some(quarantine_id))
            .map(|d| {
                d.flags
                    .into_iter()
                    .map(|f| (f.matched_text, f.effective_classification))
                    .collect()
            })
            .unwrap_or_default())
    }
}

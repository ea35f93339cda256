//! The Gate: the interception point for every outbound tool call.
//!
//! Evaluates the same short-circuit style as the source material's
//! three-phase pipeline, but over scan/escalation collaborators instead of
//! registry/monitor/council voting, and in the fixed six-step order the
//! external-interfaces contract specifies.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::sync::{Mutex as AsyncMutex, Semaphore};
use tracing::{info, warn};
use uuid::Uuid;

use watchdog_classifier::ClassifierClient;
use watchdog_escalation::interface::{EscalationInterface, EscalationStore};
use watchdog_registry::Registry;
use watchdog_types::bridges::{AuditorBridge, ChannelAdapter, ScannerBridge};
use watchdog_types::config::GatewayConfig;
use watchdog_types::enums::{PostureLevel, ScanDirection, ScanOutcome, ScanVerdict};
use watchdog_types::error::ConfigError;
use watchdog_types::model::{Destination, Quarantine, ScanDecision, ScanFlag, StageRecord};
use watchdog_types::Hash;

use crate::decision::{AllowReason, DenyReason, GateDecision};
use crate::killswitch::KillSwitch;
use crate::metrics::GateMetrics;
use crate::token::{self, TokenCache};

/// Content of the env var carrying the token-signing key. Never logged.
const SIGNING_KEY_ENV: &str = "WATCHDOG_TOKEN_SIGNING_KEY";

/// System prompt for the classifier's review of quarantined content. Asks
/// for the wire format `ClassifierOutput` deserializes: a top-level
/// decision, per-flag decisions, a confidence, and reasoning.
const CLASSIFIER_SYSTEM_PROMPT: &str = "You are reviewing content a security scanner flagged as potentially \
sensitive before it leaves a controlled channel. Decide BLOCK if it should never be released, ESCALATE if a human \
owner should decide, or FALSE_POSITIVE if the flag was wrong and the content is safe to release. Respond as JSON: \
{\"decision\": \"BLOCK\"|\"ESCALATE\"|\"FALSE_POSITIVE\", \"flags\": [{\"flagId\": string, \"decision\": string, \
\"reasoning\": string}], \"confidence\": number, \"reasoning\": string}.";

pub struct Gate<S, A, ES, C>
where
    S: ScannerBridge,
    A: AuditorBridge,
    ES: EscalationStore,
    C: ChannelAdapter,
{
    config: GatewayConfig,
    scanner: Arc<S>,
    auditor: Arc<A>,
    registry: Arc<Registry>,
    classifier: Arc<ClassifierClient>,
    escalation: Arc<AsyncMutex<EscalationInterface<ES, C>>>,
    metrics: Arc<GateMetrics>,
    kill_switch: Arc<KillSwitch>,
    semaphore: Arc<Semaphore>,
    token_cache: Arc<parking_lot::Mutex<TokenCache>>,
    replay_cache: Arc<parking_lot::Mutex<ReplayCache>>,
    signing_key: Vec<u8>,
}

/// Bounded cache of per-request-id gate decisions, keyed by request id
/// rather than `(sessionKey, toolCallId)` like [`TokenCache`]. Backs the
/// round-trip law that posting the same request id twice within the
/// token TTL returns the identical verdict, token, and quarantine id
/// instead of re-running the pipeline.
const REPLAY_CACHE_CAPACITY: usize = 10_000;

struct ReplayCache {
    entries: std::collections::HashMap<Uuid, (GateDecision, Instant)>,
    insert_order: Vec<Uuid>,
}

impl ReplayCache {
    fn new() -> Self {
        ReplayCache { entries: std::collections::HashMap::new(), insert_order: Vec::new() }
    }

    fn get(&self, request_id: Uuid, ttl: Duration) -> Option<GateDecision> {
        let (decision, issued_at) = self.entries.get(&request_id)?;
        if issued_at.elapsed() <= ttl {
            Some(decision.clone())
        } else {
            None
        }
    }

    fn insert(&mut self, request_id: Uuid, decision: GateDecision) {
        if !self.entries.contains_key(&request_id) && self.insert_order.len() >= REPLAY_CACHE_CAPACITY {
            let evicted = self.insert_order.remove(0);
            self.entries.remove(&evicted);
        }
        if !self.entries.contains_key(&request_id) {
            self.insert_order.push(request_id);
        }
        self.entries.insert(request_id, (decision, Instant::now()));
    }
}

fn content_hash(content: &str) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher.finalize().into()
}

pub(crate) fn hash_hex(hash: &Hash) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

impl<S, A, ES, C> Gate<S, A, ES, C>
where
    S: ScannerBridge,
    A: AuditorBridge,
    ES: EscalationStore,
    C: ChannelAdapter,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: GatewayConfig,
        scanner: Arc<S>,
        auditor: Arc<A>,
        registry: Arc<Registry>,
        classifier: Arc<ClassifierClient>,
        escalation: Arc<AsyncMutex<EscalationInterface<ES, C>>>,
    ) -> Result<Self, ConfigError> {
        let signing_key = std::env::var(SIGNING_KEY_ENV)
            .map_err(|_| ConfigError::MissingSigningKey)?
            .into_bytes();
        if signing_key.is_empty() {
            return Err(ConfigError::MissingSigningKey);
        }
        let kill_switch = Arc::new(KillSwitch::new(config.kill_switch_default));
        let semaphore = Arc::new(Semaphore::new(config.concurrency_limit));
        Ok(Gate {
            config,
            scanner,
            auditor,
            registry,
            classifier,
            escalation,
            metrics: Arc::new(GateMetrics::new()),
            kill_switch,
            semaphore,
            token_cache: Arc::new(parking_lot::Mutex::new(TokenCache::new())),
            replay_cache: Arc::new(parking_lot::Mutex::new(ReplayCache::new())),
            signing_key,
        })
    }

    pub fn metrics(&self) -> &Arc<GateMetrics> {
        &self.metrics
    }

    pub fn kill_switch(&self) -> &Arc<KillSwitch> {
        &self.kill_switch
    }

    pub fn token_cache(&self) -> &Arc<parking_lot::Mutex<TokenCache>> {
        &self.token_cache
    }

    fn current_posture(&self) -> PostureLevel {
        self.registry.get_posture().ok().flatten().map(|s| s.level).unwrap_or(PostureLevel::Green)
    }

    /// Runs the six-step gating decision for one outbound tool call.
    ///
    /// Replays of the same `request_id` within the token TTL return the
    /// cached decision instead of re-running the pipeline, per the
    /// round-trip law that a retried request id yields an identical
    /// verdict, token, and quarantine id.
    #[allow(clippy::too_many_arguments)]
    pub async fn intercept(
        &self,
        request_id: Uuid,
        session_key: &str,
        tool_call_id: &str,
        agent_id: Option<&str>,
        tool_name: &str,
        content: &str,
        destination: Option<Destination>,
    ) -> GateDecision {
        let ttl = Duration::from_secs(self.config.token_ttl_secs);
        if let Some(cached) = self.replay_cache.lock().get(request_id, ttl) {
            return cached;
        }
        let decision = self
            .intercept_uncached(request_id, session_key, tool_call_id, agent_id, tool_name, content, destination)
            .await;
        self.replay_cache.lock().insert(request_id, decision.clone());
        decision
    }

    #[allow(clippy::too_many_arguments)]
    async fn intercept_uncached(
        &self,
        request_id: Uuid,
        session_key: &str,
        tool_call_id: &str,
        agent_id: Option<&str>,
        tool_name: &str,
        content: &str,
        destination: Option<Destination>,
    ) -> GateDecision {
        self.metrics.record_intercepted();

        if self.kill_switch.is_active() {
            info!(%request_id, "kill switch active, allowing without scan");
            return GateDecision::Allow { reason: AllowReason::KillSwitchBypass, approval_token: None };
        }

        if !self.config.enabled {
            return GateDecision::Allow { reason: AllowReason::GateDisabled, approval_token: None };
        }

        if self.scanner.is_degraded() {
            self.metrics.record_failed();
            let quarantine_id = Uuid::new_v4();
            warn!(%request_id, %quarantine_id, "scanner circuit breaker tripped, failing closed");
            return GateDecision::Deny { reason: DenyReason::ScannerUnhealthy, quarantine_id: Some(quarantine_id) };
        }

        let bypassed_by_tool = self.config.bypass_tools.iter().any(|t| t == tool_name);
        let bypassed_by_destination =
            destination.as_ref().is_some_and(|d| self.config.bypass_destinations.iter().any(|b| b == &d.target));
        if bypassed_by_tool || bypassed_by_destination {
            self.metrics.record_bypassed();
            return GateDecision::Allow { reason: AllowReason::BypassList, approval_token: None };
        }

        let queue_timeout = Duration::from_millis(self.config.queue_timeout_ms);
        self.metrics.scan_queued();
        let permit = tokio::time::timeout(queue_timeout, self.semaphore.clone().acquire_owned()).await;
        self.metrics.scan_dequeued();
        let Ok(Ok(permit)) = permit else {
            self.metrics.record_failed();
            warn!(%request_id, "scan concurrency queue timed out");
            return GateDecision::Deny { reason: DenyReason::QueueTimeout, quarantine_id: None };
        };

        self.metrics.scan_started();
        let start = Instant::now();
        let posture = self.current_posture();
        let scan = self.scanner.scan(content, destination.as_ref(), posture).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        self.metrics.scan_finished(elapsed_ms);
        drop(permit);

        let now = Utc::now();
        let hash = content_hash(content);

        let scan_result = match scan {
            Ok(result) => result,
            Err(err) => {
                self.metrics.record_failed();
                let quarantine_id = Uuid::new_v4();
                warn!(%request_id, %quarantine_id, error = %err, "scan pipeline returned an error");
                let decision = self.build_decision(
                    request_id,
                    session_key,
                    agent_id,
                    hash,
                    destination.clone(),
                    posture,
                    ScanVerdict::Flagged,
                    Vec::new(),
                    Vec::new(),
                    ScanOutcome::PipelineError,
                    Some(quarantine_id),
                    None,
                    now,
                );
                let _ = self.auditor.record_decision(&decision).await;
                return GateDecision::Deny { reason: DenyReason::PipelineError, quarantine_id: Some(quarantine_id) };
            }
        };

        match scan_result.verdict {
            ScanVerdict::Clean => {
                self.metrics.record_clean();
                let verdict_label = "CLEAN";
                let token = token::generate(&self.signing_key, request_id, &hash_hex(&hash), now.timestamp(), verdict_label);
                let decision = self.build_decision(
                    request_id,
                    session_key,
                    agent_id,
                    hash,
                    destination,
                    posture,
                    ScanVerdict::Clean,
                    scan_result.flags,
                    scan_result.stages,
                    ScanOutcome::Allowed,
                    None,
                    Some(token.clone()),
                    now,
                );
                let _ = self.auditor.record_decision(&decision).await;
                self.token_cache.lock().deposit(session_key, tool_call_id, token.clone());
                GateDecision::Allow { reason: AllowReason::Clean, approval_token: Some(token) }
            }
            ScanVerdict::Flagged => {
                self.metrics.record_quarantined();
                let quarantine_id = Uuid::new_v4();
                let quarantine = Quarantine {
                    id: quarantine_id,
                    request_id,
                    content_hash: hash,
                    sealed_content: content.as_bytes().to_vec(),
                    destination: destination.clone(),
                    state: watchdog_types::enums::QuarantineState::Pending,
                    approval_token: None,
                    created_at: now,
                };
                if let Err(err) = self.registry.create_quarantine(&quarantine) {
                    warn!(%request_id, error = %err, "failed to persist quarantine");
                }

                let classifier_verdict = self.classifier.classify(quarantine_id, CLASSIFIER_SYSTEM_PROMPT, content).await;
                let outcome = match classifier_verdict.decision {
                    watchdog_types::bridges::ClassifierDecision::FalsePositive => {
                        let release_token =
                            token::generate(&self.signing_key, request_id, &hash_hex(&hash), now.timestamp(), "APPROVED");
                        if let Err(err) = self.registry.transition_quarantine(
                            quarantine_id,
                            watchdog_types::enums::QuarantineState::Approved,
                            Some(release_token),
                        ) {
                            warn!(%request_id, %quarantine_id, error = %err, "failed to release false-positive quarantine");
                        }
                        ScanOutcome::FalsePositiveReleased
                    }
                    watchdog_types::bridges::ClassifierDecision::Block => {
                        if let Err(err) =
                            self.registry.transition_quarantine(quarantine_id, watchdog_types::enums::QuarantineState::Blocked, None)
                        {
                            warn!(%request_id, %quarantine_id, error = %err, "failed to transition blocked quarantine");
                        }
                        ScanOutcome::Blocked
                    }
                    watchdog_types::bridges::ClassifierDecision::Escalate => {
                        let classification = scan_result
                            .flags
                            .iter()
                            .map(|f| f.effective_classification)
                            .min()
                            .unwrap_or(watchdog_types::enums::Classification::AskFirst);
                        let destination_target = destination.as_ref().map(|d| d.target.clone()).unwrap_or_default();
                        let mut escalation = self.escalation.lock().await;
                        if let Err(err) = escalation
                            .create(request_id, quarantine_id, classification, hash_hex(&hash), destination_target, posture, now)
                            .await
                        {
                            warn!(%request_id, %quarantine_id, error = %err, "failed to create escalation");
                        }
                        ScanOutcome::Blocked
                    }
                };

                let decision = self.build_decision(
                    request_id,
                    session_key,
                    agent_id,
                    hash,
                    destination,
                    posture,
                    ScanVerdict::Flagged,
                    scan_result.flags,
                    scan_result.stages,
                    outcome,
                    Some(quarantine_id),
                    None,
                    now,
                );
                let _ = self.auditor.record_decision(&decision).await;
                GateDecision::Deny { reason: DenyReason::Flagged, quarantine_id: Some(quarantine_id) }
            }
        }
    }

    /// Fire-and-forget inspection of inbound content: PII + fuzzy only,
    /// never blocks delivery. Errors are logged and otherwise swallowed.
    pub async fn inspect_inbound(&self, content: &str, session_key: &str) {
        self.metrics.record_inbound_inspected();
        let posture = self.current_posture();
        let destination = Destination::new(watchdog_types::enums::DestinationType::OwnerOnly, "inbound", "inbound");
        match self.scanner.scan(content, Some(&destination), posture).await {
            Ok(result) => {
                for flag in &result.flags {
                    if flag.effective_classification == watchdog_types::enums::Classification::Public {
                        continue;
                    }
                    self.upsert_inventory_for_flag(flag, session_key);
                }
            }
            Err(err) => {
                self.metrics.record_inbound_error();
                warn!(%session_key, error = %err, "inbound inspection failed");
            }
        }
    }

    /// Upserts the inventory row a non-public inbound flag implies. Pattern
    /// matches (structural/credential) key on the pattern's entity type;
    /// entry matches (exact/fuzzy) key on the matched `UserEntry`'s id.
    fn upsert_inventory_for_flag(&self, flag: &ScanFlag, session_key: &str) {
        use watchdog_types::enums::{DataForm, ScanFlagSource, StorageType};

        let (ref_type, ref_id) = match flag.source {
            ScanFlagSource::ExactMatch | ScanFlagSource::FuzzyMatch => {
                ("user_entry".to_string(), flag.registry_ref.map(|id| id.to_string()).unwrap_or_default())
            }
            ScanFlagSource::Structural | ScanFlagSource::Credential => ("pattern".to_string(), flag.entity_type.clone()),
        };
        let data_form = if flag.source == ScanFlagSource::FuzzyMatch { DataForm::Paraphrased } else { DataForm::Verbatim };
        let now = Utc::now();
        let item = watchdog_types::model::InventoryItem {
            id: Uuid::new_v4(),
            ref_type,
            ref_id,
            storage_location: session_key.to_string(),
            storage_type: StorageType::Session,
            data_form,
            classification: flag.effective_classification,
            first_detected: now,
            last_verified: now,
            active: true,
        };
        if let Err(err) = self.registry.upsert_inventory_item(&item) {
            warn!(%session_key, error = %err, "failed to upsert inventory item");
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_decision(
        &self,
        request_id: Uuid,
        session_key: &str,
        agent_id: Option<&str>,
        content_hash: Hash,
        destination: Option<Destination>,
        posture: PostureLevel,
        verdict: ScanVerdict,
        flags: Vec<ScanFlag>,
        stages: Vec<StageRecord>,
        outcome: ScanOutcome,
        quarantine_id: Option<Uuid>,
        approval_token: Option<String>,
        timestamp: chrono::DateTime<Utc>,
    ) -> ScanDecision {
        ScanDecision {
            request_id,
            direction: ScanDirection::Outbound,
            session_key: session_key.to_string(),
            agent_id: agent_id.map(str::to_string),
            content_hash,
            destination,
            posture_at_decision: posture,
            verdict,
            stages,
            flags,
            outcome,
            quarantine_id,
            approval_token,
            timestamp,
            chain_hash: [0u8; 32],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    use watchdog_escalation::Resolution;
    use watchdog_types::config::EscalationConfig;
    use watchdog_types::enums::Classification;

    #[derive(Debug, thiserror::Error)]
    #[error("fake scanner error")]
    struct FakeScannerError;

    struct FakeScanner {
        verdict: ScanVerdict,
        flags: Vec<ScanFlag>,
        degraded: AtomicBool,
        fail: AtomicBool,
    }

    impl FakeScanner {
        fn clean() -> Self {
            FakeScanner { verdict: ScanVerdict::Clean, flags: Vec::new(), degraded: AtomicBool::new(false), fail: AtomicBool::new(false) }
        }
        fn flagged(flags: Vec<ScanFlag>) -> Self {
            FakeScanner { verdict: ScanVerdict::Flagged, flags, degraded: AtomicBool::new(false), fail: AtomicBool::new(false) }
        }
        fn unhealthy() -> Self {
            FakeScanner { verdict: ScanVerdict::Clean, flags: Vec::new(), degraded: AtomicBool::new(true), fail: AtomicBool::new(false) }
        }
        fn erroring() -> Self {
            FakeScanner { verdict: ScanVerdict::Clean, flags: Vec::new(), degraded: AtomicBool::new(false), fail: AtomicBool::new(true) }
        }
    }

    #[async_trait::async_trait]
    impl ScannerBridge for FakeScanner {
        type Error = FakeScannerError;

        async fn scan(
            &self,
            _content: &str,
            _destination: Option<&Destination>,
            posture: PostureLevel,
        ) -> Result<watchdog_types::bridges::ScanResult, Self::Error> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(FakeScannerError);
            }
            Ok(watchdog_types::bridges::ScanResult {
                verdict: self.verdict,
                flags: self.flags.clone(),
                stages: Vec::new(),
                posture_at_decision: posture,
                degraded: false,
            })
        }

        fn is_degraded(&self) -> bool {
            self.degraded.load(Ordering::SeqCst)
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("fake auditor error")]
    struct FakeAuditorError;

    struct FakeAuditor {
        recorded: StdMutex<Vec<ScanDecision>>,
    }

    impl FakeAuditor {
        fn new() -> Self {
            FakeAuditor { recorded: StdMutex::new(Vec::new()) }
        }
    }

    #[async_trait::async_trait]
    impl AuditorBridge for FakeAuditor {
        type Error = FakeAuditorError;

        async fn record_decision(&self, decision: &ScanDecision) -> Result<(), Self::Error> {
            self.recorded.lock().unwrap().push(decision.clone());
            Ok(())
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("fake escalation store error")]
    struct FakeStoreError;

    struct FakeStore {
        created: AtomicUsize,
    }

    impl FakeStore {
        fn new() -> Self {
            FakeStore { created: AtomicUsize::new(0) }
        }
    }

    #[async_trait::async_trait]
    impl EscalationStore for FakeStore {
        type Error = FakeStoreError;

        async fn persist_created(&self, _escalation: &watchdog_types::model::Escalation) -> std::result::Result<(), Self::Error> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn apply_resolution(&self, _resolution: &Resolution) -> std::result::Result<(), Self::Error> {
            Ok(())
        }

        async fn flagged_texts(&self, _quarantine_id: Uuid) -> std::result::Result<Vec<(String, Classification)>, Self::Error> {
            Ok(Vec::new())
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("fake channel error")]
    struct FakeChannelError;

    struct FakeChannel;

    #[async_trait::async_trait]
    impl ChannelAdapter for FakeChannel {
        type Error = FakeChannelError;

        async fn send_message(&self, _channel: &str, _peer_id: &str, _text: &str) -> std::result::Result<(), Self::Error> {
            Ok(())
        }

        async fn is_available(&self, _channel: &str) -> bool {
            true
        }
    }

    fn escalation_config() -> EscalationConfig {
        EscalationConfig {
            queue_capacity: 50,
            batch_window_secs: 5,
            batch_max_size: 10,
            batch_max_delay_secs: 15,
            timeout_secs: 900,
            timeout_secs_red: 300,
            reminder_lead_secs: 300,
            bulk_confirm_timeout_secs: 60,
        }
    }

    fn make_gate(
        scanner: FakeScanner,
        config: GatewayConfig,
    ) -> Gate<FakeScanner, FakeAuditor, FakeStore, FakeChannel> {
        std::env::set_var(SIGNING_KEY_ENV, "test-signing-key");
        let registry = Arc::new(Registry::temporary().unwrap());
        let classifier = Arc::new(ClassifierClient::new(watchdog_types::config::SecurityAgentConfig::default()));
        let escalation = Arc::new(AsyncMutex::new(EscalationInterface::new(
            &escalation_config(),
            Arc::new(FakeStore::new()),
            Arc::new(FakeChannel),
            "primary",
            None,
            "owner",
        )));
        Gate::new(config, Arc::new(scanner), Arc::new(FakeAuditor::new()), registry, classifier, escalation).unwrap()
    }

    fn default_config() -> GatewayConfig {
        GatewayConfig {
            enabled: true,
            bypass_tools: Vec::new(),
            bypass_destinations: Vec::new(),
            concurrency_limit: 10,
            queue_timeout_ms: 10_000,
            token_ttl_secs: 60,
            kill_switch_default: false,
        }
    }

    #[tokio::test]
    async fn clean_scan_allows_with_an_approval_token() {
        let gate = make_gate(FakeScanner::clean(), default_config());
        let decision = gate
            .intercept(Uuid::new_v4(), "session-1", "call-1", None, "read_file", "hello", None)
            .await;
        assert!(decision.is_allowed());
        assert!(decision.approval_token().is_some());
        assert_eq!(gate.token_cache().lock().len(), 1);
    }

    #[tokio::test]
    async fn replaying_the_same_request_id_returns_the_cached_decision() {
        let gate = make_gate(FakeScanner::clean(), default_config());
        let request_id = Uuid::new_v4();
        let first = gate.intercept(request_id, "session-1", "call-1", None, "read_file", "hello", None).await;
        let second = gate.intercept(request_id, "session-1", "call-1", None, "read_file", "hello", None).await;
        assert_eq!(first, second);
        // a fresh pipeline run would have minted a second token; the cache hit must not.
        assert_eq!(gate.token_cache().lock().len(), 1);
    }

    #[tokio::test]
    async fn flagged_scan_denies_and_quarantines() {
        let flag = ScanFlag {
            id: Uuid::new_v4(),
            source: watchdog_types::enums::ScanFlagSource::Structural,
            entity_type: "EMAIL".to_string(),
            matched_text: "a@b.com".to_string(),
            confidence: 0.9,
            offset_start: 0,
            offset_end: 7,
            effective_classification: Classification::NeverShare,
            registry_ref: None,
        };
        let gate = make_gate(FakeScanner::flagged(vec![flag]), default_config());
        let decision = gate
            .intercept(Uuid::new_v4(), "session-1", "call-1", None, "read_file", "a@b.com", None)
            .await;
        match decision {
            GateDecision::Deny { reason, quarantine_id } => {
                assert_eq!(reason, DenyReason::Flagged);
                assert!(quarantine_id.is_some());
            }
            _ => panic!("expected deny"),
        }
    }

    #[tokio::test]
    async fn kill_switch_allows_without_scanning() {
        let gate = make_gate(FakeScanner::unhealthy(), default_config());
        gate.kill_switch().activate("incident", "operator");
        let decision = gate
            .intercept(Uuid::new_v4(), "session-1", "call-1", None, "read_file", "hello", None)
            .await;
        assert_eq!(decision, GateDecision::Allow { reason: AllowReason::KillSwitchBypass, approval_token: None });
    }

    #[tokio::test]
    async fn unhealthy_scanner_fails_closed() {
        let gate = make_gate(FakeScanner::unhealthy(), default_config());
        let decision = gate
            .intercept(Uuid::new_v4(), "session-1", "call-1", None, "read_file", "hello", None)
            .await;
        match decision {
            GateDecision::Deny { reason, .. } => assert_eq!(reason, DenyReason::ScannerUnhealthy),
            _ => panic!("expected deny"),
        }
    }

    #[tokio::test]
    async fn bypass_tool_allows_without_scanning() {
        let mut config = default_config();
        config.bypass_tools.push("safe_tool".to_string());
        let gate = make_gate(FakeScanner::clean(), config);
        let decision = gate
            .intercept(Uuid::new_v4(), "session-1", "call-1", None, "safe_tool", "hello", None)
            .await;
        assert_eq!(decision, GateDecision::Allow { reason: AllowReason::BypassList, approval_token: None });
    }

    #[tokio::test]
    async fn disabled_gate_allows_everything() {
        let mut config = default_config();
        config.enabled = false;
        let gate = make_gate(FakeScanner::clean(), config);
        let decision = gate
            .intercept(Uuid::new_v4(), "session-1", "call-1", None, "read_file", "hello", None)
            .await;
        assert_eq!(decision, GateDecision::Allow { reason: AllowReason::GateDisabled, approval_token: None });
    }

    #[tokio::test]
    async fn scan_pipeline_error_denies_with_a_quarantine_id() {
        let gate = make_gate(FakeScanner::erroring(), default_config());
        let decision = gate
            .intercept(Uuid::new_v4(), "session-1", "call-1", None, "read_file", "hello", None)
            .await;
        match decision {
            GateDecision::Deny { reason, quarantine_id } => {
                assert_eq!(reason, DenyReason::PipelineError);
                assert!(quarantine_id.is_some());
            }
            _ => panic!("expected deny"),
        }
    }
}

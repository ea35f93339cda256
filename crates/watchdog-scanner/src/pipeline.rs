//! The three-stage scan pipeline.
//!
//! Orchestrates PII, Secrets, and Fuzzy stages under per-stage and total
//! deadlines, producing a flag list and per-stage execution record. Does
//! not itself persist anything or know about request ids, sessions, or
//! posture transitions — those belong to the caller (the gateway), which
//! combines a [`PipelineOutput`] with registry lookups to build a full
//! `ScanDecision`. This keeps the pipeline testable without a registry
//! and keeps `watchdog-scanner` from depending on `watchdog-registry`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;
use watchdog_types::enums::{Classification, PostureLevel, ScanFlagSource, ScanVerdict};
use watchdog_types::model::{Destination, ScanFlag, StageRecord};

use crate::dedup::dedup_flags;
use crate::fuzzy::{self, FuzzyIndex};
use crate::pii::{CircuitBreaker, PiiAnalyzer};
use crate::secrets::{self, CredentialScanner};

/// Looks up the classification a structural-PII entity type maps to,
/// via the registry's active `Pattern` rows, subject to destination-rule
/// resolution. Kept as a narrow trait so the pipeline doesn't depend on
/// `watchdog-registry` directly.
pub trait PatternLookup: Send + Sync {
    fn classification_for(&self, entity_type: &str, destination: Option<&Destination>) -> Option<Classification>;
}

/// Applies a `UserEntry`'s destination-rule override to a fuzzy/exact
/// match's base classification. Kept narrow for the same reason as
/// `PatternLookup`. `entry_id == Uuid::nil()` (a tagged-literal match
/// with no backing `UserEntry`) has no rule to apply and is passed
/// through unchanged.
pub trait EntryOverrideResolver: Send + Sync {
    fn resolve_override(&self, entry_id: Uuid, base: Classification, destination: Option<&Destination>) -> Classification;
}

/// Per-request inputs that decide which stages run, per the scan
/// pipeline's conditional-execution rules.
#[derive(Debug, Clone)]
pub struct StageGate {
    pub destination: Option<Destination>,
    pub destination_is_public: bool,
    pub posture: PostureLevel,
    pub prior_flags_present: bool,
}

impl StageGate {
    /// Secrets runs when the destination is public, posture is RED or
    /// BLACK, or prior flags are already present on this content.
    fn should_run_secrets(&self) -> bool {
        self.destination_is_public
            || matches!(self.posture, PostureLevel::Red | PostureLevel::Black)
            || self.prior_flags_present
    }
}

pub struct PipelineOutput {
    pub flags: Vec<ScanFlag>,
    pub stages: Vec<StageRecord>,
    pub verdict: ScanVerdict,
    pub degraded: bool,
}

pub struct ScanPipeline {
    pii_analyzer: Arc<dyn PiiAnalyzer>,
    pattern_lookup: Arc<dyn PatternLookup>,
    entry_override: Arc<dyn EntryOverrideResolver>,
    credential_scanner: Arc<dyn CredentialScanner>,
    fuzzy_index: Arc<FuzzyIndex>,
    pii_circuit_breaker: Arc<CircuitBreaker>,
    pii_entities: Vec<String>,
    pii_score_threshold: f64,
    pii_timeout: Duration,
    secrets_timeout: Duration,
    fuzzy_timeout: Duration,
    total_timeout: Duration,
}

impl ScanPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pii_analyzer: Arc<dyn PiiAnalyzer>,
        pattern_lookup: Arc<dyn PatternLookup>,
        entry_override: Arc<dyn EntryOverrideResolver>,
        credential_scanner: Arc<dyn CredentialScanner>,
        fuzzy_index: Arc<FuzzyIndex>,
        pii_circuit_breaker: Arc<CircuitBreaker>,
        pii_entities: Vec<String>,
        pii_score_threshold: f64,
        pii_timeout: Duration,
        secrets_timeout: Duration,
        fuzzy_timeout: Duration,
        total_timeout: Duration,
    ) -> Self {
        ScanPipeline {
            pii_analyzer,
            pattern_lookup,
            entry_override,
            credential_scanner,
            fuzzy_index,
            pii_circuit_breaker,
            pii_entities,
            pii_score_threshold,
            pii_timeout,
            secrets_timeout,
            fuzzy_timeout,
            total_timeout,
        }
    }

    /// Runs all applicable stages against `content`, honoring per-stage
    /// and total timeouts. Never returns an error: a stage failure
    /// degrades that stage (zero flags, `degraded = true`) and the
    /// pipeline continues. Only the total-timeout deadline can abort
    /// remaining stages early, which is itself reported as degraded.
    pub async fn run(&self, content: &str, gate: StageGate) -> PipelineOutput {
        let started = Instant::now();
        let mut stages = Vec::with_capacity(3);
        let mut flags = Vec::new();
        let mut pipeline_degraded = false;

        // --- PII stage ---
        if self.pii_circuit_breaker.is_tripped() {
            stages.push(StageRecord {
                stage: "pii".to_string(),
                executed: false,
                duration_ms: 0,
                flag_count: 0,
                degraded: true,
                error: Some("circuit breaker tripped".to_string()),
            });
            pipeline_degraded = true;
        } else {
            let stage_started = Instant::now();
            let result = tokio::time::timeout(
                self.pii_timeout,
                self.pii_analyzer.analyze(
                    content,
                    "en",
                    &self.pii_entities,
                    self.pii_score_threshold,
                ),
            )
            .await;

            match result {
                Ok(Ok(entities)) => {
                    self.pii_circuit_breaker.record_success();
                    let mut found = 0;
                    for entity in entities {
                        if let Some(classification) =
                            self.pattern_lookup.classification_for(&entity.entity_type, gate.destination.as_ref())
                        {
                            found += 1;
                            flags.push(ScanFlag {
                                id: Uuid::new_v4(),
                                source: ScanFlagSource::Structural,
                                entity_type: entity.entity_type,
                                matched_text: content[entity.start.min(content.len())..entity.end.min(content.len())]
                                    .to_string(),
                                confidence: entity.score,
                                offset_start: entity.start,
                                offset_end: entity.end,
                                effective_classification: classification,
                                registry_ref: None,
                            });
                        }
                    }
                    stages.push(StageRecord {
                        stage: "pii".to_string(),
                        executed: true,
                        duration_ms: stage_started.elapsed().as_millis() as u64,
                        flag_count: found,
                        degraded: false,
                        error: None,
                    });
                }
                Ok(Err(e)) => {
                    self.pii_circuit_breaker.record_failure();
                    stages.push(degraded_stage("pii", stage_started, e.to_string()));
                    pipeline_degraded = true;
                }
                Err(_) => {
                    self.pii_circuit_breaker.record_failure();
                    stages.push(degraded_stage("pii", stage_started, "timed out".to_string()));
                    pipeline_degraded = true;
                }
            }
        }

        if started.elapsed() >= self.total_timeout {
            return self.timed_out(flags, stages);
        }

        // --- Secrets stage ---
        if gate.should_run_secrets() {
            let stage_started = Instant::now();
            let result = tokio::time::timeout(
                self.secrets_timeout,
                secrets::run_secrets_stage(self.credential_scanner.as_ref(), content),
            )
            .await;

            match result {
                Ok(Ok(findings)) => {
                    let count = findings.len();
                    for f in findings {
                        flags.push(ScanFlag {
                            id: Uuid::new_v4(),
                            source: ScanFlagSource::Credential,
                            entity_type: f.detector,
                            matched_text: content
                                [f.offset_start.min(content.len())..f.offset_end.min(content.len())]
                                .to_string(),
                            confidence: f.confidence,
                            offset_start: f.offset_start,
                            offset_end: f.offset_end,
                            effective_classification: Classification::NeverShare,
                            registry_ref: None,
                        });
                    }
                    stages.push(StageRecord {
                        stage: "secrets".to_string(),
                        executed: true,
                        duration_ms: stage_started.elapsed().as_millis() as u64,
                        flag_count: count,
                        degraded: false,
                        error: None,
                    });
                }
                Ok(Err(e)) => {
                    stages.push(degraded_stage("secrets", stage_started, e.to_string()));
                    pipeline_degraded = true;
                }
                Err(_) => {
                    stages.push(degraded_stage("secrets", stage_started, "timed out".to_string()));
                    pipeline_degraded = true;
                }
            }
        } else {
            stages.push(StageRecord {
                stage: "secrets".to_string(),
                executed: false,
                duration_ms: 0,
                flag_count: 0,
                degraded: false,
                error: None,
            });
        }

        if started.elapsed() >= self.total_timeout {
            return self.timed_out(flags, stages);
        }

        // --- Fuzzy stage ---
        {
            let stage_started = Instant::now();
            let index = Arc::clone(&self.fuzzy_index);
            let content_owned = content.to_string();
            let posture = gate.posture;
            let result = tokio::time::timeout(
                self.fuzzy_timeout,
                tokio::task::spawn_blocking(move || fuzzy::run_fuzzy_stage(&index, &content_owned, posture)),
            )
            .await;

            match result {
                Ok(Ok(matches)) => {
                    let count = matches.len();
                    for m in matches {
                        let effective_classification = if m.entry_id.is_nil() {
                            m.classification
                        } else {
                            self.entry_override.resolve_override(m.entry_id, m.classification, gate.destination.as_ref())
                        };
                        flags.push(ScanFlag {
                            id: Uuid::new_v4(),
                            source: if m.exact {
                                ScanFlagSource::ExactMatch
                            } else {
                                ScanFlagSource::FuzzyMatch
                            },
                            entity_type: "USER_ENTRY".to_string(),
                            matched_text: m.matched_text,
                            confidence: m.confidence,
                            offset_start: m.offset_start,
                            offset_end: m.offset_end,
                            effective_classification,
                            registry_ref: Some(m.entry_id).filter(|id| !id.is_nil()),
                        });
                    }
                    stages.push(StageRecord {
                        stage: "fuzzy".to_string(),
                        executed: true,
                        duration_ms: stage_started.elapsed().as_millis() as u64,
                        flag_count: count,
                        degraded: false,
                        error: None,
                    });
                }
                Ok(Err(e)) => {
                    stages.push(degraded_stage("fuzzy", stage_started, e.to_string()));
                    pipeline_degraded = true;
                }
                Err(_) => {
                    stages.push(degraded_stage("fuzzy", stage_started, "timed out".to_string()));
                    pipeline_degraded = true;
                }
            }
        }

        let flags = dedup_flags(flags);
        let verdict = if flags.iter().any(|f| f.effective_classification.is_flaggable()) {
            ScanVerdict::Flagged
        } else {
            ScanVerdict::Clean
        };

        PipelineOutput {
            flags,
            stages,
            verdict,
            degraded: pipeline_degraded,
        }
    }

    /// Builds the synthetic `pipeline_error` flag and forces FLAGGED,
    /// per the total-timeout failure semantics: the request is always
    /// quarantined rather than allowed through on a partial scan.
    fn timed_out(&self, mut flags: Vec<ScanFlag>, mut stages: Vec<StageRecord>) -> PipelineOutput {
        stages.push(StageRecord {
            stage: "pipeline".to_string(),
            executed: true,
            duration_ms: self.total_timeout.as_millis() as u64,
            flag_count: 1,
            degraded: true,
            error: Some("total pipeline timeout exceeded".to_string()),
        });
        flags.push(ScanFlag {
            id: Uuid::new_v4(),
            source: ScanFlagSource::Structural,
            entity_type: "pipeline_error".to_string(),
            matched_text: String::new(),
            confidence: 1.0,
            offset_start: 0,
            offset_end: 0,
            effective_classification: Classification::NeverShare,
            registry_ref: None,
        });
        PipelineOutput {
            flags,
            stages,
            verdict: ScanVerdict::Flagged,
            degraded: true,
        }
    }
}

fn degraded_stage(stage: &str, started: Instant, error: String) -> StageRecord {
    StageRecord {
        stage: stage.to_string(),
        executed: true,
        duration_ms: started.elapsed().as_millis() as u64,
        flag_count: 0,
        degraded: true,
        error: Some(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pii::PiiEntity;
    use crate::secrets::CredentialDetection;
    use async_trait::async_trait;
    use watchdog_types::enums::Classification;

    struct FakePii(Vec<PiiEntity>);
    #[async_trait]
    impl PiiAnalyzer for FakePii {
        async fn analyze(
            &self,
            _text: &str,
            _language: &str,
            _entities: &[String],
            _threshold: f64,
        ) -> Result<Vec<PiiEntity>, crate::error::ScanStageError> {
            Ok(self.0.clone())
        }
    }

    struct AlwaysSsn;
    impl PatternLookup for AlwaysSsn {
        fn classification_for(&self, entity_type: &str, _destination: Option<&Destination>) -> Option<Classification> {
            if entity_type == "US_SSN" {
                Some(Classification::NeverShare)
            } else {
                None
            }
        }
    }

    struct NoOverride;
    impl EntryOverrideResolver for NoOverride {
        fn resolve_override(&self, _entry_id: Uuid, base: Classification, _destination: Option<&Destination>) -> Classification {
            base
        }
    }

    struct NoCredentials;
    #[async_trait]
    impl CredentialScanner for NoCredentials {
        async fn scan(&self, _content: &str) -> Result<Vec<CredentialDetection>, crate::error::ScanStageError> {
            Ok(Vec::new())
        }
    }

    fn pipeline(pii: Vec<PiiEntity>) -> ScanPipeline {
        ScanPipeline::new(
            Arc::new(FakePii(pii)),
            Arc::new(AlwaysSsn),
            Arc::new(NoOverride),
            Arc::new(NoCredentials),
            Arc::new(FuzzyIndex::new()),
            Arc::new(CircuitBreaker::new(10)),
            vec!["US_SSN".to_string()],
            0.35,
            Duration::from_millis(500),
            Duration::from_millis(1500),
            Duration::from_millis(1000),
            Duration::from_millis(5000),
        )
    }

    fn clean_gate() -> StageGate {
        StageGate {
            destination: None,
            destination_is_public: false,
            posture: PostureLevel::Green,
            prior_flags_present: false,
        }
    }

    #[tokio::test]
    async fn empty_content_yields_clean_zero_flags() {
        let output = pipeline(vec![]).run("", clean_gate()).await;
        assert_eq!(output.verdict, ScanVerdict::Clean);
        assert!(output.flags.is_empty());
    }

    #[tokio::test]
    async fn ssn_detection_yields_flagged_never_share() {
        let entity = PiiEntity {
            entity_type: "US_SSN".to_string(),
            start: 0,
            end: 11,
            score: 0.9,
        };
        let output = pipeline(vec![entity]).run("123-45-6789", clean_gate()).await;
        assert_eq!(output.verdict, ScanVerdict::Flagged);
        assert_eq!(output.flags.len(), 1);
        assert_eq!(output.flags[0].effective_classification, Classification::NeverShare);
    }

    #[tokio::test]
    async fn secrets_stage_skipped_when_gate_conditions_not_met() {
        let output = pipeline(vec![]).run("plain text", clean_gate()).await;
        let secrets_stage = output.stages.iter().find(|s| s.stage == "secrets").unwrap();
        assert!(!secrets_stage.executed);
    }

    #[tokio::test]
    async fn secrets_stage_runs_for_public_destination() {
        let gate = StageGate {
            destination_is_public: true,
            ..clean_gate()
        };
        let output = pipeline(vec![]).run("plain text", gate).await;
        let secrets_stage = output.stages.iter().find(|s| s.stage == "secrets").unwrap();
        assert!(secrets_stage.executed);
    }

    #[tokio::test]
    async fn tripped_circuit_breaker_skips_pii_and_marks_degraded() {
        let p = pipeline(vec![]);
        for _ in 0..10 {
            p.pii_circuit_breaker.record_failure();
        }
        let output = p.run("anything", clean_gate()).await;
        assert!(output.degraded);
        let pii_stage = output.stages.iter().find(|s| s.stage == "pii").unwrap();
        assert!(!pii_stage.executed);
    }
}

//! Structural PII detection.
//!
//! Submits content to an external analyzer service, maps each returned
//! entity back through its registered `Pattern`, and applies the
//! pattern's default classification (subject to destination-rule
//! override, which the caller — `pipeline.rs` — applies afterward via
//! the registry).

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ScanStageError;

/// One entity returned by the external analyzer.
#[derive(Debug, Clone, Deserialize)]
pub struct PiiEntity {
    pub entity_type: String,
    pub start: usize,
    pub end: usize,
    pub score: f64,
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
    language: &'a str,
    entities: &'a [String],
    #[serde(rename = "scoreThreshold")]
    score_threshold: f64,
}

/// A structural-PII recognizer. Implemented over HTTP in production; a
/// fixed-response fake backs pipeline tests.
#[async_trait]
pub trait PiiAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        text: &str,
        language: &str,
        entities: &[String],
        score_threshold: f64,
    ) -> Result<Vec<PiiEntity>, ScanStageError>;
}

/// HTTP client for the external structural-PII analyzer.
///
/// Request: `{text, language, entities, scoreThreshold}`.
/// Response: `[{entity_type, start, end, score}]`.
pub struct HttpPiiAnalyzer {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpPiiAnalyzer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        HttpPiiAnalyzer {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

#[async_trait]
impl PiiAnalyzer for HttpPiiAnalyzer {
    async fn analyze(
        &self,
        text: &str,
        language: &str,
        entities: &[String],
        score_threshold: f64,
    ) -> Result<Vec<PiiEntity>, ScanStageError> {
        let request = AnalyzeRequest {
            text,
            language,
            entities,
            score_threshold,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScanStageError::Timeout(self.timeout.as_millis() as u64)
                } else {
                    ScanStageError::Unreachable(e.to_string())
                }
            })?;

        response
            .json::<Vec<PiiEntity>>()
            .await
            .map_err(|e| ScanStageError::InvalidResponse(e.to_string()))
    }
}

/// Trips after `threshold` consecutive analyzer failures and stays
/// tripped until an operator calls [`CircuitBreaker::reset`].
///
/// Mirrors the fail-closed rule: once tripped, the PII stage is
/// considered unavailable and the gate treats the scanner as degraded
/// (`ScannerBridge::is_degraded`).
pub struct CircuitBreaker {
    threshold: u32,
    consecutive_failures: AtomicU32,
}

impl CircuitBreaker {
    pub fn new(threshold: u32) -> Self {
        CircuitBreaker {
            threshold,
            consecutive_failures: AtomicU32::new(0),
        }
    }

    pub fn is_tripped(&self) -> bool {
        self.consecutive_failures.load(Ordering::SeqCst) >= self.threshold
    }

    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
    }

    pub fn record_failure(&self) {
        self.consecutive_failures.fetch_add(1, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
    }

    pub fn failure_count(&self) -> u32 {
        self.consecutive_failures.load(Ordering::SeqCst)
    }
}

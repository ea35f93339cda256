//! Classifier HTTP client: wraps the local model's generate endpoint with
//! canary hardening, a bounded retry policy, and a circuit breaker. Never
//! returns an error to the caller — every failure mode degrades to an
//! `Escalate` verdict so an unreachable model fails toward a human, not
//! toward silently allowing or blocking.

use std::time::Duration;

use tracing::warn;
use uuid::Uuid;

use watchdog_types::bridges::{ClassifierDecision, ClassifierVerdict};
use watchdog_types::config::SecurityAgentConfig;

use crate::canary::{canary_leaked, generate_canary, harden_system_prompt};
use crate::circuit::CircuitBreaker;
use crate::error::{ClassifierError, Result};
use crate::precedence::combine;
use crate::wire::{ClassifierOutput, GenerateOptions, GenerateRequest, GenerateResponse};

/// Whether a failed attempt should be retried. A plain function over the
/// prior attempt's result, kept separate from the loop that drives it: only
/// parse failures are worth retrying (a fresh sample from the model may
/// parse cleanly), and only while attempts remain.
fn should_retry(attempt: u32, max_attempts: u32, last_result: &Result<ClassifierOutput>) -> bool {
    attempt < max_attempts && matches!(last_result, Err(ClassifierError::ParseFailure(_)))
}

pub struct ClassifierClient {
    http: reqwest::Client,
    cfg: SecurityAgentConfig,
    breaker: CircuitBreaker,
}

impl ClassifierClient {
    pub fn new(cfg: SecurityAgentConfig) -> Self {
        ClassifierClient {
            http: reqwest::Client::new(),
            cfg,
            breaker: CircuitBreaker::new(10),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.breaker.is_tripped()
    }

    pub fn reset(&self) {
        self.breaker.reset();
    }

    /// Classifies one quarantined payload. Never surfaces an error: a
    /// degraded circuit, exhausted retries, or a canary leak all resolve to
    /// an `Escalate` verdict with confidence `0.0`.
    pub async fn classify(&self, quarantine_id: Uuid, system_prompt: &str, content: &str) -> ClassifierVerdict {
        if self.breaker.is_tripped() {
            return forced_escalate(quarantine_id, "classifier circuit breaker is tripped");
        }

        let canary = generate_canary();
        let hardened_system = harden_system_prompt(system_prompt, &canary);

        let mut attempt = 0;
        let mut last: Result<ClassifierOutput> = Err(ClassifierError::ParseFailure("no attempt made".to_string()));

        loop {
            attempt += 1;
            last = self.call_once(&hardened_system, content, &canary).await;

            match &last {
                Ok(_) => {
                    self.breaker.record_success();
                    break;
                }
                Err(ClassifierError::ParseFailure(reason)) => {
                    warn!(attempt, %reason, "classifier output failed to parse");
                    if !should_retry(attempt, self.cfg.max_parse_attempts, &last) {
                        break;
                    }
                }
                Err(_) => {
                    self.breaker.record_failure();
                    break;
                }
            }
        }

        match last {
            Ok(output) => {
                let (decision, confidence) = combine(&output, self.cfg.min_confidence);
                ClassifierVerdict { quarantine_id, decision, confidence, reasoning: output.reasoning }
            }
            Err(err) => forced_escalate(quarantine_id, &err.to_string()),
        }
    }

    async fn call_once(&self, hardened_system: &str, content: &str, canary: &str) -> Result<ClassifierOutput> {
        let request = GenerateRequest::new(
            &self.cfg.model,
            hardened_system,
            content,
            GenerateOptions {
                temperature: self.cfg.temperature,
                num_predict: self.cfg.num_predict,
                top_p: self.cfg.top_p,
            },
        );

        let response = self
            .http
            .post(&self.cfg.endpoint)
            .json(&request)
            .timeout(Duration::from_millis(self.cfg.timeout_ms))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifierError::Timeout(self.cfg.timeout_ms)
                } else {
                    ClassifierError::Unreachable(e.to_string())
                }
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ClassifierError::ModelMissing(self.cfg.model.clone()));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::ParseFailure(e.to_string()))?;

        if canary_leaked(&body.response, canary) {
            return Err(ClassifierError::ParseFailure("canary token leaked into model output".to_string()));
        }

        serde_json::from_str(&body.response).map_err(|e| ClassifierError::ParseFailure(e.to_string()))
    }
}

fn forced_escalate(quarantine_id: Uuid, reasoning: &str) -> ClassifierVerdict {
    ClassifierVerdict {
        quarantine_id,
        decision: ClassifierDecision::Escalate,
        confidence: 0.0,
        reasoning: reasoning.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(result: Result<ClassifierOutput>) -> Result<ClassifierOutput> {
        result
    }

    #[test]
    fn retries_on_parse_failure_while_attempts_remain() {
        let last = output(Err(ClassifierError::ParseFailure("bad json".to_string())));
        assert!(should_retry(1, 2, &last));
    }

    #[test]
    fn stops_retrying_once_attempts_exhausted() {
        let last = output(Err(ClassifierError::ParseFailure("bad json".to_string())));
        assert!(!should_retry(2, 2, &last));
    }

    #[test]
    fn does_not_retry_on_network_errors() {
        let last = output(Err(ClassifierError::Unreachable("connection refused".to_string())));
        assert!(!should_retry(1, 2, &last));
    }

    #[tokio::test]
    async fn tripped_breaker_forces_escalate_without_a_network_call() {
        let client = ClassifierClient::new(SecurityAgentConfig {
            endpoint: "http://127.0.0.1:1/nonexistent".to_string(),
            ..Default::default()
        });
        for _ in 0..10 {
            client.breaker.record_failure();
        }
        let verdict = client.classify(Uuid::new_v4(), "system", "content").await;
        assert_eq!(verdict.decision, ClassifierDecision::Escalate);
        assert_eq!(verdict.confidence, 0.0);
    }
}

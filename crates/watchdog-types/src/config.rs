//! Configuration for the Security Watchdog, loaded from a single JSON
//! document at `WATCHDOG_CONFIG_PATH`.
//!
//! Mirrors the sections enumerated in the external-interfaces contract:
//! `gateway.hook`, `scanner`, `securityAgent`, `escalation`, `posture`,
//! `auditor`. Unknown keys are rejected at load (`deny_unknown_fields`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::enums::Classification;
use crate::error::ConfigError;

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchdogConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(rename = "securityAgent", default)]
    pub security_agent: SecurityAgentConfig,
    #[serde(default)]
    pub escalation: EscalationConfig,
    #[serde(default)]
    pub posture: PostureConfig,
    #[serde(default)]
    pub auditor: AuditorConfig,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        WatchdogConfig {
            gateway: GatewayConfig::default(),
            scanner: ScannerConfig::default(),
            security_agent: SecurityAgentConfig::default(),
            escalation: EscalationConfig::default(),
            posture: PostureConfig::default(),
            auditor: AuditorConfig::default(),
        }
    }
}

impl WatchdogConfig {
    /// Parses a configuration document, rejecting unknown keys.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Loads the configuration from `WATCHDOG_CONFIG_PATH`, falling back to
    /// defaults if the variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var("WATCHDOG_CONFIG_PATH") {
            Ok(path) => {
                let text = std::fs::read_to_string(&path)
                    .map_err(|e| ConfigError::Invalid(format!("{path}: {e}")))?;
                Self::from_json(&text)
            }
            Err(_) => Ok(Self::default()),
        }
    }
}

/// `gateway.hook` section: interception entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub bypass_tools: Vec<String>,
    #[serde(default)]
    pub bypass_destinations: Vec<String>,
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
    #[serde(default = "default_queue_timeout_ms")]
    pub queue_timeout_ms: u64,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    #[serde(default)]
    pub kill_switch_default: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            enabled: true,
            bypass_tools: Vec::new(),
            bypass_destinations: Vec::new(),
            concurrency_limit: default_concurrency_limit(),
            queue_timeout_ms: default_queue_timeout_ms(),
            token_ttl_secs: default_token_ttl_secs(),
            kill_switch_default: false,
        }
    }
}

fn default_concurrency_limit() -> usize {
    10
}
fn default_queue_timeout_ms() -> u64 {
    // 2 * T_total default (T_total default 5000ms)
    10_000
}
fn default_token_ttl_secs() -> u64 {
    60
}
fn default_true() -> bool {
    true
}

/// `scanner` section: per-stage budgets and thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScannerConfig {
    #[serde(default = "default_total_timeout_ms")]
    pub total_timeout_ms: u64,
    #[serde(default = "default_pii_timeout_ms")]
    pub pii_timeout_ms: u64,
    #[serde(default = "default_secrets_timeout_ms")]
    pub secrets_timeout_ms: u64,
    #[serde(default = "default_fuzzy_timeout_ms")]
    pub fuzzy_timeout_ms: u64,
    #[serde(default = "default_pii_score_threshold")]
    pub pii_score_threshold: f64,
    #[serde(default = "default_circuit_breaker_threshold")]
    pub circuit_breaker_threshold: u32,
    #[serde(default = "default_max_content_bytes")]
    pub max_content_bytes: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            total_timeout_ms: default_total_timeout_ms(),
            pii_timeout_ms: default_pii_timeout_ms(),
            secrets_timeout_ms: default_secrets_timeout_ms(),
            fuzzy_timeout_ms: default_fuzzy_timeout_ms(),
            pii_score_threshold: default_pii_score_threshold(),
            circuit_breaker_threshold: default_circuit_breaker_threshold(),
            max_content_bytes: default_max_content_bytes(),
        }
    }
}

fn default_total_timeout_ms() -> u64 {
    5_000
}
fn default_pii_timeout_ms() -> u64 {
    500
}
fn default_secrets_timeout_ms() -> u64 {
    1_500
}
fn default_fuzzy_timeout_ms() -> u64 {
    1_000
}
fn default_pii_score_threshold() -> f64 {
    0.35
}
fn default_circuit_breaker_threshold() -> u32 {
    10
}
fn default_max_content_bytes() -> usize {
    1_000_000
}

/// `securityAgent` section: classifier client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityAgentConfig {
    #[serde(default = "default_classifier_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_classifier_model")]
    pub model: String,
    #[serde(default = "default_classifier_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_parse_attempts")]
    pub max_parse_attempts: u32,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_num_predict")]
    pub num_predict: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
}

impl Default for SecurityAgentConfig {
    fn default() -> Self {
        SecurityAgentConfig {
            endpoint: default_classifier_endpoint(),
            model: default_classifier_model(),
            timeout_ms: default_classifier_timeout_ms(),
            max_parse_attempts: default_max_parse_attempts(),
            min_confidence: default_min_confidence(),
            temperature: default_temperature(),
            num_predict: default_num_predict(),
            top_p: default_top_p(),
        }
    }
}

fn default_classifier_endpoint() -> String {
    "http://127.0.0.1:11434/api/generate".to_string()
}
fn default_classifier_model() -> String {
    "llama3".to_string()
}
fn default_classifier_timeout_ms() -> u64 {
    8_000
}
fn default_max_parse_attempts() -> u32 {
    2
}
fn default_min_confidence() -> f64 {
    0.7
}
fn default_temperature() -> f64 {
    0.0
}
fn default_num_predict() -> u32 {
    512
}
fn default_top_p() -> f64 {
    0.9
}

/// `escalation` section: priority queue, batching, timers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EscalationConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_batch_window_secs")]
    pub batch_window_secs: u64,
    #[serde(default = "default_batch_max_size")]
    pub batch_max_size: usize,
    #[serde(default = "default_batch_max_delay_secs")]
    pub batch_max_delay_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_timeout_secs_red")]
    pub timeout_secs_red: u64,
    #[serde(default = "default_reminder_lead_secs")]
    pub reminder_lead_secs: u64,
    #[serde(default = "default_bulk_confirm_timeout_secs")]
    pub bulk_confirm_timeout_secs: u64,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        EscalationConfig {
            queue_capacity: default_queue_capacity(),
            batch_window_secs: default_batch_window_secs(),
            batch_max_size: default_batch_max_size(),
            batch_max_delay_secs: default_batch_max_delay_secs(),
            timeout_secs: default_timeout_secs(),
            timeout_secs_red: default_timeout_secs_red(),
            reminder_lead_secs: default_reminder_lead_secs(),
            bulk_confirm_timeout_secs: default_bulk_confirm_timeout_secs(),
        }
    }
}

fn default_queue_capacity() -> usize {
    50
}
fn default_batch_window_secs() -> u64 {
    5
}
fn default_batch_max_size() -> usize {
    10
}
fn default_batch_max_delay_secs() -> u64 {
    15
}
fn default_timeout_secs() -> u64 {
    900
}
fn default_timeout_secs_red() -> u64 {
    300
}
fn default_reminder_lead_secs() -> u64 {
    300
}
fn default_bulk_confirm_timeout_secs() -> u64 {
    60
}

/// `posture` section: hysteresis and lifecycle-alert tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostureConfig {
    #[serde(default = "default_hysteresis_secs")]
    pub hysteresis_down_secs: u64,
    #[serde(default = "default_recalc_interval_secs")]
    pub recalc_interval_secs: u64,
    #[serde(default = "default_retention_days")]
    pub retention_days: HashMap<Classification, u64>,
    #[serde(default = "default_staleness_hours")]
    pub staleness_hours: u64,
    #[serde(default = "default_lifecycle_alert_interval_hours")]
    pub lifecycle_alert_interval_hours: u64,
}

impl Default for PostureConfig {
    fn default() -> Self {
        PostureConfig {
            hysteresis_down_secs: default_hysteresis_secs(),
            recalc_interval_secs: default_recalc_interval_secs(),
            retention_days: default_retention_days(),
            staleness_hours: default_staleness_hours(),
            lifecycle_alert_interval_hours: default_lifecycle_alert_interval_hours(),
        }
    }
}

fn default_hysteresis_secs() -> u64 {
    300
}
fn default_recalc_interval_secs() -> u64 {
    60
}
fn default_retention_days() -> HashMap<Classification, u64> {
    let mut m = HashMap::new();
    m.insert(Classification::NeverShare, 7);
    m.insert(Classification::AskFirst, 30);
    m.insert(Classification::InternalOnly, 90);
    m
}
fn default_staleness_hours() -> u64 {
    48
}
fn default_lifecycle_alert_interval_hours() -> u64 {
    24
}

/// `auditor` section: registry persistence and audit-log behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditorConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_true")]
    pub fail_closed: bool,
    #[serde(default = "default_true")]
    pub audit_logging: bool,
}

impl Default for AuditorConfig {
    fn default() -> Self {
        AuditorConfig {
            db_path: default_db_path(),
            fail_closed: true,
            audit_logging: true,
        }
    }
}

fn default_db_path() -> String {
    "./data/watchdog.db".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_defaults() {
        let cfg = WatchdogConfig::default();
        assert_eq!(cfg.gateway.concurrency_limit, 10);
        assert_eq!(cfg.scanner.pii_timeout_ms, 500);
        assert_eq!(cfg.scanner.secrets_timeout_ms, 1_500);
        assert_eq!(cfg.scanner.fuzzy_timeout_ms, 1_000);
        assert_eq!(cfg.scanner.total_timeout_ms, 5_000);
        assert_eq!(cfg.escalation.queue_capacity, 50);
        assert_eq!(cfg.escalation.timeout_secs, 900);
        assert_eq!(cfg.posture.hysteresis_down_secs, 300);
        assert_eq!(
            cfg.posture.retention_days[&Classification::NeverShare],
            7
        );
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = WatchdogConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let parsed = WatchdogConfig::from_json(&json).unwrap();
        assert_eq!(cfg, parsed);
    }

    #[test]
    fn rejects_unknown_keys() {
        let bad = r#"{"gateway": {"enabled": true, "not_a_real_field": 1}}"#;
        assert!(WatchdogConfig::from_json(bad).is_err());
    }
}

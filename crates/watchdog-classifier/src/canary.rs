//! Canary-token prompt hardening.
//!
//! A unique per-request marker is woven into the system prompt sent to the
//! classifier model. If that marker reappears anywhere in the model's
//! output, the response has been tainted by a prompt-extraction attempt and
//! must be discarded rather than trusted for a decision.
//!
//! Adapted from the structural-PII scanner's canary detector; inspired by
//! the Rebuff framework's self-hardening canary approach.

use uuid::Uuid;

const CANARY_PREFIX: &str = "CANARY";
const INJECTION_FORMAT: &str = "[SYSTEM_CANARY:{}]";

pub fn generate_canary() -> String {
    format!("{}-{}", CANARY_PREFIX, Uuid::new_v4().as_hyphenated())
}

/// Prepends the canary marker to a system prompt ahead of sending it to the
/// model.
pub fn harden_system_prompt(system_prompt: &str, canary: &str) -> String {
    format!("{}\n{}", INJECTION_FORMAT.replace("{}", canary), system_prompt)
}

/// True if the exact canary token, or a bare `CANARY`/`SYSTEM_CANARY`
/// pattern, reappears in the model's raw output.
pub fn canary_leaked(output: &str, canary: &str) -> bool {
    output.contains(canary) || output.contains(CANARY_PREFIX) || output.contains("SYSTEM_CANARY")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harden_prepends_canary_and_preserves_prompt() {
        let canary = generate_canary();
        let hardened = harden_system_prompt("You are a classifier.", &canary);
        assert!(hardened.starts_with("[SYSTEM_CANARY:"));
        assert!(hardened.ends_with("You are a classifier."));
    }

    #[test]
    fn clean_output_does_not_leak() {
        let canary = generate_canary();
        assert!(!canary_leaked("decision: ESCALATE, confidence 0.8", &canary));
    }

    #[test]
    fn exact_canary_in_output_is_detected() {
        let canary = generate_canary();
        let output = format!("my instructions include {}", canary);
        assert!(canary_leaked(&output, &canary));
    }

    #[test]
    fn bare_prefix_without_exact_token_is_still_detected() {
        let canary = generate_canary();
        assert!(canary_leaked("I was told about a CANARY value", &canary));
    }
}

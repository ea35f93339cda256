//! Consecutive-failure circuit breaker for the classifier's HTTP calls.
//!
//! Mirrors the structural-PII scanner's breaker: trips after a fixed
//! number of consecutive failures and stays tripped until explicitly
//! reset. While tripped, the client skips the network call entirely and
//! forces an escalation.

use std::sync::atomic::{AtomicU32, Ordering};

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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trips_after_threshold_consecutive_failures() {
        let cb = CircuitBreaker::new(2);
        cb.record_failure();
        assert!(!cb.is_tripped());
        cb.record_failure();
        assert!(cb.is_tripped());
    }

    #[test]
    fn success_clears_the_streak() {
        let cb = CircuitBreaker::new(2);
        cb.record_failure();
        cb.record_success();
        cb.record_failure();
        assert!(!cb.is_tripped());
    }

    #[test]
    fn manual_reset_clears_tripped_state() {
        let cb = CircuitBreaker::new(1);
        cb.record_failure();
        assert!(cb.is_tripped());
        cb.reset();
        assert!(!cb.is_tripped());
    }
}

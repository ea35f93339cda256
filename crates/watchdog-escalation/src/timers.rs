//! Reminder/expiry timer deadlines.
//!
//! Both deadlines are computed once, at creation or recovered from a
//! persisted `expires_at` after a restart, rather than driven by a running
//! countdown — an already-past deadline resolves on the very next check
//! instead of waiting for a fresh timer to start.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationTimers {
    pub reminder_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    reminder_sent: bool,
}

impl EscalationTimers {
    pub fn new(created_at: DateTime<Utc>, timeout: chrono::Duration, reminder_lead: chrono::Duration) -> Self {
        let expires_at = created_at + timeout;
        EscalationTimers {
            reminder_at: expires_at - reminder_lead,
            expires_at,
            reminder_sent: false,
        }
    }

    /// Recovers timers from a persisted expiry at startup.
    pub fn from_persisted_expiry(expires_at: DateTime<Utc>, reminder_lead: chrono::Duration) -> Self {
        EscalationTimers {
            reminder_at: expires_at - reminder_lead,
            expires_at,
            reminder_sent: false,
        }
    }

    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// True exactly once: the first check at or after the reminder deadline.
    pub fn take_reminder_due(&mut self, now: DateTime<Utc>) -> bool {
        if !self.reminder_sent && now >= self.reminder_at {
            self.reminder_sent = true;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn expiry_is_created_at_plus_timeout() {
        let timers = EscalationTimers::new(now(), chrono::Duration::seconds(900), chrono::Duration::seconds(300));
        assert_eq!(timers.expires_at, now() + chrono::Duration::seconds(900));
        assert_eq!(timers.reminder_at, now() + chrono::Duration::seconds(600));
    }

    #[test]
    fn reminder_fires_exactly_once() {
        let mut timers = EscalationTimers::new(now(), chrono::Duration::seconds(900), chrono::Duration::seconds(300));
        let at_reminder = now() + chrono::Duration::seconds(600);
        assert!(timers.take_reminder_due(at_reminder));
        assert!(!timers.take_reminder_due(at_reminder + chrono::Duration::seconds(1)));
    }

    #[test]
    fn recovered_timer_with_past_expiry_is_already_expired() {
        let timers = EscalationTimers::from_persisted_expiry(now() - chrono::Duration::seconds(1), chrono::Duration::seconds(300));
        assert!(timers.expired(now()));
    }
}

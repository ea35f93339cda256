//! Pending bulk-operation confirmation.
//!
//! `APPROVE-ALL` / `DENY-ALL` opens a confirmation window; the next message
//! is interpreted as confirmation (`YES`/`Y`/`CONFIRM`) while the window is
//! open, otherwise the pending op implicitly cancels.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOp {
    ApproveAll,
    DenyAll,
}

struct PendingBulk {
    op: BulkOp,
    opened_at: DateTime<Utc>,
    timeout: chrono::Duration,
}

#[derive(Default)]
pub struct BulkState {
    pending: Option<PendingBulk>,
}

impl BulkState {
    pub fn new() -> Self {
        BulkState { pending: None }
    }

    pub fn open(&mut self, op: BulkOp, now: DateTime<Utc>, timeout_secs: u64) {
        self.pending = Some(PendingBulk {
            op,
            opened_at: now,
            timeout: chrono::Duration::seconds(timeout_secs as i64),
        });
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        match &self.pending {
            Some(p) => now - p.opened_at < p.timeout,
            None => false,
        }
    }

    /// Consumes the pending op if one is open and unexpired; clears the
    /// pending state regardless so a stray confirmation after expiry is a
    /// no-op rather than resurrecting a stale bulk op.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> Option<BulkOp> {
        let pending = self.pending.take()?;
        if now - pending.opened_at >= pending.timeout {
            None
        } else {
            Some(pending.op)
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn confirm_within_window_returns_op() {
        let mut state = BulkState::new();
        state.open(BulkOp::ApproveAll, now(), 60);
        assert_eq!(state.confirm(now() + chrono::Duration::seconds(10)), Some(BulkOp::ApproveAll));
    }

    #[test]
    fn confirm_after_expiry_returns_none() {
        let mut state = BulkState::new();
        state.open(BulkOp::DenyAll, now(), 60);
        assert_eq!(state.confirm(now() + chrono::Duration::seconds(61)), None);
    }

    #[test]
    fn no_pending_op_returns_none() {
        let mut state = BulkState::new();
        assert_eq!(state.confirm(now()), None);
    }
}

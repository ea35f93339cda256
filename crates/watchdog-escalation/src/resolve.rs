//! Act-stage resolution: turns a trigger into the decision outcome and
//! registry mutations the caller must apply. This module only computes
//! what happened; it never touches persistence, the approval-token key, or
//! the messaging transport directly.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use watchdog_types::enums::{Classification, EscalationState};
use watchdog_types::model::Escalation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTrigger {
    UserApprove,
    UserDeny,
    UserDenyAdd,
    Timeout,
}

/// One user-entry-plus-variant pair to create for DENY_AND_ADD, derived
/// from a flag's matched text.
#[derive(Debug, Clone, PartialEq)]
pub struct DeniedVariant {
    pub label: String,
    pub variant_text: String,
    pub classification: Classification,
}

/// What happened when an escalation resolved, and what the caller must do
/// about it: issue an approval token, write the decision outcome, and for
/// DENY_AND_ADD create the listed user entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub escalation_id: Uuid,
    pub quarantine_id: Uuid,
    pub linked_request_ids: Vec<Uuid>,
    pub new_state: EscalationState,
    pub decision_outcome: &'static str,
    pub issue_approval_token: bool,
    pub deny_add_entries: Vec<DeniedVariant>,
    pub resolved_at: DateTime<Utc>,
}

/// Resolves `escalation` per `trigger`. `matched_texts` supplies the flag
/// text/classification pairs behind the quarantined payload, consulted
/// only for DENY_AND_ADD — every flag becomes a NEVER_SHARE user entry with
/// a `denied_`-prefixed label and the matched text as its variant, per the
/// specification's adopted answer to the "partial fuzzy token" open
/// question (all source flags qualify, not just exact matches).
pub fn resolve(
    escalation: &Escalation,
    trigger: ResolutionTrigger,
    matched_texts: &[(String, Classification)],
    now: DateTime<Utc>,
) -> Resolution {
    let (new_state, outcome, issue_token, deny_add_entries) = match trigger {
        ResolutionTrigger::UserApprove => (EscalationState::Approved, "approved_by_user", true, Vec::new()),
        ResolutionTrigger::UserDeny => (EscalationState::Denied, "denied_by_user", false, Vec::new()),
        ResolutionTrigger::UserDenyAdd => {
            let entries = matched_texts
                .iter()
                .enumerate()
                .map(|(i, (text, _classification))| DeniedVariant {
                    label: format!("denied_{}_{}", escalation.short_id.trim_start_matches("esc-"), i),
                    variant_text: text.clone(),
                    classification: Classification::NeverShare,
                })
                .collect();
            (EscalationState::DeniedAndAdded, "denied_and_added", false, entries)
        }
        ResolutionTrigger::Timeout => (EscalationState::TimedOut, "denied_by_timeout", false, Vec::new()),
    };

    Resolution {
        escalation_id: escalation.id,
        quarantine_id: escalation.quarantine_id,
        linked_request_ids: escalation.linked_request_ids.clone(),
        new_state,
        decision_outcome: outcome,
        issue_approval_token: issue_token,
        deny_add_entries,
        resolved_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escalation() -> Escalation {
        Escalation {
            id: Uuid::new_v4(),
            short_id: "esc-abcdef12".to_string(),
            state: EscalationState::Pending,
            priority: 1,
            quarantine_id: Uuid::new_v4(),
            linked_request_ids: vec![Uuid::new_v4()],
            created_at: now(),
            expires_at: now() + chrono::Duration::seconds(900),
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn approve_issues_token_and_sets_outcome() {
        let res = resolve(&escalation(), ResolutionTrigger::UserApprove, &[], now());
        assert_eq!(res.new_state, EscalationState::Approved);
        assert_eq!(res.decision_outcome, "approved_by_user");
        assert!(res.issue_approval_token);
    }

    #[test]
    fn deny_add_creates_an_entry_per_flag() {
        let texts = vec![
            ("Family of 6 at Ridgeview".to_string(), Classification::AskFirst),
            ("Q-Mesh".to_string(), Classification::AskFirst),
        ];
        let res = resolve(&escalation(), ResolutionTrigger::UserDenyAdd, &texts, now());
        assert_eq!(res.new_state, EscalationState::DeniedAndAdded);
        assert_eq!(res.decision_outcome, "denied_and_added");
        assert_eq!(res.deny_add_entries.len(), 2);
        assert!(res.deny_add_entries[0].label.starts_with("denied_"));
    }

    #[test]
    fn timeout_denies_by_timeout() {
        let res = resolve(&escalation(), ResolutionTrigger::Timeout, &[], now());
        assert_eq!(res.new_state, EscalationState::TimedOut);
        assert_eq!(res.decision_outcome, "denied_by_timeout");
        assert!(!res.issue_approval_token);
    }
}

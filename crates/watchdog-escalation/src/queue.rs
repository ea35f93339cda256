//! Priority queue of pending escalations.
//!
//! Ordered by priority bucket (NEVER_SHARE < ASK_FIRST < INTERNAL_ONLY <
//! other), FIFO within a bucket. A duplicate create — same content hash and
//! destination target as an already-pending escalation — attaches its
//! request id to the existing entry instead of creating a new one.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use watchdog_types::enums::{Classification, EscalationState};
use watchdog_types::model::Escalation;

use crate::error::{EscalationError, Result};
use crate::ids;

/// Maps a classification to its escalation priority bucket: 0 is highest.
pub fn priority_for(classification: Classification) -> u8 {
    match classification {
        Classification::NeverShare => 0,
        Classification::AskFirst => 1,
        Classification::InternalOnly => 2,
        Classification::Public => 3,
    }
}

type DuplicateKey = (String, String);

struct PendingEscalation {
    escalation: Escalation,
    duplicate_key: DuplicateKey,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    /// A new escalation was created and should be notified.
    Created(Escalation),
    /// `request_id` was attached to the existing escalation with this short
    /// id; no new notification is needed.
    Attached(String),
}

pub struct EscalationQueue {
    capacity: usize,
    by_id: HashMap<Uuid, PendingEscalation>,
    by_short_id: HashMap<String, Uuid>,
    by_duplicate_key: HashMap<DuplicateKey, Uuid>,
}

impl EscalationQueue {
    pub fn new(capacity: usize) -> Self {
        EscalationQueue {
            capacity,
            by_id: HashMap::new(),
            by_short_id: HashMap::new(),
            by_duplicate_key: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &mut self,
        request_id: Uuid,
        quarantine_id: Uuid,
        classification: Classification,
        content_hash: String,
        destination_target: String,
        now: DateTime<Utc>,
        timeout: chrono::Duration,
    ) -> Result<CreateOutcome> {
        let key = (content_hash, destination_target);
        if let Some(existing_id) = self.by_duplicate_key.get(&key) {
            let pending = self
                .by_id
                .get_mut(existing_id)
                .expect("duplicate-key index must point at a live entry");
            pending.escalation.linked_request_ids.push(request_id);
            return Ok(CreateOutcome::Attached(pending.escalation.short_id.clone()));
        }

        if self.is_full() {
            return Err(EscalationError::QueueFull(self.capacity));
        }

        let by_short_id = &self.by_short_id;
        let (id, short_id) = ids::generate_unique_id(|candidate| by_short_id.contains_key(candidate));
        let escalation = Escalation {
            id,
            short_id: short_id.clone(),
            state: EscalationState::Pending,
            priority: priority_for(classification),
            quarantine_id,
            linked_request_ids: vec![request_id],
            created_at: now,
            expires_at: now + timeout,
        };
        self.by_id.insert(
            id,
            PendingEscalation {
                escalation: escalation.clone(),
                duplicate_key: key.clone(),
            },
        );
        self.by_short_id.insert(short_id, id);
        self.by_duplicate_key.insert(key, id);
        Ok(CreateOutcome::Created(escalation))
    }

    pub fn find_by_short_id(&self, short_id: &str) -> Option<&Escalation> {
        self.by_short_id
            .get(short_id)
            .and_then(|id| self.by_id.get(id))
            .map(|p| &p.escalation)
    }

    pub fn get(&self, id: Uuid) -> Option<&Escalation> {
        self.by_id.get(&id).map(|p| &p.escalation)
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Escalation> {
        let pending = self.by_id.remove(&id)?;
        self.by_short_id.remove(&pending.escalation.short_id);
        self.by_duplicate_key.remove(&pending.duplicate_key);
        Some(pending.escalation)
    }

    pub fn remove_by_short_id(&mut self, short_id: &str) -> Option<Escalation> {
        let id = *self.by_short_id.get(short_id)?;
        self.remove(id)
    }

    /// All pending escalations ordered by priority bucket, then arrival
    /// order within the bucket.
    pub fn ordered(&self) -> Vec<&Escalation> {
        let mut all: Vec<&Escalation> = self.by_id.values().map(|p| &p.escalation).collect();
        all.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.created_at.cmp(&b.created_at)));
        all
    }

    pub fn ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.by_id.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn create_succeeds_and_assigns_priority() {
        let mut q = EscalationQueue::new(50);
        let outcome = q
            .create(
                Uuid::new_v4(),
                Uuid::new_v4(),
                Classification::NeverShare,
                "hash1".to_string(),
                "dest1".to_string(),
                now(),
                chrono::Duration::seconds(900),
            )
            .unwrap();
        match outcome {
            CreateOutcome::Created(esc) => assert_eq!(esc.priority, 0),
            _ => panic!("expected Created"),
        }
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn duplicate_create_attaches_instead_of_inserting() {
        let mut q = EscalationQueue::new(50);
        q.create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Classification::AskFirst,
            "hash1".to_string(),
            "dest1".to_string(),
            now(),
            chrono::Duration::seconds(900),
        )
        .unwrap();

        let second_request = Uuid::new_v4();
        let outcome = q
            .create(
                second_request,
                Uuid::new_v4(),
                Classification::AskFirst,
                "hash1".to_string(),
                "dest1".to_string(),
                now(),
                chrono::Duration::seconds(900),
            )
            .unwrap();

        assert!(matches!(outcome, CreateOutcome::Attached(_)));
        assert_eq!(q.len(), 1);
        let esc = q.ordered()[0];
        assert!(esc.linked_request_ids.contains(&second_request));
    }

    #[test]
    fn full_queue_rejects_new_escalations() {
        let mut q = EscalationQueue::new(1);
        q.create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Classification::AskFirst,
            "a".to_string(),
            "d".to_string(),
            now(),
            chrono::Duration::seconds(900),
        )
        .unwrap();

        let err = q
            .create(
                Uuid::new_v4(),
                Uuid::new_v4(),
                Classification::AskFirst,
                "b".to_string(),
                "d".to_string(),
                now(),
                chrono::Duration::seconds(900),
            )
            .unwrap_err();
        assert!(matches!(err, EscalationError::QueueFull(1)));
    }

    #[test]
    fn ordered_ranks_never_share_before_ask_first() {
        let mut q = EscalationQueue::new(50);
        q.create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Classification::AskFirst,
            "a".to_string(),
            "d1".to_string(),
            now(),
            chrono::Duration::seconds(900),
        )
        .unwrap();
        q.create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Classification::NeverShare,
            "b".to_string(),
            "d2".to_string(),
            now(),
            chrono::Duration::seconds(900),
        )
        .unwrap();

        let ordered = q.ordered();
        assert_eq!(ordered[0].priority, 0);
        assert_eq!(ordered[1].priority, 1);
    }
}

//! The escalation interface facade: wires the priority queue, batch
//! notifier, timers, bulk-op state, and reply parser into the lifecycle
//! described for one escalation (create, notify, wait, resolve, act).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use watchdog_types::bridges::ChannelAdapter;
use watchdog_types::config::EscalationConfig;
use watchdog_types::enums::{Classification, PostureLevel};
use watchdog_types::model::Escalation;

use crate::batch::BatchAccumulator;
use crate::bulk::{BulkOp, BulkState};
use crate::error::{EscalationError, Result};
use crate::parser::{parse_message, ParsedMessage};
use crate::queue::{CreateOutcome, EscalationQueue};
use crate::resolve::{resolve, Resolution, ResolutionTrigger};
use crate::timers::EscalationTimers;

/// What the escalation interface needs from persistence. Kept narrow so
/// this crate doesn't depend on the registry's storage concretely — the
/// registry's CRUD surface is a collaborator, not a dependency.
#[async_trait]
pub trait EscalationStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn persist_created(&self, escalation: &Escalation) -> std::result::Result<(), Self::Error>;
    async fn apply_resolution(&self, resolution: &Resolution) -> std::result::Result<(), Self::Error>;
    /// Flag text/classification pairs behind a quarantined payload; read
    /// only for DENY_AND_ADD resolutions.
    async fn flagged_texts(
        &self,
        quarantine_id: Uuid,
    ) -> std::result::Result<Vec<(String, Classification)>, Self::Error>;
}

#[derive(Debug)]
pub enum HandledReply {
    Resolved(Resolution),
    BulkPending(BulkOp),
    BulkResolved(Vec<Resolution>),
    StatusListing(Vec<String>),
    HelpMessage(Vec<String>),
    /// A bulk confirmation arrived with nothing pending, or the pending op
    /// had already expired.
    Noop,
}

pub struct EscalationInterface<S, C> {
    queue: EscalationQueue,
    batch: BatchAccumulator,
    bulk: BulkState,
    timers: HashMap<Uuid, EscalationTimers>,
    store: Arc<S>,
    channel: Arc<C>,
    primary_channel: String,
    fallback_channel: Option<String>,
    peer_id: String,
    reminder_lead: chrono::Duration,
    timeout_green: chrono::Duration,
    timeout_red: chrono::Duration,
    bulk_confirm_timeout_secs: u64,
}

impl<S, C> EscalationInterface<S, C>
where
    S: EscalationStore,
    C: ChannelAdapter,
{
    pub fn new(
        cfg: &EscalationConfig,
        store: Arc<S>,
        channel: Arc<C>,
        primary_channel: impl Into<String>,
        fallback_channel: Option<String>,
        peer_id: impl Into<String>,
    ) -> Self {
        EscalationInterface {
            queue: EscalationQueue::new(cfg.queue_capacity),
            batch: BatchAccumulator::new(cfg.batch_window_secs, cfg.batch_max_size, cfg.batch_max_delay_secs),
            bulk: BulkState::new(),
            timers: HashMap::new(),
            store,
            channel,
            primary_channel: primary_channel.into(),
            fallback_channel,
            peer_id: peer_id.into(),
            reminder_lead: chrono::Duration::seconds(cfg.reminder_lead_secs as i64),
            timeout_green: chrono::Duration::seconds(cfg.timeout_secs as i64),
            timeout_red: chrono::Duration::seconds(cfg.timeout_secs_red as i64),
            bulk_confirm_timeout_secs: cfg.bulk_confirm_timeout_secs,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Creates (or attaches a duplicate to) an escalation. `Ok(None)` means
    /// an existing escalation absorbed this request and no new notification
    /// is needed; `Ok(Some(short_id))` means a fresh one was queued.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &mut self,
        request_id: Uuid,
        quarantine_id: Uuid,
        classification: Classification,
        content_hash: String,
        destination_target: String,
        posture: PostureLevel,
        now: DateTime<Utc>,
    ) -> Result<Option<String>> {
        let timeout = if posture >= PostureLevel::Red {
            self.timeout_red
        } else {
            self.timeout_green
        };
        let outcome = self
            .queue
            .create(request_id, quarantine_id, classification, content_hash, destination_target, now, timeout)?;
        match outcome {
            CreateOutcome::Attached(_short_id) => Ok(None),
            CreateOutcome::Created(escalation) => {
                self.timers
                    .insert(escalation.id, EscalationTimers::new(now, timeout, self.reminder_lead));
                self.store
                    .persist_created(&escalation)
                    .await
                    .map_err(|e| EscalationError::Store(e.to_string()))?;
                self.batch.add(escalation.short_id.clone(), now);
                Ok(Some(escalation.short_id))
            }
        }
    }

    pub fn should_flush_batch(&self, now: DateTime<Utc>) -> bool {
        self.batch.should_flush(now)
    }

    pub fn next_wakeup(&self) -> Option<DateTime<Utc>> {
        self.batch.next_deadline()
    }

    /// Flushes the batch, sending one message via the preferred channel and
    /// falling back to the secondary on failure. If both fail, every
    /// escalation in the batch resolves immediately as TIMEOUT.
    pub async fn flush_batch(&mut self, now: DateTime<Utc>) -> Result<Vec<Resolution>> {
        if self.batch.is_empty() {
            return Ok(Vec::new());
        }
        let short_ids = self.batch.flush();
        let text = format_batch_message(&short_ids);

        let mut sent = self.channel.send_message(&self.primary_channel, &self.peer_id, &text).await.is_ok();
        if !sent {
            if let Some(fallback) = &self.fallback_channel {
                sent = self.channel.send_message(fallback, &self.peer_id, &text).await.is_ok();
            }
        }

        if sent {
            return Ok(Vec::new());
        }

        let mut resolutions = Vec::new();
        for short_id in short_ids {
            if let Some(escalation) = self.queue.find_by_short_id(&short_id).cloned() {
                resolutions.push(self.resolve_and_remove(&escalation, ResolutionTrigger::Timeout, now).await?);
            }
        }
        Ok(resolutions)
    }

    /// Resolves every escalation whose expiry timer has fired.
    pub async fn check_expiries(&mut self, now: DateTime<Utc>) -> Result<Vec<Resolution>> {
        let expired_ids: Vec<Uuid> = self.timers.iter().filter(|(_, t)| t.expired(now)).map(|(id, _)| *id).collect();

        let mut resolutions = Vec::new();
        for id in expired_ids {
            if let Some(escalation) = self.queue.get(id).cloned() {
                resolutions.push(self.resolve_and_remove(&escalation, ResolutionTrigger::Timeout, now).await?);
            }
        }
        Ok(resolutions)
    }

    /// Short ids whose reminder deadline just fired, for the caller to
    /// send a reminder message. Fires exactly once per escalation.
    pub fn due_reminders(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let queue = &self.queue;
        self.timers
            .iter_mut()
            .filter(|(_, timers)| timers.take_reminder_due(now))
            .filter_map(|(id, _)| queue.get(*id).map(|e| e.short_id.clone()))
            .collect()
    }

    /// Parses and handles one incoming reply.
    pub async fn handle_message(&mut self, text: &str, now: DateTime<Utc>) -> Result<HandledReply> {
        match parse_message(text) {
            ParsedMessage::Approve(short_id) => self.resolve_by_short_id(&short_id, ResolutionTrigger::UserApprove, now).await,
            ParsedMessage::Deny(short_id) => self.resolve_by_short_id(&short_id, ResolutionTrigger::UserDeny, now).await,
            ParsedMessage::DenyAdd(short_id) => self.resolve_by_short_id(&short_id, ResolutionTrigger::UserDenyAdd, now).await,
            ParsedMessage::ApproveAll => {
                self.bulk.open(BulkOp::ApproveAll, now, self.bulk_confirm_timeout_secs);
                Ok(HandledReply::BulkPending(BulkOp::ApproveAll))
            }
            ParsedMessage::DenyAll => {
                self.bulk.open(BulkOp::DenyAll, now, self.bulk_confirm_timeout_secs);
                Ok(HandledReply::BulkPending(BulkOp::DenyAll))
            }
            ParsedMessage::BulkConfirm => match self.bulk.confirm(now) {
                Some(BulkOp::ApproveAll) => Ok(HandledReply::BulkResolved(self.resolve_all(ResolutionTrigger::UserApprove, now).await?)),
                Some(BulkOp::DenyAll) => Ok(HandledReply::BulkResolved(self.resolve_all(ResolutionTrigger::UserDeny, now).await?)),
                None => Ok(HandledReply::Noop),
            },
            ParsedMessage::Status => Ok(HandledReply::StatusListing(
                self.queue.ordered().into_iter().map(|e| e.short_id.clone()).collect(),
            )),
            ParsedMessage::Unrecognized => Ok(HandledReply::HelpMessage(
                self.queue.ordered().into_iter().map(|e| e.short_id.clone()).collect(),
            )),
        }
    }

    async fn resolve_by_short_id(&mut self, short_id: &str, trigger: ResolutionTrigger, now: DateTime<Utc>) -> Result<HandledReply> {
        let escalation = self
            .queue
            .find_by_short_id(short_id)
            .cloned()
            .ok_or_else(|| EscalationError::UnknownShortId(short_id.to_string()))?;
        Ok(HandledReply::Resolved(self.resolve_and_remove(&escalation, trigger, now).await?))
    }

    async fn resolve_all(&mut self, trigger: ResolutionTrigger, now: DateTime<Utc>) -> Result<Vec<Resolution>> {
        let escalations: Vec<Escalation> = self.queue.ordered().into_iter().cloned().collect();
        let mut resolutions = Vec::with_capacity(escalations.len());
        for escalation in escalations {
            resolutions.push(self.resolve_and_remove(&escalation, trigger, now).await?);
        }
        Ok(resolutions)
    }

    async fn resolve_and_remove(&mut self, escalation: &Escalation, trigger: ResolutionTrigger, now: DateTime<Utc>) -> Result<Resolution> {
        let matched_texts = if matches!(trigger, ResolutionTrigger::UserDenyAdd) {
            self.store
                .flagged_texts(escalation.quarantine_id)
                .await
                .map_err(|e| EscalationError::Store(e.to_string()))?
        } else {
            Vec::new()
        };
        let resolution = resolve(escalation, trigger, &matched_texts, now);
        self.store
            .apply_resolution(&resolution)
            .await
            .map_err(|e| EscalationError::Store(e.to_string()))?;
        self.queue.remove(escalation.id);
        self.timers.remove(&escalation.id);
        Ok(resolution)
    }
}

fn format_batch_message(short_ids: &[String]) -> String {
    format!(
        "{} item(s) need your review: {}. Reply APPROVE-<id>, DENY-<id>, DENY-ADD-<id>, or STATUS.",
        short_ids.len(),
        short_ids.join(", ")
    )
}

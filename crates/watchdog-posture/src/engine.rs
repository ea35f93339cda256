//! Posture hysteresis state machine.
//!
//! Computes the raw scrutiny level from live inventory counts, then
//! applies hysteresis before changing the *effective* posture: upward
//! transitions take effect immediately, downward transitions require
//! the raw level to stay qualified for `hysteresis_down` continuously
//! (no pending escalations blocking it) before they take effect. BLACK
//! is reachable only through a manual override — the raw-level
//! calculation never produces it.

use chrono::{DateTime, Utc};

use watchdog_types::enums::{PostureLevel, PostureTrigger};
use watchdog_types::model::PostureState;

use crate::events::{OverrideEvent, PostureChanged, SubscriberList};

/// Live counts of non-PUBLIC inventory items, used to compute the raw
/// posture level. Supplied by the caller (the registry owns the actual
/// counting query); kept as plain data so this crate doesn't depend on
/// `watchdog-registry`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryCounts {
    pub never_share: u64,
    pub ask_first: u64,
    pub internal_only: u64,
}

impl InventoryCounts {
    /// GREEN if nothing outstanding, YELLOW if ASK_FIRST/INTERNAL_ONLY
    /// items exist, RED if any NEVER_SHARE item exists.
    pub fn raw_level(&self) -> PostureLevel {
        if self.never_share > 0 {
            PostureLevel::Red
        } else if self.ask_first > 0 || self.internal_only > 0 {
            PostureLevel::Yellow
        } else {
            PostureLevel::Green
        }
    }
}

pub struct PostureEngine {
    hysteresis_down: chrono::Duration,
    subscribers: SubscriberList,
}

impl PostureEngine {
    pub fn new(hysteresis_down_secs: u64) -> Self {
        PostureEngine {
            hysteresis_down: chrono::Duration::seconds(hysteresis_down_secs as i64),
            subscribers: SubscriberList::new(),
        }
    }

    pub fn subscribers_mut(&mut self) -> &mut SubscriberList {
        &mut self.subscribers
    }

    /// Runs the 5-step transition pipeline against the current state,
    /// mutating it in place and returning the resulting transition if
    /// the effective level changed.
    ///
    /// `pending_escalations_block` is true when an unresolved escalation
    /// exists whose resolution could raise the raw level back up —
    /// downward transitions are deferred while any are pending.
    pub fn recompute(
        &mut self,
        state: &mut PostureState,
        counts: InventoryCounts,
        now: DateTime<Utc>,
        pending_escalations_block: bool,
        trigger: PostureTrigger,
    ) -> Option<PostureChanged> {
        let raw = counts.raw_level();
        state.never_share_count = counts.never_share;
        state.ask_first_count = counts.ask_first;
        state.internal_only_count = counts.internal_only;
        state.last_calculated = now;

        let current = state.level;

        // Step: an active manual override always wins.
        if let Some(override_level) = state.manual_override {
            if override_level != current {
                state.level = override_level;
                state.downward_eligible_since = None;
                return self.emit(state, current, override_level, trigger);
            }
            return None;
        }

        // Step: raw rose above current — immediate upward transition,
        // hysteresis eligibility clears.
        if raw > current {
            state.level = raw;
            state.downward_eligible_since = None;
            return self.emit(state, current, raw, trigger);
        }

        // Step: raw dropped below current — start or continue the
        // hysteresis window, but never transition while an escalation
        // could still push the raw level back up.
        if raw < current {
            if pending_escalations_block {
                state.downward_eligible_since = None;
                return None;
            }

            let eligible_since = *state.downward_eligible_since.get_or_insert(now);
            if now - eligible_since >= self.hysteresis_down {
                state.level = raw;
                state.downward_eligible_since = None;
                return self.emit(state, current, raw, trigger);
            }
            return None;
        }

        // raw == current: nothing qualifies for a downward transition
        // anymore, clear eligibility so a future dip restarts the timer.
        state.downward_eligible_since = None;
        None
    }

    /// Sets a manual override, recomputing the effective level
    /// immediately without hysteresis. Logs a warning if the requested
    /// level is GREEN while NEVER_SHARE items are still outstanding.
    pub fn set_override(
        &mut self,
        state: &mut PostureState,
        level: PostureLevel,
        now: DateTime<Utc>,
    ) {
        if level == PostureLevel::Green && state.never_share_count > 0 {
            tracing::warn!(
                never_share_count = state.never_share_count,
                "posture override to GREEN set while NEVER_SHARE inventory is outstanding"
            );
        }
        state.manual_override = Some(level);
        let previous = state.level;
        state.level = level;
        state.last_calculated = now;
        self.subscribers
            .notify_override_changed(&OverrideEvent::Set(level));
        if previous != level {
            self.subscribers.notify_posture_changed(&PostureChanged {
                previous,
                new: level,
                trigger: PostureTrigger::ManualOverride,
            });
        }
    }

    /// Releases a manual override and recomputes without hysteresis.
    pub fn release_override(
        &mut self,
        state: &mut PostureState,
        counts: InventoryCounts,
        now: DateTime<Utc>,
    ) -> Option<PostureChanged> {
        state.manual_override = None;
        let previous = state.level;
        let raw = counts.raw_level();
        state.level = raw;
        state.downward_eligible_since = None;
        state.last_calculated = now;
        self.subscribers
            .notify_override_changed(&OverrideEvent::Released);
        if previous != raw {
            self.emit(state, previous, raw, PostureTrigger::Recovery)
        } else {
            None
        }
    }

    fn emit(
        &self,
        _state: &PostureState,
        previous: PostureLevel,
        new: PostureLevel,
        trigger: PostureTrigger,
    ) -> Option<PostureChanged> {
        let event = PostureChanged {
            previous,
            new,
            trigger,
        };
        self.subscribers.notify_posture_changed(&event);
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_state(now: DateTime<Utc>) -> PostureState {
        PostureState {
            level: PostureLevel::Green,
            manual_override: None,
            last_calculated: now,
            never_share_count: 0,
            ask_first_count: 0,
            internal_only_count: 0,
            downward_eligible_since: None,
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn rises_to_red_immediately_on_never_share_item() {
        let mut engine = PostureEngine::new(300);
        let mut state = fresh_state(now());
        let changed = engine.recompute(
            &mut state,
            InventoryCounts {
                never_share: 1,
                ..Default::default()
            },
            now(),
            false,
            PostureTrigger::InventoryChange,
        );
        assert_eq!(state.level, PostureLevel::Red);
        assert_eq!(changed.unwrap().new, PostureLevel::Red);
    }

    #[test]
    fn does_not_drop_before_hysteresis_window_elapses() {
        let mut engine = PostureEngine::new(300);
        let mut state = fresh_state(now());
        engine.recompute(
            &mut state,
            InventoryCounts {
                never_share: 1,
                ..Default::default()
            },
            now(),
            false,
            PostureTrigger::InventoryChange,
        );

        let soon = now() + chrono::Duration::seconds(100);
        let changed = engine.recompute(&mut state, InventoryCounts::default(), soon, false, PostureTrigger::InventoryChange);
        assert!(changed.is_none());
        assert_eq!(state.level, PostureLevel::Red);
    }

    #[test]
    fn drops_exactly_once_after_hysteresis_window_elapses() {
        let mut engine = PostureEngine::new(300);
        let mut state = fresh_state(now());
        engine.recompute(
            &mut state,
            InventoryCounts {
                never_share: 1,
                ..Default::default()
            },
            now(),
            false,
            PostureTrigger::InventoryChange,
        );

        let later = now() + chrono::Duration::seconds(301);
        let changed = engine.recompute(&mut state, InventoryCounts::default(), later, false, PostureTrigger::InventoryChange);
        assert_eq!(changed.unwrap().new, PostureLevel::Green);

        // Recomputing again at the same raw level shouldn't re-fire.
        let changed_again = engine.recompute(&mut state, InventoryCounts::default(), later, false, PostureTrigger::InventoryChange);
        assert!(changed_again.is_none());
    }

    #[test]
    fn pending_escalations_block_downward_transition_indefinitely() {
        let mut engine = PostureEngine::new(300);
        let mut state = fresh_state(now());
        engine.recompute(
            &mut state,
            InventoryCounts {
                never_share: 1,
                ..Default::default()
            },
            now(),
            false,
            PostureTrigger::InventoryChange,
        );

        let much_later = now() + chrono::Duration::seconds(10_000);
        let changed = engine.recompute(&mut state, InventoryCounts::default(), much_later, true, PostureTrigger::InventoryChange);
        assert!(changed.is_none());
        assert_eq!(state.level, PostureLevel::Red);
    }

    #[test]
    fn manual_override_wins_over_raw_level() {
        let mut engine = PostureEngine::new(300);
        let mut state = fresh_state(now());
        engine.set_override(&mut state, PostureLevel::Black, now());
        assert_eq!(state.level, PostureLevel::Black);

        let changed = engine.recompute(
            &mut state,
            InventoryCounts {
                never_share: 1,
                ..Default::default()
            },
            now(),
            false,
            PostureTrigger::InventoryChange,
        );
        assert!(changed.is_none());
        assert_eq!(state.level, PostureLevel::Black);
    }

    #[test]
    fn releasing_override_recomputes_without_hysteresis() {
        let mut engine = PostureEngine::new(300);
        let mut state = fresh_state(now());
        engine.set_override(&mut state, PostureLevel::Black, now());
        let changed = engine.release_override(&mut state, InventoryCounts::default(), now());
        assert_eq!(changed.unwrap().new, PostureLevel::Green);
    }
}

//! Lifecycle alerts for aging inventory.
//!
//! Each non-PUBLIC inventory item has a retention threshold keyed by
//! classification; once an item's age exceeds that threshold it raises
//! a [`LifecycleAlert`](crate::events::LifecycleAlert). Alerts
//! re-raising for the same item are suppressed for
//! `lifecycle_alert_interval` — tracked in a capacity-bounded map that
//! evicts its oldest entry on insert once full, so the suppression
//! bookkeeping itself can't grow unbounded even if inventory churns
//! heavily.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use watchdog_types::enums::Classification;

use crate::events::LifecycleAlert;

/// One inventory item's aging-relevant fields. Kept minimal so this
/// module doesn't depend on `watchdog-registry`'s full `InventoryItem`.
#[derive(Debug, Clone)]
pub struct InventoryAge {
    pub ref_type: String,
    pub ref_id: String,
    pub classification: Classification,
    pub first_detected: DateTime<Utc>,
    pub last_verified: DateTime<Utc>,
}

const SUPPRESSION_CAPACITY: usize = 10_000;

/// Tracks the last time a lifecycle alert fired per inventory key, to
/// suppress repeats within the configured interval.
pub struct AlertSuppression {
    last_alerted: HashMap<(String, String), DateTime<Utc>>,
    insert_order: Vec<(String, String)>,
}

impl Default for AlertSuppression {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertSuppression {
    pub fn new() -> Self {
        AlertSuppression {
            last_alerted: HashMap::new(),
            insert_order: Vec::new(),
        }
    }

    fn should_alert(&self, key: &(String, String), now: DateTime<Utc>, interval: chrono::Duration) -> bool {
        match self.last_alerted.get(key) {
            Some(last) => now - *last >= interval,
            None => true,
        }
    }

    fn record(&mut self, key: (String, String), now: DateTime<Utc>) {
        if !self.last_alerted.contains_key(&key) && self.insert_order.len() >= SUPPRESSION_CAPACITY {
            let evicted = self.insert_order.remove(0);
            self.last_alerted.remove(&evicted);
        }
        if !self.last_alerted.contains_key(&key) {
            self.insert_order.push(key.clone());
        }
        self.last_alerted.insert(key, now);
    }
}

/// Evaluates every item against its retention threshold and the
/// staleness threshold, returning alerts for items that qualify and
/// aren't currently suppressed. Staleness marks an item stale in the
/// returned alert but never deactivates it.
pub fn evaluate(
    items: &[InventoryAge],
    retention_days: &HashMap<Classification, u64>,
    staleness_hours: u64,
    alert_interval: chrono::Duration,
    now: DateTime<Utc>,
    suppression: &mut AlertSuppression,
) -> Vec<LifecycleAlert> {
    let mut alerts = Vec::new();

    for item in items {
        let age = now - item.first_detected;
        let age_days = age.num_days();
        let retention = retention_days.get(&item.classification).copied();
        let stale = (now - item.last_verified).num_hours() >= staleness_hours as i64;

        let past_retention = retention.is_some_and(|days| age_days >= days as i64);
        if !past_retention && !stale {
            continue;
        }

        let key = (item.ref_type.clone(), item.ref_id.clone());
        if !suppression.should_alert(&key, now, alert_interval) {
            continue;
        }

        alerts.push(LifecycleAlert {
            ref_type: item.ref_type.clone(),
            ref_id: item.ref_id.clone(),
            classification: item.classification,
            age_days,
            stale,
        });
        suppression.record(key, now);
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(days_old: i64, classification: Classification) -> InventoryAge {
        let now = DateTime::parse_from_rfc3339("2026-01-10T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        InventoryAge {
            ref_type: "user_entry".to_string(),
            ref_id: "abc".to_string(),
            classification,
            first_detected: now - chrono::Duration::days(days_old),
            last_verified: now,
        }
    }

    fn retention_map() -> HashMap<Classification, u64> {
        let mut m = HashMap::new();
        m.insert(Classification::NeverShare, 7);
        m.insert(Classification::AskFirst, 30);
        m.insert(Classification::InternalOnly, 90);
        m
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-10T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn item_past_retention_threshold_raises_alert() {
        let items = vec![item(10, Classification::NeverShare)];
        let mut suppression = AlertSuppression::new();
        let alerts = evaluate(&items, &retention_map(), 48, chrono::Duration::hours(24), now(), &mut suppression);
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn item_within_retention_and_fresh_raises_nothing() {
        let items = vec![item(3, Classification::NeverShare)];
        let mut suppression = AlertSuppression::new();
        let alerts = evaluate(&items, &retention_map(), 48, chrono::Duration::hours(24), now(), &mut suppression);
        assert!(alerts.is_empty());
    }

    #[test]
    fn repeat_alert_suppressed_within_interval() {
        let items = vec![item(10, Classification::NeverShare)];
        let mut suppression = AlertSuppression::new();
        let first = evaluate(&items, &retention_map(), 48, chrono::Duration::hours(24), now(), &mut suppression);
        let second = evaluate(&items, &retention_map(), 48, chrono::Duration::hours(24), now(), &mut suppression);
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }
}

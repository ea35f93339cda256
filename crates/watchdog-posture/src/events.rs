//! Typed posture event subscription.
//!
//! The source material notified interested parties through a singleton
//! event emitter; here subscribers implement [`PostureSubscriber`] and
//! are registered explicitly with the engine that owns posture state,
//! so there's no implicit global channel to reason about.

use watchdog_types::enums::{Classification, PostureLevel, PostureTrigger};

/// A posture-level transition, upward or downward.
#[derive(Debug, Clone, PartialEq)]
pub struct PostureChanged {
    pub previous: PostureLevel,
    pub new: PostureLevel,
    pub trigger: PostureTrigger,
}

/// A retention or staleness threshold breach for one inventory item.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleAlert {
    pub ref_type: String,
    pub ref_id: String,
    pub classification: Classification,
    pub age_days: i64,
    pub stale: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideEvent {
    Set(PostureLevel),
    Released,
}

/// Implemented by anything that wants to observe posture-engine events.
/// All methods have empty default bodies so subscribers only implement
/// the events they care about.
pub trait PostureSubscriber: Send + Sync {
    fn on_posture_changed(&self, _event: &PostureChanged) {}
    fn on_lifecycle_alert(&self, _event: &LifecycleAlert) {}
    fn on_override_changed(&self, _event: &OverrideEvent) {}
}

/// Fan-out subscriber that forwards every event to each registered
/// subscriber in order.
#[derive(Default)]
pub struct SubscriberList {
    subscribers: Vec<Box<dyn PostureSubscriber>>,
}

impl SubscriberList {
    pub fn new() -> Self {
        SubscriberList {
            subscribers: Vec::new(),
        }
    }

    pub fn register(&mut self, subscriber: Box<dyn PostureSubscriber>) {
        self.subscribers.push(subscriber);
    }

    pub fn notify_posture_changed(&self, event: &PostureChanged) {
        for s in &self.subscribers {
            s.on_posture_changed(event);
        }
    }

    pub fn notify_lifecycle_alert(&self, event: &LifecycleAlert) {
        for s in &self.subscribers {
            s.on_lifecycle_alert(event);
        }
    }

    pub fn notify_override_changed(&self, event: &OverrideEvent) {
        for s in &self.subscribers {
            s.on_override_changed(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSubscriber(Arc<AtomicUsize>);
    impl PostureSubscriber for CountingSubscriber {
        fn on_posture_changed(&self, _event: &PostureChanged) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn registered_subscribers_receive_posture_changed() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut list = SubscriberList::new();
        list.register(Box::new(CountingSubscriber(Arc::clone(&counter))));

        list.notify_posture_changed(&PostureChanged {
            previous: PostureLevel::Green,
            new: PostureLevel::Yellow,
            trigger: PostureTrigger::InventoryChange,
        });

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscriber_with_no_override_ignores_unrelated_events() {
        struct Silent;
        impl PostureSubscriber for Silent {}

        let mut list = SubscriberList::new();
        list.register(Box::new(Silent));
        list.notify_override_changed(&OverrideEvent::Released);
    }
}

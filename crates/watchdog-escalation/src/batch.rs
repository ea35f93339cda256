//! Sliding-window batch notification accumulator.
//!
//! New escalations accumulate instead of each triggering its own message.
//! The window resets on every arrival so a burst of escalations still
//! produces one message; the hard delay cap guarantees the batch flushes
//! even if arrivals never stop.

use chrono::{DateTime, Utc};

pub struct BatchAccumulator {
    window: chrono::Duration,
    max_size: usize,
    max_delay: chrono::Duration,
    pending: Vec<String>,
    first_arrival: Option<DateTime<Utc>>,
    last_arrival: Option<DateTime<Utc>>,
}

impl BatchAccumulator {
    pub fn new(window_secs: u64, max_size: usize, max_delay_secs: u64) -> Self {
        BatchAccumulator {
            window: chrono::Duration::seconds(window_secs as i64),
            max_size,
            max_delay: chrono::Duration::seconds(max_delay_secs as i64),
            pending: Vec::new(),
            first_arrival: None,
            last_arrival: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Adds a short id to the batch, resetting the sliding window.
    pub fn add(&mut self, short_id: String, now: DateTime<Utc>) {
        if self.pending.is_empty() {
            self.first_arrival = Some(now);
        }
        self.pending.push(short_id);
        self.last_arrival = Some(now);
    }

    /// True once the batch should flush: the window elapsed since the last
    /// arrival, the size cap was hit, or the hard delay cap elapsed since
    /// the first arrival.
    pub fn should_flush(&self, now: DateTime<Utc>) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        if self.pending.len() >= self.max_size {
            return true;
        }
        if let Some(last) = self.last_arrival {
            if now - last >= self.window {
                return true;
            }
        }
        if let Some(first) = self.first_arrival {
            if now - first >= self.max_delay {
                return true;
            }
        }
        false
    }

    /// The earliest instant this batch becomes flushable if nothing else
    /// arrives, for scheduling a wakeup. `None` while empty.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        let last = self.last_arrival?;
        let first = self.first_arrival?;
        Some((last + self.window).min(first + self.max_delay))
    }

    /// Drains and returns the pending short ids, resetting the window.
    pub fn flush(&mut self) -> Vec<String> {
        self.first_arrival = None;
        self.last_arrival = None;
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(secs: i64) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc) + chrono::Duration::seconds(secs)
    }

    #[test]
    fn flushes_once_window_elapses_since_last_arrival() {
        let mut batch = BatchAccumulator::new(5, 10, 15);
        batch.add("esc-1".to_string(), t(0));
        assert!(!batch.should_flush(t(4)));
        assert!(batch.should_flush(t(5)));
    }

    #[test]
    fn window_resets_on_new_arrival() {
        let mut batch = BatchAccumulator::new(5, 10, 15);
        batch.add("esc-1".to_string(), t(0));
        batch.add("esc-2".to_string(), t(4));
        assert!(!batch.should_flush(t(8)));
        assert!(batch.should_flush(t(9)));
    }

    #[test]
    fn flushes_immediately_once_max_size_reached() {
        let mut batch = BatchAccumulator::new(5, 2, 15);
        batch.add("esc-1".to_string(), t(0));
        batch.add("esc-2".to_string(), t(1));
        assert!(batch.should_flush(t(1)));
    }

    #[test]
    fn hard_delay_cap_flushes_despite_continuous_arrivals() {
        let mut batch = BatchAccumulator::new(5, 100, 15);
        batch.add("esc-1".to_string(), t(0));
        batch.add("esc-2".to_string(), t(4));
        batch.add("esc-3".to_string(), t(8));
        batch.add("esc-4".to_string(), t(12));
        assert!(!batch.should_flush(t(14)));
        assert!(batch.should_flush(t(15)));
    }

    #[test]
    fn flush_drains_and_resets() {
        let mut batch = BatchAccumulator::new(5, 10, 15);
        batch.add("esc-1".to_string(), t(0));
        let drained = batch.flush();
        assert_eq!(drained, vec!["esc-1".to_string()]);
        assert!(batch.is_empty());
        assert!(batch.next_deadline().is_none());
    }
}

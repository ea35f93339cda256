//! Gate metrics: plain atomic counters snapshotted on demand for a pull
//! endpoint, rather than pushed. EMA and peak latency are tracked under a
//! small lock since they need read-modify-write, not just increment.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

/// Smoothing factor for the exponential moving average of scan latency.
const EMA_ALPHA: f64 = 0.2;

pub struct GateMetrics {
    intercepted: AtomicU64,
    clean: AtomicU64,
    quarantined: AtomicU64,
    failed: AtomicU64,
    bypassed: AtomicU64,
    inbound_inspected: AtomicU64,
    inbound_errors: AtomicU64,
    active_scan_count: AtomicU64,
    queued_scan_count: AtomicU64,
    latency: Mutex<LatencyTracker>,
    started_at: Instant,
}

struct LatencyTracker {
    ema_ms: f64,
    peak_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSnapshot {
    pub intercepted: u64,
    pub clean: u64,
    pub quarantined: u64,
    pub failed: u64,
    pub bypassed: u64,
    pub inbound_inspected: u64,
    pub inbound_errors: u64,
    pub active_scan_count: u64,
    pub queued_scan_count: u64,
    pub ema_latency_ms: f64,
    pub peak_latency_ms: u64,
    pub uptime_seconds: u64,
    pub kill_switch: bool,
}

impl Default for GateMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl GateMetrics {
    pub fn new() -> Self {
        GateMetrics {
            intercepted: AtomicU64::new(0),
            clean: AtomicU64::new(0),
            quarantined: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            bypassed: AtomicU64::new(0),
            inbound_inspected: AtomicU64::new(0),
            inbound_errors: AtomicU64::new(0),
            active_scan_count: AtomicU64::new(0),
            queued_scan_count: AtomicU64::new(0),
            latency: Mutex::new(LatencyTracker { ema_ms: 0.0, peak_ms: 0 }),
            started_at: Instant::now(),
        }
    }

    pub fn record_intercepted(&self) {
        self.intercepted.fetch_add(1, Ordering::Relaxed);
    }
    pub fn record_clean(&self) {
        self.clean.fetch_add(1, Ordering::Relaxed);
    }
    pub fn record_quarantined(&self) {
        self.quarantined.fetch_add(1, Ordering::Relaxed);
    }
    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }
    pub fn record_bypassed(&self) {
        self.bypassed.fetch_add(1, Ordering::Relaxed);
    }
    pub fn record_inbound_inspected(&self) {
        self.inbound_inspected.fetch_add(1, Ordering::Relaxed);
    }
    pub fn record_inbound_error(&self) {
        self.inbound_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn scan_started(&self) {
        self.active_scan_count.fetch_add(1, Ordering::Relaxed);
    }
    pub fn scan_finished(&self, elapsed_ms: u64) {
        self.active_scan_count.fetch_sub(1, Ordering::Relaxed);
        let mut latency = self.latency.lock();
        latency.ema_ms = if latency.ema_ms == 0.0 {
            elapsed_ms as f64
        } else {
            EMA_ALPHA * elapsed_ms as f64 + (1.0 - EMA_ALPHA) * latency.ema_ms
        };
        latency.peak_ms = latency.peak_ms.max(elapsed_ms);
    }
    pub fn scan_queued(&self) {
        self.queued_scan_count.fetch_add(1, Ordering::Relaxed);
    }
    pub fn scan_dequeued(&self) {
        self.queued_scan_count.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, kill_switch: bool) -> MetricsSnapshot {
        let latency = self.latency.lock();
        MetricsSnapshot {
            intercepted: self.intercepted.load(Ordering::Relaxed),
            clean: self.clean.load(Ordering::Relaxed),
            quarantined: self.quarantined.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            bypassed: self.bypassed.load(Ordering::Relaxed),
            inbound_inspected: self.inbound_inspected.load(Ordering::Relaxed),
            inbound_errors: self.inbound_errors.load(Ordering::Relaxed),
            active_scan_count: self.active_scan_count.load(Ordering::Relaxed),
            queued_scan_count: self.queued_scan_count.load(Ordering::Relaxed),
            ema_latency_ms: latency.ema_ms,
            peak_latency_ms: latency.peak_ms,
            uptime_seconds: self.started_at.elapsed().as_secs(),
            kill_switch,
        }
    }
}

//! # Watchdog Posture — Scrutiny-Level Hysteresis Engine
//!
//! Tracks the system-wide posture level (GREEN/YELLOW/RED/BLACK) that
//! gates the fuzzy-match threshold and escalation timeouts elsewhere in
//! the Watchdog. The raw level is a pure function of live inventory
//! counts; hysteresis prevents rapid up/down flapping when inventory
//! changes near a threshold.
//!
//! ## Threat model
//!
//! | Threat                                    | Defense                                  |
//! |----------------------------------------------|---------------------------------------------|
//! | Posture flapping masking a real incident       | Downward-transition hysteresis window      |
//! | Stale/forgotten sensitive inventory             | Lifecycle alerts on retention/staleness     |
//! | Operator forgetting an active override          | Warning logged on GREEN override w/ NEVER_SHARE |
//!
//! ## Architecture
//!
//! ```text
//!   inventory counts ──▶ PostureEngine ──▶ PostureState
//!                              │
//!                              ▼
//!                      SubscriberList ──▶ PostureSubscriber impls
//! ```

pub mod alerts;
pub mod engine;
pub mod error;
pub mod events;

pub use engine::{InventoryCounts, PostureEngine};
pub use error::{PostureError, Result};
pub use events::{LifecycleAlert, OverrideEvent, PostureChanged, PostureSubscriber, SubscriberList};

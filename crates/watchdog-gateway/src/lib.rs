//! # Watchdog Gateway
//!
//! The interception point for every outbound tool call and the fire-and-forget
//! inspector for inbound content. Drives the scan pipeline, issues approval
//! tokens, quarantines flagged content, and hands off to escalation.
//!
//! ## Threat coverage
//!
//! | Threat                                          | Defense                                             |
//! |--------------------------------------------------|------------------------------------------------------|
//! | A compromised scanner silently waves bad content through | Circuit breaker on the scanner trips the gate fail-closed |
//! | Unbounded concurrent scans exhaust the host            | Bounded semaphore with a queue timeout, deny on overflow |
//! | A forged or replayed approval token                     | HMAC-SHA256 over request id + content hash + timestamp + verdict, timing-safe verification, TTL freshness |
//! | An operator forgetting enforcement was disabled          | Kill switch toggles are audit-logged with reason and operator identity |
//!
//! ## Architecture
//!
//! ```text
//!   outbound tool call ──▶ Gate::intercept ──▶ GateDecision
//!                              │      │
//!                    ScannerBridge   AuditorBridge
//!                              │
//!                       EscalationStore / ChannelAdapter
//!                              │
//!                         ClassifierClient (on FLAGGED)
//!
//!   inbound content ──▶ Gate::inspect_inbound (fire-and-forget)
//! ```
//!
//! Concrete wiring of the narrow bridge traits to `watchdog-registry` and
//! `watchdog-scanner` lives in [`adapters`]; this is the one crate allowed
//! to depend on both.

pub mod adapters;
pub mod decision;
pub mod error;
pub mod gate;
pub mod killswitch;
pub mod metrics;
pub mod token;

pub use decision::{AllowReason, DenyReason, GateDecision};
pub use error::{ChannelError, GatewayError, ProtocolError, Result};
pub use gate::Gate;
pub use killswitch::KillSwitch;
pub use metrics::{GateMetrics, MetricsSnapshot};
pub use token::TokenCache;

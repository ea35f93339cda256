//! # Watchdog Escalation — Human-in-the-Loop Approval Queue
//!
//! Holds pending owner decisions for payloads the classifier couldn't
//! resolve on its own: a priority queue ordered by the most-restrictive
//! flag on the payload, a sliding-window batch notifier so a burst of
//! ambiguous calls produces one message instead of many, dual
//! reminder/expiry timers, and a tolerant parser for the short reply codes
//! an owner sends back over chat.
//!
//! ## Threat model
//!
//! | Threat                                       | Defense                                               |
//! |-------------------------------------------------|-----------------------------------------------------------|
//! | Owner never replies                              | Expiry timer resolves as `denied_by_timeout`              |
//! | Notification channel down                        | Fallback channel, then immediate timeout if both fail      |
//! | Duplicate ambiguous calls flooding the owner      | Content-hash + destination duplicate suppression          |
//! | Queue exhaustion under load                      | Fixed capacity, fail-closed rejection                     |
//!
//! ## Architecture
//!
//! ```text
//!   classifier ESCALATE ──▶ EscalationQueue ──▶ BatchAccumulator ──▶ ChannelAdapter
//!                                 │                                      │
//!                                 ▼                                 owner reply
//!                           EscalationTimers                             │
//!                                 │                                      ▼
//!                                 └──────────────────────────────▶ parser::parse_message
//!                                                                        │
//!                                                                        ▼
//!                                                                resolve::resolve
//! ```

pub mod batch;
pub mod bulk;
pub mod error;
pub mod ids;
pub mod interface;
pub mod parser;
pub mod queue;
pub mod resolve;
pub mod timers;

pub use error::{EscalationError, Result};
pub use interface::{EscalationInterface, EscalationStore, HandledReply};
pub use resolve::{DeniedVariant, Resolution, ResolutionTrigger};

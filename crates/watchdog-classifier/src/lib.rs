//! # Watchdog Classifier — LLM Verdict Client
//!
//! Wraps a local language model behind the narrow `classify` operation the
//! gateway needs: given a quarantined payload and its flagged context, come
//! back with one of `FalsePositive` / `Block` / `Escalate` and a confidence.
//!
//! ## Threat model
//!
//! | Threat                                         | Defense                                                    |
//! |-------------------------------------------------|-------------------------------------------------------------|
//! | Prompt extraction via the classifier's own system prompt | Canary token injected per request; a leak discards the response |
//! | Malformed or truncated model output               | Bounded retry (parse failures only), then forced escalate   |
//! | Model endpoint down or consistently failing       | Circuit breaker skips the network call and forces escalate  |
//! | Overconfident-looking but low-quality verdict      | Confidence floor forces escalate regardless of decision     |
//!
//! ## Architecture
//!
//! ```text
//!   quarantined payload ──▶ harden_system_prompt ──▶ generate endpoint
//!                                                          │
//!                                                          ▼
//!                                                   canary_leaked? ──yes──▶ discard, retry/escalate
//!                                                          │ no
//!                                                          ▼
//!                                                   parse ClassifierOutput
//!                                                          │
//!                                                          ▼
//!                                                   precedence::combine ──▶ ClassifierVerdict
//! ```

pub mod canary;
pub mod circuit;
pub mod client;
pub mod error;
pub mod precedence;
pub mod wire;

pub use client::ClassifierClient;
pub use error::{ClassifierError, Result};
pub use wire::{ClassifierOutput, FlagJudgment, GenerateOptions, GenerateRequest, GenerateResponse, RawDecision};

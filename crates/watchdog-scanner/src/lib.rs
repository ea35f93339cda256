//! # Watchdog Scanner — Three-Stage Scan Pipeline
//!
//! Detects sensitive content in outbound tool calls across three
//! stages: structural PII (an external analyzer), credential/secrets
//! (an external scanner plus a Shannon-entropy fallback), and fuzzy
//! matching against owner-defined user entries and variants. Stages run
//! under independent per-stage deadlines and a pipeline-wide total
//! deadline; a stage error degrades that stage without aborting the
//! others.
//!
//! ## Threat model
//!
//! | Threat                                | Defense                                    |
//! |-----------------------------------------|----------------------------------------------|
//! | Structural PII (SSNs, emails, etc.)      | External analyzer + registered patterns      |
//! | API keys, tokens, credentials            | Known-format detectors + entropy fallback    |
//! | Paraphrased owner-sensitive content       | Fuzzy matching against user entries/variants |
//! | Scanner outage                           | Circuit breaker → fail-closed FLAGGED         |
//!
//! ## Architecture
//!
//! ```text
//!                 content
//!                    │
//!        ┌───────────┼───────────┐
//!        ▼           ▼           ▼
//!  ┌──────────┐ ┌──────────┐ ┌──────────┐
//!  │   PII    │ │ Secrets  │ │  Fuzzy   │
//!  │  (500ms) │ │ (1500ms) │ │ (1000ms) │
//!  └────┬─────┘ └────┬─────┘ └────┬─────┘
//!       └───────────┬┴────────────┘
//!                    ▼
//!               dedup_flags
//!                    │
//!                    ▼
//!             PipelineOutput
//! ```

pub mod dedup;
pub mod entropy;
pub mod error;
pub mod extract;
pub mod fuzzy;
pub mod pii;
pub mod pipeline;
pub mod secrets;

pub use error::ScanStageError;
pub use pipeline::{EntryOverrideResolver, PatternLookup, PipelineOutput, ScanPipeline, StageGate};

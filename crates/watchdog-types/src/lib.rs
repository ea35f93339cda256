//! # Shared Types for the Security Watchdog
//!
//! This crate defines the data model, configuration, error taxonomy, and
//! narrow collaborator interfaces shared by every Watchdog component. No
//! crate in the workspace depends on a concrete peer crate for its data
//! types — they all depend on `watchdog-types` instead.
//!
//! ## Architecture
//!
//! ```text
//!                    ┌────────────────────┐
//!                    │   watchdog-types    │
//!                    │  (data model, cfg)  │
//!                    └─────────┬──────────┘
//!                              │
//!      ┌──────────┬────────────┼────────────┬──────────────┐
//!      ▼          ▼            ▼            ▼              ▼
//! registry    scanner      posture      escalation     classifier
//! ```
//!
//! ## Threat coverage
//!
//! | Concern                  | Type                                   |
//! |---------------------------|-----------------------------------------|
//! | Tamper-evident audit log  | `ScanDecision` + chain hash              |
//! | Fail-closed destinations  | `Destination::is_public`                 |
//! | Sensitive-value drift     | `UserEntry` + `Variant`                  |
//! | Retention / staleness     | `InventoryItem` timestamps               |

pub mod bridges;
pub mod config;
pub mod enums;
pub mod error;
pub mod model;

pub use bridges::{AuditorBridge, ChannelAdapter, ScannerBridge};
pub use config::WatchdogConfig;
pub use enums::{
    Classification, DataForm, DestinationType, EscalationState, PostureLevel, PostureTrigger,
    QuarantineState, ScanFlagSource, ScanOutcome, ScanVerdict, StorageType,
};
pub use error::ConfigError;
pub use model::{
    Destination, DestinationRule, Escalation, InventoryItem, Pattern, PostureHistory,
    PostureState, Quarantine, ScanDecision, ScanFlag, UserEntry, Variant,
};

/// SHA-256 digest size in bytes, used for content hashes and chain hashes.
pub const HASH_SIZE: usize = 32;

/// A 32-byte SHA-256 hash, used for content hashes and the decision chain.
pub type Hash = [u8; HASH_SIZE];

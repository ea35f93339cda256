//! # Watchdog Registry — Persistent Store
//!
//! The Registry is the Watchdog's single persistent data store: patterns,
//! user entries and variants, destination rules, live inventory, the
//! scan-decision audit chain, quarantine rows, escalations, and posture
//! state/history. It is a plain collaborator consumed by the scan
//! pipeline, gateway, posture engine, and escalation interface — it owns
//! no scanning or gating logic of its own.
//!
//! ## Threat model
//!
//! | Threat                          | Defense                                   |
//! |----------------------------------|--------------------------------------------|
//! | Audit-log tampering              | Hash chain over canonical decision rows    |
//! | Key-reordering hash instability   | RFC 8785 JSON canonicalization              |
//! | Duplicate sensitive-entry drift   | Unique `(entryId, text)` variant constraint |
//! | Lost writes on crash              | Sled's crash-safe embedded storage          |
//!
//! ## Architecture
//!
//! ```text
//!                    ┌────────────────────┐
//!                    │      Registry       │
//!                    │      (Facade)       │
//!                    └─────────┬──────────┘
//!                              │
//!          ┌───────────┬───────┴───────┬───────────┐
//!          │           │               │           │
//!          ▼           ▼               ▼           ▼
//!    ┌──────────┐ ┌──────────┐  ┌──────────┐ ┌──────────┐
//!    │Canonical-│ │  Chain   │  │Invariant │ │ Storage  │
//!    │  izer    │ │  Hash    │  │ Checks   │ │  (Sled)  │
//!    └──────────┘ └──────────┘  └──────────┘ └──────────┘
//! ```
//!
//! ## References
//!
//! - RFC 8785 — JSON Canonicalization Scheme
//! - NIST FIPS 180-4 — SHA-256

pub mod canonicalize;
pub mod error;
pub mod registry;
pub mod storage;

pub use error::{RegistryError, Result};
pub use registry::{InventoryCounts, Registry};

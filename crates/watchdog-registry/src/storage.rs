//! Sled-backed key/value storage shared by every registry table.
//!
//! One `sled::Tree` per table (the persisted-state layout names them
//! `locales`, `patterns`, `user_entries`, `entry_variants`,
//! `destination_rules`, `destinations`, `inventory`, `scan_decisions`,
//! `scan_flags`, `quarantine_queue`, `escalations`, `posture_current`,
//! `posture_history`, `health_checks`, `daily_metrics`, `system_mode`,
//! `config_meta`); values are JSON-serialized, matching the teacher's
//! JSON-in-sled convention.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{RegistryError, Result};

/// Thin typed wrapper over a `sled::Db`.
pub struct Storage {
    db: sled::Db,
}

impl Storage {
    /// Opens or creates the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Storage { db })
    }

    /// Opens a temporary, in-memory-backed database discarded on drop.
    /// Used by tests and by any caller that does not need persistence
    /// across restarts.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Storage { db })
    }

    fn tree(&self, name: &str) -> Result<sled::Tree> {
        Ok(self.db.open_tree(name)?)
    }

    /// Serializes `value` as JSON and stores it under `key` in `tree`.
    pub fn put<T: Serialize>(&self, tree: &str, key: &[u8], value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.tree(tree)?.insert(key, bytes)?;
        Ok(())
    }

    /// Loads and deserializes the value stored under `key` in `tree`.
    pub fn get<T: DeserializeOwned>(&self, tree: &str, key: &[u8]) -> Result<Option<T>> {
        match self.tree(tree)?.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Removes the value stored under `key` in `tree`. Returns whether a
    /// value was present.
    pub fn delete(&self, tree: &str, key: &[u8]) -> Result<bool> {
        Ok(self.tree(tree)?.remove(key)?.is_some())
    }

    pub fn contains(&self, tree: &str, key: &[u8]) -> Result<bool> {
        Ok(self.tree(tree)?.contains_key(key)?)
    }

    /// Returns every `(key, value)` pair in `tree`, in key order.
    pub fn iter_all<T: DeserializeOwned>(&self, tree: &str) -> Result<Vec<(Vec<u8>, T)>> {
        let mut out = Vec::new();
        for entry in self.tree(tree)?.iter() {
            let (key, bytes) = entry?;
            let value = serde_json::from_slice(&bytes)?;
            out.push((key.to_vec(), value));
        }
        Ok(out)
    }

    /// Returns every `(key, value)` pair whose key starts with `prefix`.
    pub fn scan_prefix<T: DeserializeOwned>(
        &self,
        tree: &str,
        prefix: &[u8],
    ) -> Result<Vec<(Vec<u8>, T)>> {
        let mut out = Vec::new();
        for entry in self.tree(tree)?.scan_prefix(prefix) {
            let (key, bytes) = entry?;
            let value = serde_json::from_slice(&bytes)?;
            out.push((key.to_vec(), value));
        }
        Ok(out)
    }

    pub fn len(&self, tree: &str) -> Result<usize> {
        Ok(self.tree(tree)?.len())
    }

    pub fn is_empty(&self, tree: &str) -> Result<bool> {
        Ok(self.tree(tree)?.is_empty())
    }

    /// Flushes pending writes for every open tree to disk.
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("path", &self.db.name())
            .finish()
    }
}

/// Joins key components with a NUL separator, matching the composite
/// uniqueness constraints in the data model (`Pattern`'s
/// `(locale, category, type)`, `InventoryItem`'s
/// `(ref_type, ref_id, storage_location, storage_type)`, etc).
pub fn composite_key(parts: &[&str]) -> Vec<u8> {
    parts.join("\u{0}").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Widget {
        name: String,
        count: u32,
    }

    #[test]
    fn put_get_roundtrip() {
        let storage = Storage::temporary().unwrap();
        let w = Widget {
            name: "a".into(),
            count: 1,
        };
        storage.put("widgets", b"a", &w).unwrap();
        let loaded: Option<Widget> = storage.get("widgets", b"a").unwrap();
        assert_eq!(loaded, Some(w));
    }

    #[test]
    fn missing_key_is_none() {
        let storage = Storage::temporary().unwrap();
        let loaded: Option<Widget> = storage.get("widgets", b"missing").unwrap();
        assert_eq!(loaded, None);
    }

    #[test]
    fn delete_reports_presence() {
        let storage = Storage::temporary().unwrap();
        let w = Widget {
            name: "a".into(),
            count: 1,
        };
        storage.put("widgets", b"a", &w).unwrap();
        assert!(storage.delete("widgets", b"a").unwrap());
        assert!(!storage.delete("widgets", b"a").unwrap());
    }

    #[test]
    fn scan_prefix_filters_by_key() {
        let storage = Storage::temporary().unwrap();
        storage
            .put(
                "widgets",
                &composite_key(&["a", "1"]),
                &Widget { name: "a1".into(), count: 1 },
            )
            .unwrap();
        storage
            .put(
                "widgets",
                &composite_key(&["a", "2"]),
                &Widget { name: "a2".into(), count: 2 },
            )
            .unwrap();
        storage
            .put(
                "widgets",
                &composite_key(&["b", "1"]),
                &Widget { name: "b1".into(), count: 3 },
            )
            .unwrap();

        let results: Vec<(Vec<u8>, Widget)> = storage
            .scan_prefix("widgets", &composite_key(&["a"]))
            .unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn composite_key_distinguishes_boundaries() {
        // Without a separator "ab" + "c" would collide with "a" + "bc".
        let k1 = composite_key(&["ab", "c"]);
        let k2 = composite_key(&["a", "bc"]);
        assert_ne!(k1, k2);
    }
}

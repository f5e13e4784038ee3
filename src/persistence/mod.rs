//! Key-value persistence that outlives scene loads and app restarts
//!
//! Features:
//! - `KeyValueStore` trait shared by every backend
//! - In-memory store (tests, headless runs without a save directory)
//! - Versioned JSON envelope on disk with tmp -> save -> backup rotation
//! - Browser LocalStorage on wasm32 (see `platform::storage`)

pub mod file;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub use file::FileStore;

/// Removal target written when an encounter is armed.
/// Absent or empty means no pending removal.
pub const DELETE_TARGET_ENEMY_KEY: &str = "DeleteTargetEnemy";
/// Player preferences (JSON `Settings`)
pub const SETTINGS_KEY: &str = "maze_encounter_settings";
/// Best clear times (JSON `BestRuns`)
pub const BEST_RUNS_KEY: &str = "maze_encounter_best_runs";

/// String-keyed persisted storage.
///
/// Mutations may be buffered until `flush`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
    fn flush(&mut self) -> Result<(), StoreError>;

    /// Read a value, treating an empty string as absent
    fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty())
    }
}

/// Store that lives only as long as the process
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// On-disk save format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub version: u32,
    pub entries: BTreeMap<String, String>,
}

impl Envelope {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries,
        }
    }
}

/// Load a JSON value from the store, falling back to `T::default()` when the
/// key is missing or the stored text no longer parses.
pub fn load_json<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: for<'de> Deserialize<'de> + Default,
{
    match store.get(key) {
        Some(json) => match serde_json::from_str(&json) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Discarding unreadable {key}: {e}");
                T::default()
            }
        },
        None => T::default(),
    }
}

/// Serialize a value into the store and flush it
pub fn save_json<T: Serialize>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)?;
    store.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.get(DELETE_TARGET_ENEMY_KEY).is_none());

        store.set(DELETE_TARGET_ENEMY_KEY, "Enemy_01").unwrap();
        assert_eq!(store.get(DELETE_TARGET_ENEMY_KEY).as_deref(), Some("Enemy_01"));

        store.remove(DELETE_TARGET_ENEMY_KEY).unwrap();
        assert!(store.get(DELETE_TARGET_ENEMY_KEY).is_none());
    }

    #[test]
    fn test_empty_value_counts_as_absent() {
        let mut store = MemoryStore::new();
        store.set(DELETE_TARGET_ENEMY_KEY, "").unwrap();
        assert_eq!(store.get(DELETE_TARGET_ENEMY_KEY).as_deref(), Some(""));
        assert!(store.get_non_empty(DELETE_TARGET_ENEMY_KEY).is_none());
    }

    #[test]
    fn test_load_json_falls_back_on_garbage() {
        let mut store = MemoryStore::new();
        store.set("numbers", "not json").unwrap();
        let loaded: Vec<u32> = load_json(&store, "numbers");
        assert!(loaded.is_empty());

        save_json(&mut store, "numbers", &vec![1u32, 2, 3]).unwrap();
        let loaded: Vec<u32> = load_json(&store, "numbers");
        assert_eq!(loaded, vec![1, 2, 3]);
    }
}

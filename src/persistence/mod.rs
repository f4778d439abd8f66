//! Save/load persistence
//!
//! A tiny key/value abstraction with three backends:
//! - `MemoryStore`: tests and first-run fallback
//! - `FileStore`: native, one JSON document in the user data directory
//! - `LocalStore`: browser LocalStorage (wasm only)
//!
//! Typed records (`SavedProgress`, `RunnerRecord`) default when absent.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod local;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;

/// Storage error types
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// Backing storage could not be reached (no window, no data dir)
    Unavailable(String),
    /// I/O error
    Io(String),
    /// Serialization/deserialization error
    Serde(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            StorageError::Io(msg) => write!(f, "I/O error: {}", msg),
            StorageError::Serde(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serde(e.to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e.to_string())
    }
}

/// String key/value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

fn load_json<T>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StorageError>
where
    T: for<'de> Deserialize<'de>,
{
    match store.get(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

fn store_json<T: Serialize>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// Shooter run progress, saved on every level-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedProgress {
    pub level: u32,
    pub score: u64,
}

impl Default for SavedProgress {
    fn default() -> Self {
        Self { level: 1, score: 0 }
    }
}

impl SavedProgress {
    const STORAGE_KEY: &'static str = "arcade_duo_progress";

    /// Load progress; a first run (or unreadable save) starts at level 1
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json::<Self>(store, Self::STORAGE_KEY) {
            Ok(Some(progress)) => {
                log::info!("Found saved progress at level {}", progress.level);
                progress.sanitized()
            }
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("Discarding unreadable progress: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        store_json(store, Self::STORAGE_KEY, self)
    }

    pub fn clear(store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        store.remove(Self::STORAGE_KEY)
    }

    fn sanitized(self) -> Self {
        Self {
            level: self.level.max(1),
            score: self.score,
        }
    }
}

/// Runner best score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerRecord {
    #[serde(rename = "highScore")]
    pub high_score: u64,
}

impl RunnerRecord {
    const STORAGE_KEY: &'static str = "arcade_duo_runner";

    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json::<Self>(store, Self::STORAGE_KEY) {
            Ok(record) => record.unwrap_or_default(),
            Err(e) => {
                log::warn!("Discarding unreadable runner record: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        store_json(store, Self::STORAGE_KEY, self)
    }

    /// Record a finished run; returns true if it set a new best
    pub fn submit(&mut self, score: u64) -> bool {
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_defaults_on_first_run() {
        let store = MemoryStore::default();
        assert_eq!(SavedProgress::load(&store), SavedProgress { level: 1, score: 0 });
        assert_eq!(RunnerRecord::load(&store).high_score, 0);
    }

    #[test]
    fn test_progress_save_clear() {
        let mut store = MemoryStore::default();
        SavedProgress { level: 4, score: 720 }.save(&mut store).unwrap();
        assert_eq!(SavedProgress::load(&store).level, 4);

        SavedProgress::clear(&mut store).unwrap();
        assert!(store.is_empty());
        assert_eq!(SavedProgress::load(&store), SavedProgress::default());
    }

    #[test]
    fn test_corrupt_progress_falls_back() {
        let mut store = MemoryStore::default();
        store.set(SavedProgress::STORAGE_KEY, "garbage").unwrap();
        assert_eq!(SavedProgress::load(&store), SavedProgress::default());

        store.set(SavedProgress::STORAGE_KEY, r#"{"level":0,"score":5}"#).unwrap();
        assert_eq!(SavedProgress::load(&store).level, 1);
    }

    #[test]
    fn test_runner_record_keeps_best() {
        let mut store = MemoryStore::default();
        let mut record = RunnerRecord::load(&store);
        assert!(record.submit(300));
        assert!(!record.submit(120));
        record.save(&mut store).unwrap();

        assert_eq!(
            store.get(RunnerRecord::STORAGE_KEY).unwrap().as_deref(),
            Some(r#"{"highScore":300}"#)
        );
        assert_eq!(RunnerRecord::load(&store).high_score, 300);
    }
}

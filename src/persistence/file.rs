//! Native file-backed store
//!
//! All keys live in one JSON object, rewritten through a temp file on every change.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, StorageError};

const FILE_NAME: &str = "arcade-duo.json";

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open (or start) the store at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = if path.exists() {
            let json = fs::read_to_string(&path)?;
            serde_json::from_str(&json)?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    /// Open the store in the user's data directory
    pub fn open_default() -> Result<Self, StorageError> {
        let dir = dirs::data_dir()
            .ok_or_else(|| StorageError::Unavailable("no data directory".into()))?
            .join("arcade-duo");
        fs::create_dir_all(&dir)?;
        Self::open(dir.join(FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::SavedProgress;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("arcade-duo-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let path = temp_path("reopen");
        let _ = fs::remove_file(&path);

        let mut store = FileStore::open(&path).unwrap();
        SavedProgress { level: 3, score: 450 }.save(&mut store).unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(SavedProgress::load(&reopened), SavedProgress { level: 3, score: 450 });

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = temp_path("corrupt");
        fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StorageError::Serde(_))));
        let _ = fs::remove_file(&path);
    }
}

//! Roster persistence over a key-value blob store.
//!
//! The roster is a JSON array of character records stored under a single
//! well-known key. Reads are forgiving: a missing or corrupt blob is an empty
//! roster, and individual bad records are skipped. Write failures are
//! reported to the caller, which logs and carries on.

use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::character::Character;
use crate::constants::ROSTER_KEY;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Opaque string blobs keyed by name
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store (tests, ephemeral sessions)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value.to_string());
        store
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
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Ordered collection of character records, unique by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    records: Vec<Character>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the roster, dropping anything unusable
    pub fn load(store: &dyn KeyValueStore, catalog: &Catalog) -> Self {
        let blob = match store.get(ROSTER_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => return Self::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read roster, starting empty");
                return Self::new();
            }
        };
        Self::from_json(&blob, catalog)
    }

    pub fn from_json(blob: &str, catalog: &Catalog) -> Self {
        let entries: Vec<Value> = match serde_json::from_str(blob) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "corrupt roster, starting empty");
                return Self::new();
            }
        };

        let mut roster = Self::new();
        for entry in entries {
            let mut record: Character = match serde_json::from_value(entry) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed roster record");
                    continue;
                }
            };
            if catalog.class(&record.class_id).is_none() {
                tracing::warn!(id = %record.id, class = %record.class_id, "skipping record with unknown class");
                continue;
            }
            if roster.get(&record.id).is_some() {
                tracing::warn!(id = %record.id, "skipping duplicate roster id");
                continue;
            }
            record.sanitize(catalog);
            roster.records.push(record);
        }
        roster
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(&self.records)?)
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        store.set(ROSTER_KEY, &self.to_json()?)
    }

    pub fn records(&self) -> &[Character] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Character> {
        self.records.iter().find(|c| c.id == id)
    }

    pub fn first(&self) -> Option<&Character> {
        self.records.first()
    }

    /// Case-insensitive name check
    pub fn name_taken(&self, name: &str) -> bool {
        let wanted = name.to_lowercase();
        self.records.iter().any(|c| c.name.to_lowercase() == wanted)
    }

    /// Replace the record with the same id in place, or append
    pub fn upsert(&mut self, record: Character) {
        match self.records.iter_mut().find(|c| c.id == record.id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Character> {
        let index = self.records.iter().position(|c| c.id == id)?;
        Some(self.records.remove(index))
    }
}

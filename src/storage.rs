use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::app_dirs::AppDirs;

/// Logical key for the persisted book collection.
pub const BOOKS_KEY: &str = "books";
/// Logical key for the append-only session log.
pub const SESSIONS_KEY: &str = "readingSessions";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable key-value storage keyed by logical name.
///
/// `save` returns its failure to the caller; the store layers log it and
/// carry on in-memory rather than aborting the user action. `load` treats
/// missing and corrupt payloads alike as absent.
pub trait KeyValueStore {
    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError>;
    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T>;
}

/// File-backed store: one pretty-printed `<key>.json` per logical key under
/// the state directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let dir = AppDirs::state_dir().unwrap_or_else(|| PathBuf::from("quire_state"));
        Self { dir }
    }

    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for JsonFileStore {
    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let data = serde_json::to_vec_pretty(value)?;
        fs::write(self.key_path(key), data)?;
        Ok(())
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = fs::read(self.key_path(key)).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("discarding corrupt record for key {key:?}: {err}");
                None
            }
        }
    }
}

/// In-memory store for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let data = serde_json::to_string(value)?;
        self.records.borrow_mut().insert(key.to_string(), data);
        Ok(())
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let records = self.records.borrow();
        let data = records.get(key)?;
        match serde_json::from_str(data) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("discarding corrupt record for key {key:?}: {err}");
                None
            }
        }
    }
}

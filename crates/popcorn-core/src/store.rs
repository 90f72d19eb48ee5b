use parking_lot::Mutex;
use popcorn_models::WatchedMovie;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::watched::WatchedList;

/// Key the watched list lives under
pub const WATCHED_KEY: &str = "watched";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not serialize '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

/// String values by key, the way a browser's local storage works
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

fn io_error(key: &str, source: std::io::Error) -> StoreError {
    StoreError::Io {
        key: key.to_string(),
        source,
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Store miss: {} (file does not exist)", key);
                Ok(None)
            }
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| io_error(key, e))?;

        // Write to a temp file then rename so a crash never leaves half a list
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, value).map_err(|e| io_error(key, e))?;
        std::fs::rename(&temp_path, &path).map_err(|e| io_error(key, e))?;
        debug!("Store write: {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// Reads the watched list once at startup and rewrites it on every change.
pub struct WatchedRepository {
    store: Box<dyn KeyValueStore>,
}

impl WatchedRepository {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Missing data is an empty list. Unreadable data is copied to
    /// `watched.bak` and replaced by an empty list.
    pub fn load(&self) -> Result<WatchedList, StoreError> {
        let Some(content) = self.store.get(WATCHED_KEY)? else {
            return Ok(WatchedList::new());
        };

        let records: Vec<WatchedMovie> = match serde_json::from_str::<Option<Vec<WatchedMovie>>>(&content) {
            Ok(records) => records.unwrap_or_default(),
            Err(e) => {
                let backup_key = format!("{}.bak", WATCHED_KEY);
                match self.store.set(&backup_key, &content) {
                    Ok(()) => warn!(
                        "Watched list is unreadable ({}). Backed it up under '{}' and starting empty.",
                        e, backup_key
                    ),
                    Err(backup_err) => warn!(
                        "Watched list is unreadable ({}) and backing it up failed ({}). Starting empty.",
                        e, backup_err
                    ),
                }
                return Ok(WatchedList::new());
            }
        };

        let (list, discarded) = WatchedList::from_records(records);
        if discarded > 0 {
            warn!("Dropped {} repeated or out-of-range entries from the stored watched list", discarded);
        }
        info!("Loaded watched list: {} movies", list.len());
        Ok(list)
    }

    pub fn save(&self, list: &WatchedList) -> Result<(), StoreError> {
        let json = serde_json::to_string(list.as_slice()).map_err(|source| StoreError::Serialize {
            key: WATCHED_KEY.to_string(),
            source,
        })?;
        self.store.set(WATCHED_KEY, &json)?;
        debug!("Saved watched list: {} movies", list.len());
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(WATCHED_KEY)
    }
}

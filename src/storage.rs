// src/storage.rs

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Serialize, de::DeserializeOwned};

use crate::error::ClientError;

/// Bump whenever the layout of any persisted value changes.
/// A mismatch at open time clears the store before first use.
pub const SCHEMA_VERSION: u32 = 1;

/// Key names for everything the client persists locally.
/// Minted here so no component invents its own spelling.
pub mod keys {
    /// Schema version stamp written by `LocalStore::open`.
    pub const SCHEMA_VERSION: &str = "schema_version";

    /// Calendar day of the last daily cache reset.
    pub const LAST_RESET: &str = "last_reset";

    /// Audit record written by the last daily cache reset.
    pub const LAST_RESET_AUDIT: &str = "last_reset_audit";

    /// Global UI theme preference.
    pub const THEME: &str = "theme";

    /// Session identity facts, written at login and cleared at logout.
    pub const USER_ID: &str = "session.user_id";
    pub const DESIGNATION: &str = "session.designation";

    /// Completion list for one category.
    pub fn completed(category_id: &str) -> String {
        format!("completed.{}", category_id)
    }

    /// Locally accumulated point cache for one category.
    pub fn category_points(category_id: &str) -> String {
        format!("points.{}", category_id)
    }

    /// Whether the category reward has been claimed.
    pub fn reward_claimed(category_id: &str) -> String {
        format!("reward.{}", category_id)
    }
}

/// Persistent string-keyed storage with JSON-serialized values.
///
/// Read-modify-write sequences through a backend are not atomic; each key
/// is expected to have a single writer.
pub trait StorageBackend: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, ClientError>;
    fn write(&self, key: &str, value: &str) -> Result<(), ClientError>;
    fn remove(&self, key: &str) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

/// In-memory backend for tests and as a fallback when the store file
/// cannot be opened.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.entries().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        self.entries().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.entries().clear();
        Ok(())
    }
}

/// File-backed backend: one JSON object per store, loaded fully at open and
/// rewritten on every mutation.
pub struct FileBackend {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileBackend {
    /// Opens the store file, creating parent directories as needed.
    /// A missing or corrupt file starts empty.
    pub fn open(path: &Path) -> Result<Self, ClientError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let entries = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!("local store file is corrupt, starting empty: {}", e);
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), ClientError> {
        let raw = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.entries().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let mut entries = self.entries();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        let mut entries = self.entries();
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        let mut entries = self.entries();
        entries.clear();
        self.flush(&entries)
    }
}

/// Schema-versioned key-value store injected into every component that
/// persists locally.
pub struct LocalStore {
    backend: Box<dyn StorageBackend>,
}

impl LocalStore {
    /// Wraps a backend, clearing it when the persisted schema version does
    /// not match `SCHEMA_VERSION`. Cached data is disposable by contract,
    /// so a clear is the migration step.
    pub fn open(backend: Box<dyn StorageBackend>) -> Result<Self, ClientError> {
        let store = Self { backend };

        let stored: Option<u32> = store.get_json(keys::SCHEMA_VERSION)?;
        if stored != Some(SCHEMA_VERSION) {
            if stored.is_some() {
                tracing::warn!("local store schema changed, clearing cached data");
            }
            store.backend.clear()?;
            store.put_json(keys::SCHEMA_VERSION, &SCHEMA_VERSION)?;
        }

        Ok(store)
    }

    pub fn open_file(path: &Path) -> Result<Self, ClientError> {
        Self::open(Box::new(FileBackend::open(path)?))
    }

    pub fn in_memory() -> Self {
        // The memory backend has no failure path.
        Self::open(Box::new(MemoryBackend::default())).expect("memory backend")
    }

    /// Reads and decodes a stored value. An undecodable value reads as
    /// absent: cached data is disposable and must never block the caller.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ClientError> {
        let Some(raw) = self.backend.read(key)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!("discarding undecodable local value for '{}': {}", key, e);
                Ok(None)
            }
        }
    }

    pub fn put_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ClientError> {
        let raw = serde_json::to_string(value)?;
        self.backend.write(key, &raw)
    }

    pub fn remove(&self, key: &str) -> Result<(), ClientError> {
        self.backend.remove(key)
    }

    /// Global UI theme preference.
    pub fn theme(&self) -> Result<Option<String>, ClientError> {
        self.get_json(keys::THEME)
    }

    pub fn set_theme(&self, theme: &str) -> Result<(), ClientError> {
        self.put_json(keys::THEME, &theme)
    }
}

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::CacheError;

/// Trait for the session-scoped string key-value store backing the cache.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// Configuration for the session store backend.
#[derive(Debug, Clone)]
pub enum CacheSource {
    /// Keep everything in process memory.
    Memory,

    /// One file per key under the given directory.
    File {
        /// Directory holding the store files
        dir: PathBuf,
    },

    /// No store at all; every read misses and every write fails.
    Disabled,
}

impl CacheSource {
    /// Create an in-memory store source.
    pub fn memory() -> Self {
        Self::Memory
    }

    /// Create a file-backed store source rooted at `dir`.
    pub fn file(dir: impl Into<PathBuf>) -> Self {
        Self::File { dir: dir.into() }
    }

    /// Create the store with the appropriate backend.
    pub fn into_store(self) -> Box<dyn SessionStore> {
        match self {
            Self::Memory => Box::new(MemoryStore::new()),
            Self::File { dir } => Box::new(FileStore::new(dir)),
            Self::Disabled => Box::new(DisabledStore),
        }
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-memory store for testing/development.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> CacheError {
    CacheError::Unavailable("memory store lock poisoned".to_string())
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let values = self.values.read().map_err(poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut values = self.values.write().map_err(poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut values = self.values.write().map_err(poisoned)?;
        values.remove(key);
        Ok(())
    }
}

// =============================================================================
// File Store
// =============================================================================

/// File-backed store, one JSON file per key.
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
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Disabled Store
// =============================================================================

/// Store used when no session storage is available.
pub struct DisabledStore;

impl SessionStore for DisabledStore {
    fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("session store disabled".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("session store disabled".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("session store disabled".to_string()))
    }
}

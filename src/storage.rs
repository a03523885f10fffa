//!
//! agendo durable client storage
//! ------------------------------
//! Small string key/value store backing the two pieces of durable session
//! state: the bearer credential and the active workspace id. The file
//! implementation keeps the whole map as one JSON object on disk and
//! rewrites it on every mutation; the payload is two short strings, so a
//! full rewrite is the simple correct choice.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{AppError, AppResult};

/// Storage key for the persisted bearer credential.
pub const CREDENTIAL_KEY: &str = "auth_token";
/// Storage key for the persisted active workspace id.
pub const ACTIVE_WORKSPACE_KEY: &str = "current_workspace_id";

/// Durable client-side key/value storage. Implementations must be safe to
/// share across tasks; all three operations are synchronous.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
    fn remove(&self, key: &str) -> AppResult<()>;
}

/// JSON-file-backed storage under the configured state directory.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    cache: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open (or create) the storage file. A missing file is an empty map;
    /// an unreadable or malformed file is an error so callers never run on
    /// silently dropped state.
    pub fn open<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let map: HashMap<String, String> = if path.exists() {
            let text = fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&text)
                    .map_err(|e| AppError::storage("corrupt_state_file".into(), format!("{}: {}", path.display(), e)))?
            }
        } else {
            HashMap::new()
        };
        Ok(Self { path, cache: Mutex::new(map) })
    }

    fn flush(&self, map: &HashMap<String, String>) -> AppResult<()> {
        let text = serde_json::to_string_pretty(map)
            .map_err(|e| AppError::storage("serialize_state".into(), e.to_string()))?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut map = self.cache.lock();
        map.insert(key.to_string(), value.to_string());
        self.flush(&map)
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let mut map = self.cache.lock();
        if map.remove(key).is_some() {
            return self.flush(&map);
        }
        Ok(())
    }
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.map.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.map.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.map.lock().remove(key);
        Ok(())
    }
}

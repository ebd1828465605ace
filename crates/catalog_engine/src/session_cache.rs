use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use catalog_core::CacheEntry;
use catalog_logging::{catalog_debug, catalog_warn};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::persist::{PersistError, SessionDir};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("session store: {0}")]
    Store(#[from] PersistError),
    #[error("cache entry could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Session-lifetime key/blob storage.
pub trait SessionStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// Lives as long as the process. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    blobs: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a session directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: SessionDir,
}

impl FileSessionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir: SessionDir::new(dir),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.dir.read(&blob_filename(key))?)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.dir.write(&blob_filename(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        Ok(self.dir.remove(&blob_filename(key))?)
    }
}

/// `{list}-{hash(key)}.json`; keys carry characters no filesystem should see.
fn blob_filename(key: &str) -> String {
    let list: String = key
        .split(':')
        .next()
        .unwrap_or("list")
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(32)
        .collect();
    let digest = Sha256::digest(key.as_bytes());
    let hash: String = digest.iter().take(8).map(|byte| format!("{byte:02x}")).collect();
    format!("{list}-{hash}.json")
}

/// Scroll offsets live beside the entry so scrolling never re-encodes it.
fn scroll_key(key: &str) -> String {
    format!("{key}#scroll")
}

/// Snapshots of list state, keyed by list key.
pub struct SessionCache {
    store: Box<dyn SessionStore>,
}

impl SessionCache {
    pub fn new(store: impl SessionStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemorySessionStore::new())
    }

    /// Replaces the entry stored under `entry.list_key`.
    pub fn save(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        let blob = serde_json::to_string(entry)?;
        self.store.set(&entry.list_key, &blob)
    }

    /// Records the scroll offset for `key` without touching the entry blob.
    pub fn save_scroll(&self, key: &str, offset: u32) -> Result<(), CacheError> {
        self.store.set(&scroll_key(key), &offset.to_string())
    }

    /// Returns the current entry for `key`. Unreadable or outdated blobs are removed and count as a miss.
    pub fn restore(&self, key: &str) -> Option<CacheEntry> {
        let blob = match self.store.get(key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(err) => {
                catalog_warn!("Session cache read for {} failed: {}", key, err);
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry>(&blob) {
            Ok(mut entry) if entry.is_current() && entry.list_key == key => {
                if let Some(offset) = self.scroll_offset(key) {
                    entry.scroll_offset = offset;
                }
                Some(entry)
            }
            Ok(entry) => {
                catalog_debug!(
                    "Dropping session cache entry {} with schema version {}",
                    key,
                    entry.version
                );
                self.discard(key);
                None
            }
            Err(err) => {
                catalog_warn!("Dropping unreadable session cache entry {}: {}", key, err);
                self.discard(key);
                None
            }
        }
    }

    pub fn clear(&self, key: &str) -> Result<(), CacheError> {
        self.store.remove(key)?;
        self.store.remove(&scroll_key(key))
    }

    fn scroll_offset(&self, key: &str) -> Option<u32> {
        match self.store.get(&scroll_key(key)) {
            Ok(Some(raw)) => raw.parse().ok(),
            Ok(None) => None,
            Err(err) => {
                catalog_warn!("Session cache scroll read for {} failed: {}", key, err);
                None
            }
        }
    }

    fn discard(&self, key: &str) {
        if let Err(err) = self.clear(key) {
            catalog_warn!("Could not remove session cache entry {}: {}", key, err);
        }
    }
}

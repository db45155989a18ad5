//! Credential store: the one shared holder of the current access token.
//!
//! The token lives in memory behind a lock and is mirrored to a
//! [`TokenStorage`] backend under the fixed key [`ACCESS_TOKEN_KEY`], so it
//! survives restarts. Writers replace the whole value in one assignment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use thiserror::Error;

/// Key under which the access token is persisted.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("format: {0}")]
    Format(String),
}

/// Persistent string key-value storage.
pub trait TokenStorage: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

// ── MemoryStorage ───────────────────────────────────────────────────

/// Non-persistent storage. Used for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

// ── FileStorage ─────────────────────────────────────────────────────

/// TOML file of string keys, e.g.
///
/// ```toml
/// access_token = "eyJhbGciOi..."
/// ```
///
/// A missing file reads as empty. Writes create parent directories.
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| StorageError::Format(e.to_string()))
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(entries).map_err(|e| StorageError::Format(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl TokenStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

// ── CredentialStore ─────────────────────────────────────────────────

/// Process-wide holder of the current bearer token.
///
/// Constructed once at startup and shared by `Arc` with the gateway, the
/// refresh coordinator and the realtime channel. Nobody else keeps a copy
/// of the token beyond a single request.
pub struct CredentialStore {
    current: RwLock<Option<String>>,
    storage: Arc<dyn TokenStorage>,
}

impl CredentialStore {
    /// Open the store, loading any persisted token.
    pub fn open(storage: Arc<dyn TokenStorage>) -> Result<Self, StorageError> {
        let token = storage.get(ACCESS_TOKEN_KEY)?.filter(|t| !t.is_empty());
        Ok(Self {
            current: RwLock::new(token),
            storage,
        })
    }

    /// An empty store backed by [`MemoryStorage`].
    pub fn in_memory() -> Self {
        Self {
            current: RwLock::new(None),
            storage: Arc::new(MemoryStorage::new()),
        }
    }

    /// Current token, if any.
    pub fn get(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Replace the token.
    ///
    /// The in-memory value is updated before persisting, so a storage
    /// error still leaves the new token in effect for this process. The
    /// write lock is held while persisting: concurrent writers land in
    /// storage in the same order as in memory.
    pub fn set(&self, token: impl Into<String>) -> Result<(), StorageError> {
        let token = token.into();
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Some(token.clone());
        self.storage.set(ACCESS_TOKEN_KEY, &token)
    }

    /// Forget the token (logout).
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = None;
        self.storage.delete(ACCESS_TOKEN_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_starts_empty() {
        let store = CredentialStore::in_memory();
        assert_eq!(store.get(), None);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn set_replaces_and_clear_forgets() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CredentialStore::open(storage.clone()).unwrap();

        store.set("first").unwrap();
        store.set("second").unwrap();
        assert_eq!(store.get().as_deref(), Some("second"));
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("second"));

        store.clear().unwrap();
        assert_eq!(store.get(), None);
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap(), None);
    }

    /// Storage that stalls on every write, widening any gap between the
    /// in-memory update and persistence.
    struct SlowStorage(MemoryStorage);

    impl TokenStorage for SlowStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            std::thread::sleep(std::time::Duration::from_millis(2));
            self.0.set(key, value)
        }

        fn delete(&self, key: &str) -> Result<(), StorageError> {
            std::thread::sleep(std::time::Duration::from_millis(2));
            self.0.delete(key)
        }
    }

    #[test]
    fn concurrent_writers_persist_what_memory_holds() {
        let storage = Arc::new(SlowStorage(MemoryStorage::new()));
        let store = Arc::new(CredentialStore::open(storage.clone()).unwrap());

        let writers: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for j in 0..10 {
                        if (i + j) % 5 == 0 {
                            store.clear().unwrap();
                        } else {
                            store.set(format!("tok-{}-{}", i, j)).unwrap();
                        }
                    }
                })
            })
            .collect();
        for w in writers {
            w.join().unwrap();
        }

        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap(), store.get());
    }

    #[test]
    fn open_loads_persisted_token() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(ACCESS_TOKEN_KEY, "persisted").unwrap();

        let store = CredentialStore::open(storage).unwrap();
        assert_eq!(store.get().as_deref(), Some("persisted"));
    }

    #[test]
    fn open_ignores_empty_token() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(ACCESS_TOKEN_KEY, "").unwrap();

        let store = CredentialStore::open(storage).unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.toml");

        {
            let store = CredentialStore::open(Arc::new(FileStorage::new(&path))).unwrap();
            assert_eq!(store.get(), None);
            store.set("tok-123").unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("access_token"));

        let store = CredentialStore::open(Arc::new(FileStorage::new(&path))).unwrap();
        assert_eq!(store.get().as_deref(), Some("tok-123"));

        store.clear().unwrap();
        let store = CredentialStore::open(Arc::new(FileStorage::new(&path))).unwrap();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn file_storage_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("local.toml"));
        storage.set("theme", "dark").unwrap();
        storage.set(ACCESS_TOKEN_KEY, "abc").unwrap();
        storage.delete(ACCESS_TOKEN_KEY).unwrap();

        assert_eq!(storage.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn file_storage_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        let err = FileStorage::new(&path).get(ACCESS_TOKEN_KEY).unwrap_err();
        assert!(matches!(err, StorageError::Format(_)));
    }
}

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::error::StorageError;

/// Bearer token of the current session.
pub const TOKEN_KEY: &str = "token";
/// Legacy alias of `TOKEN_KEY`, written alongside it and read as a fallback.
pub const LEGACY_TOKEN_KEY: &str = "admin_token";
/// JSON-encoded `Session`.
pub const USER_KEY: &str = "user";
pub const ROLE_KEY: &str = "userRole";

pub const SESSION_KEYS: [&str; 4] = [TOKEN_KEY, LEGACY_TOKEN_KEY, USER_KEY, ROLE_KEY];

/// One write in a storage batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageChange {
    Set(&'static str, String),
    Remove(&'static str),
}

// 1. DurableStorage Contract
/// DurableStorage
///
/// String key/value storage that outlives the process, the client-side counterpart of a
/// browser's local storage.
pub trait DurableStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Applies every change or none of them.
    fn apply(&self, changes: &[StorageChange]) -> Result<(), StorageError>;
}

pub type StorageState = Arc<dyn DurableStorage>;

fn apply_to_map(map: &mut BTreeMap<String, String>, changes: &[StorageChange]) {
    for change in changes {
        match change {
            StorageChange::Set(key, value) => {
                map.insert((*key).to_string(), value.clone());
            }
            StorageChange::Remove(key) => {
                map.remove(*key);
            }
        }
    }
}

// 2. File-backed Implementation
/// FileStorage
///
/// Keeps all keys in one JSON object on disk. A batch is written to a sibling temp file
/// and renamed over the original, so readers see either the old or the new contents.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl DurableStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_map()?.remove(key))
    }

    fn apply(&self, changes: &[StorageChange]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Unreadable contents are replaced, otherwise a corrupt file would block every write.
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(StorageError::Serialization(error)) => {
                tracing::warn!(%error, path = %self.path.display(), "discarding corrupt session storage");
                BTreeMap::new()
            }
            Err(error) => return Err(error),
        };
        apply_to_map(&mut map, changes);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&map)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

// 3. In-memory Implementation
/// MemoryStorage
///
/// Process-local storage for tests and ephemeral clients. Writes can be switched off to
/// simulate a full or unavailable backing store.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
    reject_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl DurableStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn apply(&self, changes: &[StorageChange]) -> Result<(), StorageError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes rejected".to_string()));
        }
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        apply_to_map(&mut entries, changes);
        Ok(())
    }
}

//! Durable key/value storage for the credential mirror.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session only ever persists two string entries, `token` and `user`
//! (the latter JSON-encoded). `FileStorage` keeps them in a small JSON object
//! on disk so a later run starts from the same session; `MemoryStorage`
//! backs tests and throwaway sessions.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("session storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session storage encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String-keyed durable storage, read at startup and written on every
/// login/logout.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns an error if the entry cannot be made durable.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal cannot be made durable.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// MEMORY
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed entries, e.g. to simulate state left by a previous run.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { entries: Mutex::new(entries) }
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.entries).insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// JSON-object file holding the persisted entries.
///
/// The whole file is rewritten on each mutation; entries are few and writes
/// only happen at login, logout and expiry.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open the storage file, starting empty when it does not exist.
    ///
    /// A file that is not a JSON object of strings is discarded and treated
    /// as empty; the next write replaces it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "session file unreadable; starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|source| StorageError::Io { path: parent.to_path_buf(), source })?;
        }
        let raw = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, raw).map_err(|source| StorageError::Io { path: self.path.clone(), source })
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries);
        entries.insert(key.to_owned(), value.to_owned());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries);
        if entries.remove(key).is_none() && !self.path.exists() {
            return Ok(());
        }
        self.flush(&entries)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

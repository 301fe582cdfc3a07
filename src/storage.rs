//! Key-value storage module
//!
//! This module provides the persistence backends for local collections. Each
//! key holds one serialized value; the on-disk backend keeps every key in its
//! own JSON file inside the application's data directory.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to determine data directory location
    #[error("Failed to determine data directory location")]
    DataDirectoryNotFound,

    /// Failed to create or access the data directory
    #[error("Failed to create data directory at {path}: {source}")]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    /// Failed to read a stored value
    #[error("Failed to read storage file {path}: {source}")]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a stored value
    #[error("Failed to write storage file {path}: {source}")]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to serialize data for storage
    #[error("Failed to serialize data: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// A synchronous string key-value store.
///
/// Values are opaque strings; callers handle serialization. Writes replace
/// the whole value under a key.
pub trait KeyValueStore: Send + Sync {
    /// Loads the value stored under `key`
    ///
    /// # Arguments
    ///
    /// * `key` - The storage key, e.g. `movie-favorites`
    ///
    /// # Returns
    ///
    /// The stored value, or `None` if nothing was ever stored under `key`.
    /// Returns an error if a value exists but cannot be read.
    ///
    /// # Examples
    ///
    /// ```
    /// use screen_scout::{KeyValueStore, MemoryStorage};
    ///
    /// let storage = MemoryStorage::new();
    /// assert_eq!(storage.get("movie-favorites").unwrap(), None);
    /// ```
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value
    ///
    /// # Arguments
    ///
    /// * `key` - The storage key
    /// * `value` - The serialized value
    ///
    /// # Examples
    ///
    /// ```
    /// use screen_scout::{KeyValueStore, MemoryStorage};
    ///
    /// let storage = MemoryStorage::new();
    /// storage.set("movie-watchlist", "[]").unwrap();
    /// assert_eq!(storage.get("movie-watchlist").unwrap().as_deref(), Some("[]"));
    /// ```
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// File-backed storage keeping one JSON file per key
#[derive(Debug)]
pub struct FileStorage {
    /// The directory where values are stored
    data_dir: PathBuf,
}

impl FileStorage {
    /// Opens or creates a storage rooted at `dir`
    ///
    /// Missing parent directories are created.
    ///
    /// # Arguments
    ///
    /// * `dir` - The directory holding one `<key>.json` file per key
    ///
    /// # Returns
    ///
    /// A Result containing the FileStorage or a StorageError
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use screen_scout::FileStorage;
    ///
    /// let storage = FileStorage::open("/tmp/screen-scout").unwrap();
    /// ```
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let data_dir = dir.into();

        fs::create_dir_all(&data_dir).map_err(|e| StorageError::DirectoryCreationFailed {
            path: data_dir.clone(),
            source: e,
        })?;

        Ok(Self { data_dir })
    }

    /// Opens the storage in the system's standard data directory
    pub fn open_default() -> Result<Self, StorageError> {
        let dir = default_data_dir().ok_or(StorageError::DataDirectoryNotFound)?;
        Self::open(dir)
    }

    /// Returns the path to the data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let file_path = self.path_for(key);

        match fs::read_to_string(&file_path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed {
                path: file_path,
                source: e,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let file_path = self.path_for(key);

        fs::write(&file_path, value).map_err(|e| StorageError::WriteFailed {
            path: file_path,
            source: e,
        })
    }
}

/// In-process storage that forgets everything when dropped
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave a half-written value
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The platform data directory for this application, if one can be determined
pub fn default_data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "screen-scout")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Sanitizes a key for use in file paths
///
/// Converts to lowercase and replaces all characters that are not
/// a-z, 0-9, or hyphen with underscores.
fn sanitize_key(key: &str) -> String {
    key.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("movie-favorites"), "movie-favorites");
        assert_eq!(sanitize_key("With Spaces"), "with_spaces");
        assert_eq!(sanitize_key("../escape"), "___escape");
        assert_eq!(sanitize_key("Mixed123ABC"), "mixed123abc");
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("nested")).unwrap();

        assert_eq!(storage.get("movie-favorites").unwrap(), None);

        storage.set("movie-favorites", "[]").unwrap();
        assert_eq!(storage.get("movie-favorites").unwrap().as_deref(), Some("[]"));
        assert!(storage.data_dir().join("movie-favorites.json").is_file());

        storage.set("movie-favorites", "[1]").unwrap();
        assert_eq!(storage.get("movie-favorites").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_file_storage_keys_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        storage.set("movie-favorites", "[1]").unwrap();
        storage.set("movie-watchlist", "[2]").unwrap();

        assert_eq!(storage.get("movie-favorites").unwrap().as_deref(), Some("[1]"));
        assert_eq!(storage.get("movie-watchlist").unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();

        assert_eq!(storage.get("key").unwrap(), None);
        storage.set("key", "value").unwrap();
        assert_eq!(storage.get("key").unwrap().as_deref(), Some("value"));
        storage.set("key", "other").unwrap();
        assert_eq!(storage.get("key").unwrap().as_deref(), Some("other"));
    }
}

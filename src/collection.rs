//! Persisted collection module
//!
//! A collection is an ordered, id-unique list of entries stored as a single
//! serialized value under one key. Every mutation reads the whole list,
//! changes it, writes the whole list back and announces the change on the
//! notification bus.

use crate::events::{NotificationBus, Topic};
use crate::storage::{KeyValueStore, StorageError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Layout version written by this crate
pub(crate) const SCHEMA_VERSION: u32 = 1;

/// An entry that can live in a collection
pub(crate) trait CollectionEntry: Clone + Serialize + DeserializeOwned {
    /// The identity used for duplicate detection
    fn id(&self) -> &str;
}

/// The stored layout of a collection
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    entries: T,
}

/// Accepts both the versioned envelope and the legacy bare array
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredPayload<E> {
    Versioned(Envelope<Vec<E>>),
    Legacy(Vec<E>),
}

/// A persisted id-unique collection of entries
pub(crate) struct Collection<E> {
    key: &'static str,
    topic: Topic,
    backend: Arc<dyn KeyValueStore>,
    bus: NotificationBus,
    _entry: std::marker::PhantomData<E>,
}

impl<E> Collection<E>
where
    E: CollectionEntry,
{
    pub fn new(
        key: &'static str,
        topic: Topic,
        backend: Arc<dyn KeyValueStore>,
        bus: NotificationBus,
    ) -> Self {
        Self {
            key,
            topic,
            backend,
            bus,
            _entry: std::marker::PhantomData,
        }
    }

    /// Reads every entry in insertion order
    ///
    /// # Returns
    ///
    /// The stored entries. A missing, unreadable or unparseable payload
    /// reads as an empty collection, as does one written by a newer schema.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// for title in favorites.list() {
    ///     println!("{} ({})", title.name, title.year);
    /// }
    /// ```
    pub fn list(&self) -> Vec<E> {
        let raw = match self.backend.get(self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(
                    key = self.key,
                    error = %e,
                    "unreadable collection, treating as empty"
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<StoredPayload<E>>(&raw) {
            Ok(StoredPayload::Versioned(envelope)) if envelope.version <= SCHEMA_VERSION => {
                envelope.entries
            }
            Ok(StoredPayload::Versioned(envelope)) => {
                tracing::warn!(
                    key = self.key,
                    version = envelope.version,
                    "collection written by a newer version, treating as empty"
                );
                Vec::new()
            }
            Ok(StoredPayload::Legacy(entries)) => {
                tracing::debug!(key = self.key, "reading unversioned collection");
                entries
            }
            Err(e) => {
                tracing::warn!(
                    key = self.key,
                    error = %e,
                    "corrupt collection, treating as empty"
                );
                Vec::new()
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.list().iter().any(|entry| entry.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<E> {
        self.list().into_iter().find(|entry| entry.id() == id)
    }

    /// Appends `entry` unless an entry with the same id exists
    ///
    /// # Arguments
    ///
    /// * `entry` - The entry to append
    ///
    /// # Returns
    ///
    /// `true` if the entry was inserted and persisted, `false` if its id was
    /// already present (nothing is written then). Returns an error if the
    /// write fails.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// if collection.insert(title.clone())? {
    ///     println!("Added {}", title.name);
    /// }
    /// ```
    pub fn insert(&self, entry: E) -> Result<bool, StorageError> {
        let mut entries = self.list();

        if entries.iter().any(|existing| existing.id() == entry.id()) {
            return Ok(false);
        }

        entries.push(entry);
        self.persist(&entries)?;
        Ok(true)
    }

    /// Drops any entry with `id` and persists the result
    ///
    /// The collection is written and its topic published even if nothing
    /// matched.
    ///
    /// # Arguments
    ///
    /// * `id` - The id of the entry to drop
    ///
    /// # Examples
    ///
    /// ```ignore
    /// collection.remove("tt0372784")?;
    /// assert!(!collection.contains("tt0372784"));
    /// ```
    pub fn remove(&self, id: &str) -> Result<(), StorageError> {
        let mut entries = self.list();
        entries.retain(|entry| entry.id() != id);
        self.persist(&entries)
    }

    /// Applies `change` to the entry with `id`
    ///
    /// # Arguments
    ///
    /// * `id` - The id of the entry to change
    /// * `change` - Mutation applied to the matching entry
    ///
    /// # Returns
    ///
    /// Whether an entry matched. Nothing is written when none did.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// collection.update("tt0372784", |entry| entry.watched = !entry.watched)?;
    /// ```
    pub fn update<F>(&self, id: &str, change: F) -> Result<bool, StorageError>
    where
        F: FnOnce(&mut E),
    {
        let mut entries = self.list();

        let Some(entry) = entries.iter_mut().find(|entry| entry.id() == id) else {
            return Ok(false);
        };
        change(entry);

        self.persist(&entries)?;
        Ok(true)
    }

    fn persist(&self, entries: &[E]) -> Result<(), StorageError> {
        let envelope = Envelope {
            version: SCHEMA_VERSION,
            entries,
        };
        let content = serde_json::to_string(&envelope)?;

        self.backend.set(self.key, &content)?;
        tracing::debug!(key = self.key, entries = entries.len(), "collection saved");

        self.bus.publish(self.topic);
        Ok(())
    }
}

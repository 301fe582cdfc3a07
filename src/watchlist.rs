//! Watchlist collection
//!
//! The watchlist holds titles the user wants to see, each with the time it
//! was added and whether it has been watched. The watched flag only exists
//! while the title is on the list: removing and re-adding a title starts it
//! over as unwatched.

use crate::catalog::Title;
use crate::collection::{Collection, CollectionEntry};
use crate::events::{NotificationBus, Topic};
use crate::storage::{KeyValueStore, StorageError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Storage key of the watchlist collection
pub const WATCHLIST_KEY: &str = "movie-watchlist";

/// A title on the watchlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    #[serde(flatten)]
    pub title: Title,
    /// When the title was put on the watchlist
    #[serde(alias = "addedAt")]
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub watched: bool,
}

impl CollectionEntry for WatchlistEntry {
    fn id(&self) -> &str {
        &self.title.id
    }
}

/// Which part of the watchlist to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchFilter {
    #[default]
    All,
    /// Entries not yet watched
    ToWatch,
    Watched,
}

impl WatchFilter {
    pub fn matches(&self, entry: &WatchlistEntry) -> bool {
        match self {
            WatchFilter::All => true,
            WatchFilter::ToWatch => !entry.watched,
            WatchFilter::Watched => entry.watched,
        }
    }
}

/// Entry counts per filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatchCounts {
    pub all: usize,
    pub to_watch: usize,
    pub watched: usize,
}

/// The user's watchlist
///
/// Every successful mutation publishes `Topic::WatchlistChanged`.
pub struct Watchlist {
    collection: Collection<WatchlistEntry>,
}

impl Watchlist {
    pub fn new(backend: Arc<dyn KeyValueStore>, bus: NotificationBus) -> Self {
        Self {
            collection: Collection::new(WATCHLIST_KEY, Topic::WatchlistChanged, backend, bus),
        }
    }

    /// All entries in the order they were added
    pub fn list(&self) -> Vec<WatchlistEntry> {
        self.collection.list()
    }

    /// Entries matching `filter`, in the order they were added
    pub fn filtered(&self, filter: WatchFilter) -> Vec<WatchlistEntry> {
        self.list()
            .into_iter()
            .filter(|entry| filter.matches(entry))
            .collect()
    }

    pub fn counts(&self) -> WatchCounts {
        let entries = self.list();
        let watched = entries.iter().filter(|entry| entry.watched).count();

        WatchCounts {
            all: entries.len(),
            to_watch: entries.len() - watched,
            watched,
        }
    }

    /// Adds `title` as unwatched unless it is already on the watchlist
    pub fn add(&self, title: &Title) -> Result<(), StorageError> {
        self.add_with_status(title, false)
    }

    /// Adds `title` with the given watched flag unless it is already on the
    /// watchlist. An existing entry keeps its flag and timestamp.
    pub fn add_with_status(&self, title: &Title, watched: bool) -> Result<(), StorageError> {
        let entry = WatchlistEntry {
            title: title.clone(),
            added_at: Utc::now(),
            watched,
        };

        self.collection.insert(entry).map(|_| ())
    }

    pub fn remove(&self, id: &str) -> Result<(), StorageError> {
        self.collection.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.collection.contains(id)
    }

    /// Removes `title` if it is on the watchlist and adds it otherwise
    ///
    /// Returns whether the title is on the watchlist afterwards.
    pub fn toggle(&self, title: &Title) -> Result<bool, StorageError> {
        if self.contains(&title.id) {
            self.remove(&title.id)?;
            Ok(false)
        } else {
            self.add(title)?;
            Ok(true)
        }
    }

    /// Flips the watched flag of the entry with `id`
    ///
    /// Nothing changes when the title is not on the watchlist.
    pub fn toggle_watched(&self, id: &str) -> Result<(), StorageError> {
        let found = self
            .collection
            .update(id, |entry| entry.watched = !entry.watched)?;

        if !found {
            tracing::debug!(id, "toggle_watched on a title not in the watchlist");
        }
        Ok(())
    }

    /// Whether the entry with `id` is marked watched; false when absent
    pub fn get_watched(&self, id: &str) -> bool {
        self.collection
            .get(id)
            .map(|entry| entry.watched)
            .unwrap_or(false)
    }
}

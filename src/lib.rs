//! ScreenScout - Search movies and TV shows and keep track of what to watch
//!
//! This library provides the core of the ScreenScout client: a catalog client
//! for the OMDb API, locally persisted favorites and watchlist collections,
//! a notification bus announcing collection changes, and an aggregator that
//! turns paged search results into one growing list.

mod aggregator;
mod catalog;
mod collection;
mod config;
mod events;
mod favorites;
mod storage;
mod watchlist;

pub use aggregator::{PageRequest, ResultAggregator, SearchStatus};
pub use catalog::{
    CatalogClient, CatalogError, DEFAULT_BASE_URL, DEFAULT_FAILURE_MESSAGE, OmdbClient,
    SearchPage, Title, TitleDetail, TitleKind,
};
pub use config::{Config, ConfigError, OmdbConfig, default_config_path};
pub use events::{NotificationBus, Subscription, Topic};
pub use favorites::{FAVORITES_KEY, Favorites};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage, StorageError, default_data_dir};
pub use watchlist::{WATCHLIST_KEY, WatchCounts, WatchFilter, Watchlist, WatchlistEntry};

use std::sync::Arc;
use thiserror::Error;

/// Top-level error type for ScreenScout operations
#[derive(Debug, Error)]
pub enum ScreenScoutError {
    /// Error during a catalog lookup
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Error while persisting a collection
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Error while loading configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// The user's local collections, sharing one storage backend and one bus
///
/// Construct one per session. Tests build isolated instances over
/// [`MemoryStorage`] or a temporary directory.
///
/// # Examples
///
/// ```
/// use screen_scout::{LocalStore, MemoryStorage, NotificationBus, Title, TitleKind, Topic};
/// use std::sync::Arc;
///
/// let bus = NotificationBus::new();
/// let store = LocalStore::new(Arc::new(MemoryStorage::new()), bus.clone());
///
/// let _refresh = bus.subscribe(Topic::WatchlistChanged, |_| {
///     // re-read the watchlist here
/// });
///
/// let title = Title {
///     id: "tt0372784".to_string(),
///     name: "Batman Begins".to_string(),
///     year: "2005".to_string(),
///     kind: TitleKind::Movie,
///     poster: None,
/// };
/// store.watchlist().add(&title).unwrap();
/// assert!(store.watchlist().contains("tt0372784"));
/// assert!(!store.favorites().contains("tt0372784"));
/// ```
pub struct LocalStore {
    favorites: Favorites,
    watchlist: Watchlist,
    bus: NotificationBus,
}

impl LocalStore {
    pub fn new(backend: Arc<dyn KeyValueStore>, bus: NotificationBus) -> Self {
        Self {
            favorites: Favorites::new(Arc::clone(&backend), bus.clone()),
            watchlist: Watchlist::new(backend, bus.clone()),
            bus,
        }
    }

    /// Opens the on-disk store in the configured (or platform) data directory
    pub fn open(config: &Config, bus: NotificationBus) -> Result<Self, StorageError> {
        let storage = match &config.data_dir {
            Some(dir) => FileStorage::open(dir)?,
            None => FileStorage::open_default()?,
        };
        tracing::debug!(dir = %storage.data_dir().display(), "opened local store");

        Ok(Self::new(Arc::new(storage), bus))
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    /// The bus this store publishes changes on
    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }
}

/// Builds the OMDb client described by `config`
pub fn catalog_client(config: &Config) -> Result<OmdbClient, ConfigError> {
    Ok(OmdbClient::with_base_url(
        config.api_key()?,
        config.omdb.base_url.clone(),
    ))
}

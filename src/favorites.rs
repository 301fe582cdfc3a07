//! Favorites collection

use crate::catalog::Title;
use crate::collection::{Collection, CollectionEntry};
use crate::events::{NotificationBus, Topic};
use crate::storage::{KeyValueStore, StorageError};
use std::sync::Arc;

/// Storage key of the favorites collection
pub const FAVORITES_KEY: &str = "movie-favorites";

impl CollectionEntry for Title {
    fn id(&self) -> &str {
        &self.id
    }
}

/// The set of titles the user marked as favorite
///
/// Every successful mutation publishes `Topic::FavoritesChanged`.
pub struct Favorites {
    collection: Collection<Title>,
}

impl Favorites {
    pub fn new(backend: Arc<dyn KeyValueStore>, bus: NotificationBus) -> Self {
        Self {
            collection: Collection::new(FAVORITES_KEY, Topic::FavoritesChanged, backend, bus),
        }
    }

    /// All favorites in the order they were added
    pub fn list(&self) -> Vec<Title> {
        self.collection.list()
    }

    /// Adds `title` unless a favorite with the same id exists
    pub fn add(&self, title: &Title) -> Result<(), StorageError> {
        self.collection.insert(title.clone()).map(|_| ())
    }

    pub fn remove(&self, id: &str) -> Result<(), StorageError> {
        self.collection.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.collection.contains(id)
    }

    /// Removes `title` if it is a favorite and adds it otherwise
    ///
    /// Returns whether the title is a favorite afterwards.
    pub fn toggle(&self, title: &Title) -> Result<bool, StorageError> {
        if self.contains(&title.id) {
            self.remove(&title.id)?;
            Ok(false)
        } else {
            self.add(title)?;
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TitleKind;
    use crate::storage::MemoryStorage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn title(id: &str) -> Title {
        Title {
            id: id.to_string(),
            name: format!("Title {}", id),
            year: "2005".to_string(),
            kind: TitleKind::Movie,
            poster: None,
        }
    }

    fn favorites() -> Favorites {
        Favorites::new(Arc::new(MemoryStorage::new()), NotificationBus::new())
    }

    #[test]
    fn test_add_then_contains() {
        let favorites = favorites();
        favorites.add(&title("tt1")).unwrap();

        assert!(favorites.contains("tt1"));
        assert!(!favorites.contains("tt2"));
    }

    #[test]
    fn test_add_twice_keeps_one_entry() {
        let favorites = favorites();
        favorites.add(&title("tt1")).unwrap();
        favorites.add(&title("tt1")).unwrap();

        let matching = favorites.list().iter().filter(|t| t.id == "tt1").count();
        assert_eq!(matching, 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let favorites = favorites();
        favorites.add(&title("tt1")).unwrap();
        let before = favorites.list();

        favorites.remove("tt404").unwrap();

        assert_eq!(favorites.list(), before);
    }

    #[test]
    fn test_toggle() {
        let favorites = favorites();

        assert!(favorites.toggle(&title("tt1")).unwrap());
        assert!(favorites.contains("tt1"));
        assert!(!favorites.toggle(&title("tt1")).unwrap());
        assert!(!favorites.contains("tt1"));
    }

    #[test]
    fn test_mutations_publish() {
        let bus = NotificationBus::new();
        let favorites = Favorites::new(Arc::new(MemoryStorage::new()), bus.clone());
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let _subscription = bus.subscribe(Topic::FavoritesChanged, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        favorites.add(&title("tt1")).unwrap();
        // Duplicate add writes nothing and stays silent
        favorites.add(&title("tt1")).unwrap();
        favorites.remove("tt1").unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(crate::storage::FileStorage::open(dir.path()).unwrap());

        Favorites::new(backend.clone(), NotificationBus::new())
            .add(&title("tt1"))
            .unwrap();

        let reopened = Favorites::new(backend, NotificationBus::new());
        assert_eq!(reopened.list(), vec![title("tt1")]);
    }

    #[test]
    fn test_reads_provider_shaped_records() {
        let backend = Arc::new(MemoryStorage::new());
        backend
            .set(
                FAVORITES_KEY,
                r#"[{"imdbID": "tt0372784", "Title": "Batman Begins", "Year": "2005", "Type": "movie", "Poster": "https://example.com/a.jpg"}]"#,
            )
            .unwrap();

        let favorites = Favorites::new(backend, NotificationBus::new());
        let list = favorites.list();

        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "Batman Begins");
        assert!(favorites.contains("tt0372784"));
    }

    #[test]
    fn test_unknown_type_tag_keeps_whole_list() {
        let backend = Arc::new(MemoryStorage::new());
        backend
            .set(
                FAVORITES_KEY,
                r#"[
                    {"imdbID": "tt0372784", "Title": "Batman Begins", "Year": "2005", "Type": "movie"},
                    {"imdbID": "tt1569923", "Title": "Batman: Arkham City", "Year": "2011", "Type": "game"}
                ]"#,
            )
            .unwrap();

        let favorites = Favorites::new(backend, NotificationBus::new());
        assert_eq!(favorites.list().len(), 2);
        assert_eq!(favorites.list()[1].kind, TitleKind::Movie);

        favorites.add(&title("tt3")).unwrap();

        let ids: Vec<String> = favorites.list().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["tt0372784", "tt1569923", "tt3"]);
    }

    #[test]
    fn test_poster_placeholder_reads_as_missing() {
        let backend = Arc::new(MemoryStorage::new());
        backend
            .set(
                FAVORITES_KEY,
                r#"[{"imdbID": "tt0000002", "Title": "Lost Reel", "Year": "1931", "Type": "movie", "Poster": "N/A"}]"#,
            )
            .unwrap();

        let favorites = Favorites::new(backend, NotificationBus::new());

        assert_eq!(favorites.list()[0].poster, None);
    }
}

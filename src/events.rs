//! Change notification module
//!
//! Collections announce that they changed by publishing a topic on a shared
//! bus. Listeners receive only the topic and re-read the collection they care
//! about.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// What changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// The favorites collection was written
    FavoritesChanged,
    /// The watchlist collection was written
    WatchlistChanged,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::FavoritesChanged => "favoritesUpdated",
            Topic::WatchlistChanged => "watchlistUpdated",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Listener = Arc<dyn Fn(Topic) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Topic, Listener)>,
}

/// In-process publish/subscribe bus for collection changes
///
/// Cloning the bus yields another handle to the same set of listeners.
#[derive(Clone, Default)]
pub struct NotificationBus {
    registry: Arc<Mutex<Registry>>,
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationBus")
            .field("listeners", &self.registry().listeners.len())
            .finish()
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for `topic`
    ///
    /// The listener stays registered until the returned `Subscription` is
    /// dropped or `unsubscribe` is called on it.
    ///
    /// # Examples
    ///
    /// ```
    /// use screen_scout::{NotificationBus, Topic};
    ///
    /// let bus = NotificationBus::new();
    /// let subscription = bus.subscribe(Topic::WatchlistChanged, |topic| {
    ///     println!("{} fired, reloading", topic);
    /// });
    /// bus.publish(Topic::WatchlistChanged);
    /// drop(subscription);
    /// ```
    #[must_use = "the listener is removed as soon as the subscription is dropped"]
    pub fn subscribe<F>(&self, topic: Topic, listener: F) -> Subscription
    where
        F: Fn(Topic) + Send + Sync + 'static,
    {
        let mut registry = self.registry();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, topic, Arc::new(listener)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Synchronously calls every listener registered for `topic`
    ///
    /// Listeners run on the caller's thread before `publish` returns. They
    /// may publish, subscribe or unsubscribe themselves; such changes take
    /// effect for the next `publish`.
    pub fn publish(&self, topic: Topic) {
        let listeners: Vec<Listener> = self
            .registry()
            .listeners
            .iter()
            .filter(|(_, t, _)| *t == topic)
            .map(|(_, _, listener)| Arc::clone(listener))
            .collect();

        tracing::trace!(%topic, listeners = listeners.len(), "publishing change");

        for listener in listeners {
            listener(topic);
        }
    }

    /// Number of listeners currently registered for `topic`
    pub fn listener_count(&self, topic: Topic) -> usize {
        self.registry()
            .listeners
            .iter()
            .filter(|(_, t, _)| *t == topic)
            .count()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        lock(&self.registry)
    }
}

/// Guard for a registered listener that unsubscribes on drop
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Removes the listener now instead of at drop time
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // The bus may already be gone
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).listeners.retain(|(id, _, _)| *id != self.id);
        }
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

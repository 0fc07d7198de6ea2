// src/app/watchlist.rs
use tracing::{debug, info, warn};

use super::error::WatchlistError;
use super::notify::{SubscriptionId, Subscribers};
use super::storage::KeyValueStore;
use super::types::WatchedEntry;
use super::utils::calc_average;

pub const MAX_USER_RATING: u8 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatchlistEvent {
    Added(String),
    Removed(String),
}

/// Figures shown above the watched list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WatchedSummary {
    pub count: usize,
    pub avg_imdb_rating: i64,
    pub avg_user_rating: i64,
    pub avg_runtime: i64,
}

/// Ordered, id-unique collection of watched movies, mirrored to a
/// [`KeyValueStore`] slot after every mutation.
pub struct WatchlistStore {
    entries: Vec<WatchedEntry>,
    storage: Box<dyn KeyValueStore>,
    key: String,
    subscribers: Subscribers<WatchlistEvent>,
}

/// Parse a persisted mirror. `null`, garbage, or a missing slot all mean "empty".
pub fn parse_mirror(raw: Option<&str>) -> Vec<WatchedEntry> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str::<Option<Vec<WatchedEntry>>>(raw) {
        Ok(list) => dedupe(list.unwrap_or_default()),
        Err(err) => {
            warn!("Stored watchlist is unreadable ({err}); starting empty.");
            Vec::new()
        }
    }
}

/// Older mirrors may hold the same movie twice; keep the first.
fn dedupe(list: Vec<WatchedEntry>) -> Vec<WatchedEntry> {
    let mut out: Vec<WatchedEntry> = Vec::with_capacity(list.len());
    for e in list {
        if out.iter().any(|o| o.id == e.id) {
            debug!("dropping duplicate watchlist entry {}", e.id);
            continue;
        }
        out.push(e);
    }
    out
}

impl WatchlistStore {
    /// Read the mirror once. Never fails: storage errors fall back to empty.
    pub fn load(storage: Box<dyn KeyValueStore>, key: &str) -> Self {
        let raw = match storage.get(key) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Failed to read watchlist slot `{key}`: {err}");
                None
            }
        };
        let entries = parse_mirror(raw.as_deref());
        info!("Loaded {} watched movie(s)", entries.len());
        Self {
            entries,
            storage,
            key: key.to_string(),
            subscribers: Subscribers::new(),
        }
    }

    pub fn entries(&self) -> &[WatchedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&WatchedEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn subscribe(&mut self, f: impl FnMut(&WatchlistEvent) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(f)
    }

    pub fn add(&mut self, entry: WatchedEntry) -> Result<(), WatchlistError> {
        if entry.user_rating == 0 || entry.user_rating > MAX_USER_RATING {
            return Err(WatchlistError::InvalidRating(entry.user_rating));
        }
        if self.contains(&entry.id) {
            return Err(WatchlistError::AlreadyWatched(entry.id));
        }
        let id = entry.id.clone();
        info!("Added {} ({}) to watchlist", entry.title, id);
        self.entries.push(entry);
        self.persist();
        self.subscribers.notify(&WatchlistEvent::Added(id));
        Ok(())
    }

    /// No-op (and no write) when `id` is absent.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            return false;
        }
        info!("Removed {id} from watchlist");
        self.persist();
        self.subscribers.notify(&WatchlistEvent::Removed(id.to_string()));
        true
    }

    pub fn summary(&self) -> WatchedSummary {
        summarize(&self.entries)
    }

    /// Full re-serialization into the mirror slot.
    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.entries) {
            Ok(j) => j,
            Err(err) => {
                warn!("Failed to serialize watchlist: {err}");
                return;
            }
        };
        if let Err(err) = self.storage.set(&self.key, &json) {
            warn!("Failed to persist watchlist to `{}`: {err}", self.key);
        }
    }
}

pub fn summarize(entries: &[WatchedEntry]) -> WatchedSummary {
    WatchedSummary {
        count: entries.len(),
        avg_imdb_rating: calc_average(entries.iter().map(|e| e.imdb_rating.map(f64::from))),
        avg_user_rating: calc_average(entries.iter().map(|e| Some(f64::from(e.user_rating)))),
        avg_runtime: calc_average(entries.iter().map(|e| e.runtime_minutes.map(f64::from))),
    }
}

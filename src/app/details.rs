// src/app/details.rs
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::cancel::CancelToken;
use super::error::{ConfirmError, FetchError};
use super::notify::{SubscriptionId, Subscribers};
use super::omdb::MovieApi;
use super::shortcuts::{ShortcutAction, ShortcutId, ShortcutRegistry};
use super::types::{MovieDetail, WatchedEntry};
use super::watchlist::{WatchlistStore, MAX_USER_RATING};
use super::worker::{spawn_request, Reply, Waker};

/// Key that closes the detail view while it is open.
pub const CLOSE_DETAIL_KEY: &str = "Escape";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DetailEvent {
    Opened(String),
    Loaded { id: String, title: String },
    Failed { id: String, message: String },
    Closed,
}

/// Owns the selection and the single-movie panel state.
pub struct DetailController {
    api: Arc<dyn MovieApi>,

    selected: Option<String>,
    detail: Option<MovieDetail>,
    loading: bool,
    error: Option<String>,
    user_rating: u8,
    rating_revisions: u32,

    in_flight: Option<CancelToken>,
    close_shortcut: Option<ShortcutId>,
    tx: Sender<Reply<MovieDetail>>,
    rx: Receiver<Reply<MovieDetail>>,
    waker: Option<Waker>,
    subscribers: Subscribers<DetailEvent>,
}

impl DetailController {
    pub fn new(api: Arc<dyn MovieApi>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            api,
            selected: None,
            detail: None,
            loading: false,
            error: None,
            user_rating: 0,
            rating_revisions: 0,
            in_flight: None,
            close_shortcut: None,
            tx,
            rx,
            waker: None,
            subscribers: Subscribers::new(),
        }
    }

    pub fn set_waker(&mut self, waker: Waker) {
        self.waker = Some(waker);
    }

    pub fn subscribe(&mut self, f: impl FnMut(&DetailEvent) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(f)
    }

    // ---- read side ----
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn detail(&self) -> Option<&MovieDetail> {
        self.detail.as_ref()
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub const fn user_rating(&self) -> u8 {
        self.user_rating
    }

    pub const fn rating_revisions(&self) -> u32 {
        self.rating_revisions
    }

    /// "+ Add to list" is offered only for a loaded, rated, unwatched movie.
    pub fn can_add(&self, watchlist: &WatchlistStore) -> bool {
        match (&self.detail, &self.selected) {
            (Some(_), Some(id)) => self.user_rating > 0 && !watchlist.contains(id),
            _ => false,
        }
    }

    // ---- intents ----
    /// Toggle: picking the open movie closes it; anything else opens it.
    pub fn select(&mut self, id: &str, shortcuts: &mut ShortcutRegistry) {
        if self.selected.as_deref() == Some(id) {
            self.close(shortcuts);
            return;
        }
        self.open(id, shortcuts);
    }

    pub fn close(&mut self, shortcuts: &mut ShortcutRegistry) {
        let was_open = self.selected.take().is_some();
        self.cancel_in_flight();
        self.detail = None;
        self.loading = false;
        self.error = None;
        self.reset_rating();
        if let Some(id) = self.close_shortcut.take() {
            shortcuts.unregister(id);
        }
        if was_open {
            self.subscribers.notify(&DetailEvent::Closed);
        }
    }

    /// Star widget callback. Only a change to a different non-zero value
    /// counts as a revision.
    pub fn set_user_rating(&mut self, rating: u8) {
        let rating = rating.min(MAX_USER_RATING);
        if rating == self.user_rating {
            return;
        }
        self.user_rating = rating;
        if rating > 0 {
            self.rating_revisions += 1;
        }
    }

    /// Build the watched entry, hand it to the store, then close the view.
    pub fn confirm_add(
        &mut self,
        watchlist: &mut WatchlistStore,
        shortcuts: &mut ShortcutRegistry,
    ) -> Result<(), ConfirmError> {
        let detail = self.detail.as_ref().ok_or(ConfirmError::NotLoaded)?;
        if self.user_rating == 0 {
            return Err(ConfirmError::Unrated);
        }
        let mut entry = WatchedEntry::from_detail(detail, self.user_rating, self.rating_revisions);
        if let Some(id) = &self.selected {
            entry.id = id.clone();
        }
        watchlist.add(entry)?;
        self.close(shortcuts);
        Ok(())
    }

    fn open(&mut self, id: &str, shortcuts: &mut ShortcutRegistry) {
        self.cancel_in_flight();
        self.selected = Some(id.to_string());
        self.detail = None;
        self.reset_rating();
        if self.close_shortcut.is_none() {
            self.close_shortcut =
                Some(shortcuts.register(CLOSE_DETAIL_KEY, ShortcutAction::CloseDetail));
        }
        self.subscribers.notify(&DetailEvent::Opened(id.to_string()));
        self.dispatch(id);
    }

    fn reset_rating(&mut self) {
        self.user_rating = 0;
        self.rating_revisions = 0;
    }

    fn cancel_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            debug!("canceling in-flight detail fetch #{}", token.id());
            token.cancel();
        }
    }

    fn dispatch(&mut self, id: &str) {
        let token = CancelToken::new();
        self.loading = true;
        self.error = None;
        self.in_flight = Some(token.clone());

        info!(imdb_id = %id, "fetching details");
        let api = Arc::clone(&self.api);
        let id = id.to_string();
        spawn_request(
            "detail",
            token,
            self.tx.clone(),
            self.waker.clone(),
            move || api.detail(&id),
        );
    }

    // ---- reply handling ----
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.rx.try_recv() {
                Ok(reply) => changed |= self.apply(reply),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changed
    }

    fn apply(&mut self, reply: Reply<MovieDetail>) -> bool {
        let is_current = self
            .in_flight
            .as_ref()
            .is_some_and(|t| t.same_request(&reply.token));
        if reply.token.is_cancelled() || !is_current {
            debug!("discarding stale detail reply #{}", reply.token.id());
            return false;
        }
        self.in_flight = None;
        self.loading = false;
        let id = self.selected.clone().unwrap_or_default();

        match reply.outcome {
            Ok(detail) => {
                let title = detail.title.clone();
                self.detail = Some(detail);
                self.error = None;
                self.subscribers.notify(&DetailEvent::Loaded { id, title });
            }
            Err(FetchError::Canceled) => {
                debug!("detail #{} canceled before it ran", reply.token.id());
            }
            Err(err) => {
                let message = err.user_message();
                warn!("detail fetch for {id} failed: {err}");
                self.detail = None;
                self.error = Some(message.clone());
                self.subscribers.notify(&DetailEvent::Failed { id, message });
            }
        }
        true
    }

    #[cfg(test)]
    pub(crate) fn settle_one(&mut self) -> bool {
        let reply = self
            .rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("detail worker reply");
        self.apply(reply)
    }
}

impl Drop for DetailController {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::error::WatchlistError;
    use crate::app::storage::MemoryStore;
    use crate::app::testing::{detail_of, FakeApi};

    fn controller(api: &Arc<FakeApi>) -> DetailController {
        DetailController::new(Arc::clone(api) as Arc<dyn MovieApi>)
    }

    fn empty_watchlist() -> WatchlistStore {
        WatchlistStore::load(Box::new(MemoryStore::new()), "watchedMovies")
    }

    #[test]
    fn selecting_twice_toggles_closed() {
        let api = FakeApi::new();
        api.on_detail("tt1375666", Ok(detail_of("tt1375666", "Inception")));
        let mut keys = ShortcutRegistry::new();
        let mut d = controller(&api);

        d.select("tt1375666", &mut keys);
        assert_eq!(d.selected(), Some("tt1375666"));
        assert!(d.is_loading());
        d.select("tt1375666", &mut keys);
        assert_eq!(d.selected(), None);
        assert!(!d.is_loading());
        assert!(keys.is_empty());
    }

    #[test]
    fn loads_detail_immediately() {
        let api = FakeApi::new();
        api.on_detail("tt1375666", Ok(detail_of("tt1375666", "Inception")));
        let mut keys = ShortcutRegistry::new();
        let mut d = controller(&api);
        d.select("tt1375666", &mut keys);
        assert!(d.settle_one());
        assert_eq!(d.detail().unwrap().title, "Inception");
        assert!(!d.is_loading());
        assert_eq!(d.error(), None);
        assert_eq!(api.calls(), vec!["detail:tt1375666"]);
    }

    #[test]
    fn switching_movies_discards_the_old_reply() {
        let api = FakeApi::new();
        api.on_detail("tt0133093", Ok(detail_of("tt0133093", "The Matrix")));
        api.on_detail("tt1375666", Ok(detail_of("tt1375666", "Inception")));
        let release_old = api.gate("tt0133093");
        let mut keys = ShortcutRegistry::new();
        let mut d = controller(&api);

        d.select("tt0133093", &mut keys);
        api.wait_for_calls(1);
        d.select("tt1375666", &mut keys);
        assert!(d.settle_one());
        release_old.send(()).unwrap();
        assert!(!d.settle_one());

        assert_eq!(d.detail().unwrap().title, "Inception");
        assert_eq!(d.error(), None);
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn closing_mid_flight_is_not_an_error() {
        let api = FakeApi::new();
        api.on_detail("tt0133093", Ok(detail_of("tt0133093", "The Matrix")));
        let release = api.gate("tt0133093");
        let mut keys = ShortcutRegistry::new();
        let mut d = controller(&api);
        d.select("tt0133093", &mut keys);
        d.close(&mut keys);
        release.send(()).unwrap();
        assert!(!d.settle_one());
        assert_eq!(d.error(), None);
        assert!(d.detail().is_none());
    }

    #[test]
    fn api_failure_sets_error_and_clears_detail() {
        let api = FakeApi::new();
        let mut keys = ShortcutRegistry::new();
        let mut d = controller(&api);
        d.select("tt0000000", &mut keys);
        d.settle_one();
        assert_eq!(d.error(), Some("Incorrect IMDb ID."));
        assert!(d.detail().is_none());
        assert!(!d.is_loading());
    }

    #[test]
    fn escape_binding_lives_only_while_open() {
        let api = FakeApi::new();
        let mut keys = ShortcutRegistry::new();
        let mut d = controller(&api);
        assert!(keys.dispatch("Escape").is_empty());

        d.select("tt1", &mut keys);
        d.select("tt2", &mut keys);
        assert_eq!(keys.dispatch("Escape"), vec![ShortcutAction::CloseDetail]);

        d.close(&mut keys);
        assert!(keys.is_empty());
        d.close(&mut keys);
        assert!(keys.is_empty());

        d.select("tt3", &mut keys);
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn rating_revisions_count_distinct_changes_and_reset_per_movie() {
        let api = FakeApi::new();
        let mut keys = ShortcutRegistry::new();
        let mut d = controller(&api);
        d.select("tt1", &mut keys);
        d.set_user_rating(6);
        d.set_user_rating(6);
        d.set_user_rating(8);
        d.set_user_rating(20);
        assert_eq!(d.user_rating(), 10);
        assert_eq!(d.rating_revisions(), 3);

        d.select("tt2", &mut keys);
        assert_eq!(d.user_rating(), 0);
        assert_eq!(d.rating_revisions(), 0);
    }

    #[test]
    fn confirm_add_writes_entry_and_closes() {
        let api = FakeApi::new();
        api.on_detail("tt1375666", Ok(detail_of("tt1375666", "Inception")));
        let mut keys = ShortcutRegistry::new();
        let mut watchlist = empty_watchlist();
        let mut d = controller(&api);

        d.select("tt1375666", &mut keys);
        d.settle_one();
        assert!(!d.can_add(&watchlist));
        assert_eq!(
            d.confirm_add(&mut watchlist, &mut keys),
            Err(ConfirmError::Unrated)
        );
        d.set_user_rating(7);
        d.set_user_rating(9);
        assert!(d.can_add(&watchlist));
        d.confirm_add(&mut watchlist, &mut keys).unwrap();

        let entry = watchlist.get("tt1375666").unwrap();
        assert_eq!(entry.user_rating, 9);
        assert_eq!(entry.rating_revision_count, 2);
        assert_eq!(entry.runtime_minutes, Some(148));
        assert_eq!(d.selected(), None);
        assert!(keys.is_empty());
    }

    #[test]
    fn watched_movie_cannot_be_added_again() {
        let api = FakeApi::new();
        api.on_detail("tt1375666", Ok(detail_of("tt1375666", "Inception")));
        let mut keys = ShortcutRegistry::new();
        let mut watchlist = empty_watchlist();
        let mut d = controller(&api);

        d.select("tt1375666", &mut keys);
        d.settle_one();
        d.set_user_rating(9);
        d.confirm_add(&mut watchlist, &mut keys).unwrap();

        d.select("tt1375666", &mut keys);
        d.settle_one();
        d.set_user_rating(3);
        assert!(!d.can_add(&watchlist));
        assert_eq!(
            d.confirm_add(&mut watchlist, &mut keys),
            Err(ConfirmError::Watchlist(WatchlistError::AlreadyWatched(
                "tt1375666".into()
            )))
        );
        assert_eq!(watchlist.len(), 1);
        assert_eq!(d.selected(), Some("tt1375666"));
    }

    #[test]
    fn confirm_without_detail_fails() {
        let api = FakeApi::new();
        let mut keys = ShortcutRegistry::new();
        let mut watchlist = empty_watchlist();
        let mut d = controller(&api);
        assert_eq!(
            d.confirm_add(&mut watchlist, &mut keys),
            Err(ConfirmError::NotLoaded)
        );
    }

    #[test]
    fn detail_and_search_do_not_share_cancellation() {
        use crate::app::search::SearchController;
        use crate::app::testing::page_of;
        use std::time::{Duration, Instant};

        let api = FakeApi::new();
        api.on_search("matrix", 1, Ok(page_of("m", 10, 23)));
        api.on_detail("tt0133093", Ok(detail_of("tt0133093", "The Matrix")));
        let mut keys = ShortcutRegistry::new();
        let mut d = controller(&api);
        let mut s = SearchController::new(
            Arc::clone(&api) as Arc<dyn MovieApi>,
            Duration::from_millis(600),
        );

        let t0 = Instant::now();
        s.set_query("matrix", t0);
        assert!(s.tick(t0 + Duration::from_millis(600)));
        d.select("tt0133093", &mut keys);
        s.set_query("ma", t0);
        assert!(!s.is_loading());
        assert!(d.is_loading());
        assert!(d.settle_one());
        assert_eq!(d.detail().unwrap().title, "The Matrix");
        assert!(s.results().is_empty());
    }
}

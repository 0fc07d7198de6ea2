// src/app/search.rs
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::cancel::CancelToken;
use super::debounce::Debouncer;
use super::error::FetchError;
use super::notify::{SubscriptionId, Subscribers};
use super::omdb::MovieApi;
use super::pagination::Pagination;
use super::types::{SearchPage, SearchResult};
use super::worker::{spawn_request, Reply, Waker};

/// Shorter queries never reach the network.
pub const MIN_QUERY_CHARS: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchEvent {
    /// Short query: results and error were wiped synchronously.
    Cleared,
    /// Debounce fired and a request for `(query, page)` went out.
    Started { query: String, page: u32 },
    Completed { total_results: u32 },
    Failed { message: String },
}

/// Owns the query, the result page and pagination; turns keystrokes into at
/// most one live request.
pub struct SearchController {
    api: Arc<dyn MovieApi>,
    debounce: Debouncer,

    query: String,
    pagination: Pagination,
    results: Vec<SearchResult>,
    total_results: u32,
    loading: bool,
    error: Option<String>,

    in_flight: Option<CancelToken>,
    outstanding: usize,
    tx: Sender<Reply<SearchPage>>,
    rx: Receiver<Reply<SearchPage>>,
    waker: Option<Waker>,
    subscribers: Subscribers<SearchEvent>,
}

impl SearchController {
    pub fn new(api: Arc<dyn MovieApi>, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            api,
            debounce: Debouncer::new(debounce),
            query: String::new(),
            pagination: Pagination::default(),
            results: Vec::new(),
            total_results: 0,
            loading: false,
            error: None,
            in_flight: None,
            outstanding: 0,
            tx,
            rx,
            waker: None,
            subscribers: Subscribers::new(),
        }
    }

    pub fn set_waker(&mut self, waker: Waker) {
        self.waker = Some(waker);
    }

    pub fn subscribe(&mut self, f: impl FnMut(&SearchEvent) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(f)
    }

    // ---- read side ----
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub const fn total_results(&self) -> u32 {
        self.total_results
    }

    pub const fn page(&self) -> u32 {
        self.pagination.page()
    }

    pub const fn page_count(&self) -> u32 {
        self.pagination.page_count()
    }

    pub const fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Time until the pending debounce fires, if one is pending.
    pub fn debounce_remaining(&self, now: Instant) -> Option<Duration> {
        self.debounce.remaining(now)
    }

    // ---- intents ----
    pub fn set_query(&mut self, query: &str, now: Instant) {
        if query == self.query {
            return;
        }
        self.query = query.to_string();
        self.pagination.reset();

        if self.query.chars().count() < MIN_QUERY_CHARS {
            self.debounce.cancel();
            self.cancel_in_flight();
            self.results.clear();
            self.error = None;
            self.loading = false;
            self.total_results = 0;
            self.pagination.set_total_results(0);
            self.subscribers.notify(&SearchEvent::Cleared);
            return;
        }

        self.reschedule(now);
    }

    pub fn next_page(&mut self, now: Instant) -> bool {
        let moved = self.pagination.next();
        if moved {
            self.reschedule(now);
        }
        moved
    }

    pub fn prev_page(&mut self, now: Instant) -> bool {
        let moved = self.pagination.prev();
        if moved {
            self.reschedule(now);
        }
        moved
    }

    /// The request in flight answers an older (query, page); orphan it so its
    /// reply can't land while the new debounce is still pending.
    fn reschedule(&mut self, now: Instant) {
        self.cancel_in_flight();
        self.debounce.schedule(now);
    }

    /// Fire the debounce if due. Returns true when a request was issued, which
    /// is the caller's cue to close any open detail view.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.debounce.fire_if_ready(now) {
            return false;
        }
        if self.query.chars().count() < MIN_QUERY_CHARS {
            return false;
        }
        self.dispatch();
        true
    }

    /// View teardown: drop the timer and orphan whatever is in flight.
    pub fn shutdown(&mut self) {
        self.debounce.cancel();
        self.cancel_in_flight();
        self.loading = false;
    }

    fn cancel_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            debug!("canceling in-flight search #{}", token.id());
            token.cancel();
        }
    }

    fn dispatch(&mut self) {
        self.cancel_in_flight();

        let token = CancelToken::new();
        let query = self.query.clone();
        let page = self.pagination.page();

        self.loading = true;
        self.error = None;
        self.in_flight = Some(token.clone());
        self.outstanding += 1;

        info!(query = %query, page, outstanding = self.outstanding, "searching");
        self.subscribers.notify(&SearchEvent::Started {
            query: query.clone(),
            page,
        });

        let api = Arc::clone(&self.api);
        spawn_request(
            "search",
            token,
            self.tx.clone(),
            self.waker.clone(),
            move || api.search(&query, page),
        );
    }

    // ---- reply handling ----
    /// Drain finished requests. Returns true if visible state changed.
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

    fn apply(&mut self, reply: Reply<SearchPage>) -> bool {
        self.outstanding = self.outstanding.saturating_sub(1);

        let is_current = self
            .in_flight
            .as_ref()
            .is_some_and(|t| t.same_request(&reply.token));
        if reply.token.is_cancelled() || !is_current {
            debug!("discarding stale search reply #{}", reply.token.id());
            return false;
        }
        self.in_flight = None;
        self.loading = false;

        match reply.outcome {
            Ok(page) => {
                self.results = page.results;
                self.total_results = page.total_results;
                self.pagination.set_total_results(page.total_results);
                self.error = None;
                self.subscribers.notify(&SearchEvent::Completed {
                    total_results: self.total_results,
                });
            }
            Err(FetchError::Canceled) => {
                debug!("search #{} canceled before it ran", reply.token.id());
            }
            Err(err) => {
                let message = err.user_message();
                warn!("search for {:?} failed: {err}", self.query);
                self.results.clear();
                self.total_results = 0;
                self.error = Some(message.clone());
                self.subscribers.notify(&SearchEvent::Failed { message });
            }
        }
        true
    }

    /// Block for the next worker reply and apply it.
    #[cfg(test)]
    pub(crate) fn settle_one(&mut self) -> bool {
        let reply = self
            .rx
            .recv_timeout(Duration::from_secs(5))
            .expect("search worker reply");
        self.apply(reply)
    }

    #[cfg(test)]
    pub(crate) const fn outstanding(&self) -> usize {
        self.outstanding
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::{page_of, FakeApi};
    use std::cell::RefCell;
    use std::rc::Rc;

    const DEBOUNCE: Duration = Duration::from_millis(600);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn controller(api: &Arc<FakeApi>) -> SearchController {
        SearchController::new(Arc::clone(api) as Arc<dyn MovieApi>, DEBOUNCE)
    }

    #[test]
    fn short_query_clears_without_network() {
        let api = FakeApi::new();
        let mut s = controller(&api);
        let t0 = Instant::now();
        for q in ["", "m", "ma"] {
            s.set_query(q, t0);
            assert!(!s.tick(t0 + DEBOUNCE * 2));
            assert!(s.results().is_empty());
            assert_eq!(s.error(), None);
            assert!(!s.is_loading());
        }
        assert!(api.calls().is_empty());
    }

    #[test]
    fn short_query_wipes_previous_results_immediately() {
        let api = FakeApi::new();
        api.on_search("matrix", 1, Ok(page_of("m", 10, 23)));
        let mut s = controller(&api);
        let t0 = Instant::now();
        s.set_query("matrix", t0);
        assert!(s.tick(t0 + DEBOUNCE));
        s.settle_one();
        assert_eq!(s.results().len(), 10);

        s.set_query("ma", t0 + ms(700));
        assert!(s.results().is_empty());
        assert_eq!(s.total_results(), 0);
        assert!(!s.debounce.is_pending());
    }

    #[test]
    fn rapid_typing_issues_one_request_for_final_query() {
        let api = FakeApi::new();
        api.on_search("matrix", 1, Ok(page_of("m", 10, 23)));
        let mut s = controller(&api);
        let t0 = Instant::now();
        for (i, q) in ["mat", "matr", "matri", "matrix"].iter().enumerate() {
            s.set_query(q, t0 + ms(100 * i as u64));
            assert!(!s.tick(t0 + ms(100 * i as u64 + 50)));
        }
        assert!(!s.tick(t0 + ms(850)));
        assert!(s.tick(t0 + ms(900)));
        assert!(s.is_loading());
        s.settle_one();
        assert_eq!(api.calls(), vec!["search:matrix:1".to_string()]);
        assert!(!s.is_loading());
    }

    #[test]
    fn matrix_scenario_paginates_and_clamps() {
        let api = FakeApi::new();
        api.on_search("matrix", 1, Ok(page_of("a", 10, 23)));
        api.on_search("matrix", 2, Ok(page_of("b", 10, 23)));
        api.on_search("matrix", 3, Ok(page_of("c", 3, 23)));
        let mut s = controller(&api);
        let mut now = Instant::now();

        s.set_query("matrix", now);
        now += DEBOUNCE;
        assert!(s.tick(now));
        s.settle_one();
        assert_eq!(s.page_count(), 3);
        assert_eq!(s.total_results(), 23);

        for expected in [2, 3] {
            assert!(s.next_page(now));
            assert_eq!(s.page(), expected);
            now += DEBOUNCE;
            assert!(s.tick(now));
            s.settle_one();
        }
        assert!(!s.next_page(now));
        assert_eq!(s.page(), 3);
        assert_eq!(s.results().len(), 3);
        assert_eq!(
            api.calls(),
            vec!["search:matrix:1", "search:matrix:2", "search:matrix:3"]
        );
    }

    #[test]
    fn prev_page_never_goes_below_one() {
        let api = FakeApi::new();
        let mut s = controller(&api);
        let t0 = Instant::now();
        assert!(!s.prev_page(t0));
        assert_eq!(s.page(), 1);
        assert!(!s.debounce.is_pending());
    }

    #[test]
    fn query_change_resets_page() {
        let api = FakeApi::new();
        api.on_search("matrix", 1, Ok(page_of("a", 10, 23)));
        let mut s = controller(&api);
        let mut now = Instant::now();
        s.set_query("matrix", now);
        now += DEBOUNCE;
        s.tick(now);
        s.settle_one();
        s.next_page(now);
        assert_eq!(s.page(), 2);
        s.set_query("matrix reloaded", now);
        assert_eq!(s.page(), 1);
    }

    #[test]
    fn api_error_scenario() {
        let api = FakeApi::new();
        api.on_search(
            "xyzzynotamovie",
            1,
            Err(FetchError::Api("Movie not found!".into())),
        );
        let mut s = controller(&api);
        let t0 = Instant::now();
        s.set_query("xyzzynotamovie", t0);
        s.tick(t0 + DEBOUNCE);
        s.settle_one();
        assert_eq!(s.error(), Some("Movie not found!"));
        assert!(s.results().is_empty());
        assert!(!s.is_loading());
    }

    #[test]
    fn failure_keeps_previous_page_count() {
        let api = FakeApi::new();
        api.on_search("matrix", 1, Ok(page_of("a", 10, 23)));
        api.on_search("matrixx", 1, Err(FetchError::Status(500)));
        let mut s = controller(&api);
        let mut now = Instant::now();
        s.set_query("matrix", now);
        now += DEBOUNCE;
        s.tick(now);
        s.settle_one();
        s.set_query("matrixx", now);
        now += DEBOUNCE;
        s.tick(now);
        s.settle_one();
        assert_eq!(s.error(), Some("Something went wrong"));
        assert_eq!(s.total_results(), 0);
        assert_eq!(s.page_count(), 3);
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let api = FakeApi::new();
        api.on_search("zzzz", 1, Ok(SearchPage::default()));
        let mut s = controller(&api);
        let t0 = Instant::now();
        s.set_query("zzzz", t0);
        s.tick(t0 + DEBOUNCE);
        s.settle_one();
        assert!(s.results().is_empty());
        assert_eq!(s.error(), None);
        assert_eq!(s.total_results(), 0);
        assert_eq!(s.page_count(), 1);
    }

    #[test]
    fn late_reply_from_superseded_query_is_discarded() {
        let api = FakeApi::new();
        api.on_search("matrix", 1, Ok(page_of("old", 10, 23)));
        api.on_search("inception", 1, Ok(page_of("new", 4, 4)));
        let release_old = api.gate("matrix");
        let mut s = controller(&api);
        let mut now = Instant::now();

        s.set_query("matrix", now);
        now += DEBOUNCE;
        assert!(s.tick(now));
        api.wait_for_calls(1);

        s.set_query("inception", now);
        now += DEBOUNCE;
        assert!(s.tick(now));

        // "inception" resolves first while "matrix" is still held.
        assert!(s.settle_one());
        assert_eq!(s.total_results(), 4);
        assert_eq!(s.results()[0].id, "ttnew00");

        release_old.send(()).unwrap();
        assert!(!s.settle_one());
        assert_eq!(s.outstanding(), 0);
        assert_eq!(s.total_results(), 4);
        assert_eq!(s.results().len(), 4);
        assert_eq!(s.error(), None);
        assert!(!s.is_loading());
    }

    #[test]
    fn query_edit_orphans_reply_arriving_inside_debounce_window() {
        let api = FakeApi::new();
        api.on_search("matrix", 1, Ok(page_of("m", 10, 23)));
        api.on_search("inception", 1, Ok(page_of("i", 4, 4)));
        let release = api.gate("matrix");
        let mut s = controller(&api);
        let t0 = Instant::now();

        s.set_query("matrix", t0);
        assert!(s.tick(t0 + DEBOUNCE));
        api.wait_for_calls(1);

        s.set_query("inception", t0 + ms(700));
        release.send(()).unwrap();
        assert!(!s.settle_one());
        assert!(s.results().is_empty());
        assert_eq!(s.total_results(), 0);
        assert_eq!(s.page_count(), 1);
        assert_eq!(s.outstanding(), 0);

        assert!(s.tick(t0 + ms(700) + DEBOUNCE));
        assert!(s.settle_one());
        assert_eq!(s.total_results(), 4);
        assert_eq!(s.results()[0].id, "tti00");
        assert!(!s.is_loading());
    }

    #[test]
    fn page_change_orphans_reply_for_previous_page() {
        let api = FakeApi::new();
        api.on_search("matrix", 1, Ok(page_of("a", 10, 23)));
        api.on_search("matrix", 2, Ok(page_of("b", 10, 23)));
        api.on_search("matrix", 3, Ok(page_of("c", 3, 23)));
        let mut s = controller(&api);
        let mut now = Instant::now();

        s.set_query("matrix", now);
        now += DEBOUNCE;
        assert!(s.tick(now));
        assert!(s.settle_one());

        let release_two = api.gate("matrix");
        assert!(s.next_page(now));
        now += DEBOUNCE;
        assert!(s.tick(now));
        api.wait_for_calls(2);

        // User moves on to page 3 while page 2 is still held.
        assert!(s.next_page(now + ms(100)));
        release_two.send(()).unwrap();
        assert!(!s.settle_one());
        assert_eq!(s.results()[0].id, "tta00");
        assert_eq!(s.page(), 3);

        assert!(s.tick(now + ms(100) + DEBOUNCE));
        assert!(s.settle_one());
        assert_eq!(s.results().len(), 3);
        assert_eq!(s.results()[0].id, "ttc00");
        assert!(!s.is_loading());
    }

    #[test]
    fn short_query_orphans_in_flight_request() {
        let api = FakeApi::new();
        api.on_search("matrix", 1, Ok(page_of("m", 10, 23)));
        let release = api.gate("matrix");
        let mut s = controller(&api);
        let t0 = Instant::now();
        s.set_query("matrix", t0);
        s.tick(t0 + DEBOUNCE);
        assert!(s.is_loading());

        s.set_query("m", t0 + DEBOUNCE);
        assert!(!s.is_loading());
        release.send(()).unwrap();
        assert!(!s.settle_one());
        assert!(s.results().is_empty());
    }

    #[test]
    fn events_follow_request_lifecycle() {
        let api = FakeApi::new();
        api.on_search("matrix", 1, Ok(page_of("m", 10, 23)));
        let mut s = controller(&api);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        s.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        let t0 = Instant::now();
        s.set_query("matrix", t0);
        s.tick(t0 + DEBOUNCE);
        s.settle_one();
        s.set_query("", t0 + DEBOUNCE);

        assert_eq!(
            *seen.borrow(),
            vec![
                SearchEvent::Started {
                    query: "matrix".into(),
                    page: 1
                },
                SearchEvent::Completed { total_results: 23 },
                SearchEvent::Cleared,
            ]
        );
    }
}

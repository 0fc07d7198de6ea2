// src/app/testing.rs
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use super::error::FetchError;
use super::omdb::MovieApi;
use super::types::{MovieDetail, SearchPage, SearchResult};

/// Scripted [`MovieApi`] for controller tests.
///
/// A gated key blocks the worker thread until the returned sender fires (or
/// drops), which lets a test decide the order replies arrive in.
#[derive(Default)]
pub(crate) struct FakeApi {
    searches: Mutex<HashMap<(String, u32), Result<SearchPage, FetchError>>>,
    details: Mutex<HashMap<String, Result<MovieDetail, FetchError>>>,
    gates: Mutex<HashMap<String, Receiver<()>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn on_search(&self, query: &str, page: u32, outcome: Result<SearchPage, FetchError>) {
        self.searches
            .lock()
            .unwrap()
            .insert((query.to_string(), page), outcome);
    }

    pub(crate) fn on_detail(&self, id: &str, outcome: Result<MovieDetail, FetchError>) {
        self.details.lock().unwrap().insert(id.to_string(), outcome);
    }

    /// Hold the next call for `key` (a query or an imdb id) until released.
    pub(crate) fn gate(&self, key: &str) -> Sender<()> {
        let (tx, rx) = mpsc::channel();
        self.gates.lock().unwrap().insert(key.to_string(), rx);
        tx
    }

    /// Calls recorded as `search:<query>:<page>` / `detail:<id>`.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Spin until at least `n` calls reached the fake (the worker is running).
    pub(crate) fn wait_for_calls(&self, n: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.calls.lock().unwrap().len() < n {
            assert!(Instant::now() < deadline, "worker never called the api");
            thread::sleep(Duration::from_millis(2));
        }
    }

    fn wait_gate(&self, key: &str) {
        let gate = self.gates.lock().unwrap().remove(key);
        if let Some(rx) = gate {
            let _ = rx.recv();
        }
    }
}

impl MovieApi for FakeApi {
    fn search(&self, query: &str, page: u32) -> Result<SearchPage, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("search:{query}:{page}"));
        self.wait_gate(query);
        self.searches
            .lock()
            .unwrap()
            .get(&(query.to_string(), page))
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Api("Movie not found!".into())))
    }

    fn detail(&self, imdb_id: &str) -> Result<MovieDetail, FetchError> {
        self.calls.lock().unwrap().push(format!("detail:{imdb_id}"));
        self.wait_gate(imdb_id);
        self.details
            .lock()
            .unwrap()
            .get(imdb_id)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Api("Incorrect IMDb ID.".into())))
    }
}

pub(crate) fn page_of(prefix: &str, count: usize, total_results: u32) -> SearchPage {
    SearchPage {
        results: (0..count)
            .map(|i| SearchResult {
                id: format!("tt{prefix}{i:02}"),
                title: format!("{prefix} {i}"),
                year: "1999".into(),
                poster_url: None,
            })
            .collect(),
        total_results,
    }
}

pub(crate) fn detail_of(id: &str, title: &str) -> MovieDetail {
    MovieDetail {
        id: id.into(),
        title: title.into(),
        year: Some("2010".into()),
        poster_url: Some(format!("https://img.example/{id}.jpg")),
        runtime: Some("148 min".into()),
        imdb_rating: Some(8.8),
        plot: Some("A thief who steals corporate secrets.".into()),
        released: Some("16 Jul 2010".into()),
        actors: Some("Leonardo DiCaprio".into()),
        director: Some("Christopher Nolan".into()),
        genre: Some("Action, Sci-Fi".into()),
    }
}

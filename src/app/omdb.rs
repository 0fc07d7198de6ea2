// src/app/omdb.rs
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use super::error::FetchError;
use super::types::{MovieDetail, SearchPage, SearchResult};
use super::utils::{parse_rating, parse_total_results, present};

const REQUEST_TIMEOUT_SECS: u64 = 15;

/// The remote movie database, as seen by the controllers.
///
/// Calls block; controllers run them on worker threads.
pub trait MovieApi: Send + Sync {
    fn search(&self, query: &str, page: u32) -> Result<SearchPage, FetchError>;
    fn detail(&self, imdb_id: &str) -> Result<MovieDetail, FetchError>;
}

// ---- wire format ----
#[derive(Debug, Deserialize)]
struct WireSearch {
    #[serde(rename = "Search", default)]
    search: Option<Vec<WireSearchItem>>,
    #[serde(rename = "totalResults", default)]
    total_results: Option<String>,
    #[serde(rename = "Response", default)]
    response: Option<String>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireSearchItem {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireDetail {
    #[serde(rename = "imdbID", default)]
    imdb_id: Option<String>,
    #[serde(rename = "Title", default)]
    title: Option<String>,
    #[serde(rename = "Year", default)]
    year: Option<String>,
    #[serde(rename = "Poster", default)]
    poster: Option<String>,
    #[serde(rename = "Runtime", default)]
    runtime: Option<String>,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: Option<String>,
    #[serde(rename = "Plot", default)]
    plot: Option<String>,
    #[serde(rename = "Released", default)]
    released: Option<String>,
    #[serde(rename = "Actors", default)]
    actors: Option<String>,
    #[serde(rename = "Director", default)]
    director: Option<String>,
    #[serde(rename = "Genre", default)]
    genre: Option<String>,
    #[serde(rename = "Response", default)]
    response: Option<String>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

/// `Error` wins; a bare `Response:"False"` still counts as a failure.
fn api_failure(response: Option<&str>, error: Option<String>) -> Option<FetchError> {
    if let Some(msg) = error {
        return Some(FetchError::Api(msg));
    }
    match response {
        Some(r) if r.eq_ignore_ascii_case("false") => Some(FetchError::Api(String::new())),
        _ => None,
    }
}

fn check_status(status: u16) -> Result<(), FetchError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(FetchError::Status(status))
    }
}

pub fn decode_search(status: u16, body: &str) -> Result<SearchPage, FetchError> {
    check_status(status)?;
    let wire: WireSearch =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    if let Some(err) = api_failure(wire.response.as_deref(), wire.error) {
        return Err(err);
    }
    let results = wire
        .search
        .unwrap_or_default()
        .into_iter()
        .map(|item| SearchResult {
            id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster_url: present(item.poster),
        })
        .collect();
    Ok(SearchPage {
        results,
        total_results: parse_total_results(wire.total_results.as_deref()),
    })
}

pub fn decode_detail(status: u16, body: &str, requested_id: &str) -> Result<MovieDetail, FetchError> {
    check_status(status)?;
    let wire: WireDetail =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    if let Some(err) = api_failure(wire.response.as_deref(), wire.error) {
        return Err(err);
    }
    Ok(MovieDetail {
        id: present(wire.imdb_id).unwrap_or_else(|| requested_id.to_string()),
        title: present(wire.title).unwrap_or_default(),
        year: present(wire.year),
        poster_url: present(wire.poster),
        runtime: present(wire.runtime),
        imdb_rating: wire.imdb_rating.as_deref().and_then(parse_rating),
        plot: present(wire.plot),
        released: present(wire.released),
        actors: present(wire.actors),
        director: present(wire.director),
        genre: present(wire.genre),
    })
}

// ---- HTTP client ----
pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, String> {
        let client = Client::builder()
            .user_agent("popcorn/omdb")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| format!("http client: {e}"))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('&').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// `<base>?apikey=<key>`; extra params are appended with `&`.
    fn url_with(&self, params: &str) -> String {
        let sep = if self.base_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}apikey={}&{}",
            self.base_url,
            sep,
            urlencoding::encode(&self.api_key),
            params
        )
    }

    pub fn search_url(&self, query: &str, page: u32) -> String {
        self.url_with(&format!("s={}&page={page}", urlencoding::encode(query)))
    }

    pub fn detail_url(&self, imdb_id: &str) -> String {
        self.url_with(&format!("i={}", urlencoding::encode(imdb_id)))
    }

    fn get(&self, url: &str) -> Result<(u16, String), FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| FetchError::Network(format!("read body: {e}")))?;
        Ok((status, body))
    }
}

impl MovieApi for OmdbClient {
    fn search(&self, query: &str, page: u32) -> Result<SearchPage, FetchError> {
        debug!(query = %query, page, "omdb search");
        let (status, body) = self.get(&self.search_url(query, page))?;
        decode_search(status, &body)
    }

    fn detail(&self, imdb_id: &str) -> Result<MovieDetail, FetchError> {
        debug!(imdb_id = %imdb_id, "omdb detail");
        let (status, body) = self.get(&self.detail_url(imdb_id))?;
        decode_detail(status, &body, imdb_id)
    }
}

/// Stand-in used when no API key is configured.
pub struct MissingKeyApi;

impl MovieApi for MissingKeyApi {
    fn search(&self, _query: &str, _page: u32) -> Result<SearchPage, FetchError> {
        Err(FetchError::Api("No OMDb API key configured".into()))
    }

    fn detail(&self, _imdb_id: &str) -> Result<MovieDetail, FetchError> {
        Err(FetchError::Api("No OMDb API key configured".into()))
    }
}

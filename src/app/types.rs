// src/app/types.rs
use serde::{Deserialize, Serialize};

use super::utils::{field_exists, parse_runtime_minutes};

/// Fixed by the movie API: one search page holds ten results.
pub const PAGE_SIZE: u32 = 10;

// ---- search ----
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster_url: Option<String>,
}

/// One page of search results as returned by the API.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchPage {
    pub results: Vec<SearchResult>,
    pub total_results: u32,
}

// ---- detail ----
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovieDetail {
    pub id: String,
    pub title: String,
    pub year: Option<String>,
    pub poster_url: Option<String>,
    /// Raw runtime text, e.g. "148 min".
    pub runtime: Option<String>,
    pub imdb_rating: Option<f32>,
    pub plot: Option<String>,
    pub released: Option<String>,
    pub actors: Option<String>,
    pub director: Option<String>,
    pub genre: Option<String>,
}

impl MovieDetail {
    pub fn runtime_minutes(&self) -> Option<u32> {
        self.runtime.as_deref().and_then(parse_runtime_minutes)
    }
}

// ---- watchlist ----
/// A rated movie in the watchlist. Field names match the persisted JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WatchedEntry {
    #[serde(rename = "imdbID")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(rename = "poster", default)]
    pub poster_url: Option<String>,
    #[serde(rename = "runtime", default)]
    pub runtime_minutes: Option<u32>,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<f32>,
    #[serde(rename = "userRating")]
    pub user_rating: u8,
    #[serde(rename = "countRatingDecisions", default)]
    pub rating_revision_count: u32,
}

impl WatchedEntry {
    pub fn from_detail(detail: &MovieDetail, user_rating: u8, rating_revision_count: u32) -> Self {
        Self {
            id: detail.id.clone(),
            title: detail.title.clone(),
            year: detail.year.clone().unwrap_or_default(),
            poster_url: detail.poster_url.clone(),
            runtime_minutes: detail.runtime_minutes(),
            imdb_rating: detail.imdb_rating,
            user_rating,
            rating_revision_count,
        }
    }

    pub fn has_poster(&self) -> bool {
        self.poster_url.as_deref().is_some_and(field_exists)
    }
}

// ---- posters ----
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PosterState {
    Pending, // queued or downloading
    Decoded, // pixels in memory (ready to upload)
    Ready,   // texture uploaded
    Failed,  // permanent failure
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inception() -> MovieDetail {
        MovieDetail {
            id: "tt1375666".into(),
            title: "Inception".into(),
            year: Some("2010".into()),
            poster_url: Some("https://m.media-amazon.com/images/inception.jpg".into()),
            runtime: Some("148 min".into()),
            imdb_rating: Some(8.8),
            ..Default::default()
        }
    }

    #[test]
    fn entry_from_detail_copies_numbers() {
        let e = WatchedEntry::from_detail(&inception(), 9, 3);
        assert_eq!(e.id, "tt1375666");
        assert_eq!(e.runtime_minutes, Some(148));
        assert_eq!(e.imdb_rating, Some(8.8));
        assert_eq!(e.user_rating, 9);
        assert_eq!(e.rating_revision_count, 3);
        assert!(e.has_poster());
    }

    #[test]
    fn entry_serializes_with_legacy_field_names() {
        let mut detail = inception();
        detail.runtime = Some("N/A".into());
        let e = WatchedEntry::from_detail(&detail, 7, 1);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["imdbID"], "tt1375666");
        assert_eq!(json["userRating"], 7);
        assert_eq!(json["countRatingDecisions"], 1);
        assert!(json["runtime"].is_null());
    }

    #[test]
    fn entry_accepts_null_numbers() {
        let raw = r#"{"imdbID":"tt1","title":"T","year":"1999","poster":"N/A",
                      "runtime":null,"imdbRating":null,"userRating":5,"countRatingDecisions":2}"#;
        let e: WatchedEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(e.runtime_minutes, None);
        assert_eq!(e.imdb_rating, None);
        assert!(!e.has_poster());
    }
}

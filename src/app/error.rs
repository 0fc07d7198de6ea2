// src/app/error.rs
use thiserror::Error;

/// Message shown for every failure that carries no API-supplied text.
pub const GENERIC_FETCH_ERROR: &str = "Something went wrong";

/// Failure of a single search or detail request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("unreadable response: {0}")]
    Decode(String),

    /// The API answered but reported `Response: "False"` / an `Error` field.
    #[error("{0}")]
    Api(String),

    #[error("request canceled")]
    Canceled,
}

impl FetchError {
    /// Text for the error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(msg) if !msg.trim().is_empty() => msg.clone(),
            _ => GENERIC_FETCH_ERROR.to_string(),
        }
    }

    pub const fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchlistError {
    #[error("{0} is already in the watchlist")]
    AlreadyWatched(String),

    #[error("rating {0} is outside 1..=10")]
    InvalidRating(u8),
}

/// Why "+ Add to list" could not be completed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfirmError {
    #[error("no movie details are loaded")]
    NotLoaded,

    #[error("rate the movie before adding it")]
    Unrated,

    #[error(transparent)]
    Watchlist(#[from] WatchlistError),
}

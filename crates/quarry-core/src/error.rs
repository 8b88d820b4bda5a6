//! Error taxonomy for remote calls and history persistence.
//!
//! Each remote operation class has its own error so the controller can
//! route it to the right channel: suggestion and stats failures are only
//! logged, search failures set the view model's error, index and upload
//! failures raise a [`Notice`](crate::view::Notice).

use thiserror::Error;

/// Suggestion fetch failed. Recovered locally as an empty list.
#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("suggestion request failed: {0}")]
    Transport(String),
    #[error("suggestion service returned status {0}")]
    Status(u16),
    #[error("invalid suggestion response: {0}")]
    Decode(String),
}

/// Search submission failed or was rejected before contacting the service.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("query must not be empty")]
    EmptyQuery,
    #[error("search request failed: {0}")]
    Transport(String),
    #[error("search service returned status {0}")]
    Status(u16),
    #[error("invalid search response: {0}")]
    Decode(String),
}

impl SearchError {
    /// Message shown in the dismissible error banner.
    pub fn user_message(&self) -> String {
        match self {
            SearchError::EmptyQuery => "Enter a search query.".to_string(),
            _ => "Search failed. Make sure the backend is running.".to_string(),
        }
    }
}

/// Stats refresh failed. The previous snapshot is kept.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("stats request failed: {0}")]
    Transport(String),
    #[error("stats service returned status {0}")]
    Status(u16),
    #[error("invalid stats response: {0}")]
    Decode(String),
}

/// Batch indexing failed.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index request failed: {0}")]
    Transport(String),
    #[error("index service returned status {0}")]
    Status(u16),
}

/// Single-file upload failed. The pending file stays selected.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("could not read {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("upload request failed: {0}")]
    Transport(String),
    #[error("upload service returned status {0}")]
    Status(u16),
    #[error("invalid upload response: {0}")]
    Decode(String),
}

/// The history slot could not be written.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to encode history: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to persist history: {0}")]
    Persist(String),
}

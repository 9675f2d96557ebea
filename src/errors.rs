//! Typed error hierarchy for the progress board.
//!
//! Two top-level enums cover the two layers:
//! - `ApiError`: failures talking to the Goals-OKR service
//! - `BoardError`: controller and storage failures surfaced to the user
//!
//! Per-card title resolution failures never become a `BoardError`; they are
//! absorbed by the resolver and logged.

use thiserror::Error;

/// Errors from the Goals-OKR REST collaborator.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 404. The resolver relies on telling this apart from every other
    /// failure.
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("Goals-OKR service returned {status} for {resource}: {message}")]
    Status {
        resource: String,
        status: u16,
        message: String,
    },

    #[error("Request for {resource} failed: {source}")]
    Transport {
        resource: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode {resource}: {message}")]
    Decode { resource: String, message: String },
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors from the board controller and local storage.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Card {id} is not on the board")]
    ItemNotFound { id: i64 },

    #[error("This board is read-only (team board)")]
    ReadOnly,

    #[error("No drag in progress")]
    NoActiveDrag,

    #[error("Failed to load the board: {0}")]
    Load(#[source] ApiError),

    /// A user-initiated mutation failed. Not retried; the user may repeat
    /// the gesture.
    #[error("Could not {action}: {source}")]
    Mutation {
        action: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("Storage error at {path}: {source}")]
    Storage {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

//! CampusGuide Error Types
//!
//! Centralized error handling for the assistant engine.

use thiserror::Error;

/// Central error type for CampusGuide
#[derive(Error, Debug)]
pub enum GuideError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Voice input error: {0}")]
    Voice(String),

    #[error("Lock poisoned: {0}")]
    Lock(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Sql(#[from] rusqlite::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for CampusGuide operations
pub type GuideResult<T> = Result<T, GuideError>;

/// Helper to convert Mutex poison errors
impl<T> From<std::sync::PoisonError<T>> for GuideError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        GuideError::Lock(err.to_string())
    }
}

//! Shared error types for the services crate.

use thiserror::Error;

use katha_core::assets::AssetUrlError;
use katha_core::model::{ProgressError, QuizError};
use storage::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ApiClient`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("request rejected as unauthorized; session cleared")]
    Unauthorized,
    #[error("request requires a signed-in user")]
    NotSignedIn,
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    /// Status code carried by the error, when the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            ApiError::Unauthorized => Some(reqwest::StatusCode::UNAUTHORIZED),
            ApiError::HttpStatus(status) => Some(*status),
            ApiError::Http(err) => err.status(),
            _ => None,
        }
    }
}

/// Errors emitted by `SessionContext`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("failed to encode user profile: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ApiConfig`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid {var}: {raw:?}")]
    InvalidVar { var: &'static str, raw: String },
    #[error(transparent)]
    AssetBase(#[from] AssetUrlError),
}

/// Errors emitted by `ChapterReader`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReaderError {
    #[error("chapter has no scenes")]
    EmptyChapter,
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("quiz is not finished")]
    Unfinished,
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
